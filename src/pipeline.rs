// src/pipeline.rs
//! Per-file processing: size check, parse, root classification, dispatch.
//!
//! Every file-fatal condition (oversized, unreadable, empty, malformed,
//! unrecognised root) becomes a marker inside the file's own result tree.
//! The only error this module ever returns is an operator interrupt.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::Serialize;

use crate::dispatch::dispatch;
use crate::error::Result;
use crate::model::{parse_document, Document};
use crate::stats::{
    activity, file, organisation, rules, ActivityContext, FileContext, Flavor,
    OrganisationContext, RecordFilter,
};
use crate::value::Value;

/// Files above this many bytes are never parsed; the size alone is recorded.
/// Matches the upstream registry's archiver limit.
pub const MAX_FILE_BYTES: u64 = 50_000_000;

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub flavor: Flavor,
    pub strict: bool,
    pub today: NaiveDate,
    pub debug: bool,
    pub max_file_bytes: u64,
}

impl PipelineOptions {
    #[must_use]
    pub fn new(flavor: Flavor, today: NaiveDate) -> Self {
        PipelineOptions {
            flavor,
            strict: false,
            today,
            debug: false,
            max_file_bytes: MAX_FILE_BYTES,
        }
    }
}

/// One file's full output: the file-granularity mapping plus one mapping per
/// dispatched record.
#[derive(Debug, Clone, Serialize)]
pub struct FileStats {
    pub file: Value,
    pub elements: Vec<Value>,
}

impl FileStats {
    fn marker(pairs: &[(&str, Value)]) -> Self {
        let mut tree = BTreeMap::new();
        for (key, value) in pairs {
            let _ = tree.insert((*key).to_string(), value.clone());
        }
        FileStats {
            file: Value::Tree(tree),
            elements: Vec::new(),
        }
    }
}

/// Runs the whole pipeline for one input file.
pub fn process_file(path: &Path, opts: &PipelineOptions) -> Result<FileStats> {
    let file_size = fs::metadata(path).map(|meta| meta.len()).unwrap_or(0);

    if file_size > opts.max_file_bytes {
        return Ok(FileStats::marker(&[
            ("toolarge", Value::Count(1)),
            ("file_size", Value::Count(file_size)),
        ]));
    }

    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        // Unreadable counts as a transport failure when nothing was
        // downloaded, malformed content otherwise.
        Err(_) if file_size == 0 => return Ok(FileStats::marker(&[("emptyfile", Value::Count(1))])),
        Err(_) => return Ok(FileStats::marker(&[("invalidxml", Value::Count(1))])),
    };

    if bytes.is_empty() {
        return Ok(FileStats::marker(&[("emptyfile", Value::Count(1))]));
    }

    let doc = match parse_document(&bytes) {
        Ok(doc) => doc,
        Err(_) => return Ok(FileStats::marker(&[("invalidxml", Value::Count(1))])),
    };

    match doc.root.tag.as_str() {
        "iati-activities" => activities_path(path, file_size, &doc, opts),
        "iati-organisations" => organisations_path(path, file_size, &doc, opts),
        _ => Ok(FileStats::marker(&[("nonstandardroots", Value::Count(1))])),
    }
}

fn activities_path(
    path: &Path,
    file_size: u64,
    doc: &Document,
    opts: &PipelineOptions,
) -> Result<FileStats> {
    let context = format!("in {}", path.display());
    let file_tree = dispatch_file(path, file_size, doc, opts, &context, true)?;

    let mut elements = Vec::new();
    for element in &doc.root.children {
        if opts.flavor.record_filter() == RecordFilter::HumanitarianOnly
            && !rules::is_humanitarian(element, &doc.version)
        {
            continue;
        }
        let ctx = ActivityContext {
            element,
            version: &doc.version,
            strict: opts.strict,
            context: &context,
            today: opts.today,
        };
        elements.push(dispatch(
            &activity::metrics(),
            &opts.flavor.activity_policy(),
            &ctx,
            &context,
            opts.debug,
        )?);
    }

    Ok(FileStats {
        file: file_tree,
        elements,
    })
}

fn organisations_path(
    path: &Path,
    file_size: u64,
    doc: &Document,
    opts: &PipelineOptions,
) -> Result<FileStats> {
    let context = format!("in {}", path.display());
    let file_tree = dispatch_file(path, file_size, doc, opts, &context, false)?;

    let mut elements = Vec::new();
    for element in &doc.root.children {
        let ctx = OrganisationContext {
            element,
            version: &doc.version,
            strict: opts.strict,
            context: &context,
        };
        elements.push(dispatch(
            &organisation::metrics(),
            &opts.flavor.organisation_policy(),
            &ctx,
            &context,
            opts.debug,
        )?);
    }

    Ok(FileStats {
        file: file_tree,
        elements,
    })
}

fn dispatch_file(
    path: &Path,
    file_size: u64,
    doc: &Document,
    opts: &PipelineOptions,
    context: &str,
    activities: bool,
) -> Result<Value> {
    let fname = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ctx = FileContext {
        root: &doc.root,
        version: &doc.version,
        fname: &fname,
        inputfile: path,
        file_size,
        strict: opts.strict,
        context,
    };
    if activities {
        dispatch(
            &file::activity_file_metrics(),
            &opts.flavor.activity_file_policy(),
            &ctx,
            context,
            opts.debug,
        )
    } else {
        dispatch(
            &file::organisation_file_metrics(),
            &opts.flavor.organisation_file_policy(),
            &ctx,
            context,
            opts.debug,
        )
    }
}
