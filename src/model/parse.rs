// src/model/parse.rs
//! Event-stream XML parsing into an owned record tree.
//!
//! Records are small relative to the files that hold them, and every metric
//! walks the same tree several times, so the reader builds an owned DOM
//! rather than re-scanning events per metric.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::node::Node;
use super::version::{Version, DEFAULT_VERSION};
use crate::error::{Result, StatsError};

/// A fully parsed input file: the root element plus the file-wide standard
/// version, resolved once.
#[derive(Debug, Clone)]
pub struct Document {
    pub root: Node,
    pub version: Version,
}

/// Parses one input file held in memory.
pub fn parse_document(bytes: &[u8]) -> Result<Document> {
    let mut reader = Reader::from_reader(bytes);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut stack: Vec<Node> = Vec::new();
    let mut root: Option<Node> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(start) => {
                stack.push(node_from_start(&start)?);
            }
            Event::Empty(start) => {
                let node = node_from_start(&start)?;
                attach(&mut stack, &mut root, node);
            }
            Event::End(_) => {
                if let Some(node) = stack.pop() {
                    attach(&mut stack, &mut root, node);
                }
            }
            Event::Text(text) => {
                if let Some(open) = stack.last_mut() {
                    append_text(open, &text.unescape()?);
                }
            }
            Event::CData(cdata) => {
                if let Some(open) = stack.last_mut() {
                    append_text(open, &String::from_utf8_lossy(cdata.as_ref()));
                }
            }
            Event::Eof => break,
            // Declarations, comments and processing instructions carry no
            // record content.
            _ => {}
        }
        buf.clear();
    }

    let root = root.ok_or(StatsError::NoRoot)?;
    let version = root
        .attr("version")
        .map_or_else(|| Version::parse(DEFAULT_VERSION), Version::parse);
    Ok(Document { root, version })
}

fn node_from_start(start: &BytesStart<'_>) -> Result<Node> {
    let mut node = Node::new(String::from_utf8_lossy(start.local_name().as_ref()).into_owned());
    for attr in start.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(quick_xml::Error::from)?
            .into_owned();
        node.attrs.push((key, value));
    }
    Ok(node)
}

fn attach(stack: &mut Vec<Node>, root: &mut Option<Node>, node: Node) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        // First element closed with an empty stack is the document root.
        None => {
            if root.is_none() {
                *root = Some(node);
            }
        }
    }
}

fn append_text(node: &mut Node, fragment: &str) {
    if fragment.is_empty() {
        return;
    }
    match &mut node.text {
        Some(existing) => existing.push_str(fragment),
        None => node.text = Some(fragment.to_string()),
    }
}
