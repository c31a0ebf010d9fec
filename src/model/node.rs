// src/model/node.rs
use chrono::NaiveDate;

/// One element of a parsed record tree.
///
/// Records are read-only once parsed; nothing here is mutated during
/// analysis. Attribute and child order follow document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Node {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
    pub text: Option<String>,
}

impl Node {
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Node {
            tag: tag.into(),
            ..Node::default()
        }
    }

    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn children_named<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Node> {
        self.children.iter().filter(move |child| child.tag == tag)
    }

    #[must_use]
    pub fn child(&self, tag: &str) -> Option<&Node> {
        self.children.iter().find(|child| child.tag == tag)
    }

    #[must_use]
    pub fn has_child(&self, tag: &str) -> bool {
        self.child(tag).is_some()
    }

    /// Trimmed text content of the first child with the given tag.
    #[must_use]
    pub fn child_text(&self, tag: &str) -> Option<&str> {
        self.child(tag)
            .and_then(|child| child.text.as_deref())
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }

    /// All values of `attr` across children named `tag`, document order.
    pub fn child_attr_values<'a>(
        &'a self,
        tag: &'a str,
        attr: &'a str,
    ) -> impl Iterator<Item = &'a str> {
        self.children_named(tag).filter_map(move |c| c.attr(attr))
    }
}

/// Parses a date in `YYYY-MM-DD` form, tolerating trailing time or zone
/// designators by reading only the leading date portion.
#[must_use]
pub fn parse_iso_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    let datepart = match trimmed.char_indices().nth(10) {
        Some((idx, _)) => &trimmed[..idx],
        None => trimmed,
    };
    NaiveDate::parse_from_str(datepart, "%Y-%m-%d").ok()
}
