use serde::{Serialize, Serializer};
use std::fmt;

/// One hop in a document path: a mapping key or a sequence index
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl PathSegment {
    /// The key text, if this segment is a mapping key
    pub fn as_key(&self) -> Option<&str> {
        match self {
            PathSegment::Key(key) => Some(key),
            PathSegment::Index(_) => None,
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => write!(f, "{}", key),
            PathSegment::Index(index) => write!(f, "{}", index),
        }
    }
}

// Findings expose paths as string arrays.
impl Serialize for PathSegment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        PathSegment::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

/// Absolute path from the document root
pub type DocPath = Vec<PathSegment>;

/// Build a path from anything convertible into segments
pub fn doc_path<I, S>(segments: I) -> DocPath
where
    I: IntoIterator<Item = S>,
    S: Into<PathSegment>,
{
    segments.into_iter().map(Into::into).collect()
}

/// Append segments to a copy of `base`
pub fn join_path<I, S>(base: &[PathSegment], tail: I) -> DocPath
where
    I: IntoIterator<Item = S>,
    S: Into<PathSegment>,
{
    let mut path = base.to_vec();
    path.extend(tail.into_iter().map(Into::into));
    path
}

/// Render a path in `paths./users.get.responses.200` form for human output
pub fn display_path(path: &[PathSegment]) -> String {
    if path.is_empty() {
        return "$".to_string();
    }
    let mut out = String::new();
    for (i, segment) in path.iter().enumerate() {
        match segment {
            PathSegment::Index(index) => out.push_str(&format!("[{}]", index)),
            PathSegment::Key(key) => {
                if i > 0 {
                    out.push('.');
                }
                out.push_str(key);
            }
        }
    }
    out
}

/// Look up the node at `path` below `root`
pub fn resolve_path<'a>(
    root: &'a serde_json::Value,
    path: &[PathSegment],
) -> Option<&'a serde_json::Value> {
    path.iter().try_fold(root, |node, segment| match segment {
        PathSegment::Key(key) => node.as_object()?.get(key),
        PathSegment::Index(index) => node.as_array()?.get(*index),
    })
}
