//! Order-preserving structured documents and their YAML files.
//!
//! A document is an explicit ordered list of `(key, value)` entries so that
//! rendering is stable: keys come out in the order they were inserted.
//! Multi-line strings are rendered as literal blocks (`|`).

use std::path::Path;

use serde::ser::{Serialize, SerializeMap, Serializer};
use xshell::Shell;

use crate::error::TaskResult;

/// A value in a document.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Str(String),
    Int(i64),
    Bool(bool),
    Seq(Vec<Node>),
    Map(Entries),
}

/// An ordered mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Entries(Vec<(String, Node)>);

impl Entries {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Insert `key`; an existing key keeps its position and takes the new value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Node>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Node {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&[Node]> {
        match self {
            Node::Seq(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Entries> {
        match self {
            Node::Map(entries) => Some(entries),
            _ => None,
        }
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Node::Str(value.to_string())
    }
}

impl From<String> for Node {
    fn from(value: String) -> Self {
        Node::Str(value)
    }
}

impl From<&String> for Node {
    fn from(value: &String) -> Self {
        Node::Str(value.clone())
    }
}

impl From<i64> for Node {
    fn from(value: i64) -> Self {
        Node::Int(value)
    }
}

impl From<u32> for Node {
    fn from(value: u32) -> Self {
        Node::Int(value.into())
    }
}

impl From<bool> for Node {
    fn from(value: bool) -> Self {
        Node::Bool(value)
    }
}

impl From<Entries> for Node {
    fn from(value: Entries) -> Self {
        Node::Map(value)
    }
}

impl<T: Into<Node>> From<Vec<T>> for Node {
    fn from(value: Vec<T>) -> Self {
        Node::Seq(value.into_iter().map(Into::into).collect())
    }
}

/// Build [`Entries`] in order: `entries! { "name" => "Build", "steps" => steps }`.
#[macro_export]
macro_rules! entries {
    () => {
        $crate::document::Entries::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut entries = $crate::document::Entries::new();
        $(entries.insert($key, $value);)+
        entries
    }};
}

impl Serialize for Entries {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            // serde_yaml emits strings containing a line break as literal blocks
            Node::Str(s) => serializer.serialize_str(s),
            Node::Int(i) => serializer.serialize_i64(*i),
            Node::Bool(b) => serializer.serialize_bool(*b),
            Node::Seq(items) => items.serialize(serializer),
            Node::Map(entries) => entries.serialize(serializer),
        }
    }
}

pub fn render(document: &Entries) -> TaskResult<String> {
    Ok(serde_yaml::to_string(document)?)
}

/// Render `document` to `path`, creating parent directories.
pub fn write(sh: &Shell, path: &Path, document: &Entries) -> TaskResult<()> {
    let contents = render(document)?;
    sh.write_file(path, contents)?;
    info!("==> Wrote {}", path.display());
    Ok(())
}

/// Remove the artifact at `path`; an absent artifact is not an error.
pub fn remove(sh: &Shell, path: &Path) -> TaskResult<()> {
    if sh.path_exists(path) {
        sh.remove_path(path)?;
        info!("==> Deleted {}", path.display());
    } else {
        info!("==> Nothing to delete at {}", path.display());
    }
    Ok(())
}
