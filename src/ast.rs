use std::collections::HashMap;
use std::collections::hash_map;
use std::path::Path;

use serde::Serialize;

use crate::error::Result;
use crate::processor::{self, ParseOptions, Source};

/// A single classified piece of an ITML line, borrowing from the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// Declaration line: `id: kind`
    Name { id: &'a str, kind: &'a str },
    /// Trimmed text of an indented content line
    String(&'a str),
    /// Leading whitespace width of the content line that follows
    Indent(usize),
    /// Empty line
    Newline,
    /// Line whose first non-whitespace character is `#`
    Comment,
    /// Directive line
    Function(Function<'a>),
}

/// Directives recognised at zero indentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function<'a> {
    /// `import <path>`, with the path relative to the importing file
    Import(&'a str),
}

/// Entry types understood by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Str,
    List,
}

impl Kind {
    /// Returns `None` for anything other than `str` or `list`.
    pub fn parse(kind: &str) -> Option<Self> {
        match kind {
            "str" => Some(Kind::Str),
            "list" => Some(Kind::List),
            _ => None,
        }
    }
}

/// A named template value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Entry {
    Str(String),
    List(Vec<String>),
}

impl Entry {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Entry::Str(s) => Some(s),
            Entry::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Entry::Str(_) => None,
            Entry::List(items) => Some(items),
        }
    }
}

impl From<&str> for Entry {
    fn from(value: &str) -> Self {
        Entry::Str(value.to_owned())
    }
}

impl From<Vec<String>> for Entry {
    fn from(value: Vec<String>) -> Self {
        Entry::List(value)
    }
}

/// Parsed templates keyed by entry id.
///
/// Inserting an id that already exists replaces the previous entry, which is
/// how imports and redeclarations are merged.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Templates(HashMap<String, Entry>);

impl Templates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse ITML source text and merge its entries into this mapping.
    /// Relative imports resolve against the working directory.
    pub fn load(&mut self, source: &str) -> Result<()> {
        let parsed = processor::parse(Source::Text(source), &ParseOptions::default())?;
        self.merge(parsed);
        Ok(())
    }

    /// Parse an ITML file and merge its entries into this mapping.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let parsed = processor::parse(Source::File(path.as_ref()), &ParseOptions::default())?;
        self.merge(parsed);
        Ok(())
    }

    pub fn insert(&mut self, id: impl Into<String>, entry: Entry) -> Option<Entry> {
        self.0.insert(id.into(), entry)
    }

    pub fn get(&self, id: &str) -> Option<&Entry> {
        self.0.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> hash_map::Iter<'_, String, Entry> {
        self.0.iter()
    }

    /// Move every entry of `other` into this mapping, `other` winning on collision.
    pub fn merge(&mut self, other: Templates) {
        self.0.extend(other.0);
    }

    pub fn into_inner(self) -> HashMap<String, Entry> {
        self.0
    }
}

impl FromIterator<(String, Entry)> for Templates {
    fn from_iter<I: IntoIterator<Item = (String, Entry)>>(iter: I) -> Self {
        Templates(iter.into_iter().collect())
    }
}

impl IntoIterator for Templates {
    type Item = (String, Entry);
    type IntoIter = hash_map::IntoIter<String, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Templates {
    type Item = (&'a String, &'a Entry);
    type IntoIter = hash_map::Iter<'a, String, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parse() {
        assert_eq!(Kind::parse("str"), Some(Kind::Str));
        assert_eq!(Kind::parse("list"), Some(Kind::List));
        assert_eq!(Kind::parse("int"), None);
        assert_eq!(Kind::parse("Str"), None);
    }

    #[test]
    fn test_merge_last_write_wins() {
        let mut base = Templates::new();
        base.insert("greeting", Entry::from("hello"));
        base.insert("farewell", Entry::from("bye"));

        let mut other = Templates::new();
        other.insert("greeting", Entry::from("hi"));

        base.merge(other);
        assert_eq!(base.len(), 2);
        assert_eq!(base.get("greeting").and_then(Entry::as_str), Some("hi"));
        assert_eq!(base.get("farewell").and_then(Entry::as_str), Some("bye"));
    }

    #[test]
    fn test_load_merges_into_existing() {
        let mut templates = Templates::new();
        templates.load("a: str\n    one\n").unwrap();
        templates.load("b: list\n    two\n\n    three\n").unwrap();

        assert_eq!(templates.get("a").and_then(Entry::as_str), Some("one"));
        assert_eq!(
            templates.get("b").and_then(Entry::as_list),
            Some(&["two".to_string(), "three".to_string()][..])
        );
    }

    #[test]
    fn test_entry_serializes_untagged() {
        let mut templates = Templates::new();
        templates.insert("s", Entry::from("text"));
        templates.insert("l", Entry::from(vec!["a".to_string(), "b".to_string()]));

        let value = serde_json::to_value(&templates).unwrap();
        assert_eq!(value["s"], serde_json::json!("text"));
        assert_eq!(value["l"], serde_json::json!(["a", "b"]));
    }
}
