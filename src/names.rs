use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Provider id -> display name. Unknown ids label as themselves.
#[derive(Debug, Clone, Default)]
pub struct NameBook {
    by_id: HashMap<String, String>,
}

impl NameBook {
    pub fn insert(&mut self, id: impl Into<String>, name: impl Into<String>) {
        let name = name.into();
        if name.trim().is_empty() {
            return;
        }
        self.by_id.insert(id.into(), name.trim().to_string());
    }

    /// Entries already present win.
    pub fn extend_missing(&mut self, other: NameBook) {
        for (id, name) in other.by_id {
            self.by_id.entry(id).or_insert(name);
        }
    }

    pub fn label<'a>(&'a self, id: &'a str) -> &'a str {
        self.by_id.get(id).map(String::as_str).unwrap_or(id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

pub fn load_names(path: &Path) -> Result<NameBook> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read player names {}", path.display()))?;
    let map = serde_json::from_str::<HashMap<String, String>>(&raw)
        .with_context(|| format!("parse player names {}", path.display()))?;
    let mut book = NameBook::default();
    for (id, name) in map {
        book.insert(id, name);
    }
    Ok(book)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_falls_back_to_id() {
        let mut book = NameBook::default();
        book.insert("p1", " Cale Makar ");
        book.insert("p2", "  ");
        assert_eq!(book.label("p1"), "Cale Makar");
        assert_eq!(book.label("p2"), "p2");
    }

    #[test]
    fn extend_keeps_existing() {
        let mut a = NameBook::default();
        a.insert("p1", "Explicit");
        let mut b = NameBook::default();
        b.insert("p1", "Provider");
        b.insert("p2", "Other");
        a.extend_missing(b);
        assert_eq!(a.label("p1"), "Explicit");
        assert_eq!(a.label("p2"), "Other");
    }
}
