//! The symbol table: named model payloads addressable from request and
//! response sections.
//!
//! Populated once by the parser's pre-pass and read-only afterwards. A table
//! supplied from outside is copied before mutation, so concurrent parses
//! sharing one starting table stay independent. Entries keep insertion
//! order; names are case-sensitive.

use crate::ast::Payload;

#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    models: Vec<(String, Payload)>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Payload> {
        self.models
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, payload)| payload)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Inserts or replaces the payload registered under `name`.
    pub fn insert(&mut self, name: impl Into<String>, payload: Payload) {
        let name = name.into();
        match self.models.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => *existing = payload,
            None => self.models.push((name, payload)),
        }
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.models.iter().map(|(name, _)| name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn insert_and_lookup_are_case_sensitive() {
        let mut table = SymbolTable::new();
        table.insert("Super", Payload::default());
        assert!(table.contains("Super"));
        assert!(!table.contains("super"));
    }

    #[test]
    fn insert_replaces_and_keeps_order() {
        let mut table = SymbolTable::new();
        table.insert("A", Payload::default());
        table.insert("B", Payload::default());
        table.insert(
            "A",
            Payload {
                body: "updated".into(),
                ..Default::default()
            },
        );
        assert_eq!(table.len(), 2);
        assert_eq!(table.names().collect::<Vec<_>>(), vec!["A", "B"]);
        assert_eq!(table.get("A").unwrap().body, "updated");
    }
}
