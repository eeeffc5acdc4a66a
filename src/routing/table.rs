//! Ordered route storage shared by the path and host routers.
//!
//! # Responsibilities
//! - Keep literal routes in a map for O(1) lookup
//! - Keep regex routes in registration order, first match wins
//! - Reject a literal pattern that an earlier route already serves
//!
//! # Design Decisions
//! - Routes live in an arena so a literal alias (`/d` for `/d/`) can point
//!   at the same route as its pattern
//! - Literals are checked before regex routes, regardless of the order they
//!   were added
//! - Regex routes are never rejected at registration: literals win at
//!   request time, so a later regex overlapping an earlier literal is legal

use std::collections::HashMap;

use regex::Regex;

use crate::routing::error::RouteError;
use crate::routing::pattern::CompiledPattern;

#[derive(Debug, Clone, Copy)]
struct LiteralEntry {
    index: usize,
    /// Registered implicitly as the slash-less form of another pattern.
    alias: bool,
}

#[derive(Debug)]
struct Entry<R> {
    pattern: String,
    route: R,
}

/// A successful lookup.
#[derive(Debug)]
pub struct Match<'t, 'c, R> {
    pub route: &'t R,
    /// Pattern the route was registered with.
    pub pattern: &'t str,
    /// Named captures in pattern order. Empty for literal routes.
    pub captures: Vec<(&'t str, &'c str)>,
}

/// Route table keyed by compiled patterns.
#[derive(Debug)]
pub struct RouteTable<R> {
    entries: Vec<Entry<R>>,
    literals: HashMap<String, LiteralEntry>,
    regexes: Vec<(Regex, usize)>,
}

impl<R> Default for RouteTable<R> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            literals: HashMap::new(),
            regexes: Vec::new(),
        }
    }
}

impl<R> RouteTable<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered routes (aliases not counted).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add a route and return its index.
    pub fn insert(
        &mut self,
        pattern: &str,
        compiled: CompiledPattern,
        route: R,
    ) -> Result<usize, RouteError> {
        let index = self.entries.len();
        match compiled {
            CompiledPattern::Literal(literal) => {
                if let Some(existing) = self.conflict(&literal) {
                    return Err(RouteError::Ambiguous {
                        pattern: pattern.to_string(),
                        existing: existing.to_string(),
                    });
                }
                self.literals
                    .insert(literal, LiteralEntry { index, alias: false });
            }
            CompiledPattern::Regex(regex) => {
                self.regexes.push((regex, index));
            }
        }
        self.entries.push(Entry {
            pattern: pattern.to_string(),
            route,
        });
        Ok(index)
    }

    /// Point `alias` at the route at `index` if nothing else serves it.
    ///
    /// Returns whether the alias was installed.
    pub fn insert_alias(&mut self, alias: &str, index: usize) -> bool {
        if index >= self.entries.len() || self.find_index(alias).is_some() {
            return false;
        }
        self.literals
            .insert(alias.to_string(), LiteralEntry { index, alias: true });
        true
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut R> {
        self.entries.get_mut(index).map(|e| &mut e.route)
    }

    /// Find the route serving `candidate`.
    pub fn lookup<'t, 'c>(&'t self, candidate: &'c str) -> Option<Match<'t, 'c, R>> {
        if let Some(entry) = self.literals.get(candidate) {
            let e = &self.entries[entry.index];
            return Some(Match {
                route: &e.route,
                pattern: &e.pattern,
                captures: Vec::new(),
            });
        }

        for (regex, index) in &self.regexes {
            let Some(caps) = regex.captures(candidate) else { continue };
            let captures = regex
                .capture_names()
                .enumerate()
                .filter_map(|(i, name)| {
                    let name = name.filter(|n| !n.is_empty())?;
                    Some((name, caps.get(i).map_or("", |m| m.as_str())))
                })
                .collect();
            let e = &self.entries[*index];
            return Some(Match {
                route: &e.route,
                pattern: &e.pattern,
                captures,
            });
        }

        None
    }

    /// Pattern of a registered route already serving `literal`.
    ///
    /// Implicit aliases do not count: an explicit registration replaces them.
    fn conflict(&self, literal: &str) -> Option<&str> {
        if let Some(entry) = self.literals.get(literal) {
            if !entry.alias {
                return Some(&self.entries[entry.index].pattern);
            }
        }
        self.regexes
            .iter()
            .find(|(regex, _)| regex.is_match(literal))
            .map(|(_, index)| self.entries[*index].pattern.as_str())
    }

    fn find_index(&self, candidate: &str) -> Option<usize> {
        if let Some(entry) = self.literals.get(candidate) {
            return Some(entry.index);
        }
        self.regexes
            .iter()
            .find(|(regex, _)| regex.is_match(candidate))
            .map(|(_, index)| *index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::pattern::compile;

    fn add(table: &mut RouteTable<&'static str>, pattern: &'static str) -> Result<usize, RouteError> {
        let compiled = compile(pattern, '/', false)?;
        table.insert(pattern, compiled, pattern)
    }

    #[test]
    fn test_literal_lookup() {
        let mut table = RouteTable::new();
        add(&mut table, "/a").unwrap();
        add(&mut table, "/b").unwrap();

        let m = table.lookup("/b").unwrap();
        assert_eq!(*m.route, "/b");
        assert!(m.captures.is_empty());
        assert!(table.lookup("/c").is_none());
    }

    #[test]
    fn test_literal_beats_earlier_regex() {
        let mut table = RouteTable::new();
        add(&mut table, "/u/<id>").unwrap();
        // Registering the literal after the regex is ambiguous...
        assert!(matches!(
            add(&mut table, "/u/me"),
            Err(RouteError::Ambiguous { .. })
        ));

        // ...but a regex after a literal is allowed and the literal still wins.
        let mut table = RouteTable::new();
        add(&mut table, "/u/me").unwrap();
        add(&mut table, "/u/<id>").unwrap();
        assert_eq!(*table.lookup("/u/me").unwrap().route, "/u/me");
        let m = table.lookup("/u/42").unwrap();
        assert_eq!(*m.route, "/u/<id>");
        assert_eq!(m.captures, vec![("id", "42")]);
    }

    #[test]
    fn test_regex_routes_first_registered_wins() {
        let mut table = RouteTable::new();
        add(&mut table, "/h/<x:[0-9]+>").unwrap();
        add(&mut table, "/h/<y>").unwrap();

        assert_eq!(*table.lookup("/h/7").unwrap().route, "/h/<x:[0-9]+>");
        assert_eq!(*table.lookup("/h/seven").unwrap().route, "/h/<y>");
    }

    #[test]
    fn test_duplicate_literal_rejected() {
        let mut table = RouteTable::new();
        add(&mut table, "/a").unwrap();
        let err = add(&mut table, "/a").unwrap_err();
        assert_eq!(
            err.to_string(),
            "pattern \"/a\" matches route \"/a\""
        );
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_alias_rules() {
        let mut table = RouteTable::new();
        let d = add(&mut table, "/d/").unwrap();
        assert!(table.insert_alias("/d", d));
        assert_eq!(*table.lookup("/d").unwrap().route, "/d/");

        // Explicit registration replaces the alias.
        add(&mut table, "/d").unwrap();
        assert_eq!(*table.lookup("/d").unwrap().route, "/d");

        // Aliases never shadow existing routes.
        add(&mut table, "/e").unwrap();
        let e = add(&mut table, "/e/").unwrap();
        assert!(!table.insert_alias("/e", e));
        assert_eq!(*table.lookup("/e").unwrap().route, "/e");
    }

    #[test]
    fn test_unnamed_groups_not_captured() {
        let mut table = RouteTable::new();
        add(&mut table, "/<:static>/<file>").unwrap();
        let m = table.lookup("/static/app.js").unwrap();
        assert_eq!(m.captures, vec![("file", "app.js")]);
    }
}
