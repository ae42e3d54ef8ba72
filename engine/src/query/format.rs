//! Term formatting used when rendering algebra trees.

use crate::term::Term;

/// Turns a term into its textual form inside a rendered algebra tree.
pub trait TermFormatter {
    fn format_term(&self, term: &Term) -> String;
}

/// Writes every term in N-Triples syntax.
#[derive(Debug, Clone, Copy, Default)]
pub struct NTriplesFormatter;

impl TermFormatter for NTriplesFormatter {
    fn format_term(&self, term: &Term) -> String {
        term.to_string()
    }
}

/// Compacts IRIs that start with a registered namespace into `prefix:local`.
///
/// IRIs with no matching namespace, or whose local part would not be a plain
/// name, fall back to N-Triples syntax.
#[derive(Debug, Clone, Default)]
pub struct PrefixFormatter {
    prefixes: Vec<(String, String)>,
}

impl PrefixFormatter {
    /// Create a formatter with no prefixes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a prefix for a namespace.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>, namespace: impl Into<String>) -> Self {
        self.prefixes.push((prefix.into(), namespace.into()));
        self
    }

    fn compact(&self, iri: &str) -> Option<String> {
        self.prefixes
            .iter()
            .filter_map(|(prefix, namespace)| {
                iri.strip_prefix(namespace.as_str())
                    .filter(|local| is_local_name(local))
                    .map(|local| (namespace.len(), format!("{prefix}:{local}")))
            })
            .max_by_key(|(len, _)| *len)
            .map(|(_, compact)| compact)
    }
}

impl TermFormatter for PrefixFormatter {
    fn format_term(&self, term: &Term) -> String {
        if let Term::NamedNode(node) = term {
            if let Some(compact) = self.compact(node.as_str()) {
                return compact;
            }
        }
        term.to_string()
    }
}

fn is_local_name(local: &str) -> bool {
    !local.is_empty()
        && local
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
}
