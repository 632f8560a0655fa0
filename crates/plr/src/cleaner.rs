//! Snapshot cleaning.
//!
//! Front-end frameworks stamp elements with generated attributes
//! (`data-reactid`, `_ngcontent-*`, `data-v-*`, ...) whose values change on
//! every build. Left in place they make every node look renamed, so they are
//! stripped from raw snapshots before parsing.

use regex::Regex;
use serde_json::Value;

use crate::result::{PlrError, PlrResult};

/// Attribute-name patterns stripped by default
pub const DEFAULT_DYNAMIC_PATTERNS: [&str; 6] = [
    r"^data-reactid$",
    r"^ng-content-.*$",
    r"^_ngcontent-.*$",
    r"^data-v-.*$",
    r"^ember\d+$",
    r"^react-id.*$",
];

/// Removes dynamic attributes from snapshot values
#[derive(Debug, Clone)]
pub struct DomCleaner {
    patterns: Vec<Regex>,
}

impl DomCleaner {
    /// Cleaner with the default framework patterns
    pub fn new() -> PlrResult<Self> {
        Self::with_patterns(DEFAULT_DYNAMIC_PATTERNS)
    }

    /// Cleaner with custom attribute-name patterns
    pub fn with_patterns<I, S>(patterns: I) -> PlrResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| {
                Regex::new(p.as_ref()).map_err(|e| {
                    PlrError::invalid_config(format!(
                        "invalid dynamic attribute pattern {:?}: {e}",
                        p.as_ref()
                    ))
                })
            })
            .collect::<PlrResult<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// Whether an attribute name is considered dynamic
    #[must_use]
    pub fn is_dynamic(&self, attribute: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(attribute))
    }

    /// Cleaned copy of `snapshot`
    #[must_use]
    pub fn clean(&self, snapshot: &Value) -> Value {
        let mut cleaned = snapshot.clone();
        let removed = self.clean_in_place(&mut cleaned);
        if removed > 0 {
            tracing::debug!(removed, "stripped dynamic attributes");
        }
        cleaned
    }

    /// Strip dynamic attributes in place, returning how many were removed
    pub fn clean_in_place(&self, snapshot: &mut Value) -> usize {
        let Value::Object(node) = snapshot else {
            return 0;
        };

        let mut removed = 0;
        if let Some(Value::Object(attributes)) = node.get_mut("attributes") {
            let before = attributes.len();
            attributes.retain(|name, _| !self.is_dynamic(name));
            removed += before - attributes.len();
        }
        if let Some(Value::Array(children)) = node.get_mut("children") {
            removed += children
                .iter_mut()
                .map(|child| self.clean_in_place(child))
                .sum::<usize>();
        }
        if let Some(shadow) = node.get_mut("shadowRoot") {
            removed += self.clean_in_place(shadow);
        }
        removed
    }
}
