//! Selector grammar and match counting.
//!
//! Selectors are a small XPath subset that can be evaluated directly against a
//! [`TreeNode`] tree:
//!
//! | Selector | Meaning |
//! |---|---|
//! | `//*[@id='V']` | any element whose id is `V` |
//! | `//tag[@class='V']` | `tag` elements whose class attribute is exactly `V` |
//! | `//tag[contains(@class, 'V')]` | `tag` elements carrying class token `V` |
//! | `//tag` | every `tag` element |
//! | `//tag[N]` | positional form, rendered but never evaluated |

use std::fmt;

use crate::result::{PlrError, PlrResult};
use crate::tree::TreeNode;

/// Structured form of a generated selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// Any element with this id
    Id(String),
    /// Tag whose class attribute equals the value exactly
    TagClassExact {
        /// Element name
        tag: String,
        /// Full class attribute value
        class: String,
    },
    /// Tag carrying the class token
    TagClassContains {
        /// Element name
        tag: String,
        /// Single class token
        class: String,
    },
    /// Every element with this tag
    Tag(String),
    /// One-based position among elements with this tag
    TagIndex {
        /// Element name
        tag: String,
        /// One-based index
        index: usize,
    },
}

impl Selector {
    /// Id selector
    #[must_use]
    pub fn id(id: impl Into<String>) -> Self {
        Self::Id(id.into())
    }

    /// Tag selector
    #[must_use]
    pub fn tag(tag: impl Into<String>) -> Self {
        Self::Tag(tag.into())
    }

    /// Render to selector text. Fails when a value holds both quote characters.
    pub fn render(&self) -> PlrResult<String> {
        Ok(match self {
            Self::Id(id) => format!("//*[@id={}]", literal(id)?),
            Self::TagClassExact { tag, class } => format!("//{tag}[@class={}]", literal(class)?),
            Self::TagClassContains { tag, class } => {
                format!("//{tag}[contains(@class, {})]", literal(class)?)
            }
            Self::Tag(tag) => format!("//{tag}"),
            Self::TagIndex { tag, index } => format!("//{tag}[{index}]"),
        })
    }

    /// Parse selector text. Returns `None` for anything outside the grammar.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let rest = input.trim().strip_prefix("//")?;
        let (tag, predicate) = match rest.find('[') {
            Some(open) => (&rest[..open], Some(&rest[open..])),
            None => (rest, None),
        };
        if !is_valid_tag(tag) {
            return None;
        }

        let Some(predicate) = predicate else {
            return (tag != "*").then(|| Self::Tag(tag.to_string()));
        };
        let body = predicate.strip_prefix('[')?.strip_suffix(']')?;

        if let Some(value) = body.strip_prefix("@id=") {
            return (tag == "*").then(|| parse_literal(value)).flatten().map(Self::Id);
        }
        if let Some(value) = body.strip_prefix("@class=") {
            let class = parse_literal(value)?;
            return (tag != "*").then(|| Self::TagClassExact {
                tag: tag.to_string(),
                class,
            });
        }
        if let Some(value) = body
            .strip_prefix("contains(@class,")
            .and_then(|v| v.strip_suffix(')'))
        {
            let class = parse_literal(value.trim_start())?;
            return (tag != "*").then(|| Self::TagClassContains {
                tag: tag.to_string(),
                class,
            });
        }
        if let Ok(index) = body.parse::<usize>() {
            return (tag != "*" && index > 0).then(|| Self::TagIndex {
                tag: tag.to_string(),
                index,
            });
        }
        None
    }

    /// Whether `node` satisfies every predicate this selector encodes.
    ///
    /// Positional selectors depend on document position and never match a
    /// node in isolation.
    #[must_use]
    pub fn matches(&self, node: &TreeNode) -> bool {
        match self {
            Self::Id(id) => node.id() == Some(id.as_str()),
            Self::TagClassExact { tag, class } => {
                node.tag() == tag && node.attribute("class") == Some(class.as_str())
            }
            Self::TagClassContains { tag, class } => node.tag() == tag && node.has_class(class),
            Self::Tag(tag) => node.tag() == tag,
            Self::TagIndex { .. } => false,
        }
    }

    /// Count matching nodes in `context` (full pre-order traversal)
    #[must_use]
    pub fn count_in(&self, context: &TreeNode) -> usize {
        context.iter().filter(|node| self.matches(node)).count()
    }

    /// Whether exactly one node of `context` matches. Stops after a second hit.
    #[must_use]
    pub fn is_unique_in(&self, context: &TreeNode) -> bool {
        context
            .iter()
            .filter(|node| self.matches(node))
            .take(2)
            .count()
            == 1
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.render() {
            Ok(text) => f.write_str(&text),
            Err(_) => write!(f, "{self:?}"),
        }
    }
}

/// Count nodes of `context` matching selector text.
///
/// Never fails: text outside the grammar counts as zero matches.
#[must_use]
pub fn count_matches(selector: &str, context: &TreeNode) -> usize {
    Selector::parse(selector).map_or(0, |s| s.count_in(context))
}

/// Whether selector text matches exactly one node of `context`
#[must_use]
pub fn is_unique(selector: &str, context: &TreeNode) -> bool {
    Selector::parse(selector).is_some_and(|s| s.is_unique_in(context))
}

/// Quote `value` as a selector literal
pub fn literal(value: &str) -> PlrResult<String> {
    if !value.contains('\'') {
        Ok(format!("'{value}'"))
    } else if !value.contains('"') {
        Ok(format!("\"{value}\""))
    } else {
        Err(PlrError::UnquotableLiteral {
            value: value.to_string(),
        })
    }
}

fn parse_literal(text: &str) -> Option<String> {
    let quote = text.chars().next().filter(|c| *c == '\'' || *c == '"')?;
    let inner = text[1..].strip_suffix(quote)?;
    (!inner.contains(quote)).then(|| inner.to_string())
}

fn is_valid_tag(tag: &str) -> bool {
    tag == "*"
        || (!tag.is_empty()
            && tag
                .chars()
                .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | ':' | '.')))
}
