//! Attribute trust weights.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Weight above which an attribute class may gate a locator tier
pub const TRUST_THRESHOLD: f64 = 0.5;

/// Attribute classes a locator can be built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeClass {
    /// `id` attribute
    Id,
    /// `class` attribute
    Class,
    /// `name` attribute
    Name,
    /// Inline text
    Text,
    /// Element name
    Tag,
}

impl AttributeClass {
    /// Every attribute class
    pub const ALL: [Self; 5] = [Self::Id, Self::Class, Self::Name, Self::Text, Self::Tag];

    /// Lower-case name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Class => "class",
            Self::Name => "name",
            Self::Text => "text",
            Self::Tag => "tag",
        }
    }
}

impl fmt::Display for AttributeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trust score in `[0, 1]` per attribute class.
///
/// An explicit value threaded through synthesis; there is no global table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributeWeights {
    /// Trust in `id`
    pub id: f64,
    /// Trust in `class`
    pub class: f64,
    /// Trust in `name`
    pub name: f64,
    /// Trust in inline text
    pub text: f64,
    /// Trust in the element name
    pub tag: f64,
}

impl Default for AttributeWeights {
    fn default() -> Self {
        Self {
            id: 1.0,
            class: 0.8,
            name: 0.8,
            text: 0.5,
            tag: 0.2,
        }
    }
}

impl AttributeWeights {
    /// Synthesizer defaults (`id=1.0, class=0.8, name=0.8, text=0.5, tag=0.2`)
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Weight of one attribute class
    #[must_use]
    pub const fn get(&self, class: AttributeClass) -> f64 {
        match class {
            AttributeClass::Id => self.id,
            AttributeClass::Class => self.class,
            AttributeClass::Name => self.name,
            AttributeClass::Text => self.text,
            AttributeClass::Tag => self.tag,
        }
    }

    /// Replace one weight, clamped to `[0, 1]`
    #[must_use]
    pub fn with(mut self, class: AttributeClass, weight: f64) -> Self {
        let weight = if weight.is_nan() { 0.0 } else { weight.clamp(0.0, 1.0) };
        match class {
            AttributeClass::Id => self.id = weight,
            AttributeClass::Class => self.class = weight,
            AttributeClass::Name => self.name = weight,
            AttributeClass::Text => self.text = weight,
            AttributeClass::Tag => self.tag = weight,
        }
        self
    }

    /// Whether an attribute class is trusted enough to gate a tier
    #[must_use]
    pub fn is_trusted(&self, class: AttributeClass) -> bool {
        self.get(class) > TRUST_THRESHOLD
    }

    /// Whether every weight lies in `[0, 1]`
    #[must_use]
    pub fn is_valid(&self) -> bool {
        AttributeClass::ALL
            .iter()
            .all(|c| (0.0..=1.0).contains(&self.get(*c)))
    }
}
