//! Locator synthesis: selector grammar, attribute weights and the tiered
//! synthesizer.

mod selector;
mod synth;
mod weights;

pub use selector::{count_matches, is_unique, literal, Selector};
pub use synth::{degraded_selector, synthesize, LocatorSynthesizer};
pub use weights::{AttributeClass, AttributeWeights, TRUST_THRESHOLD};
