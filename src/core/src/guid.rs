use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Separator between the base guid and its modifier.
const MOD_SEPARATOR: &str = "-MOD-";

/// Random guid with support for variants that carry additional information.
///
/// A guid is either a base v4 UUID or the base plus a single modifier suffix
/// used for a specific purpose. A modified guid can always be returned to its
/// base; at most one modifier is ever present.
///
/// Format:
///   base: `2dc631d5-b6bb-457f-b5a2-de0b7400456d`
///   with modifier: `2dc631d5-b6bb-457f-b5a2-de0b7400456d-MOD-modifier`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Guid(String);

impl Guid {
    /// Generates a new base guid.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wraps an existing string representation.
    ///
    /// The string must have come from `generate` (or a serialization
    /// round-trip of one); no validation is performed here.
    pub fn from_string(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns whether this is a base guid with no modifier set.
    pub fn is_base(&self) -> bool {
        !self.0.contains(MOD_SEPARATOR)
    }

    /// Returns the base version of this guid. A no-op on a base guid.
    pub fn base(&self) -> Guid {
        match self.0.split_once(MOD_SEPARATOR) {
            Some((base, _)) => Guid(base.to_string()),
            None => self.clone(),
        }
    }

    /// Returns whether the given modifier is present on this guid.
    pub fn is_modifier(&self, modifier: &str) -> bool {
        match self.0.split_once(MOD_SEPARATOR) {
            Some((_, m)) => m == modifier,
            None => false,
        }
    }

    /// Returns this guid with the given modifier applied.
    ///
    /// The modifier is always applied to the base, replacing any modifier
    /// already present. It must be alphanumeric and must not contain dashes.
    pub fn with_modifier(&self, modifier: &str) -> Guid {
        assert!(
            !modifier.contains('-'),
            "guid modifier must not contain dashes"
        );
        let base = self.base();
        Guid(format!("{}{}{}", base.0, MOD_SEPARATOR, modifier))
    }

    /// Returns the string value of the guid.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_round_trip() {
        let guid = Guid::generate();
        assert_eq!(Guid::from_string(guid.to_string()), guid);
        assert_eq!(Guid::from_string(guid.to_string()).to_string(), guid.to_string());
    }

    #[test]
    fn generated_guids_are_base_and_distinct() {
        let a = Guid::generate();
        let b = Guid::generate();
        assert!(a.is_base());
        assert_ne!(a, b);
    }

    #[test]
    fn modifier_preserves_base() {
        let base = Guid::generate();
        let modified = base.with_modifier("Snooze");
        assert!(!modified.is_base());
        assert!(modified.is_modifier("Snooze"));
        assert!(!modified.is_modifier("Regular"));
        assert_eq!(modified.base(), base);
    }

    #[test]
    fn base_is_idempotent() {
        let base = Guid::generate();
        assert_eq!(base.base(), base);
        assert_eq!(base.with_modifier("Tag").base().base(), base);
    }

    #[test]
    fn second_modifier_replaces_first() {
        let base = Guid::generate();
        let modified = base.with_modifier("First").with_modifier("Second");
        assert_eq!(modified.base(), base);
        assert!(modified.is_modifier("Second"));
        assert!(!modified.is_modifier("First"));
    }

    #[test]
    fn base_guid_matches_no_modifier() {
        let base = Guid::generate();
        assert!(!base.is_modifier("Anything"));
    }

    #[test]
    #[should_panic(expected = "must not contain dashes")]
    fn modifier_with_dash_panics() {
        Guid::generate().with_modifier("with-dash");
    }

    #[test]
    fn serde_round_trips_as_plain_string() {
        let guid = Guid::generate().with_modifier("Tag");
        let json = serde_json::to_string(&guid).unwrap();
        assert_eq!(json, format!("\"{guid}\""));
        let back: Guid = serde_json::from_str(&json).unwrap();
        assert_eq!(back, guid);
    }
}
