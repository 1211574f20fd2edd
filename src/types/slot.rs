//! Builder input slots.

use serde::{Deserialize, Serialize};

/// One position of the ordered fragment list.
///
/// Serialized untagged, so a slot list reads naturally as JSON:
/// `["A ", ["x", "y"], " B"]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Slot {
    /// A single fragment shared by every variant.
    Literal(String),
    /// Mutually exclusive fragments, expanded in the given order.
    Alternatives(Vec<String>),
}

impl Slot {
    /// Create a literal slot.
    pub fn literal(text: impl Into<String>) -> Self {
        Self::Literal(text.into())
    }

    /// Create an alternatives slot.
    pub fn alternatives<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Alternatives(options.into_iter().map(Into::into).collect())
    }

    /// The fragments of this slot, in expansion order.
    pub fn options(&self) -> &[String] {
        match self {
            Self::Literal(text) => std::slice::from_ref(text),
            Self::Alternatives(options) => options,
        }
    }

    /// Number of fragments in this slot.
    pub fn len(&self) -> usize {
        self.options().len()
    }

    /// True for an alternatives slot without options.
    pub fn is_empty(&self) -> bool {
        self.options().is_empty()
    }

    /// True if the slot holds exactly one fragment.
    pub fn is_singleton(&self) -> bool {
        self.len() == 1
    }
}

impl From<&str> for Slot {
    fn from(text: &str) -> Self {
        Self::literal(text)
    }
}

impl From<String> for Slot {
    fn from(text: String) -> Self {
        Self::Literal(text)
    }
}

impl<const N: usize> From<[&str; N]> for Slot {
    fn from(options: [&str; N]) -> Self {
        Self::alternatives(options)
    }
}

/// Parse a JSON slot list such as `["A ", ["x", "y"], " B"]`.
pub fn parse_slots(json: &str) -> Result<Vec<Slot>, serde_json::Error> {
    serde_json::from_str(json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mixed_slots() {
        let slots = parse_slots(r#"["A ", ["x", "y"], " B"]"#).unwrap();
        assert_eq!(
            slots,
            vec![
                Slot::literal("A "),
                Slot::alternatives(["x", "y"]),
                Slot::literal(" B"),
            ]
        );
    }

    #[test]
    fn test_singleton_alternatives() {
        let slot = Slot::alternatives(["only"]);
        assert!(slot.is_singleton());
        assert_eq!(slot.options(), &["only".to_string()]);
    }

    #[test]
    fn test_empty_alternatives() {
        let slot: Slot = serde_json::from_str("[]").unwrap();
        assert!(slot.is_empty());
        assert!(!slot.is_singleton());
    }

    #[test]
    fn test_from_conversions() {
        assert_eq!(Slot::from("a"), Slot::Literal("a".to_string()));
        assert_eq!(Slot::from(["a", "b"]).len(), 2);
    }
}
