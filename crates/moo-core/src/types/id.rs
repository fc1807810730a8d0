//! Cow identifiers.

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// The immutable identity of a cow.
///
/// Identifiers are always strings, but may be created from any displayable
/// scalar. Herd files commonly carry numeric ids, so deserialization accepts
/// JSON strings and numbers alike.
///
/// # Examples
///
/// ```
/// use moo_core::CowId;
///
/// assert_eq!(CowId::new(1).as_str(), "1");
/// assert_eq!(CowId::new("daisy").as_str(), "daisy");
///
/// let parsed: CowId = serde_json::from_str("42").unwrap();
/// assert_eq!(parsed, CowId::new(42));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CowId(String);

impl CowId {
    /// Creates an identifier from any displayable value.
    pub fn new(id: impl fmt::Display) -> Self {
        Self(id.to_string())
    }

    /// Returns the identifier as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for CowId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CowIdVisitor;

        impl Visitor<'_> for CowIdVisitor {
            type Value = CowId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a string or numeric cow id")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<CowId, E> {
                Ok(CowId::new(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<CowId, E> {
                Ok(CowId::new(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<CowId, E> {
                Ok(CowId::new(v))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<CowId, E> {
                Ok(CowId::new(v))
            }
        }

        deserializer.deserialize_any(CowIdVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_and_number_ids_agree() {
        let from_str: CowId = serde_json::from_str(r#""7""#).unwrap();
        let from_num: CowId = serde_json::from_str("7").unwrap();
        assert_eq!(from_str, from_num);
    }

    #[test]
    fn test_serializes_as_string() {
        assert_eq!(serde_json::to_string(&CowId::new(3)).unwrap(), r#""3""#);
    }

    #[test]
    fn test_rejects_non_scalar() {
        assert!(serde_json::from_str::<CowId>("[1]").is_err());
    }
}
