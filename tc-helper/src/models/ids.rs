//! Type-safe ID wrappers.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Wire form of an identifier: services send both numbers and strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Int(i64),
    Str(String),
}

macro_rules! define_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
        pub struct $name(pub String);

        impl $name {
            /// Create a new ID from a string.
            pub fn new(id: impl Into<String>) -> Self {
                $name(id.into())
            }

            /// Check if this ID is empty.
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }

            /// Get the inner string.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                Ok(match RawId::deserialize(deserializer)? {
                    RawId::Int(n) => $name(n.to_string()),
                    RawId::Str(s) => $name(s),
                })
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                $name(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                $name(s.to_owned())
            }
        }

        impl From<&String> for $name {
            fn from(s: &String) -> Self {
                $name(s.clone())
            }
        }

        impl From<&$name> for $name {
            fn from(id: &$name) -> Self {
                id.clone()
            }
        }

        impl From<i64> for $name {
            fn from(n: i64) -> Self {
                $name(n.to_string())
            }
        }

        impl From<u64> for $name {
            fn from(n: u64) -> Self {
                $name(n.to_string())
            }
        }

        impl From<i32> for $name {
            fn from(n: i32) -> Self {
                $name(n.to_string())
            }
        }

        impl From<u32> for $name {
            fn from(n: u32) -> Self {
                $name(n.to_string())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(UserId, "A member identifier.");
define_id!(TopicId, "A discussion topic identifier.");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_from_int() {
        let id = UserId::from(40152933i64);
        assert_eq!(id.as_str(), "40152933");
        assert_eq!(format!("{}", id), "40152933");
    }

    #[test]
    fn test_id_deserialize_number_or_string() {
        let ids: Vec<UserId> = serde_json::from_str(r#"[305384, "abc"]"#).unwrap();
        assert_eq!(ids, vec![UserId::new("305384"), UserId::new("abc")]);
    }

    #[test]
    fn test_id_is_empty() {
        assert!(TopicId::new("").is_empty());
        assert!(!TopicId::new("0").is_empty());
    }
}
