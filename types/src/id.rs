//! Record identifier newtypes.
//!
//! All identifiers are opaque strings. Freshly created records get a UUIDv4;
//! externally supplied ids (creators, stories) are accepted as-is.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            /// Generate a fresh random identifier.
            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

string_id!(
    /// Identifier of a stored gratitude event.
    EventId
);
string_id!(
    /// Identifier of a verification record.
    VerificationId
);
string_id!(
    /// Identifier of a payout record.
    PayoutId
);
string_id!(
    /// Identifier of a direct tip transfer record.
    TransferId
);
string_id!(
    /// Identifier of a content creator.
    CreatorId
);
string_id!(
    /// Identifier of a story owned by a creator.
    StoryId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(EventId::generate(), EventId::generate());
    }

    #[test]
    fn roundtrips_through_display() {
        let id = PayoutId::new("payout-1");
        assert_eq!(id.to_string(), "payout-1");
        assert_eq!(id.as_str(), "payout-1");
    }
}
