//! Gratitude event classification.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The kind of on-chain gratitude action an event claims.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    /// A monetary tip to a creator.
    Tip,
    /// A token airdrop.
    Airdrop,
    /// A prediction/guess interaction.
    Guess,
    /// A governance or poll vote.
    Vote,
    /// A content share; carries no value.
    Share,
}

impl EventType {
    pub const ALL: [EventType; 5] = [
        EventType::Tip,
        EventType::Airdrop,
        EventType::Guess,
        EventType::Vote,
        EventType::Share,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Tip => "tip",
            EventType::Airdrop => "airdrop",
            EventType::Guess => "guess",
            EventType::Vote => "vote",
            EventType::Share => "share",
        }
    }

    /// Whether events of this type move value on-chain.
    ///
    /// Monetary events must carry a positive amount to pass verification;
    /// non-monetary events legitimately carry zero.
    pub fn is_monetary(&self) -> bool {
        matches!(self, EventType::Tip | EventType::Airdrop)
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tip" => Ok(EventType::Tip),
            "airdrop" => Ok(EventType::Airdrop),
            "guess" => Ok(EventType::Guess),
            "vote" => Ok(EventType::Vote),
            "share" => Ok(EventType::Share),
            other => Err(format!("unknown event type: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_variant() {
        for ty in EventType::ALL {
            assert_eq!(ty.as_str().parse::<EventType>().unwrap(), ty);
        }
    }

    #[test]
    fn rejects_unknown() {
        assert!("mint".parse::<EventType>().is_err());
    }

    #[test]
    fn only_value_moving_types_are_monetary() {
        assert!(EventType::Tip.is_monetary());
        assert!(EventType::Airdrop.is_monetary());
        assert!(!EventType::Share.is_monetary());
        assert!(!EventType::Vote.is_monetary());
    }
}
