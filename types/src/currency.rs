//! Stablecoin currency symbols supported by the payout rail.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of stable symbols the rail settles in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StableSymbol {
    #[default]
    #[serde(rename = "USDC")]
    Usdc,
    #[serde(rename = "USDT")]
    Usdt,
}

impl StableSymbol {
    pub fn as_str(&self) -> &'static str {
        match self {
            StableSymbol::Usdc => "USDC",
            StableSymbol::Usdt => "USDT",
        }
    }
}

impl fmt::Display for StableSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for StableSymbol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USDC" => Ok(StableSymbol::Usdc),
            "USDT" => Ok(StableSymbol::Usdt),
            other => Err(format!("unsupported currency: {other}")),
        }
    }
}
