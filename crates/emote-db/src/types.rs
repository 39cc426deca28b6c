//! Enumerations shared by the ledger and reward tables.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Emote provider a reward draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RewardType {
    Bttv,
    Seventv,
}

impl RewardType {
    pub const ALL: [RewardType; 2] = [RewardType::Bttv, RewardType::Seventv];

    pub fn as_str(self) -> &'static str {
        match self {
            RewardType::Bttv => "bttv",
            RewardType::Seventv => "seventv",
        }
    }
}

impl fmt::Display for RewardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RewardType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bttv" => Ok(RewardType::Bttv),
            "seventv" | "7tv" => Ok(RewardType::Seventv),
            other => Err(format!("unknown reward type: {other}")),
        }
    }
}

/// Kind of change recorded in the emote history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmoteChangeType {
    Add,
    Remove,
}

impl EmoteChangeType {
    pub fn as_str(self) -> &'static str {
        match self {
            EmoteChangeType::Add => "add",
            EmoteChangeType::Remove => "remove",
        }
    }
}

impl FromStr for EmoteChangeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(EmoteChangeType::Add),
            "remove" => Ok(EmoteChangeType::Remove),
            other => Err(format!("unknown change type: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reward_type_parses_aliases() {
        assert_eq!("7tv".parse::<RewardType>(), Ok(RewardType::Seventv));
        assert_eq!("BTTV".parse::<RewardType>(), Ok(RewardType::Bttv));
        assert!("ffz".parse::<RewardType>().is_err());
    }

    #[test]
    fn reward_type_serializes_as_variant_name() {
        let json = serde_json::to_string(&RewardType::Seventv).unwrap();
        assert_eq!(json, "\"Seventv\"");
    }
}
