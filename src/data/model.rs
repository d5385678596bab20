//! Typed records for the hashtag and poll datasets.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One day's mention count for one hashtag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HashtagMention {
    pub hashtag: String,
    pub date: NaiveDate,
    pub count: u64,
}

/// One polling institute's support for one party on one publication date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollRecord {
    pub company: String,
    pub publdate: NaiveDate,
    pub party: Party,
    pub support: f64,
}

/// A hashtag and its summed mentions over a trending window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendingEntry {
    pub hashtag: String,
    pub total_count: u64,
}

/// Parties reported by the polling institutes, plus the undecided bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Party {
    S,
    M,
    L,
    MP,
    C,
    SD,
    V,
    FI,
    KD,
    Uncertain,
}

impl Party {
    pub const ALL: [Party; 10] = [
        Party::S,
        Party::M,
        Party::L,
        Party::MP,
        Party::C,
        Party::SD,
        Party::V,
        Party::FI,
        Party::KD,
        Party::Uncertain,
    ];

    /// Parties represented in parliament, in the order the dashboard plots them.
    pub const PARLIAMENTARY: [Party; 8] = [
        Party::M,
        Party::KD,
        Party::L,
        Party::C,
        Party::S,
        Party::MP,
        Party::V,
        Party::SD,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Party::S => "S",
            Party::M => "M",
            Party::L => "L",
            Party::MP => "MP",
            Party::C => "C",
            Party::SD => "SD",
            Party::V => "V",
            Party::FI => "FI",
            Party::KD => "KD",
            Party::Uncertain => "Uncertain",
        }
    }

    /// Dashboard colour as RGB.
    pub fn color(self) -> (u8, u8, u8) {
        match self {
            Party::S | Party::V => (255, 0, 0),
            Party::M | Party::L => (0, 0, 255),
            Party::MP | Party::C => (0, 128, 0),
            Party::SD => (255, 255, 0),
            Party::FI => (255, 192, 203),
            Party::KD => (128, 0, 128),
            Party::Uncertain => (128, 128, 128),
        }
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownParty(pub String);

impl fmt::Display for UnknownParty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown party code '{}'", self.0)
    }
}

impl std::error::Error for UnknownParty {}

impl FromStr for Party {
    type Err = UnknownParty;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        Party::ALL
            .iter()
            .copied()
            .find(|p| p.code() == code)
            .ok_or_else(|| UnknownParty(code.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn party_codes_parse_back() {
        for party in Party::ALL {
            assert_eq!(party.code().parse::<Party>(), Ok(party));
        }
        assert_eq!(" SD ".parse::<Party>(), Ok(Party::SD));
    }

    #[test]
    fn unknown_party_is_rejected() {
        let err = "NYD".parse::<Party>().unwrap_err();
        assert_eq!(err, UnknownParty("NYD".to_string()));
        assert!("sd".parse::<Party>().is_err());
    }

    #[test]
    fn blocs_share_colours() {
        assert_eq!(Party::S.color(), Party::V.color());
        assert_eq!(Party::M.color(), Party::L.color());
        assert_ne!(Party::SD.color(), Party::Uncertain.color());
    }
}
