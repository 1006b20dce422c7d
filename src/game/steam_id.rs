//! # Steam identifier parsing and conversion.
//!
//! A [`SteamId`] accepts any of the three textual Steam identifier
//! shapes and converts freely among them:
//!
//! - SteamID1: `STEAM_0:X:Y`
//! - SteamID3: `[U:1:N]`
//! - SteamID64: a 17-digit community id starting `765611…`
//!
//! Internally the 64-bit community id is the canonical form; the other
//! two representations are derived by pure formatting. Equality and
//! hashing therefore follow the 64-bit id.
//!
//! Conversion math derived from the community reference mapping:
//! `id64 = 2·Y + X + BASE`, `id3 = id64 − BASE`.

use std::fmt;
use std::str::FromStr;

use crate::error::SteamIdError;

/// Offset between the 64-bit community id space and account numbers.
const SID64_BASE: u64 = 76_561_197_960_265_728;

/// A Steam identifier, canonically stored as the 64-bit community id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SteamId {
    id64: u64,
}

impl SteamId {
    /// Parses any of the three supported shapes.
    ///
    /// Inputs that resemble none of them produce
    /// [`SteamIdError::UnrecognizedFormat`]; a recognizable shape with
    /// bad numeric components produces the shape-specific error.
    pub fn parse(input: &str) -> Result<Self, SteamIdError> {
        let input = input.trim();
        if input.starts_with("STEAM_0") {
            Self::from_id1(input)
        } else if input.starts_with("[U:1:") {
            Self::from_id3(input)
        } else if input.starts_with("765611") {
            Self::from_id64(input)
        } else {
            Err(SteamIdError::UnrecognizedFormat {
                input: input.to_string(),
            })
        }
    }

    /// Parses a `STEAM_0:X:Y` identifier.
    pub fn from_id1(input: &str) -> Result<Self, SteamIdError> {
        let invalid = || SteamIdError::InvalidId1 {
            input: input.to_string(),
        };
        let mut parts = input.split(':');
        let (_prefix, parity, account) = (
            parts.next().ok_or_else(invalid)?,
            parts.next().ok_or_else(invalid)?,
            parts.next().ok_or_else(invalid)?,
        );
        if parts.next().is_some() {
            return Err(invalid());
        }
        let parity: u64 = match parity {
            "0" => 0,
            "1" => 1,
            _ => return Err(invalid()),
        };
        let account: u64 = account.parse().map_err(|_| invalid())?;
        Ok(Self {
            id64: account * 2 + parity + SID64_BASE,
        })
    }

    /// Parses a `[U:1:N]` identifier.
    pub fn from_id3(input: &str) -> Result<Self, SteamIdError> {
        let invalid = || SteamIdError::InvalidId3 {
            input: input.to_string(),
        };
        let trimmed = input
            .strip_prefix("[U:1:")
            .and_then(|rest| rest.strip_suffix(']'))
            .ok_or_else(invalid)?;
        let account: u64 = trimmed.parse().map_err(|_| invalid())?;
        Ok(Self {
            id64: account + SID64_BASE,
        })
    }

    /// Parses a decimal 64-bit community id.
    pub fn from_id64(input: &str) -> Result<Self, SteamIdError> {
        let invalid = || SteamIdError::InvalidId64 {
            input: input.to_string(),
        };
        let id64: u64 = input.parse().map_err(|_| invalid())?;
        if id64 < SID64_BASE {
            return Err(invalid());
        }
        Ok(Self { id64 })
    }

    /// The 64-bit community id.
    pub fn id64(&self) -> u64 {
        self.id64
    }

    /// Formats as `STEAM_0:X:Y`.
    pub fn id1(&self) -> String {
        let account = self.id64 - SID64_BASE;
        format!("STEAM_0:{}:{}", account % 2, account / 2)
    }

    /// Formats as `[U:1:N]`.
    pub fn id3(&self) -> String {
        format!("[U:1:{}]", self.id64 - SID64_BASE)
    }

    /// Steam community profile URL for this id.
    pub fn profile_url(&self) -> String {
        format!("https://steamcommunity.com/profiles/{}", self.id64)
    }

    /// steamhistory.net lookup URL for this id.
    pub fn history_url(&self) -> String {
        format!("https://steamhistory.net/id/{}", self.id64)
    }
}

impl FromStr for SteamId {
    type Err = SteamIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for SteamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id64)
    }
}
