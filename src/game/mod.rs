//! Game-side domain model: parsed console events, line classification,
//! and Steam identifier math.
//!
//! ## Contents
//! - [`GameEvent`], [`GameEventKind`], [`ChatEvent`], [`KillEvent`] —
//!   closed tagged variants for classified console lines
//! - [`LineMatcher`], [`ChatMatcher`], [`KillMatcher`],
//!   [`default_matchers`] — ordered, pluggable pattern matchers
//! - [`SteamId`] — SteamID1/SteamID3/SteamID64 parsing and conversion

mod event;
mod matcher;
mod steam_id;

pub use event::{ChatEvent, GameEvent, GameEventKind, KillEvent};
pub use matcher::{default_matchers, ChatMatcher, KillMatcher, LineMatcher};
pub use steam_id::SteamId;
