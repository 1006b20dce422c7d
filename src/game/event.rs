//! # Parsed console events.
//!
//! A [`GameEvent`] is one classified line from the tailed console log.
//! The payload is a closed tagged variant ([`GameEventKind`]); the
//! display form is a pure formatting function over the variant — nothing
//! about an event is mutated after construction.
//!
//! ## Rules
//! - `source` is where the line came from (the log file's name).
//! - `origin` is the component that produced the event (the tailer).
//! - Lines no matcher claims become [`GameEventKind::Raw`] — malformed
//!   input degrades to a generic event, never an error.

use std::fmt;
use std::sync::Arc;

/// One classified console line, with provenance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameEvent {
    /// Where the line came from (e.g. the log file name).
    pub source: Arc<str>,
    /// Component that produced this event.
    pub origin: Arc<str>,
    /// The classified payload.
    pub kind: GameEventKind,
}

impl GameEvent {
    /// Creates an event with the given provenance and payload.
    pub fn new(
        source: impl Into<Arc<str>>,
        origin: impl Into<Arc<str>>,
        kind: GameEventKind,
    ) -> Self {
        Self {
            source: source.into(),
            origin: origin.into(),
            kind,
        }
    }
}

/// Classified payload of a console line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEventKind {
    /// A line no matcher claimed, passed through verbatim.
    Raw {
        /// The unparsed line.
        line: String,
    },
    /// A player chat message.
    Chat(ChatEvent),
    /// A kill feed entry.
    Kill(KillEvent),
}

/// A player chat message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatEvent {
    /// Player who spoke.
    pub author: String,
    /// Message body.
    pub content: String,
    /// True when the message went to team chat only.
    pub is_team_chat: bool,
    /// True when the author spoke while dead.
    pub is_dead: bool,
}

/// A kill feed entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KillEvent {
    /// Player credited with the kill.
    pub killer: String,
    /// Player who died.
    pub victim: String,
    /// Weapon name as printed by the game.
    pub weapon: String,
    /// True when the kill was a critical hit.
    pub is_critical: bool,
}

impl fmt::Display for GameEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            GameEventKind::Raw { line } => {
                write!(f, "({}) Raw::'{}'", self.source, line)
            }
            GameEventKind::Chat(chat) => {
                write!(f, "({}) Chat::'{}: {}'", self.source, chat.author, chat.content)
            }
            GameEventKind::Kill(kill) => write!(
                f,
                "({}) Kill::'{} -> {} [{}]'",
                self.source, kill.killer, kill.victim, kill.weapon
            ),
        }
    }
}
