//! # Ordered, pluggable line classification.
//!
//! A [`LineMatcher`] is a predicate plus capture extractor over one line
//! of console text. The tailer walks its matcher list in order; the
//! first matcher to claim a line wins, and unclaimed lines fall through
//! to [`GameEventKind::Raw`]. Matchers are replaceable without touching
//! the tailing algorithm.
//!
//! ## Rules
//! - Matchers see the line already trimmed and non-empty.
//! - Order matters: [`default_matchers`] runs chat before kill so chat
//!   text quoting a kill line stays classified as chat.

use std::sync::LazyLock;

use regex::Regex;

use super::event::{ChatEvent, GameEventKind, KillEvent};

/// A single classification rule over one console line.
pub trait LineMatcher: Send + Sync {
    /// Short name for diagnostics.
    fn name(&self) -> &'static str;

    /// Attempts to classify the line; `None` passes it to the next matcher.
    fn try_match(&self, line: &str) -> Option<GameEventKind>;
}

/// The standard matcher order: chat, then kill.
pub fn default_matchers() -> Vec<Box<dyn LineMatcher>> {
    vec![Box::new(ChatMatcher), Box::new(KillMatcher)]
}

static CHAT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<dead>\*DEAD\*\s*)?(?P<team>\(TEAM\)\s*)?(?P<author>.+?)\s+:\s+(?P<content>.+)$")
        .expect("chat pattern is valid")
});

static KILL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<killer>.+?) killed (?P<victim>.+?) with (?P<weapon>.+?)\.(?P<crit>\s*\(crit\))?$")
        .expect("kill pattern is valid")
});

/// Classifies chat lines of the form
/// `*DEAD* (TEAM) Author : message`, with both prefixes optional.
pub struct ChatMatcher;

impl LineMatcher for ChatMatcher {
    fn name(&self) -> &'static str {
        "chat"
    }

    fn try_match(&self, line: &str) -> Option<GameEventKind> {
        let caps = CHAT_RE.captures(line)?;
        Some(GameEventKind::Chat(ChatEvent {
            author: caps["author"].to_string(),
            content: caps["content"].to_string(),
            is_team_chat: caps.name("team").is_some(),
            is_dead: caps.name("dead").is_some(),
        }))
    }
}

/// Classifies kill feed lines of the form
/// `Killer killed Victim with weapon.` with an optional `(crit)` suffix.
pub struct KillMatcher;

impl LineMatcher for KillMatcher {
    fn name(&self) -> &'static str {
        "kill"
    }

    fn try_match(&self, line: &str) -> Option<GameEventKind> {
        let caps = KILL_RE.captures(line)?;
        Some(GameEventKind::Kill(KillEvent {
            killer: caps["killer"].to_string(),
            victim: caps["victim"].to_string(),
            weapon: caps["weapon"].to_string(),
            is_critical: caps.name("crit").is_some(),
        }))
    }
}
