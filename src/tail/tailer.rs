//! # LogTailer: poll-based tailing of an append-only file.
//!
//! Watches a console log by polling its size, reading the delta, and
//! classifying each non-empty line through the ordered matcher list.
//! OS-level change notification is deliberately not used; the source
//! format rewrites nothing, so size polling is sufficient and portable.
//!
//! ## Cycle
//! ```text
//! loop {
//!   ├─► len = metadata().len()
//!   │     ├─ len < cursor → rotation/truncation: snap cursor to len
//!   │     └─ len > cursor → read cursor..len, lossy-decode,
//!   │                       split lines, classify, send (blocking)
//!   ├─► control: try_recv ── Shutdown → ack, break
//!   └─► idle delay (cancellable safe point)
//! }
//! ```
//!
//! ## Rules
//! - The cursor starts at EOF: pre-existing content is never replayed.
//! - Output uses `send().await` on a bounded channel — a full channel
//!   blocks this worker rather than dropping events.
//! - Invalid UTF-8 is replaced, never fatal to the read.
//! - Control is checked once per cycle, not per line.
//! - The file handle is released on every exit path (owned locally,
//!   dropped with the loop).

use std::io::SeekFrom;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio::select;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::control::{ControlMessage, ControlReceiver};
use crate::events::{Bus, Event, EventKind};
use crate::game::{GameEvent, GameEventKind, LineMatcher};

/// Name the worker reports in lifecycle events and stuck-worker lists.
pub const LOG_TAILER: &str = "log-tailer";

/// Tails one append-only log file and publishes classified events.
pub struct LogTailer {
    path: PathBuf,
    matchers: Vec<Box<dyn LineMatcher>>,
    cfg: Config,
    output: mpsc::Sender<GameEvent>,
    control: ControlReceiver,
    bus: Bus,
}

impl LogTailer {
    /// Creates a tailer over `path` with the given matcher order.
    pub fn new(
        path: impl Into<PathBuf>,
        matchers: Vec<Box<dyn LineMatcher>>,
        cfg: Config,
        output: mpsc::Sender<GameEvent>,
        control: ControlReceiver,
        bus: Bus,
    ) -> Self {
        Self {
            path: path.into(),
            matchers,
            cfg,
            output,
            control,
            bus,
        }
    }

    /// Runs until a Shutdown control message, runtime cancellation, or a
    /// fatal I/O error. Returns the worker name for join bookkeeping.
    pub async fn run(mut self, token: CancellationToken) -> &'static str {
        self.bus
            .publish(Event::now(EventKind::WorkerStarting).with_worker(LOG_TAILER));

        let source: Arc<str> = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
            .into();

        let mut file = match File::open(&self.path).await {
            Ok(f) => f,
            Err(err) => {
                self.fail(format!("open {}: {err}", self.path.display()));
                self.control.drain();
                return LOG_TAILER;
            }
        };

        // Start at EOF: only content appended after startup is observed.
        let mut cursor = match file.metadata().await {
            Ok(meta) => meta.len(),
            Err(err) => {
                self.fail(format!("stat {}: {err}", self.path.display()));
                self.control.drain();
                return LOG_TAILER;
            }
        };

        loop {
            match self.poll_once(&mut file, &mut cursor, &source).await {
                Ok(true) => {}
                Ok(false) => break,
                Err(err) => {
                    self.fail(format!("poll {}: {err}", self.path.display()));
                    break;
                }
            }

            if self.observed_shutdown() {
                break;
            }

            select! {
                _ = sleep(self.cfg.poll_interval) => {}
                _ = token.cancelled() => {
                    self.bus.publish(
                        Event::now(EventKind::WorkerStopped)
                            .with_worker(LOG_TAILER)
                            .with_reason("cancelled"),
                    );
                    break;
                }
            }
        }

        self.control.drain();
        LOG_TAILER
    }

    /// One poll cycle: snap on shrink, read and publish the delta.
    ///
    /// Returns `Ok(false)` when every event consumer is gone and the
    /// loop should stop.
    async fn poll_once(
        &mut self,
        file: &mut File,
        cursor: &mut u64,
        source: &Arc<str>,
    ) -> std::io::Result<bool> {
        let len = file.metadata().await?.len();

        if len < *cursor {
            // Rotation or truncation: discard the stale cursor, observe
            // only content appended from here on.
            *cursor = len;
            self.bus.publish(
                Event::now(EventKind::TailTruncated)
                    .with_worker(LOG_TAILER)
                    .with_value(len as f64),
            );
            return Ok(true);
        }
        if len == *cursor {
            return Ok(true);
        }

        file.seek(SeekFrom::Start(*cursor)).await?;
        let mut buf = Vec::with_capacity((len - *cursor) as usize);
        let read = file.take(len - *cursor).read_to_end(&mut buf).await?;
        *cursor += read as u64;

        // Permissive decode: malformed sequences are replaced, the read
        // itself never fails on them.
        let text = String::from_utf8_lossy(&buf);
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let kind = self
                .matchers
                .iter()
                .find_map(|m| m.try_match(line))
                .unwrap_or_else(|| GameEventKind::Raw {
                    line: line.to_string(),
                });
            let event = GameEvent::new(Arc::clone(source), LOG_TAILER, kind);
            if self.output.send(event).await.is_err() {
                self.bus.publish(
                    Event::now(EventKind::WorkerStopped)
                        .with_worker(LOG_TAILER)
                        .with_reason("event consumers gone"),
                );
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Polls one control message; returns true when it was a Shutdown.
    fn observed_shutdown(&mut self) -> bool {
        match self.control.try_recv() {
            Some(ControlMessage::Shutdown { origin }) => {
                self.bus.publish(
                    Event::now(EventKind::WorkerStopped)
                        .with_worker(LOG_TAILER)
                        .with_reason(format!("shutdown from {origin}")),
                );
                self.control.ack();
                true
            }
            Some(ControlMessage::NoOp { .. }) => {
                self.control.ack();
                false
            }
            None => false,
        }
    }

    fn fail(&self, reason: String) {
        self.bus.publish(
            Event::now(EventKind::WorkerFailed)
                .with_worker(LOG_TAILER)
                .with_reason(reason),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control;
    use crate::game::default_matchers;
    use std::io::Write;
    use std::time::Duration;

    struct Fixture {
        dir: tempfile::TempDir,
        path: PathBuf,
        events: mpsc::Receiver<GameEvent>,
        control: control::ControlSender,
        handle: tokio::task::JoinHandle<&'static str>,
        token: CancellationToken,
    }

    /// Spawns a tailer over a fresh log seeded with `initial`.
    fn spawn_tailer(initial: &str) -> Fixture {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("console.log");
        std::fs::write(&path, initial).expect("seed log");

        let mut cfg = Config::default();
        cfg.poll_interval = Duration::from_millis(5);

        let (event_tx, events) = mpsc::channel(64);
        let (ctl_tx, ctl_rx) = control::queue();
        let bus = Bus::new(256);

        let tailer = LogTailer::new(&path, default_matchers(), cfg, event_tx, ctl_rx, bus);
        let token = CancellationToken::new();
        let handle = tokio::spawn(tailer.run(token.clone()));

        Fixture {
            dir,
            path,
            events,
            control: ctl_tx,
            handle,
            token,
        }
    }

    fn append(path: &PathBuf, text: &str) {
        let mut f = std::fs::OpenOptions::new()
            .append(true)
            .open(path)
            .expect("open for append");
        f.write_all(text.as_bytes()).expect("append");
    }

    async fn recv_within(events: &mut mpsc::Receiver<GameEvent>, ms: u64) -> Option<GameEvent> {
        tokio::time::timeout(Duration::from_millis(ms), events.recv())
            .await
            .ok()
            .flatten()
    }

    #[tokio::test]
    async fn appended_lines_arrive_in_order_without_replay() {
        let mut fx = spawn_tailer("pre-existing line\n");

        // Let the tailer snap its cursor to EOF first.
        tokio::time::sleep(Duration::from_millis(50)).await;
        append(&fx.path, "first\nsecond\nthird\n");

        let a = recv_within(&mut fx.events, 500).await.expect("first");
        let b = recv_within(&mut fx.events, 500).await.expect("second");
        let c = recv_within(&mut fx.events, 500).await.expect("third");
        assert_eq!(a.kind, GameEventKind::Raw { line: "first".into() });
        assert_eq!(b.kind, GameEventKind::Raw { line: "second".into() });
        assert_eq!(c.kind, GameEventKind::Raw { line: "third".into() });
        assert_eq!(a.source.as_ref(), "console.log");

        // Exactly three: the pre-existing line was never replayed.
        assert!(recv_within(&mut fx.events, 100).await.is_none());

        fx.control.send(ControlMessage::shutdown("test"));
        fx.handle.await.unwrap();
        drop(fx.dir);
    }

    #[tokio::test]
    async fn truncation_discards_the_stale_cursor() {
        let mut fx = spawn_tailer("one\ntwo\nthree\n");
        tokio::time::sleep(Duration::from_millis(50)).await;

        // Truncate to zero, let a poll observe the shrink, then append.
        std::fs::write(&fx.path, "").expect("truncate");
        tokio::time::sleep(Duration::from_millis(50)).await;
        append(&fx.path, "after rotation\n");

        let ev = recv_within(&mut fx.events, 500).await.expect("post-rotation line");
        assert_eq!(
            ev.kind,
            GameEventKind::Raw {
                line: "after rotation".into()
            }
        );
        assert!(recv_within(&mut fx.events, 100).await.is_none());

        fx.control.send(ControlMessage::shutdown("test"));
        fx.handle.await.unwrap();
    }

    #[tokio::test]
    async fn lines_are_classified_through_the_matchers() {
        let mut fx = spawn_tailer("");
        tokio::time::sleep(Duration::from_millis(50)).await;

        append(
            &fx.path,
            "PlayerA : gg wp\nPlayerA killed PlayerB with shotgun. (crit)\nlobby updated\n",
        );

        let chat = recv_within(&mut fx.events, 500).await.expect("chat");
        assert!(matches!(chat.kind, GameEventKind::Chat(_)));
        let kill = recv_within(&mut fx.events, 500).await.expect("kill");
        assert!(matches!(kill.kind, GameEventKind::Kill(_)));
        let raw = recv_within(&mut fx.events, 500).await.expect("raw");
        assert_eq!(
            raw.kind,
            GameEventKind::Raw {
                line: "lobby updated".into()
            }
        );

        fx.control.send(ControlMessage::shutdown("test"));
        fx.handle.await.unwrap();
    }

    #[tokio::test]
    async fn shutdown_message_is_acked_and_drains() {
        let fx = spawn_tailer("");
        tokio::time::sleep(Duration::from_millis(30)).await;

        fx.control.send(ControlMessage::shutdown("test"));
        tokio::time::timeout(Duration::from_secs(2), fx.control.join())
            .await
            .expect("join resolves after the worker acks");
        fx.handle.await.unwrap();
    }

    #[tokio::test]
    async fn cancellation_stops_the_worker() {
        let fx = spawn_tailer("");
        tokio::time::sleep(Duration::from_millis(30)).await;
        fx.token.cancel();
        fx.handle.await.unwrap();
    }

    #[tokio::test]
    async fn invalid_utf8_does_not_kill_the_read() {
        let mut fx = spawn_tailer("");
        tokio::time::sleep(Duration::from_millis(50)).await;

        let mut f = std::fs::OpenOptions::new()
            .append(true)
            .open(&fx.path)
            .unwrap();
        f.write_all(b"ok line\n\xff\xfe broken\n").unwrap();
        drop(f);

        let first = recv_within(&mut fx.events, 500).await.expect("ok line");
        assert_eq!(first.kind, GameEventKind::Raw { line: "ok line".into() });
        // The malformed line still arrives, with replacements.
        let second = recv_within(&mut fx.events, 500).await.expect("lossy line");
        assert!(matches!(second.kind, GameEventKind::Raw { .. }));

        fx.control.send(ControlMessage::shutdown("test"));
        fx.handle.await.unwrap();
    }
}
