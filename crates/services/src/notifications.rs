//! Transient, informational notices ("toasts").
//!
//! Notices travel over a bounded channel. Producers never wait: a full channel
//! drops the notice. Nothing here feeds back into session state.

use std::collections::VecDeque;

use chrono::{DateTime, Duration, Utc};
use log::{debug, warn};
use tokio::sync::mpsc::{self, error::TryRecvError, error::TrySendError};
use tokio::task::JoinHandle;

use najah_core::Clock;

pub const DEFAULT_NOTICE_CAPACITY: usize = 32;
pub const DEFAULT_TOAST_TTL_MS: i64 = 3_000;
pub const DEFAULT_MAX_VISIBLE: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    #[must_use]
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

pub type NoticeReceiver = mpsc::Receiver<Notice>;

/// Create a bounded notice channel.
#[must_use]
pub fn notice_channel(capacity: usize) -> (Notifier, NoticeReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (Notifier { tx: Some(tx) }, rx)
}

/// Non-blocking sending half of the notice channel.
#[derive(Clone, Debug, Default)]
pub struct Notifier {
    tx: Option<mpsc::Sender<Notice>>,
}

impl Notifier {
    /// A notifier that discards everything.
    #[must_use]
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    pub fn notify(&self, notice: Notice) {
        let Some(tx) = &self.tx else {
            return;
        };
        match tx.try_send(notice) {
            Ok(()) => {}
            Err(TrySendError::Full(notice)) => {
                warn!("notice channel full, dropping: {}", notice.message);
            }
            Err(TrySendError::Closed(_)) => {
                debug!("notice channel closed");
            }
        }
    }

    pub fn info(&self, message: impl Into<String>) {
        self.notify(Notice::new(NoticeLevel::Info, message));
    }

    pub fn success(&self, message: impl Into<String>) {
        self.notify(Notice::new(NoticeLevel::Success, message));
    }

    pub fn error(&self, message: impl Into<String>) {
        self.notify(Notice::new(NoticeLevel::Error, message));
    }
}

/// Relay opaque push messages as `Info` notices until `source` closes.
///
/// Opening and closing the underlying push connection stays with the caller.
pub fn forward_push_messages(
    mut source: mpsc::Receiver<String>,
    notifier: Notifier,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(message) = source.recv().await {
            notifier.info(message);
        }
        debug!("push source closed");
    })
}

//
// ─── TOASTS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub notice: Notice,
    pub posted_at: DateTime<Utc>,
}

/// Visible toasts, auto-dismissed after a fixed time to live.
#[derive(Debug)]
pub struct ToastTray {
    clock: Clock,
    ttl: Duration,
    max_visible: usize,
    toasts: VecDeque<Toast>,
}

impl ToastTray {
    #[must_use]
    pub fn new(clock: Clock) -> Self {
        Self {
            clock,
            ttl: Duration::milliseconds(DEFAULT_TOAST_TTL_MS),
            max_visible: DEFAULT_MAX_VISIBLE,
            toasts: VecDeque::new(),
        }
    }

    #[must_use]
    pub fn with_max_visible(mut self, max_visible: usize) -> Self {
        self.max_visible = max_visible.max(1);
        self
    }

    pub fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    /// Take every notice already waiting in `rx` without blocking.
    ///
    /// Returns the number of notices collected.
    pub fn collect(&mut self, rx: &mut NoticeReceiver) -> usize {
        let mut collected = 0;
        loop {
            match rx.try_recv() {
                Ok(notice) => {
                    self.push(notice);
                    collected += 1;
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        collected
    }

    pub fn push(&mut self, notice: Notice) {
        self.toasts.push_back(Toast {
            notice,
            posted_at: self.clock.now(),
        });
        while self.toasts.len() > self.max_visible {
            self.toasts.pop_front();
        }
    }

    /// Drop expired toasts and return the ones still showing, oldest first.
    pub fn visible(&mut self) -> impl Iterator<Item = &Toast> {
        let clock = self.clock;
        let ttl = self.ttl;
        self.toasts.retain(|t| clock.elapsed_since(t.posted_at) < ttl);
        self.toasts.iter()
    }

    /// Remove and return all toasts that are still live.
    pub fn drain_visible(&mut self) -> Vec<Toast> {
        let _ = self.visible();
        self.toasts.drain(..).collect()
    }
}
