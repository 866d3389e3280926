use crate::toast_log::append_toast_log;
use std::path::PathBuf;
use std::time::{Duration, Instant};

pub const DEFAULT_NOTICE_DURATION: Duration = Duration::from_secs(5);

pub const MSG_DISPENSED: &str = "Medicine dispensed successfully!";
pub const MSG_DISPENSE_FAILED: &str = "Failed to dispense medicine. Please try again.";
pub const MSG_EMPTY_PAD: &str = "Please write something first!";
pub const MSG_COPIED: &str = "Copied to clipboard!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub id: u64,
    pub kind: NoticeKind,
    pub message: String,
    pub created: Instant,
}

/// Transient user-visible messages, dismissed after a fixed duration.
///
/// Presentation is left to the host: it takes newly pushed notices with
/// [`Notifications::take_unshown`] and renders them however it likes.
#[derive(Debug)]
pub struct Notifications {
    duration: Duration,
    entries: Vec<Notice>,
    unshown: Vec<Notice>,
    next_id: u64,
    log_path: Option<PathBuf>,
}

impl Default for Notifications {
    fn default() -> Self {
        Self::new(DEFAULT_NOTICE_DURATION, None)
    }
}

impl Notifications {
    pub fn new(duration: Duration, log_path: Option<PathBuf>) -> Self {
        Self {
            duration,
            entries: Vec::new(),
            unshown: Vec::new(),
            next_id: 0,
            log_path,
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn push(&mut self, kind: NoticeKind, message: impl Into<String>, now: Instant) -> u64 {
        let message = message.into();
        if let Some(path) = &self.log_path {
            append_toast_log(path, &message);
        }
        match kind {
            NoticeKind::Error => tracing::warn!(%message, "notification"),
            _ => tracing::info!(%message, "notification"),
        }
        let id = self.next_id;
        self.next_id += 1;
        let notice = Notice {
            id,
            kind,
            message,
            created: now,
        };
        self.unshown.push(notice.clone());
        self.entries.push(notice);
        id
    }

    /// Drop notices older than the display duration; returns how many went.
    pub fn expire(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        let duration = self.duration;
        self.entries
            .retain(|n| now.saturating_duration_since(n.created) < duration);
        before - self.entries.len()
    }

    pub fn dismiss(&mut self, id: u64) {
        self.entries.retain(|n| n.id != id);
    }

    pub fn active(&self) -> &[Notice] {
        &self.entries
    }

    pub fn take_unshown(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.unshown)
    }
}
