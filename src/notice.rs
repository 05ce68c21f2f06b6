//! Transient user-facing messages that expire on their own.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Informational rejection of an edit, such as a second canvas condition.
    Advisory,
    /// A failed encrypt or decrypt attempt.
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub raised_at: Instant,
    pub ttl: Duration,
}

impl Notice {
    pub fn advisory(message: impl Into<String>, raised_at: Instant, ttl: Duration) -> Self {
        Self {
            level: NoticeLevel::Advisory,
            message: message.into(),
            raised_at,
            ttl,
        }
    }

    pub fn error(message: impl Into<String>, raised_at: Instant, ttl: Duration) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
            raised_at,
            ttl,
        }
    }

    pub fn expires_at(&self) -> Instant {
        self.raised_at + self.ttl
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at()
    }
}

/// Holds at most one notice; a newer notice replaces the current one.
#[derive(Debug, Clone, Default)]
pub struct NoticeBoard {
    current: Option<Notice>,
}

impl NoticeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn post(&mut self, notice: Notice) {
        self.current = Some(notice);
    }

    /// The notice still showing at `now`, if any.
    pub fn active(&self, now: Instant) -> Option<&Notice> {
        self.current.as_ref().filter(|n| !n.is_expired(now))
    }

    /// Drops the current notice once its lifetime has passed.
    pub fn expire(&mut self, now: Instant) -> Option<Notice> {
        if self.current.as_ref().is_some_and(|n| n.is_expired(now)) {
            self.current.take()
        } else {
            None
        }
    }

    pub fn dismiss(&mut self) -> Option<Notice> {
        self.current.take()
    }

    /// Dismisses the current notice only if it has the given level.
    pub fn dismiss_level(&mut self, level: NoticeLevel) -> Option<Notice> {
        if self.current.as_ref().is_some_and(|n| n.level == level) {
            self.current.take()
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}
