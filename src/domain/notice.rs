//! Transient, user-dismissible notices. The shell shows the newest one and
//! drops expired entries on tick.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub text: String,
    pub level: NoticeLevel,
    posted_at: Instant,
}

#[derive(Debug, Clone)]
pub struct NoticeBoard {
    notices: Vec<Notice>,
    ttl: Duration,
}

impl NoticeBoard {
    pub fn new(ttl: Duration) -> Self {
        Self {
            notices: Vec::new(),
            ttl,
        }
    }

    pub fn post(&mut self, level: NoticeLevel, text: impl Into<String>, now: Instant) {
        self.notices.push(Notice {
            text: text.into(),
            level,
            posted_at: now,
        });
    }

    /// Drops expired notices; returns true when anything changed.
    pub fn expire(&mut self, now: Instant) -> bool {
        let before = self.notices.len();
        let ttl = self.ttl;
        self.notices
            .retain(|notice| now.duration_since(notice.posted_at) < ttl);
        self.notices.len() != before
    }

    pub fn dismiss_latest(&mut self) {
        self.notices.pop();
    }

    pub fn latest(&self) -> Option<&Notice> {
        self.notices.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(4);

    #[test]
    fn latest_notice_wins_and_can_be_dismissed() {
        let mut board = NoticeBoard::new(TTL);
        let now = Instant::now();
        board.post(NoticeLevel::Info, "first", now);
        board.post(NoticeLevel::Error, "second", now);

        assert_eq!(board.latest().map(|n| n.text.as_str()), Some("second"));

        board.dismiss_latest();
        assert_eq!(board.latest().map(|n| n.text.as_str()), Some("first"));
    }

    #[test]
    fn notices_expire_after_ttl() {
        let mut board = NoticeBoard::new(TTL);
        let now = Instant::now();
        board.post(NoticeLevel::Warn, "stale", now);

        assert!(!board.expire(now + Duration::from_secs(3)));
        assert!(board.latest().is_some());

        assert!(board.expire(now + TTL));
        assert!(board.latest().is_none());
    }
}
