//! Presence and typing trackers derived from realtime events.

use std::{
    collections::{HashMap, HashSet},
    time::{Duration, Instant},
};

/// Set of user ids currently online. Updated only by explicit status events;
/// the server is responsible for announcing ungraceful disconnects, the
/// client never infers them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresenceSet {
    online: HashSet<i64>,
}

impl PresenceSet {
    pub fn apply_status(&mut self, user_id: i64, online: bool) {
        if online {
            self.online.insert(user_id);
        } else {
            self.online.remove(&user_id);
        }
    }

    pub fn is_online(&self, user_id: i64) -> bool {
        self.online.contains(&user_id)
    }

    pub fn online_count(&self) -> usize {
        self.online.len()
    }
}

/// Display names currently typing in the active conversation.
///
/// An entry is removed by an explicit stop event or by a local deadline,
/// which guards against a lost stop event. Deadlines reset on every start
/// event for the same name.
#[derive(Debug, Clone)]
pub struct TypingTracker {
    deadlines: HashMap<String, Instant>,
    ttl: Duration,
}

impl TypingTracker {
    pub fn new(ttl: Duration) -> Self {
        Self {
            deadlines: HashMap::new(),
            ttl,
        }
    }

    pub fn start(&mut self, name: &str, now: Instant) {
        self.deadlines.insert(name.to_owned(), now + self.ttl);
    }

    pub fn stop(&mut self, name: &str) {
        self.deadlines.remove(name);
    }

    /// Drops entries whose deadline has passed. Returns true when anything
    /// was removed, so the caller knows a redraw is needed.
    pub fn expire(&mut self, now: Instant) -> bool {
        let before = self.deadlines.len();
        self.deadlines.retain(|_, deadline| *deadline > now);
        self.deadlines.len() != before
    }

    /// Typing belongs to one conversation; switching clears it wholesale.
    pub fn clear(&mut self) {
        self.deadlines.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }

    /// Sorted names for stable rendering.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.deadlines.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(4);

    #[test]
    fn presence_adds_and_removes_by_status() {
        let mut presence = PresenceSet::default();

        presence.apply_status(7, true);
        presence.apply_status(9, true);
        assert!(presence.is_online(7));
        assert_eq!(presence.online_count(), 2);

        presence.apply_status(7, false);
        assert!(!presence.is_online(7));
        assert_eq!(presence.online_count(), 1);
    }

    #[test]
    fn presence_is_idempotent_per_event() {
        let mut presence = PresenceSet::default();

        presence.apply_status(7, true);
        presence.apply_status(7, true);
        assert_eq!(presence.online_count(), 1);

        presence.apply_status(7, false);
        presence.apply_status(7, false);
        assert_eq!(presence.online_count(), 0);
    }

    #[test]
    fn typing_stop_removes_entry() {
        let mut typing = TypingTracker::new(TTL);
        let now = Instant::now();

        typing.start("Alice", now);
        assert_eq!(typing.names(), vec!["Alice"]);

        typing.stop("Alice");
        assert!(typing.is_empty());
    }

    #[test]
    fn typing_expires_after_ttl_without_stop_event() {
        let mut typing = TypingTracker::new(TTL);
        let now = Instant::now();

        typing.start("Alice", now);
        assert!(!typing.expire(now + TTL - Duration::from_millis(1)));
        assert_eq!(typing.names(), vec!["Alice"]);

        assert!(typing.expire(now + TTL + Duration::from_millis(1)));
        assert!(typing.is_empty());
    }

    #[test]
    fn restart_resets_the_deadline() {
        let mut typing = TypingTracker::new(TTL);
        let now = Instant::now();

        typing.start("Alice", now);
        typing.start("Alice", now + Duration::from_secs(3));

        assert!(!typing.expire(now + TTL + Duration::from_secs(1)));
        assert_eq!(typing.names(), vec!["Alice"]);
    }

    #[test]
    fn names_are_sorted_for_stable_rendering() {
        let mut typing = TypingTracker::new(TTL);
        let now = Instant::now();

        typing.start("bob", now);
        typing.start("alice", now);

        assert_eq!(typing.names(), vec!["alice", "bob"]);
    }

    #[test]
    fn clear_empties_everything() {
        let mut typing = TypingTracker::new(TTL);
        typing.start("Alice", Instant::now());

        typing.clear();

        assert!(typing.is_empty());
    }
}
