/// Prefix of the named per-topic critical section guarding accept/unaccept.
pub const TOGGLE_ANSWER_LOCK_PREFIX: &str = "toggle_answer_";

/// Id of the seeded system user, used as accepter for system-initiated flows.
pub const SYSTEM_USER_ID: i32 = -1;

pub mod auto_close {

    /// Twenty years, the upper bound for a per-category auto-close override.
    pub const MAX_HOURS: i32 = 20 * 365 * 24;
}

pub mod notifications {

    pub const ACCEPTED_MESSAGE: &str = "solved.accepted_notification";

    pub const UNRESOLVED_MESSAGE: &str = "solved.unresolved_reminder";
}

pub mod webhooks {

    /// Event type a web hook must subscribe to in order to receive solution events.
    pub const SOLVED_EVENT_TYPE: &str = "solved";
}

pub mod limits {

    pub const DEFAULT_SOLVED_POSTS_LIMIT: u64 = 30;

    pub const MAX_SOLVED_POSTS_LIMIT: u64 = 100;

    pub const MAX_SEARCH_RESULTS: u64 = 50;
}

/// Lock key for a topic's accept/unaccept critical section.
#[must_use]
pub fn toggle_answer_lock_key(topic_id: i32) -> String {
    format!("{TOGGLE_ANSWER_LOCK_PREFIX}{topic_id}")
}
