pub mod prelude;

pub mod categories;
pub mod distributed_locks;
pub mod groups_users;
pub mod notifications;
pub mod posts;
pub mod solved_topics;
pub mod tags;
pub mod topic_tags;
pub mod topic_timers;
pub mod topics;
pub mod user_actions;
pub mod users;
pub mod web_hook_events;
pub mod web_hooks;
