pub use super::categories::Entity as Categories;
pub use super::distributed_locks::Entity as DistributedLocks;
pub use super::groups_users::Entity as GroupsUsers;
pub use super::notifications::Entity as Notifications;
pub use super::posts::Entity as Posts;
pub use super::solved_topics::Entity as SolvedTopics;
pub use super::tags::Entity as Tags;
pub use super::topic_tags::Entity as TopicTags;
pub use super::topic_timers::Entity as TopicTimers;
pub use super::topics::Entity as Topics;
pub use super::user_actions::Entity as UserActions;
pub use super::users::Entity as Users;
pub use super::web_hook_events::Entity as WebHookEvents;
pub use super::web_hooks::Entity as WebHooks;
