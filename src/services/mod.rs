pub mod acceptance_service;
pub mod acceptance_service_impl;
pub use acceptance_service::{AcceptanceError, AcceptanceService};
pub use acceptance_service_impl::SeaOrmAcceptanceService;

pub mod allowlist_cache;
pub use allowlist_cache::CategoryAllowlistCache;

pub mod auto_close;
pub use auto_close::{AutoCloseService, TimerOutcome};

pub mod category_service;
pub use category_service::{CategoryError, CategorySaveObserver, CategoryService};

pub mod permission;
pub use permission::PermissionPolicy;

pub mod query_filters;
pub use query_filters::QueryFilters;

pub mod rate_limit;
pub use rate_limit::RateLimiter;

pub mod reminders;
pub use reminders::UnresolvedReminderService;

pub mod report_service;
pub use report_service::{
    AcceptedSolutionsReport, ReportError, ReportParams, ReportService, TrustLevelRequirement,
    UserSolvedSummary,
};

pub mod scheduler;
pub use scheduler::Scheduler;

pub mod topic_lock;
pub use topic_lock::{
    DatabaseTopicLock, LocalTopicLock, LockError, LockGuard, TopicLock, build_topic_lock,
};

pub mod webhooks;
pub use webhooks::WebhookService;
