use anyhow::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use sea_orm::sqlx::sqlite::SqliteJournalMode;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DatabaseTransaction, DbErr,
    SqlErr, Statement, TransactionTrait,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::info;

use crate::domain::PostType;
use crate::entities::{notifications, topic_timers, web_hook_events, web_hooks};
use crate::models::category::Category;
use crate::models::post::Post;
use crate::models::solution::Solution;
use crate::models::topic::Topic;
use crate::models::user::User;

pub mod migrator;
pub mod repositories;

pub use repositories::category::{CategoryRepository, NewCategory};
pub use repositories::lock::LockRepository;
pub use repositories::notification::{NewNotification, NotificationRepository};
pub use repositories::post::{PostRepository, PostSearchHit};
pub use repositories::report::{DailyCount, ReportRepository};
pub use repositories::solution::{SolutionRepository, SolvedPostRow};
pub use repositories::timer::TimerRepository;
pub use repositories::topic::{NewTopic, TopicRepository};
pub use repositories::user::{NewUser, UserRepository};
pub use repositories::user_action::UserActionRepository;
pub use repositories::webhook::WebhookRepository;

/// Current time as stored in every timestamp column.
#[must_use]
pub fn now_timestamp() -> String {
    format_timestamp(Utc::now())
}

/// UTC RFC 3339 with second precision, so stored values sort lexically.
#[must_use]
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[must_use]
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

/// True when `err` wraps a database unique constraint failure.
#[must_use]
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.downcast_ref::<DbErr>()
        .and_then(DbErr::sql_err)
        .is_some_and(|e| matches!(e, SqlErr::UniqueConstraintViolation(_)))
}

/// How long a connection waits on another connection's write lock before failing.
const SQLITE_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
    writer: Arc<Mutex<()>>,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:").trim_start_matches("//");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false)
            .map_sqlx_sqlite_opts(|opts| {
                opts.journal_mode(SqliteJournalMode::Wal)
                    .busy_timeout(SQLITE_BUSY_TIMEOUT)
            });

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self {
            conn,
            writer: Arc::new(Mutex::new(())),
        })
    }

    /// Starts a transaction that owns SQLite's write lock from its first statement, so it
    /// never has to upgrade a read snapshot mid-flight. Writers in this process queue on
    /// the returned guard; writers in other processes wait out the busy timeout.
    pub async fn begin_write(&self) -> Result<(OwnedMutexGuard<()>, DatabaseTransaction)> {
        let writer = Arc::clone(&self.writer).lock_owned().await;
        let txn = self.conn.begin().await?;
        txn.execute_unprepared("UPDATE distributed_locks SET expires_at = expires_at WHERE 0")
            .await?;
        Ok((writer, txn))
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    pub fn users(&self) -> UserRepository<'_, DatabaseConnection> {
        UserRepository::new(&self.conn)
    }

    pub fn categories(&self) -> CategoryRepository<'_, DatabaseConnection> {
        CategoryRepository::new(&self.conn)
    }

    pub fn topics(&self) -> TopicRepository<'_, DatabaseConnection> {
        TopicRepository::new(&self.conn)
    }

    pub fn posts(&self) -> PostRepository<'_, DatabaseConnection> {
        PostRepository::new(&self.conn)
    }

    pub fn solutions(&self) -> SolutionRepository<'_, DatabaseConnection> {
        SolutionRepository::new(&self.conn)
    }

    pub fn notifications(&self) -> NotificationRepository<'_, DatabaseConnection> {
        NotificationRepository::new(&self.conn)
    }

    pub fn timers(&self) -> TimerRepository<'_, DatabaseConnection> {
        TimerRepository::new(&self.conn)
    }

    pub fn user_actions(&self) -> UserActionRepository<'_, DatabaseConnection> {
        UserActionRepository::new(&self.conn)
    }

    pub fn webhooks(&self) -> WebhookRepository<'_, DatabaseConnection> {
        WebhookRepository::new(&self.conn)
    }

    pub fn locks(&self) -> LockRepository<'_, DatabaseConnection> {
        LockRepository::new(&self.conn)
    }

    pub fn reports(&self) -> ReportRepository<'_, DatabaseConnection> {
        ReportRepository::new(&self.conn)
    }

    pub async fn get_user(&self, id: i32) -> Result<Option<User>> {
        self.users().get_by_id(id).await
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.users().get_by_username(username).await
    }

    pub async fn get_user_by_api_key(&self, api_key: &str) -> Result<Option<User>> {
        self.users().get_by_api_key(api_key).await
    }

    pub async fn create_user(&self, input: &NewUser) -> Result<(User, String)> {
        self.users().create(input).await
    }

    pub async fn get_category(&self, id: i32) -> Result<Option<Category>> {
        self.categories().get(id).await
    }

    pub async fn create_category(&self, input: &NewCategory) -> Result<Category> {
        self.categories().create(input).await
    }

    pub async fn get_topic(&self, id: i32) -> Result<Option<Topic>> {
        self.topics().get(id).await
    }

    pub async fn get_topic_with_deleted(&self, id: i32) -> Result<Option<Topic>> {
        self.topics().get_with_deleted(id).await
    }

    pub async fn create_topic(&self, input: &NewTopic) -> Result<Topic> {
        self.topics().create(input).await
    }

    pub async fn get_post(&self, id: i32) -> Result<Option<Post>> {
        self.posts().get(id).await
    }

    pub async fn create_post(
        &self,
        topic_id: i32,
        user_id: i32,
        post_type: PostType,
        cooked: &str,
    ) -> Result<Post> {
        self.posts().create(topic_id, user_id, post_type, cooked).await
    }

    pub async fn get_solution(&self, topic_id: i32) -> Result<Option<Solution>> {
        self.solutions().find_by_topic(topic_id).await
    }

    pub async fn notifications_for_user(&self, user_id: i32) -> Result<Vec<notifications::Model>> {
        self.notifications().for_user(user_id).await
    }

    pub async fn timer_for_topic(&self, topic_id: i32) -> Result<Option<topic_timers::Model>> {
        self.timers().for_topic(topic_id).await
    }

    pub async fn create_webhook(
        &self,
        payload_url: &str,
        event_types: &[&str],
        wildcard: bool,
    ) -> Result<web_hooks::Model> {
        self.webhooks()
            .create(payload_url, event_types, wildcard)
            .await
    }

    pub async fn pending_webhook_events(&self) -> Result<Vec<web_hook_events::Model>> {
        self.webhooks().pending_events().await
    }
}
