//! "Solved" and "unsolved" predicates over the `topics` table.
//!
//! The builders return plain [`Condition`]s so they compose with whatever a caller has
//! already put on its query. [`QueryFilters`] resolves the inputs the unsolved predicate
//! needs (enabled categories and tags) and hands them to the pure builders.

use anyhow::Result;
use regex::Regex;
use sea_orm::sea_query::{Condition, Expr, Query, SelectStatement};
use sea_orm::DatabaseConnection;
use std::sync::{Arc, OnceLock};

use crate::config::SolvedConfig;
use crate::db::TopicRepository;
use crate::domain::{Archetype, SolvedFilter};
use crate::entities::{posts, solved_topics, topic_tags, topics};
use crate::services::allowlist_cache::CategoryAllowlistCache;

fn status_term() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(?:^|\s)status:(solved|unsolved)(?:\s|$)").expect("Invalid regex")
    })
}

/// Topic ids with a solution whose answer post still exists.
fn solved_topic_ids() -> SelectStatement {
    Query::select()
        .column((solved_topics::Entity, solved_topics::Column::TopicId))
        .from(solved_topics::Entity)
        .inner_join(
            posts::Entity,
            Expr::col((posts::Entity, posts::Column::Id))
                .equals((solved_topics::Entity, solved_topics::Column::AnswerPostId)),
        )
        .and_where(Expr::col((posts::Entity, posts::Column::DeletedAt)).is_null())
        .to_owned()
}

fn not_private_message() -> Condition {
    Condition::all().add(
        Expr::col((topics::Entity, topics::Column::Archetype))
            .ne(Archetype::PrivateMessage.as_str()),
    )
}

/// Topics that currently have an accepted answer.
#[must_use]
pub fn solved_condition() -> Condition {
    Condition::all()
        .add(Expr::col((topics::Entity, topics::Column::Id)).in_subquery(solved_topic_ids()))
        .add(not_private_message())
}

/// Topics without an accepted answer, regardless of whether the feature is enabled.
#[must_use]
pub fn exclude_solved_condition() -> Condition {
    Condition::all()
        .add(Expr::col((topics::Entity, topics::Column::Id)).not_in_subquery(solved_topic_ids()))
}

/// Unsolved topics where accepting an answer is possible at all.
#[must_use]
pub fn unsolved_condition(
    allow_all: bool,
    enabled_category_ids: &[i32],
    enabled_tag_ids: &[i32],
) -> Condition {
    let mut condition = exclude_solved_condition().add(not_private_message());

    if !allow_all {
        let mut enabled = Condition::any().add(
            Expr::col((topics::Entity, topics::Column::CategoryId))
                .is_in(enabled_category_ids.iter().copied()),
        );

        if !enabled_tag_ids.is_empty() {
            enabled = enabled.add(
                Expr::col((topics::Entity, topics::Column::Id)).in_subquery(
                    Query::select()
                        .column((topic_tags::Entity, topic_tags::Column::TopicId))
                        .from(topic_tags::Entity)
                        .and_where(
                            Expr::col((topic_tags::Entity, topic_tags::Column::TagId))
                                .is_in(enabled_tag_ids.iter().copied()),
                        )
                        .to_owned(),
                ),
            );
        }

        condition = condition.add(enabled);
    }

    condition
}

/// Extracts a `status:solved` / `status:unsolved` search term, returning the filter and
/// the remaining search text.
#[must_use]
pub fn parse_search_status(query: &str) -> (Option<SolvedFilter>, String) {
    let Some(captures) = status_term().captures(query) else {
        return (None, query.trim().to_string());
    };

    let filter = match captures[1].to_ascii_lowercase().as_str() {
        "solved" => SolvedFilter::Solved,
        _ => SolvedFilter::Unsolved,
    };
    let rest = status_term().replace_all(query, " ");

    (
        Some(filter),
        rest.split_whitespace().collect::<Vec<_>>().join(" "),
    )
}

pub struct QueryFilters {
    conn: DatabaseConnection,
    allowlist: Arc<CategoryAllowlistCache>,
}

impl QueryFilters {
    #[must_use]
    pub const fn new(conn: DatabaseConnection, allowlist: Arc<CategoryAllowlistCache>) -> Self {
        Self { conn, allowlist }
    }

    pub async fn condition_for(
        &self,
        config: &SolvedConfig,
        filter: SolvedFilter,
    ) -> Result<Condition> {
        match filter {
            SolvedFilter::Solved => Ok(solved_condition()),
            SolvedFilter::Unsolved => self.unsolved(config).await,
        }
    }

    pub async fn unsolved(&self, config: &SolvedConfig) -> Result<Condition> {
        if config.allow_solved_on_all_topics {
            return Ok(unsolved_condition(true, &[], &[]));
        }

        let mut category_ids: Vec<i32> =
            self.allowlist.enabled_ids().await?.iter().copied().collect();
        category_ids.sort_unstable();

        let tag_ids = TopicRepository::new(&self.conn)
            .tag_ids_for_names(&config.enable_solved_tags)
            .await?;

        Ok(unsolved_condition(false, &category_ids, &tag_ids))
    }
}
