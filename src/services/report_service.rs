//! Read-side queries: the accepted solutions report, user summaries, solved post
//! listings and the accepted answer shown with a topic.

use anyhow::Result;
use chrono::{Duration, NaiveDate};
use serde::Serialize;
use thiserror::Error;

use crate::constants::limits::{DEFAULT_SOLVED_POSTS_LIMIT, MAX_SOLVED_POSTS_LIMIT};
use crate::db::{DailyCount, Store};
use crate::domain::{Archetype, TrustLevel};
use crate::models::post::Post;
use crate::models::solution::{AcceptedAnswerInfo, SolvedPost};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid parameters: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for ReportError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct ReportParams {
    pub start_date: NaiveDate,
    /// Inclusive.
    pub end_date: NaiveDate,
    pub category_id: Option<i32>,
    pub include_subcategories: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct AcceptedSolutionsReport {
    pub data: Vec<DailyCount>,
    /// All-time count for the selected categories.
    pub total: u64,
    /// Count in the 30 days before `start_date`.
    pub prev30_days: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserSolvedSummary {
    pub username: String,
    pub solved_count: u64,
}

/// Trust level bound of the first-accepted-solution check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrustLevelRequirement {
    Any,
    AtMost(TrustLevel),
}

impl TrustLevelRequirement {
    /// Parses `any` or a trust level number.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        if value.eq_ignore_ascii_case("any") {
            return Some(Self::Any);
        }
        value
            .parse::<u8>()
            .ok()
            .filter(|level| *level <= TrustLevel::MAX.value())
            .map(|level| Self::AtMost(TrustLevel::new(level)))
    }
}

pub struct ReportService {
    store: Store,
}

impl ReportService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn accepted_solutions(
        &self,
        params: &ReportParams,
    ) -> Result<AcceptedSolutionsReport, ReportError> {
        if params.end_date < params.start_date {
            return Err(ReportError::Validation(
                "end_date must not be before start_date".to_string(),
            ));
        }

        let end = params
            .end_date
            .checked_add_signed(Duration::days(1))
            .ok_or_else(|| ReportError::Validation("end_date is out of range".to_string()))?;
        let prev_start = params
            .start_date
            .checked_sub_signed(Duration::days(30))
            .ok_or_else(|| ReportError::Validation("start_date is out of range".to_string()))?;

        let category_ids = match params.category_id {
            Some(id) => {
                let mut ids = vec![id];
                if params.include_subcategories {
                    ids.extend(self.store.categories().subcategory_ids(id).await?);
                }
                Some(ids)
            }
            None => None,
        };
        let categories = category_ids.as_deref();

        let start = params.start_date.to_string();
        let end = end.to_string();
        let prev_start = prev_start.to_string();

        let reports = self.store.reports();
        let data = reports.accepted_per_day(&start, &end, categories).await?;
        let total = reports
            .accepted_between("0000-01-01", "9999-12-31", categories)
            .await?;
        let prev30_days = reports
            .accepted_between(&prev_start, &start, categories)
            .await?;

        Ok(AcceptedSolutionsReport {
            data,
            total,
            prev30_days,
        })
    }

    pub async fn user_summary(&self, username: &str) -> Result<UserSolvedSummary, ReportError> {
        let user = self
            .store
            .get_user_by_username(username)
            .await?
            .ok_or_else(|| ReportError::NotFound(format!("User {username}")))?;

        let solved_count = self.store.solutions().count_by_answer_author(user.id).await?;

        Ok(UserSolvedSummary {
            username: user.username,
            solved_count,
        })
    }

    /// The user's accepted answers, newest first. `limit` defaults to 30 and is capped
    /// at 100.
    pub async fn solved_posts(
        &self,
        username: &str,
        offset: u64,
        limit: Option<u64>,
        quote_length: usize,
    ) -> Result<Vec<SolvedPost>, ReportError> {
        let user = self
            .store
            .get_user_by_username(username)
            .await?
            .ok_or_else(|| ReportError::NotFound(format!("User {username}")))?;

        let limit = limit
            .unwrap_or(DEFAULT_SOLVED_POSTS_LIMIT)
            .clamp(1, MAX_SOLVED_POSTS_LIMIT);

        let rows = self
            .store
            .solutions()
            .solved_posts_by_user(user.id, offset, limit)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| SolvedPost {
                post_id: row.post_id,
                post_number: row.post_number,
                topic_id: row.topic_id,
                topic_title: row.topic_title,
                category_id: row.category_id,
                excerpt: excerpt(&row.cooked, quote_length.max(1)).unwrap_or_default(),
                accepted_at: row.accepted_at,
            })
            .collect())
    }

    /// The accepted answer summary shown at the top of a topic, if it has a live one.
    pub async fn accepted_answer(
        &self,
        topic_id: i32,
        quote_length: usize,
    ) -> Result<Option<AcceptedAnswerInfo>> {
        let Some(solution) = self.store.get_solution(topic_id).await? else {
            return Ok(None);
        };
        let Some(post) = self.store.posts().get_live(solution.answer_post_id).await? else {
            return Ok(None);
        };

        let author = self.store.get_user(post.user_id).await?;
        let accepter = match solution.accepter_user_id {
            Some(id) => self.store.get_user(id).await?,
            None => None,
        };

        Ok(Some(AcceptedAnswerInfo {
            post_number: post.post_number,
            username: author.as_ref().map(|u| u.username.clone()).unwrap_or_default(),
            name: author.and_then(|u| u.name),
            accepter_username: accepter.as_ref().map(|u| u.username.clone()),
            accepter_name: accepter.and_then(|u| u.name),
            excerpt: if quote_length == 0 {
                None
            } else {
                excerpt(&post.cooked, quote_length)
            },
        }))
    }

    /// Whether an accepted `post` is its author's first accepted solution, for
    /// automations that greet first-time solvers.
    pub async fn is_first_accepted_solution(
        &self,
        post: &Post,
        requirement: TrustLevelRequirement,
    ) -> Result<bool, ReportError> {
        let topic = self.store.get_topic_with_deleted(post.topic_id).await?;
        if topic.is_none_or(|t| t.archetype != Archetype::Regular) {
            return Ok(false);
        }

        let Some(author) = self.store.get_user(post.user_id).await? else {
            return Ok(false);
        };
        if !author.is_human() {
            return Ok(false);
        }

        if let TrustLevelRequirement::AtMost(level) = requirement {
            if author.trust_level > level {
                return Ok(false);
            }
        } else {
            return Ok(true);
        }

        // The acceptance being checked has already been logged.
        let solved = self.store.user_actions().count_solved_for_user(author.id).await?;
        Ok(solved <= 1)
    }
}

/// Plain-text excerpt of cooked HTML, at most `max_chars` characters plus an ellipsis.
fn excerpt(cooked: &str, max_chars: usize) -> Option<String> {
    let text = html2text::from_read(cooked.as_bytes(), 10_000).ok()?;
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");

    if text.chars().count() <= max_chars {
        return Some(text);
    }

    let mut cut: String = text.chars().take(max_chars).collect();
    cut.truncate(cut.trim_end().len());
    cut.push('…');
    Some(cut)
}
