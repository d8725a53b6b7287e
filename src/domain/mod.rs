//! Domain types for accepted answers with strong typing.
//!
//! Small enums and newtypes shared by the store, the services and the API. Values that
//! are persisted as text provide `as_str`/`from_db` pairs; unknown stored values fall back
//! to the default variant instead of failing the whole read.

pub mod events;

use serde::{Deserialize, Serialize};
use std::fmt;

/// A user's trust level, 0 (new) to 4 (leader).
///
/// # Examples
///
/// ```rust
/// use solved::domain::TrustLevel;
///
/// let level = TrustLevel::new(3);
/// assert!(level >= TrustLevel::new(2));
/// assert_eq!(level.to_string(), "3");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TrustLevel(u8);

impl TrustLevel {
    pub const MAX: Self = Self(4);

    /// Creates a trust level, clamping values above 4.
    #[must_use]
    pub const fn new(level: u8) -> Self {
        if level > 4 { Self(4) } else { Self(level) }
    }

    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for TrustLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for TrustLevel {
    fn from(level: i32) -> Self {
        Self::new(u8::try_from(level.clamp(0, 4)).unwrap_or(0))
    }
}

impl From<TrustLevel> for i32 {
    fn from(level: TrustLevel) -> Self {
        Self::from(level.0)
    }
}

impl Serialize for TrustLevel {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u8(self.0)
    }
}

impl<'de> Deserialize<'de> for TrustLevel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let level = u8::deserialize(deserializer)?;
        Ok(Self::new(level))
    }
}

/// Kind of topic. Private messages never take part in solved/unsolved listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    #[default]
    Regular,
    PrivateMessage,
}

impl Archetype {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::PrivateMessage => "private_message",
        }
    }

    #[must_use]
    pub fn from_db(value: &str) -> Self {
        match value {
            "private_message" => Self::PrivateMessage,
            _ => Self::Regular,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostType {
    #[default]
    Regular,
    Whisper,
    ModeratorAction,
    SmallAction,
}

impl PostType {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::Whisper => "whisper",
            Self::ModeratorAction => "moderator_action",
            Self::SmallAction => "small_action",
        }
    }

    #[must_use]
    pub fn from_db(value: &str) -> Self {
        match value {
            "whisper" => Self::Whisper,
            "moderator_action" => Self::ModeratorAction,
            "small_action" => Self::SmallAction,
            _ => Self::Regular,
        }
    }
}

/// How an auto-close timer closes its topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerKind {
    /// Close without bumping the topic or announcing it.
    #[default]
    SilentClose,
    Close,
}

impl TimerKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SilentClose => "silent_close",
            Self::Close => "close",
        }
    }

    #[must_use]
    pub fn from_db(value: &str) -> Self {
        match value {
            "close" => Self::Close,
            _ => Self::SilentClose,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Custom,
    UnresolvedReminder,
}

impl NotificationKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Custom => "custom",
            Self::UnresolvedReminder => "unresolved_reminder",
        }
    }
}

/// Action types recorded in the user action log.
pub mod user_action {
    pub const SOLVED: i32 = 15;
}

/// Status filter understood by topic lists and search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolvedFilter {
    Solved,
    Unsolved,
}

impl SolvedFilter {
    /// Parses the `solved=yes|no` topic list parameter.
    #[must_use]
    pub fn from_list_param(value: &str) -> Option<Self> {
        match value {
            "yes" => Some(Self::Solved),
            "no" => Some(Self::Unsolved),
            _ => None,
        }
    }
}

/// Observable state of a topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SolvedStatus {
    Unsolved,
    Solved { answer_post_id: i32 },
}

impl SolvedStatus {
    #[must_use]
    pub const fn is_solved(&self) -> bool {
        matches!(self, Self::Solved { .. })
    }

    #[must_use]
    pub const fn answer_post_id(&self) -> Option<i32> {
        match self {
            Self::Solved { answer_post_id } => Some(*answer_post_id),
            Self::Unsolved => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trust_level_clamps() {
        assert_eq!(TrustLevel::new(9), TrustLevel::MAX);
        assert_eq!(TrustLevel::from(-3), TrustLevel::new(0));
        assert_eq!(i32::from(TrustLevel::new(2)), 2);
    }

    #[test]
    fn stored_values_round_trip_with_fallback() {
        assert_eq!(Archetype::from_db("private_message"), Archetype::PrivateMessage);
        assert_eq!(Archetype::from_db("banner"), Archetype::Regular);
        assert_eq!(PostType::from_db(PostType::Whisper.as_str()), PostType::Whisper);
        assert_eq!(TimerKind::from_db("close"), TimerKind::Close);
        assert_eq!(TimerKind::from_db("reminder"), TimerKind::SilentClose);
    }

    #[test]
    fn list_param_parsing() {
        assert_eq!(SolvedFilter::from_list_param("yes"), Some(SolvedFilter::Solved));
        assert_eq!(SolvedFilter::from_list_param("no"), Some(SolvedFilter::Unsolved));
        assert_eq!(SolvedFilter::from_list_param("maybe"), None);
    }
}
