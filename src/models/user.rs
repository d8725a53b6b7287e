use serde::Serialize;

use crate::domain::TrustLevel;
use crate::entities::users;

/// Forum user as seen by permission checks and the API (never exposes the API key).
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub name: Option<String>,
    pub trust_level: TrustLevel,
    pub admin: bool,
    pub moderator: bool,
    pub active: bool,
}

impl User {
    #[must_use]
    pub const fn is_staff(&self) -> bool {
        self.admin || self.moderator
    }

    /// System and bot accounts have non-positive ids.
    #[must_use]
    pub const fn is_human(&self) -> bool {
        self.id > 0
    }
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            name: model.name,
            trust_level: TrustLevel::from(model.trust_level),
            admin: model.admin,
            moderator: model.moderator,
            active: model.active,
        }
    }
}
