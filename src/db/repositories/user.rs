use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QuerySelect, Set,
};

use crate::db::now_timestamp;
use crate::domain::TrustLevel;
use crate::entities::{groups_users, users};
use crate::models::user::User;

/// Input for creating a user account.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub username: String,
    pub name: Option<String>,
    pub trust_level: TrustLevel,
    pub admin: bool,
    pub moderator: bool,
}

pub struct UserRepository<'c, C> {
    conn: &'c C,
}

impl<'c, C: ConnectionTrait> UserRepository<'c, C> {
    #[must_use]
    pub const fn new(conn: &'c C) -> Self {
        Self { conn }
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<User>> {
        let user = users::Entity::find_by_id(id)
            .one(self.conn)
            .await
            .context("Failed to query user by ID")?;

        Ok(user.map(User::from))
    }

    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(self.conn)
            .await
            .context("Failed to query user by username")?;

        Ok(user.map(User::from))
    }

    /// Resolves an API key to an active user.
    pub async fn get_by_api_key(&self, api_key: &str) -> Result<Option<User>> {
        let user = users::Entity::find()
            .filter(users::Column::ApiKey.eq(api_key))
            .filter(users::Column::Active.eq(true))
            .one(self.conn)
            .await
            .context("Failed to query user by API key")?;

        Ok(user.map(User::from))
    }

    /// Creates a user and returns it together with its generated API key.
    pub async fn create(&self, input: &NewUser) -> Result<(User, String)> {
        let api_key = generate_api_key();

        let model = users::ActiveModel {
            username: Set(input.username.clone()),
            name: Set(input.name.clone()),
            trust_level: Set(i32::from(input.trust_level)),
            admin: Set(input.admin),
            moderator: Set(input.moderator),
            active: Set(true),
            api_key: Set(api_key.clone()),
            created_at: Set(now_timestamp()),
            ..Default::default()
        }
        .insert(self.conn)
        .await
        .with_context(|| format!("Failed to create user {}", input.username))?;

        Ok((User::from(model), api_key))
    }

    pub async fn add_to_group(&self, group_id: i32, user_id: i32) -> Result<()> {
        groups_users::Entity::insert(groups_users::ActiveModel {
            group_id: Set(group_id),
            user_id: Set(user_id),
        })
        .on_conflict(
            sea_orm::sea_query::OnConflict::columns([
                groups_users::Column::GroupId,
                groups_users::Column::UserId,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(self.conn)
        .await?;

        Ok(())
    }

    pub async fn group_ids(&self, user_id: i32) -> Result<Vec<i32>> {
        let ids = groups_users::Entity::find()
            .select_only()
            .column(groups_users::Column::GroupId)
            .filter(groups_users::Column::UserId.eq(user_id))
            .into_tuple::<i32>()
            .all(self.conn)
            .await?;

        Ok(ids)
    }

    pub async fn is_group_member(&self, user_id: i32, group_id: i32) -> Result<bool> {
        let count = groups_users::Entity::find()
            .filter(groups_users::Column::UserId.eq(user_id))
            .filter(groups_users::Column::GroupId.eq(group_id))
            .count(self.conn)
            .await?;

        Ok(count > 0)
    }
}

/// Random API key (64-char hex string)
fn generate_api_key() -> String {
    let bytes: [u8; 32] = rand::random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_keys_are_hex_and_unique() {
        let a = generate_api_key();
        let b = generate_api_key();
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }
}
