use crate::constants::SYSTEM_USER_ID;
use crate::entities::{prelude::*, users};
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let now = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);

        // The system account has no usable API key.
        let insert = sea_orm_migration::sea_query::Query::insert()
            .into_table(Users)
            .columns([
                users::Column::Id,
                users::Column::Username,
                users::Column::Name,
                users::Column::TrustLevel,
                users::Column::Admin,
                users::Column::Moderator,
                users::Column::Active,
                users::Column::ApiKey,
                users::Column::CreatedAt,
            ])
            .values_panic([
                SYSTEM_USER_ID.into(),
                "system".into(),
                "system".into(),
                4.into(),
                true.into(),
                true.into(),
                true.into(),
                format!("system-{}", uuid::Uuid::new_v4()).into(),
                now.into(),
            ])
            .on_conflict(OnConflict::column(users::Column::Id).do_nothing().to_owned())
            .to_owned();

        manager.exec_stmt(insert).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let delete = sea_orm_migration::sea_query::Query::delete()
            .from_table(Users)
            .and_where(Expr::col(users::Column::Id).eq(SYSTEM_USER_ID))
            .to_owned();

        manager.exec_stmt(delete).await?;

        Ok(())
    }
}
