use sea_orm_migration::prelude::*;

mod m20260301_create_host_tables;
mod m20260302_create_solved_topics;
mod m20260303_seed_system_user;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_create_host_tables::Migration),
            Box::new(m20260302_create_solved_topics::Migration),
            Box::new(m20260303_seed_system_user::Migration),
        ]
    }
}
