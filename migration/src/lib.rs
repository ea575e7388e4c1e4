pub use sea_orm_migration::prelude::*;

mod m20250915_000001_create_movies_and_reviews;
mod m20250922_000001_add_catalog_columns;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250915_000001_create_movies_and_reviews::Migration),
            Box::new(m20250922_000001_add_catalog_columns::Migration),
        ]
    }
}
