use sea_orm_migration::prelude::*;

mod m20250101_000001_create_todos;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20250101_000001_create_todos::Migration)]
    }

    // Each module tracks its own migrations so migrators sharing a database
    // do not see each other's history.
    fn migration_table_name() -> DynIden {
        Alias::new("todos_migrations").into_iden()
    }
}
