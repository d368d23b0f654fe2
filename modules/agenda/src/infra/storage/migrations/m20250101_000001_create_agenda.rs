use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Hobbies::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Hobbies::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Hobbies::Hobby).string_len(50).not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Persons::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Persons::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Persons::FullName).string_len(50).not_null())
                    .col(ColumnDef::new(Persons::Job).string_len(50).not_null())
                    .col(ColumnDef::new(Persons::Email).string_len(254).not_null())
                    .col(ColumnDef::new(Persons::Phone).string_len(15).not_null())
                    .col(
                        ColumnDef::new(Persons::Created)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PersonsHobbies::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PersonsHobbies::PersonId).integer().not_null())
                    .col(ColumnDef::new(PersonsHobbies::HobbyId).integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(PersonsHobbies::PersonId)
                            .col(PersonsHobbies::HobbyId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_persons_hobbies_person")
                            .from(PersonsHobbies::Table, PersonsHobbies::PersonId)
                            .to(Persons::Table, Persons::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_persons_hobbies_hobby")
                            .from(PersonsHobbies::Table, PersonsHobbies::HobbyId)
                            .to(Hobbies::Table, Hobbies::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Reuniones::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Reuniones::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Reuniones::Fecha).date().not_null())
                    .col(ColumnDef::new(Reuniones::Hora).time().not_null())
                    .col(ColumnDef::new(Reuniones::Asunto).string_len(100).not_null())
                    .col(ColumnDef::new(Reuniones::PersonaId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reuniones_persona")
                            .from(Reuniones::Table, Reuniones::PersonaId)
                            .to(Persons::Table, Persons::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_reuniones_persona_id")
                    .table(Reuniones::Table)
                    .col(Reuniones::PersonaId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Reuniones::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PersonsHobbies::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Persons::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Hobbies::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Hobbies {
    Table,
    Id,
    Hobby,
}

#[derive(DeriveIden)]
enum Persons {
    Table,
    Id,
    FullName,
    Job,
    Email,
    Phone,
    Created,
}

#[derive(DeriveIden)]
enum PersonsHobbies {
    Table,
    PersonId,
    HobbyId,
}

#[derive(DeriveIden)]
enum Reuniones {
    Table,
    Id,
    Fecha,
    Hora,
    Asunto,
    PersonaId,
}
