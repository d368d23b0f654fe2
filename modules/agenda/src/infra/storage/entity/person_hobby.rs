use sea_orm::entity::prelude::*;

/// Join row between a person and one of their hobbies.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "persons_hobbies")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub person_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub hobby_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::person::Entity",
        from = "Column::PersonId",
        to = "super::person::Column::Id",
        on_delete = "Cascade"
    )]
    Person,
    #[sea_orm(
        belongs_to = "super::hobby::Entity",
        from = "Column::HobbyId",
        to = "super::hobby::Column::Id",
        on_delete = "Cascade"
    )]
    Hobby,
}

impl Related<super::person::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Person.def()
    }
}

impl Related<super::hobby::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Hobby.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
