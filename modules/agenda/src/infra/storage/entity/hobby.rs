use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "hobbies")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub hobby: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::person_hobby::Entity")]
    PersonHobby,
}

impl Related<super::person_hobby::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PersonHobby.def()
    }
}

impl Related<super::person::Entity> for Entity {
    fn to() -> RelationDef {
        super::person_hobby::Relation::Person.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::person_hobby::Relation::Hobby.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
