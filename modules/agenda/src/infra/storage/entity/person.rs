use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "persons")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub full_name: String,
    pub job: String,
    pub email: String,
    pub phone: String,
    pub created: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::person_hobby::Entity")]
    PersonHobby,
    #[sea_orm(has_many = "super::reunion::Entity")]
    Reunion,
}

impl Related<super::person_hobby::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PersonHobby.def()
    }
}

impl Related<super::reunion::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reunion.def()
    }
}

impl Related<super::hobby::Entity> for Entity {
    fn to() -> RelationDef {
        super::person_hobby::Relation::Hobby.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::person_hobby::Relation::Person.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
