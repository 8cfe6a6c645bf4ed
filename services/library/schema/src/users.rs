use sea_orm::entity::prelude::*;

/// Account record. `password` holds an Argon2 PHC string.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub role: i16,
    pub is_active: bool,
    pub date_joined: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::commentaries::Entity")]
    Commentaries,
    #[sea_orm(has_many = "super::user_library::Entity")]
    UserLibrary,
}

impl Related<super::commentaries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Commentaries.def()
    }
}

impl Related<super::books::Entity> for Entity {
    fn to() -> RelationDef {
        super::user_library::Relation::Book.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::user_library::Relation::User.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
