use sea_orm::entity::prelude::*;

/// Catalog book. `image` is a storage path relative to the media root.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "books")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub pages: i32,
    #[sea_orm(column_type = "Text")]
    pub summary: String,
    pub image: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::chapters::Entity")]
    Chapters,
    #[sea_orm(has_many = "super::commentaries::Entity")]
    Commentaries,
    #[sea_orm(has_many = "super::book_genres::Entity")]
    BookGenres,
    #[sea_orm(has_many = "super::book_authors::Entity")]
    BookAuthors,
    #[sea_orm(has_many = "super::book_views::Entity")]
    BookViews,
    #[sea_orm(has_many = "super::book_likes::Entity")]
    BookLikes,
    #[sea_orm(has_many = "super::book_month_views::Entity")]
    BookMonthViews,
}

impl Related<super::chapters::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Chapters.def()
    }
}

impl Related<super::commentaries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Commentaries.def()
    }
}

impl Related<super::genres::Entity> for Entity {
    fn to() -> RelationDef {
        super::book_genres::Relation::Genre.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::book_genres::Relation::Book.def().rev())
    }
}

impl Related<super::authors::Entity> for Entity {
    fn to() -> RelationDef {
        super::book_authors::Relation::Author.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::book_authors::Relation::Book.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
