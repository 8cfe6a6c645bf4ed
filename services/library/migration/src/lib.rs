use sea_orm_migration::prelude::*;

mod m20261016_000001_create_users;
mod m20261016_000002_create_genres;
mod m20261016_000003_create_authors;
mod m20261016_000004_create_books;
mod m20261016_000005_create_book_genres;
mod m20261016_000006_create_book_authors;
mod m20261016_000007_create_chapters;
mod m20261016_000008_create_commentaries;
mod m20261016_000009_create_book_views;
mod m20261016_000010_create_book_likes;
mod m20261016_000011_create_book_month_views;
mod m20261016_000012_create_user_library;
mod m20261016_000013_add_attachment_columns;
mod m20261016_000014_add_lookup_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261016_000001_create_users::Migration),
            Box::new(m20261016_000002_create_genres::Migration),
            Box::new(m20261016_000003_create_authors::Migration),
            Box::new(m20261016_000004_create_books::Migration),
            Box::new(m20261016_000005_create_book_genres::Migration),
            Box::new(m20261016_000006_create_book_authors::Migration),
            Box::new(m20261016_000007_create_chapters::Migration),
            Box::new(m20261016_000008_create_commentaries::Migration),
            Box::new(m20261016_000009_create_book_views::Migration),
            Box::new(m20261016_000010_create_book_likes::Migration),
            Box::new(m20261016_000011_create_book_month_views::Migration),
            Box::new(m20261016_000012_create_user_library::Migration),
            Box::new(m20261016_000013_add_attachment_columns::Migration),
            Box::new(m20261016_000014_add_lookup_indexes::Migration),
        ]
    }
}
