use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .table(Chapters::Table)
                    .col(Chapters::BookId)
                    .col(Chapters::SerialNumber)
                    .name("idx_chapters_book_id_serial_number")
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(Commentaries::Table)
                    .col(Commentaries::BookId)
                    .name("idx_commentaries_book_id")
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(Commentaries::Table)
                    .col(Commentaries::ParentId)
                    .name("idx_commentaries_parent_id")
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(BookMonthViews::Table)
                    .col(BookMonthViews::Month)
                    .col(BookMonthViews::BookId)
                    .name("idx_book_month_views_month_book_id")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for name in [
            "idx_book_month_views_month_book_id",
            "idx_commentaries_parent_id",
            "idx_commentaries_book_id",
            "idx_chapters_book_id_serial_number",
        ] {
            manager
                .drop_index(Index::drop().name(name).to_owned())
                .await?;
        }
        Ok(())
    }
}

#[derive(Iden)]
enum Chapters {
    Table,
    BookId,
    SerialNumber,
}

#[derive(Iden)]
enum Commentaries {
    Table,
    BookId,
    ParentId,
}

#[derive(Iden)]
enum BookMonthViews {
    Table,
    Month,
    BookId,
}
