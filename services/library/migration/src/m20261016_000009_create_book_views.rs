use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BookViews::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(BookViews::UserId).integer().not_null())
                    .col(ColumnDef::new(BookViews::BookId).integer().not_null())
                    .col(
                        ColumnDef::new(BookViews::ViewedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .primary_key(Index::create().col(BookViews::UserId).col(BookViews::BookId))
                    .foreign_key(
                        ForeignKey::create()
                            .from(BookViews::Table, BookViews::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(BookViews::Table, BookViews::BookId)
                            .to(Books::Table, Books::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BookViews::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum BookViews {
    Table,
    UserId,
    BookId,
    ViewedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}

#[derive(Iden)]
enum Books {
    Table,
    Id,
}
