use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Commentaries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Commentaries::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Commentaries::BookId).integer().null())
                    .col(ColumnDef::new(Commentaries::ParentId).integer().null())
                    .col(ColumnDef::new(Commentaries::UserId).integer().not_null())
                    .col(ColumnDef::new(Commentaries::Content).text().not_null())
                    .col(
                        ColumnDef::new(Commentaries::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    // A reply belongs to its parent; a top-level comment to its book.
                    .check(
                        Expr::col(Commentaries::BookId)
                            .is_not_null()
                            .or(Expr::col(Commentaries::ParentId).is_not_null()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Commentaries::Table, Commentaries::BookId)
                            .to(Books::Table, Books::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Commentaries::Table, Commentaries::ParentId)
                            .to(Commentaries::Table, Commentaries::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Commentaries::Table, Commentaries::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Commentaries::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Commentaries {
    Table,
    Id,
    BookId,
    ParentId,
    UserId,
    Content,
    CreatedAt,
}

#[derive(Iden)]
enum Books {
    Table,
    Id,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
