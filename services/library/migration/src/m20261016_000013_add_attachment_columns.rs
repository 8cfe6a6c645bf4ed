use sea_orm_migration::prelude::*;

/// Optional storage paths for uploaded media.
#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(Authors::Table)
                    .add_column(ColumnDef::new(Authors::Picture).string().null())
                    .to_owned(),
            )
            .await?;
        manager
            .alter_table(
                Table::alter()
                    .table(Books::Table)
                    .add_column(ColumnDef::new(Books::Image).string().null())
                    .to_owned(),
            )
            .await?;
        manager
            .alter_table(
                Table::alter()
                    .table(Chapters::Table)
                    .add_column(ColumnDef::new(Chapters::File).string().null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(Chapters::Table)
                    .drop_column(Chapters::File)
                    .to_owned(),
            )
            .await?;
        manager
            .alter_table(
                Table::alter()
                    .table(Books::Table)
                    .drop_column(Books::Image)
                    .to_owned(),
            )
            .await?;
        manager
            .alter_table(
                Table::alter()
                    .table(Authors::Table)
                    .drop_column(Authors::Picture)
                    .to_owned(),
            )
            .await
    }
}

#[derive(Iden)]
enum Authors {
    Table,
    Picture,
}

#[derive(Iden)]
enum Books {
    Table,
    Image,
}

#[derive(Iden)]
enum Chapters {
    Table,
    File,
}
