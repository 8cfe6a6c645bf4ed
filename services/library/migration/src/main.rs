use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    cli::run_cli(libris_library_migration::Migrator).await;
}
