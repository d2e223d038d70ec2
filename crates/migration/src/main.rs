use clap::{Parser, ValueEnum};
use sea_orm::Database;
use sea_orm_migration::prelude::*;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Action {
    Up,
    Down,
    Fresh,
    Status,
}

#[derive(Parser, Debug)]
#[command(name = "migration")]
#[command(about = "Apply or inspect the charity fund schema")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./charity_fund.db?mode=rwc"
    )]
    database_url: String,

    #[arg(value_enum, default_value_t = Action::Up)]
    action: Action,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();
    let db = Database::connect(&cli.database_url).await?;

    match cli.action {
        Action::Up => migration::Migrator::up(&db, None).await?,
        Action::Down => migration::Migrator::down(&db, None).await?,
        Action::Fresh => migration::Migrator::fresh(&db).await?,
        Action::Status => migration::Migrator::status(&db).await?,
    }

    Ok(())
}
