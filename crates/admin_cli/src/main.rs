use std::error::Error;

use clap::{Args, Parser, Subcommand, ValueEnum};
use engine::{Contribution, Engine};
use migration::MigratorTrait;
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, EntityTrait, IntoActiveModel, Set};

mod prompt;

mod users {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "users")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub username: String,
        pub password: String,
        pub is_superuser: bool,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

#[derive(Parser, Debug)]
#[command(name = "charity_admin")]
#[command(about = "Admin utilities for the charity fund (users, manual settlement)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./charity_fund.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    /// Match an open project or donation against the oldest open records of
    /// the other kind.
    Settle(SettleArgs),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    /// Create a user, prompting for the password.
    Create(UserCreateArgs),
    /// Grant superuser privileges to an existing user.
    Promote(UserPromoteArgs),
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    username: String,
    #[arg(long)]
    superuser: bool,
}

#[derive(Args, Debug)]
struct UserPromoteArgs {
    #[arg(long)]
    username: String,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Record {
    Project,
    Donation,
}

#[derive(Args, Debug)]
struct SettleArgs {
    #[arg(value_enum)]
    record: Record,
    #[arg(long)]
    id: i32,
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

async fn create_user(
    db: &DatabaseConnection,
    args: UserCreateArgs,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let username = args.username.trim().to_string();
    if username.is_empty() {
        return Err("username must not be empty".into());
    }
    if users::Entity::find_by_id(username.clone())
        .one(db)
        .await?
        .is_some()
    {
        return Err(format!("user already exists: {username}").into());
    }

    let password = prompt::new_password()?;
    users::Entity::insert(users::ActiveModel {
        username: Set(username.clone()),
        password: Set(password),
        is_superuser: Set(args.superuser),
    })
    .exec(db)
    .await?;

    let role = if args.superuser { "superuser" } else { "user" };
    println!("created {role}: {username}");
    Ok(())
}

async fn promote_user(
    db: &DatabaseConnection,
    args: UserPromoteArgs,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let Some(user) = users::Entity::find_by_id(args.username.clone())
        .one(db)
        .await?
    else {
        return Err(format!("user not found: {}", args.username).into());
    };
    if user.is_superuser {
        println!("{} is already a superuser", user.username);
        return Ok(());
    }

    let mut user = user.into_active_model();
    user.is_superuser = Set(true);
    user.update(db).await?;

    println!("promoted to superuser: {}", args.username);
    Ok(())
}

async fn settle(
    db: &DatabaseConnection,
    args: SettleArgs,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let record = match args.record {
        Record::Project => Contribution::project(args.id),
        Record::Donation => Contribution::donation(args.id),
    };

    let engine = Engine::builder().database(db.clone()).build().await?;
    let funding = engine.settle(record).await?;
    println!(
        "{} {}: {}/{} invested{}",
        record.side.label(),
        record.id,
        funding.invested_amount,
        funding.full_amount,
        if funding.fully_invested { ", closed" } else { "" }
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;

    let outcome = match cli.command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => create_user(&db, args).await,
        Command::User(User {
            command: UserCommand::Promote(args),
        }) => promote_user(&db, args).await,
        Command::Settle(args) => settle(&db, args).await,
    };

    if let Err(err) = outcome {
        eprintln!("{err}");
        std::process::exit(1);
    }

    Ok(())
}
