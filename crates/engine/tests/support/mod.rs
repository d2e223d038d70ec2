use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::Engine;
use migration::MigratorTrait;

pub async fn seed_users(db: &DatabaseConnection, usernames: &[&str]) {
    let backend = db.get_database_backend();
    for username in usernames {
        db.execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO users (username, password, is_superuser) VALUES (?, ?, ?)",
            vec![(*username).into(), "password".into(), false.into()],
        ))
        .await
        .unwrap();
    }
}

#[allow(dead_code)]
pub async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    seed_users(&db, &["alice", "bob"]).await;
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

/// Total invested across projects must equal total invested across
/// donations, and no record may exceed its capacity.
#[allow(dead_code)]
pub async fn assert_ledgers_balanced(engine: &Engine) {
    let projects = engine.projects().await.unwrap();
    let donations = engine.donations().await.unwrap();

    let fundings = projects
        .iter()
        .map(|p| &p.funding)
        .chain(donations.iter().map(|d| &d.funding));
    for funding in fundings {
        assert!(funding.invested_amount >= 0);
        assert!(funding.invested_amount <= funding.full_amount);
        assert_eq!(
            funding.fully_invested,
            funding.invested_amount == funding.full_amount
        );
        assert_eq!(funding.fully_invested, funding.close_date.is_some());
    }

    let projects_total: i64 = projects.iter().map(|p| p.funding.invested_amount).sum();
    let donations_total: i64 = donations.iter().map(|d| d.funding.invested_amount).sum();
    assert_eq!(projects_total, donations_total);
}
