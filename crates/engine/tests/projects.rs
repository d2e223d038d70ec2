use engine::{DonationNew, EngineError, ProjectNew, ProjectPatch};

mod support;

use support::engine_with_db;

fn roof(full_amount: i64) -> ProjectNew {
    ProjectNew {
        name: "Roof".to_string(),
        description: "Fix the shelter roof".to_string(),
        full_amount,
    }
}

#[tokio::test]
async fn duplicate_project_name_is_rejected() {
    let (engine, _db) = engine_with_db().await;
    engine.new_project(roof(100)).await.unwrap();

    let err = engine.new_project(roof(50)).await.unwrap_err();

    assert_eq!(err, EngineError::DuplicateName("Roof".to_string()));
    assert_eq!(engine.projects().await.unwrap().len(), 1);
}

#[tokio::test]
async fn duplicate_check_uses_normalized_name() {
    let (engine, _db) = engine_with_db().await;
    let mut cafe = roof(100);
    cafe.name = "Caf\u{e9}".to_string();
    engine.new_project(cafe.clone()).await.unwrap();

    cafe.name = "  Cafe\u{301}".to_string();
    let err = engine.new_project(cafe).await.unwrap_err();

    assert_eq!(err, EngineError::DuplicateName("Caf\u{e9}".to_string()));
    assert!(engine.project_by_name("Cafe\u{301}").await.unwrap().is_some());
}

#[tokio::test]
async fn invalid_project_input_is_rejected() {
    let (engine, _db) = engine_with_db().await;

    let mut blank = roof(100);
    blank.name = " ".to_string();
    assert!(matches!(
        engine.new_project(blank).await,
        Err(EngineError::InvalidInput(_))
    ));

    let mut no_description = roof(100);
    no_description.description = String::new();
    assert!(matches!(
        engine.new_project(no_description).await,
        Err(EngineError::InvalidInput(_))
    ));

    assert!(matches!(
        engine.new_project(roof(0)).await,
        Err(EngineError::InvalidInput(_))
    ));
    assert!(engine.projects().await.unwrap().is_empty());
}

#[tokio::test]
async fn deleting_invested_project_is_rejected() {
    let (engine, _db) = engine_with_db().await;
    engine
        .new_donation(
            "alice",
            DonationNew {
                full_amount: 5,
                comment: None,
            },
        )
        .await
        .unwrap();
    let created = engine.new_project(roof(100)).await.unwrap();
    assert_eq!(created.funding.invested_amount, 5);

    let err = engine.delete_project(created.id).await.unwrap_err();

    assert_eq!(err, EngineError::HasInvestment(created.id));
    assert!(engine.project(created.id).await.is_ok());
}

#[tokio::test]
async fn deleting_uninvested_project_returns_it() {
    let (engine, _db) = engine_with_db().await;
    let created = engine.new_project(roof(100)).await.unwrap();

    let removed = engine.delete_project(created.id).await.unwrap();

    assert_eq!(removed, created);
    assert_eq!(
        engine.project(created.id).await.unwrap_err(),
        EngineError::KeyNotFound(format!("charity_project {}", created.id))
    );
    // The name is free again.
    engine.new_project(roof(10)).await.unwrap();
}

#[tokio::test]
async fn deleting_unknown_project_is_not_found() {
    let (engine, _db) = engine_with_db().await;

    let err = engine.delete_project(9).await.unwrap_err();

    assert_eq!(err, EngineError::KeyNotFound("charity_project 9".to_string()));
}

#[tokio::test]
async fn full_amount_below_invested_is_rejected() {
    let (engine, _db) = engine_with_db().await;
    engine
        .new_donation(
            "alice",
            DonationNew {
                full_amount: 40,
                comment: None,
            },
        )
        .await
        .unwrap();
    let created = engine.new_project(roof(100)).await.unwrap();

    let err = engine
        .update_project(
            created.id,
            ProjectPatch {
                full_amount: Some(39),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

    assert_eq!(
        err,
        EngineError::AmountBelowInvested {
            full_amount: 39,
            invested_amount: 40,
        }
    );
    assert_eq!(engine.project(created.id).await.unwrap(), created);
}

#[tokio::test]
async fn full_amount_down_to_invested_closes_project() {
    let (engine, _db) = engine_with_db().await;
    engine
        .new_donation(
            "alice",
            DonationNew {
                full_amount: 40,
                comment: None,
            },
        )
        .await
        .unwrap();
    let created = engine.new_project(roof(100)).await.unwrap();

    let updated = engine
        .update_project(
            created.id,
            ProjectPatch {
                full_amount: Some(40),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert!(updated.funding.fully_invested);
    assert!(updated.funding.close_date.is_some());
    assert_eq!(engine.project(created.id).await.unwrap(), updated);
}

#[tokio::test]
async fn closed_project_rejects_any_patch() {
    let (engine, _db) = engine_with_db().await;
    engine
        .new_donation(
            "alice",
            DonationNew {
                full_amount: 100,
                comment: None,
            },
        )
        .await
        .unwrap();
    let created = engine.new_project(roof(100)).await.unwrap();
    assert!(created.funding.fully_invested);

    let err = engine
        .update_project(
            created.id,
            ProjectPatch {
                description: Some("Paint the roof".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

    assert_eq!(err, EngineError::ClosedProject(created.id));
}

#[tokio::test]
async fn rename_to_taken_name_is_rejected() {
    let (engine, _db) = engine_with_db().await;
    engine.new_project(roof(100)).await.unwrap();
    let mut food = roof(100);
    food.name = "Food".to_string();
    let food = engine.new_project(food).await.unwrap();

    let err = engine
        .update_project(
            food.id,
            ProjectPatch {
                name: Some("Roof".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

    assert_eq!(err, EngineError::DuplicateName("Roof".to_string()));
}

#[tokio::test]
async fn patch_keeps_absent_fields() {
    let (engine, _db) = engine_with_db().await;
    let created = engine.new_project(roof(100)).await.unwrap();

    let updated = engine
        .update_project(
            created.id,
            ProjectPatch {
                name: Some("Roof".to_string()),
                full_amount: Some(250),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.name, "Roof");
    assert_eq!(updated.description, created.description);
    assert_eq!(updated.funding.full_amount, 250);
    assert_eq!(updated.funding.create_date, created.funding.create_date);
    assert_eq!(updated.funding.invested_amount, 0);
}

#[tokio::test]
async fn projects_are_listed_oldest_first() {
    let (engine, _db) = engine_with_db().await;
    for name in ["Roof", "Food", "Vet"] {
        let mut input = roof(10);
        input.name = name.to_string();
        engine.new_project(input).await.unwrap();
    }

    let names: Vec<_> = engine
        .projects()
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect();

    assert_eq!(names, ["Roof", "Food", "Vet"]);
}

#[tokio::test]
async fn donations_are_listed_per_user() {
    let (engine, _db) = engine_with_db().await;
    for (user, amount) in [("alice", 10), ("bob", 20), ("alice", 30)] {
        engine
            .new_donation(
                user,
                DonationNew {
                    full_amount: amount,
                    comment: Some(format!(" from {user} ")),
                },
            )
            .await
            .unwrap();
    }

    let mine = engine.donations_by_user("alice").await.unwrap();

    assert_eq!(mine.len(), 2);
    assert_eq!(mine[0].funding.full_amount, 10);
    assert_eq!(mine[1].funding.full_amount, 30);
    assert_eq!(mine[0].comment.as_deref(), Some("from alice"));
    assert_eq!(engine.donations().await.unwrap().len(), 3);
}

#[tokio::test]
async fn invalid_donation_is_rejected() {
    let (engine, _db) = engine_with_db().await;

    let err = engine
        .new_donation(
            "alice",
            DonationNew {
                full_amount: -1,
                comment: None,
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::InvalidInput(_)));
    assert!(engine.donations().await.unwrap().is_empty());
}
