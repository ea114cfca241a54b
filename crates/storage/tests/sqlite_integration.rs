use chrono::Duration;
use coach_core::model::{
    CoachDraft, CoachId, CoachPatch, Equipment, SessionDraft, SessionId, SessionPatch,
    SessionType,
};
use coach_core::time::fixed_now;
use storage::repository::{
    CoachRepository, HealthRepository, NewCoachRecord, NewSessionRecord, SessionRepository,
    StorageError,
};
use storage::sqlite::SqliteRepository;

async fn repo(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:memdb_{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

fn coach(name: &str) -> NewCoachRecord {
    NewCoachRecord::new(CoachDraft::named(name).validate().unwrap(), fixed_now())
}

fn session(coach_id: CoachId, date: &str, equipment: &str, kind: &str, hours: f64) -> NewSessionRecord {
    let draft = SessionDraft {
        date: date.to_string(),
        equipment: equipment.to_string(),
        session_type: kind.to_string(),
        hours,
        notes: Some("  studio A ".to_string()),
    };
    NewSessionRecord::new(
        coach_id,
        draft.validate(fixed_now().date_naive()).unwrap(),
        fixed_now(),
    )
}

#[tokio::test]
async fn sqlite_coach_lifecycle() {
    let repo = repo("coach_lifecycle").await;

    let ada = repo
        .insert_coach(NewCoachRecord::new(
            CoachDraft {
                name: "Ada".into(),
                email: Some("Ada@Example.com".into()),
                phone: None,
            }
            .validate()
            .unwrap(),
            fixed_now(),
        ))
        .await
        .unwrap();
    repo.insert_coach(coach("Zoe")).await.unwrap();
    repo.insert_coach(coach("Bea")).await.unwrap();

    let fetched = repo.get_coach(ada.id()).await.unwrap().unwrap();
    assert_eq!(fetched, ada);
    assert_eq!(fetched.email(), Some("ada@example.com"));

    let names: Vec<String> = repo
        .list_active_coaches()
        .await
        .unwrap()
        .iter()
        .map(|c| c.name().to_string())
        .collect();
    assert_eq!(names, ["Ada", "Bea", "Zoe"]);

    let renamed = ada
        .apply_patch(
            CoachPatch {
                name: Some("Bea".into()),
                ..CoachPatch::default()
            },
            fixed_now() + Duration::minutes(1),
        )
        .unwrap();
    assert!(matches!(
        repo.update_coach(&renamed).await,
        Err(StorageError::Conflict)
    ));

    repo.deactivate_coach(ada.id(), fixed_now()).await.unwrap();
    assert!(repo.get_coach(ada.id()).await.unwrap().is_none());
    assert!(matches!(
        repo.update_coach(&ada).await,
        Err(StorageError::NotFound)
    ));

    // The name of a deleted coach is free again.
    let second = repo.insert_coach(coach("Ada")).await.unwrap();
    assert_ne!(second.id(), ada.id());
}

#[tokio::test]
async fn sqlite_duplicate_name_conflicts() {
    let repo = repo("duplicate_name").await;
    repo.insert_coach(coach("Ada")).await.unwrap();
    let err = repo.insert_coach(coach("Ada")).await.unwrap_err();
    assert!(matches!(err, StorageError::Conflict));
}

#[tokio::test]
async fn sqlite_session_for_missing_coach_is_not_persisted() {
    let repo = repo("missing_coach").await;
    let err = repo
        .insert_session(session(CoachId::new(42), "2023-11-01", "mat", "practice", 1.0))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::NotFound));

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sessions")
        .fetch_one(repo.pool())
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn sqlite_sessions_roundtrip_and_order() {
    let repo = repo("sessions_order").await;
    let ada = repo.insert_coach(coach("Ada")).await.unwrap();

    let older = repo
        .insert_session(session(ada.id(), "2023-10-01", "reformer", "practice", 2.0))
        .await
        .unwrap();
    let newer = repo
        .insert_session(session(ada.id(), "2023-11-10", "mat", "observation", 0.5))
        .await
        .unwrap();

    let fetched = repo.get_session(newer.id()).await.unwrap().unwrap();
    assert_eq!(fetched, newer);
    assert_eq!(fetched.notes(), Some("studio A"));
    assert_eq!(fetched.hours().as_f64(), 0.5);

    let listed = repo.list_sessions(ada.id()).await.unwrap();
    assert_eq!(
        listed.iter().map(|s| s.id()).collect::<Vec<_>>(),
        vec![newer.id(), older.id()]
    );

    let patched = older
        .apply_patch(
            SessionPatch {
                equipment: Some("chair".into()),
                hours: Some(3.5),
                notes: Some(String::new()),
                ..SessionPatch::default()
            },
            fixed_now().date_naive(),
            fixed_now() + Duration::minutes(2),
        )
        .unwrap();
    repo.update_session(&patched).await.unwrap();
    let reloaded = repo.get_session(older.id()).await.unwrap().unwrap();
    assert_eq!(reloaded.equipment(), Equipment::Chair);
    assert_eq!(reloaded.hours().half_hours(), 7);
    assert_eq!(reloaded.notes(), None);
    assert_eq!(reloaded.created_at(), older.created_at());

    assert!(matches!(
        repo.delete_session(SessionId::new(999)).await,
        Err(StorageError::NotFound)
    ));
    repo.delete_session(newer.id()).await.unwrap();
    assert!(repo.get_session(newer.id()).await.unwrap().is_none());
}

#[tokio::test]
async fn sqlite_hour_totals_group_by_equipment_and_type() {
    let repo = repo("hour_totals").await;
    let ada = repo.insert_coach(coach("Ada")).await.unwrap();
    for (equipment, kind, hours) in [
        ("mat", "practice", 1.5),
        ("mat", "practice", 1.0),
        ("mat", "observation", 0.5),
        ("chair", "practice", 2.0),
    ] {
        repo.insert_session(session(ada.id(), "2023-11-01", equipment, kind, hours))
            .await
            .unwrap();
    }

    let totals = repo.hour_totals(ada.id()).await.unwrap();
    assert_eq!(totals.len(), 3);
    let mat_practice = totals
        .iter()
        .find(|t| t.equipment == Equipment::Mat && t.session_type == SessionType::Practice)
        .unwrap();
    assert_eq!(mat_practice.half_hours, 5);
    assert_eq!(mat_practice.sessions, 2);

    assert_eq!(repo.delete_sessions_for_coach(ada.id()).await.unwrap(), 4);
    assert_eq!(repo.delete_sessions_for_coach(ada.id()).await.unwrap(), 0);
    assert!(repo.hour_totals(ada.id()).await.unwrap().is_empty());
}

#[tokio::test]
async fn sqlite_ping_answers() {
    let repo = repo("ping").await;
    repo.ping().await.unwrap();
    repo.close().await;
    assert!(repo.ping().await.is_err());
}
