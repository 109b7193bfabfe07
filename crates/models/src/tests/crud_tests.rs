use anyhow::Result;
use chrono::{DateTime, Duration, FixedOffset, Utc};
use sea_orm::{EntityTrait, PaginatorTrait};

use super::setup_test_db;
use crate::task::{self, NewTask, TaskChanges, TaskFilter};
use crate::user::{self, NewUser, UserChanges, UserFilter};

fn now() -> DateTime<FixedOffset> {
    Utc::now().fixed_offset()
}

/// Test task CRUD operations
#[tokio::test]
async fn test_task_crud() -> Result<()> {
    let db = setup_test_db().await?;

    // Create
    let input = NewTask {
        title: "Write docs".into(),
        description: Some("README".into()),
        completed: false,
    };
    let created = task::create(&db, input.clone(), now()).await?;
    assert!(created.id > 0);
    assert_eq!(created.title, input.title);
    assert_eq!(created.description, input.description);
    assert!(created.updated_at.is_none());

    // Read
    let found = task::find(&db, created.id).await?.expect("task exists");
    assert_eq!(found, created);

    // Update only the flag; other fields survive
    let changes = TaskChanges {
        completed: Some(true),
        ..Default::default()
    };
    let updated = task::apply_changes(&db, created.id, changes, now())
        .await?
        .expect("task updated");
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.title, "Write docs");
    assert_eq!(updated.description.as_deref(), Some("README"));
    assert!(updated.completed);
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at.is_some());

    // Delete
    assert!(task::delete(&db, created.id).await?);
    assert!(task::find(&db, created.id).await?.is_none());
    assert!(!task::delete(&db, created.id).await?);
    Ok(())
}

#[tokio::test]
async fn test_task_description_can_be_cleared() -> Result<()> {
    let db = setup_test_db().await?;
    let input = NewTask {
        title: "t".into(),
        description: Some("old".into()),
        completed: false,
    };
    let created = task::create(&db, input, now()).await?;

    let keep = TaskChanges {
        title: Some("t2".into()),
        ..Default::default()
    };
    let kept = task::apply_changes(&db, created.id, keep, now()).await?.expect("task updated");
    assert_eq!(kept.description.as_deref(), Some("old"));

    let clear = TaskChanges {
        description: Some(None),
        ..Default::default()
    };
    let cleared = task::apply_changes(&db, created.id, clear, now()).await?.expect("task updated");
    assert_eq!(cleared.description, None);
    assert_eq!(cleared.title, "t2");
    Ok(())
}

#[tokio::test]
async fn test_task_timestamps_come_from_the_caller() -> Result<()> {
    let db = setup_test_db().await?;
    let at = DateTime::parse_from_rfc3339("2024-03-01T12:00:00Z")?;
    let created = task::create(&db, NewTask::titled("t"), at).await?;
    assert_eq!(created.created_at, at);

    let later = at + Duration::minutes(5);
    let updated = task::apply_changes(&db, created.id, TaskChanges::default(), later)
        .await?
        .expect("task updated");
    assert_eq!(updated.updated_at, Some(later));
    assert_eq!(updated.created_at, at);
    Ok(())
}

#[tokio::test]
async fn test_task_update_missing_does_not_insert() -> Result<()> {
    let db = setup_test_db().await?;
    let changes = TaskChanges {
        title: Some("ghost".into()),
        ..Default::default()
    };
    let res = task::apply_changes(&db, 999, changes, now()).await?;
    assert!(res.is_none());
    assert_eq!(task::Entity::find().count(&db).await?, 0);
    Ok(())
}

#[tokio::test]
async fn test_task_ids_are_unique_and_listed_in_order() -> Result<()> {
    let db = setup_test_db().await?;
    let a = task::create(&db, NewTask::titled("a"), now()).await?;
    let b = task::create(&db, NewTask::titled("b"), now()).await?;
    let c = task::create(&db, NewTask::titled("c"), now()).await?;
    assert!(a.id < b.id && b.id < c.id);

    let ids: Vec<i32> = task::list(&db).await?.into_iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![a.id, b.id, c.id]);
    Ok(())
}

#[tokio::test]
async fn test_task_filters() -> Result<()> {
    let db = setup_test_db().await?;
    task::create(&db, NewTask::titled("Deploy api"), now()).await?;
    let worker = NewTask {
        title: "deploy worker".into(),
        completed: true,
        ..Default::default()
    };
    task::create(&db, worker, now()).await?;
    task::create(&db, NewTask::titled("Review PR"), now()).await?;

    let done = TaskFilter {
        completed: Some(true),
        ..Default::default()
    };
    let done = task::find_filtered(&db, &done).await?;
    assert_eq!(done.len(), 1);
    assert_eq!(done[0].title, "deploy worker");

    let pending = TaskFilter {
        completed: Some(false),
        ..Default::default()
    };
    assert_eq!(task::find_filtered(&db, &pending).await?.len(), 2);

    // case-sensitive containment
    let keyword = TaskFilter {
        keyword: Some("Deploy".into()),
        ..Default::default()
    };
    let hits = task::find_filtered(&db, &keyword).await?;
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "Deploy api");

    let now = Utc::now();
    let window = TaskFilter {
        from: Some((now - Duration::hours(1)).into()),
        to: Some((now + Duration::hours(1)).into()),
        ..Default::default()
    };
    assert_eq!(task::find_filtered(&db, &window).await?.len(), 3);

    let past = TaskFilter {
        to: Some((now - Duration::hours(1)).into()),
        ..Default::default()
    };
    assert!(task::find_filtered(&db, &past).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_task_range_with_non_utc_bounds() -> Result<()> {
    let db = setup_test_db().await?;
    let created = task::create(&db, NewTask::titled("offset"), now()).await?;
    let plus5 = FixedOffset::east_opt(5 * 3600).expect("valid offset");
    let minus7 = FixedOffset::west_opt(7 * 3600).expect("valid offset");

    let window = TaskFilter {
        from: Some((created.created_at - Duration::hours(1)).with_timezone(&plus5)),
        to: Some((created.created_at + Duration::hours(1)).with_timezone(&minus7)),
        ..Default::default()
    };
    assert_eq!(task::find_filtered(&db, &window).await?.len(), 1);

    let exact = TaskFilter {
        from: Some(created.created_at.with_timezone(&plus5)),
        to: Some(created.created_at.with_timezone(&plus5)),
        ..Default::default()
    };
    assert_eq!(task::find_filtered(&db, &exact).await?.len(), 1);

    let before = TaskFilter {
        to: Some((created.created_at - Duration::minutes(1)).with_timezone(&plus5)),
        ..Default::default()
    };
    assert!(task::find_filtered(&db, &before).await?.is_empty());
    Ok(())
}

/// Test user CRUD operations
#[tokio::test]
async fn test_user_crud() -> Result<()> {
    let db = setup_test_db().await?;

    let created = user::create(&db, NewUser::new("John Doe", "john@example.com"), now()).await?;
    assert!(created.id > 0);
    assert_eq!(created.name, "John Doe");

    let found = user::find(&db, created.id).await?.expect("user exists");
    assert_eq!(found.email, "john@example.com");

    let changes = UserChanges {
        email: Some("jd@example.com".into()),
        ..Default::default()
    };
    let updated = user::apply_changes(&db, created.id, changes, now())
        .await?
        .expect("user updated");
    assert_eq!(updated.name, "John Doe");
    assert_eq!(updated.email, "jd@example.com");
    assert!(updated.updated_at.is_some());

    let by_name = UserFilter {
        name: Some("John".into()),
        ..Default::default()
    };
    assert_eq!(user::find_filtered(&db, &by_name).await?.len(), 1);
    let lower = UserFilter {
        name: Some("john".into()),
        ..Default::default()
    };
    assert!(user::find_filtered(&db, &lower).await?.is_empty());

    assert!(user::delete(&db, created.id).await?);
    assert!(user::find(&db, created.id).await?.is_none());
    assert!(user::apply_changes(&db, created.id, UserChanges::default(), now()).await?.is_none());
    Ok(())
}
