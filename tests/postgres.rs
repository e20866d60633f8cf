//! Repository tests against a live database.
//!
//! Run with `DATABASE_URL=postgres://... cargo test --test postgres -- --ignored`.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use dotenv::dotenv;
use pretty_assertions::assert_eq;
use sqlx::PgPool;
use taskkeeper::auth::{CredentialStore, TokenService};
use taskkeeper::db;
use taskkeeper::models::{TaskInput, TaskKey, TaskUpdate};
use taskkeeper::repository::{
    PgTaskRepository, PgUserRepository, RepositoryError, TaskRepository, UserRepository,
};
use taskkeeper::{AppError, TaskService};

async fn pool() -> PgPool {
    dotenv().ok();
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for these tests");
    db::connect(&url, 2).await.expect("Failed to connect to database")
}

/// Names are made unique per run so tests can share one database.
fn unique(prefix: &str) -> String {
    format!("{}_{}", prefix, Utc::now().timestamp_nanos_opt().unwrap_or_default())
}

async fn cleanup_user(pool: &PgPool, username: &str) {
    let _ = sqlx::query("DELETE FROM users WHERE username = $1")
        .bind(username)
        .execute(pool)
        .await;
}

fn input(title: &str) -> TaskInput {
    TaskInput {
        title: title.to_string(),
        description: None,
        status: false,
        deadline: None,
    }
}

#[test_log::test(actix_rt::test)]
#[ignore]
async fn test_username_is_unique() {
    let pool = pool().await;
    let users = PgUserRepository::new(pool.clone());
    let name = unique("pg_user");

    let user = users.create(&name, "digest").await.unwrap();
    assert_eq!(user.username, name);

    let err = users.create(&name, "other").await.unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(_)), "{:?}", err);

    let found = users.find_by_username(&name).await.unwrap().unwrap();
    assert_eq!(found.id, user.id);

    cleanup_user(&pool, &name).await;
}

#[actix_rt::test]
#[ignore]
async fn test_task_constraints_and_updates() {
    let pool = pool().await;
    let users = PgUserRepository::new(pool.clone());
    let tasks = PgTaskRepository::new(pool.clone());

    let name = unique("pg_owner");
    let owner = users.create(&name, "digest").await.unwrap();
    let title = unique("pg_task");
    let other_title = unique("pg_other");

    let task = tasks.create(input(&title), owner.id).await.unwrap();
    assert_eq!(task.owner_id, owner.id);
    assert!(!task.status);

    let err = tasks.create(input(&title), owner.id).await.unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(_)), "{:?}", err);

    // Unknown owners are rejected by the foreign key.
    let err = tasks.create(input(&unique("orphan")), -1).await.unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound(_)), "{:?}", err);

    let done = tasks.update(task.id, TaskUpdate::Status(true)).await.unwrap();
    assert!(done.status);
    assert_eq!(done.title, title);
    assert!(done.updated_at >= task.updated_at);

    let deadline = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
    let dated = tasks
        .update(task.id, TaskUpdate::Deadline(deadline))
        .await
        .unwrap();
    assert_eq!(dated.deadline, Some(deadline));
    assert!(dated.status);

    tasks.create(input(&other_title), owner.id).await.unwrap();
    let err = tasks
        .update(task.id, TaskUpdate::Replace(input(&other_title)))
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(_)), "{:?}", err);

    let listed = tasks.list_by_owner(owner.id).await.unwrap();
    let titles: Vec<&str> = listed.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec![title.as_str(), other_title.as_str()]);

    tasks.delete(task.id).await.unwrap();
    assert!(tasks.find_by_id(task.id).await.unwrap().is_none());
    let err = tasks.delete(task.id).await.unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound(_)), "{:?}", err);

    cleanup_user(&pool, &name).await;
}

#[actix_rt::test]
#[ignore]
async fn test_deleting_user_cascades() {
    let pool = pool().await;
    let users = PgUserRepository::new(pool.clone());
    let tasks = PgTaskRepository::new(pool.clone());

    let name = unique("pg_cascade");
    let owner = users.create(&name, "digest").await.unwrap();
    let task = tasks.create(input(&unique("pg_doomed")), owner.id).await.unwrap();

    users.delete(owner.id).await.unwrap();

    assert!(users.find_by_id(owner.id).await.unwrap().is_none());
    assert!(tasks.find_by_id(task.id).await.unwrap().is_none());
    assert!(tasks.list_by_owner(owner.id).await.unwrap().is_empty());
}

#[actix_rt::test]
#[ignore]
async fn test_service_on_postgres() {
    let pool = pool().await;
    let service = TaskService::new(
        Arc::new(PgUserRepository::new(pool.clone())),
        Arc::new(PgTaskRepository::new(pool.clone())),
        TokenService::with_default_ttl("postgres_test_secret"),
        CredentialStore::new(4),
    );

    let alice_name = unique("pg_alice");
    let bob_name = unique("pg_bob");
    let alice = service.register(&alice_name, "pw1").await.unwrap();
    let bob = service.register(&bob_name, "pw2").await.unwrap();

    let token = service.login(&alice_name, "pw1").await.unwrap();
    assert_eq!(service.tokens().resolve(&token), Ok(alice.id));

    let title = unique("pg_buy");
    let task = service.create_task(input(&title), &alice).await.unwrap();
    let key = TaskKey::Title(title.clone());

    let err = service.get_task(&key, &bob).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)), "{:?}", err);

    let err = service.create_task(input(&title), &bob).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)), "{:?}", err);

    service.delete_account(&alice).await.unwrap();
    let err = service.get_task(&TaskKey::Id(task.id), &bob).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)), "{:?}", err);

    cleanup_user(&pool, &bob_name).await;
}
