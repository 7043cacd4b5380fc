//! Integration tests for the repositories
//!
//! These exercise registration conflicts, toggle semantics, derived
//! counts, comment ordering, and feed assembly against a real database.
//! They require a running PostgreSQL instance (see DATABASE_URL) and are
//! ignored by default; run with `cargo test -- --ignored`.

use api::error::ApiError;
use api::models::{NewAudio, NewUser};
use api::repositories::{AudioRepository, SocialRepository, UserRepository};
use common::database::{DatabaseConfig, init_pool};
use serial_test::serial;
use sqlx::PgPool;
use uuid::Uuid;

async fn setup() -> PgPool {
    let config = DatabaseConfig::from_env().expect("database config");
    let pool = init_pool(&config).await.expect("database pool");
    sqlx::migrate!("../../migrations")
        .run(&pool)
        .await
        .expect("migrations");
    pool
}

fn unique(prefix: &str) -> String {
    format!("{}_{}", prefix, Uuid::new_v4().simple())
}

async fn register_user(users: &UserRepository, prefix: &str) -> api::models::User {
    let name = unique(prefix);
    users
        .create(&NewUser {
            email: format!("{}@example.com", name),
            username: name,
            password: "password123".to_string(),
        })
        .await
        .expect("user creation")
}

async fn create_post(audios: &AudioRepository, owner: Uuid, title: &str) -> api::models::AudioPost {
    audios
        .create(
            owner,
            &NewAudio {
                title: title.to_string(),
                description: None,
                file_path: format!("uploads/{}.mp3", Uuid::new_v4()),
                tags: vec!["test".to_string()],
            },
        )
        .await
        .expect("audio creation")
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_duplicate_registration_conflicts() {
    let pool = setup().await;
    let users = UserRepository::new(pool);

    let user = register_user(&users, "dup").await;

    // Same email, fresh username
    let err = users
        .create(&NewUser {
            email: user.email.clone(),
            username: unique("other"),
            password: "password123".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Conflict(_)));

    // Same username, fresh email
    let err = users
        .create(&NewUser {
            email: format!("{}@example.com", unique("other")),
            username: user.username.clone(),
            password: "password123".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Conflict(_)));
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_password_verification() {
    let pool = setup().await;
    let users = UserRepository::new(pool);

    let user = register_user(&users, "pw").await;
    assert_ne!(user.password_hash, "password123");

    let found = users
        .find_by_login(&user.email)
        .await
        .unwrap()
        .expect("user by email");
    assert!(users.verify_password(&found, "password123").unwrap());
    assert!(!users.verify_password(&found, "wrong-password").unwrap());

    // The same identifier field also matches by username
    assert!(
        users
            .find_by_login(&user.username)
            .await
            .unwrap()
            .is_some()
    );
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_toggle_like_is_its_own_inverse() {
    let pool = setup().await;
    let users = UserRepository::new(pool.clone());
    let audios = AudioRepository::new(pool.clone());
    let social = SocialRepository::new(pool);

    let owner = register_user(&users, "owner").await;
    let viewer = register_user(&users, "viewer").await;
    let post = create_post(&audios, owner.id, "toggle me").await;

    let before = social.count_likes(post.id).await.unwrap();

    assert!(social.toggle_like(viewer.id, post.id).await.unwrap());
    assert!(social.is_liked(viewer.id, post.id).await.unwrap());
    assert_eq!(social.count_likes(post.id).await.unwrap(), before + 1);

    assert!(!social.toggle_like(viewer.id, post.id).await.unwrap());
    assert!(!social.is_liked(viewer.id, post.id).await.unwrap());
    assert_eq!(social.count_likes(post.id).await.unwrap(), before);
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_concurrent_toggle_converges() {
    let pool = setup().await;
    let users = UserRepository::new(pool.clone());
    let audios = AudioRepository::new(pool.clone());
    let social = SocialRepository::new(pool);

    let owner = register_user(&users, "owner").await;
    let viewer = register_user(&users, "viewer").await;
    let post = create_post(&audios, owner.id, "race me").await;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let social = social.clone();
        let (user_id, audio_id) = (viewer.id, post.id);
        handles.push(tokio::spawn(async move {
            social.toggle_like(user_id, audio_id).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    // Whatever interleaving happened, the edge set is consistent: at most
    // one row, and the count agrees with the edge's existence
    let count = social.count_likes(post.id).await.unwrap();
    let liked = social.is_liked(viewer.id, post.id).await.unwrap();
    assert!(count <= 1);
    assert_eq!(count, if liked { 1 } else { 0 });
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_self_follow_rejected() {
    let pool = setup().await;
    let users = UserRepository::new(pool.clone());
    let social = SocialRepository::new(pool);

    let user = register_user(&users, "selfie").await;

    let err = social.toggle_follow(user.id, user.id).await.unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
    assert_eq!(social.count_following(user.id).await.unwrap(), 0);
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_toggle_follow_and_counts() {
    let pool = setup().await;
    let users = UserRepository::new(pool.clone());
    let social = SocialRepository::new(pool);

    let a = register_user(&users, "follower").await;
    let b = register_user(&users, "followed").await;

    assert!(social.toggle_follow(a.id, b.id).await.unwrap());
    assert_eq!(social.count_followers(b.id).await.unwrap(), 1);
    assert_eq!(social.count_following(a.id).await.unwrap(), 1);

    assert!(!social.toggle_follow(a.id, b.id).await.unwrap());
    assert_eq!(social.count_followers(b.id).await.unwrap(), 0);
    assert_eq!(social.count_following(a.id).await.unwrap(), 0);
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_comments_validate_and_order_newest_first() {
    let pool = setup().await;
    let users = UserRepository::new(pool.clone());
    let audios = AudioRepository::new(pool);

    let owner = register_user(&users, "owner").await;
    let post = create_post(&audios, owner.id, "comment me").await;

    let err = audios
        .add_comment(post.id, owner.id, "   ")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));

    audios.add_comment(post.id, owner.id, "hi").await.unwrap();
    audios
        .add_comment(post.id, owner.id, "second")
        .await
        .unwrap();

    let comments = audios.list_comments(post.id).await.unwrap();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0].content, "second");
    assert_eq!(comments[1].content, "hi");
    assert_eq!(comments[0].user.username, owner.username);
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_feed_pagination_no_overlap() {
    let pool = setup().await;
    let users = UserRepository::new(pool.clone());
    let audios = AudioRepository::new(pool);

    let owner = register_user(&users, "feeder").await;
    for i in 0..3 {
        create_post(&audios, owner.id, &format!("post {}", i)).await;
    }

    let page1 = audios.feed(None, 2, 0).await.unwrap();
    let page2 = audios.feed(None, 2, 2).await.unwrap();

    assert_eq!(page1.len(), 2);
    assert!(!page2.is_empty());

    // No duplicates across adjacent pages
    for item in &page1 {
        assert!(page2.iter().all(|other| other.id != item.id));
    }

    // Newest first across the page boundary
    let mut all = page1;
    all.extend(page2);
    for pair in all.windows(2) {
        assert!((pair[0].created_at, pair[0].id) >= (pair[1].created_at, pair[1].id));
    }

    // Anonymous viewers get no like annotation
    assert!(all.iter().all(|item| item.liked.is_none()));
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_like_scenario_with_feed_annotation() {
    let pool = setup().await;
    let users = UserRepository::new(pool.clone());
    let audios = AudioRepository::new(pool.clone());
    let social = SocialRepository::new(pool);

    let a = register_user(&users, "alice").await;
    let b = register_user(&users, "bob").await;
    let post = create_post(&audios, a.id, "alice's clip").await;

    assert!(social.toggle_like(b.id, post.id).await.unwrap());
    assert_eq!(social.count_likes(post.id).await.unwrap(), 1);

    let feed = audios.feed(Some(b.id), 10, 0).await.unwrap();
    let item = feed
        .iter()
        .find(|item| item.id == post.id)
        .expect("post appears in feed");
    assert_eq!(item.liked, Some(true));
    assert_eq!(item.like_count, 1);
    assert_eq!(item.user.username, a.username);

    assert!(!social.toggle_like(b.id, post.id).await.unwrap());
    assert_eq!(social.count_likes(post.id).await.unwrap(), 0);
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_profile_counts_are_derived() {
    let pool = setup().await;
    let users = UserRepository::new(pool.clone());
    let audios = AudioRepository::new(pool.clone());
    let social = SocialRepository::new(pool);

    let a = register_user(&users, "profiled").await;
    let b = register_user(&users, "fan").await;

    create_post(&audios, a.id, "one").await;
    create_post(&audios, a.id, "two").await;
    social.toggle_follow(b.id, a.id).await.unwrap();

    let profile = users
        .profile_by_username(&a.username)
        .await
        .unwrap()
        .expect("profile");
    assert_eq!(profile.audio_count, 2);
    assert_eq!(profile.follower_count, 1);
    assert_eq!(profile.following_count, 0);
}
