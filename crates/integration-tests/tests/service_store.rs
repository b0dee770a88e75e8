//! Services wired straight to the in-memory store, without HTTP. Covers
//! behaviour that only shows up under concurrent callers.

use std::sync::Arc;

use domains::models::{MediaKey, MediaType, NewUser, RankingKind};
use domains::ports::{MockCredentialHasher, MockMediaStorage, MockTokenService, UserRepository};
use services::{Repositories, Services};
use storage_adapters::MemoryStore;

async fn setup() -> (Services, i64) {
    let store = Arc::new(MemoryStore::new());
    let user = store
        .create_user(NewUser {
            username: "racer".to_owned(),
            email: "racer@example.com".to_owned(),
            password_hash: "unused".to_owned(),
        })
        .await
        .unwrap();
    let services = Services::new(
        Repositories::from_store(store),
        Arc::new(MockCredentialHasher::new()),
        Arc::new(MockTokenService::new()),
        Arc::new(MockMediaStorage::new()),
    );
    (services, user.id)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_first_ratings_leave_one_row() {
    let (services, user_id) = setup().await;
    let key = MediaKey::new(550, MediaType::Movie);

    let tasks: Vec<_> = [1.0, 2.0, 3.0, 4.0, 5.0]
        .into_iter()
        .map(|score| {
            let ratings = services.ratings.clone();
            tokio::spawn(async move { ratings.rate(user_id, key, score).await })
        })
        .collect();
    let mut created = 0;
    for task in tasks {
        if task.await.unwrap().unwrap().was_created() {
            created += 1;
        }
    }

    assert_eq!(created, 1);
    assert_eq!(services.profiles.ratings_of(user_id).await.unwrap().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_toggles_leave_at_most_one_like() {
    let (services, user_id) = setup().await;
    let key = MediaKey::new(603, MediaType::Movie);

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let likes = services.likes.clone();
            tokio::spawn(async move { likes.toggle(user_id, key).await })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let likes = services.profiles.likes_of(user_id).await.unwrap();
    assert!(likes.len() <= 1);
    assert_eq!(services.likes.is_liked(user_id, key).await.unwrap(), !likes.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_ranking_replaces_never_mix() {
    let (services, user_id) = setup().await;
    let first: Vec<i64> = (1..=10).collect();
    let second: Vec<i64> = (11..=20).collect();

    let a = {
        let rankings = services.rankings.clone();
        let ids = first.clone();
        tokio::spawn(async move { rankings.replace(user_id, RankingKind::Movies, ids).await })
    };
    let b = {
        let rankings = services.rankings.clone();
        let ids = second.clone();
        tokio::spawn(async move { rankings.replace(user_id, RankingKind::Movies, ids).await })
    };
    a.await.unwrap().unwrap();
    b.await.unwrap().unwrap();

    let stored: Vec<i64> = services
        .rankings
        .get(user_id, RankingKind::Movies)
        .await
        .unwrap()
        .into_iter()
        .map(|entry| entry.item_id)
        .collect();
    assert!(stored == first || stored == second, "mixed ranking {stored:?}");
}
