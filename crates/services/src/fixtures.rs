//! Sample rows for the service unit tests.

use chrono::Utc;
use domains::models::{
    AuthoredReview, Like, ListWithItems, MediaKey, MediaList, Rating, Review, User,
};

pub fn user(id: i64, username: &str) -> User {
    User {
        id,
        username: username.to_owned(),
        email: format!("{username}@example.com"),
        password_hash: "$argon2id$stub".to_owned(),
        profile_picture: None,
        slogan: None,
        created_at: Utc::now(),
    }
}

pub fn rating(id: i64, user_id: i64, key: MediaKey, score: f64) -> Rating {
    let now = Utc::now();
    Rating {
        id,
        user_id,
        media_id: key.media_id,
        media_type: key.media_type,
        score,
        created_at: now,
        updated_at: now,
    }
}

pub fn like(id: i64, user_id: i64, key: MediaKey) -> Like {
    Like {
        id,
        user_id,
        media_id: key.media_id,
        media_type: key.media_type,
        created_at: Utc::now(),
    }
}

pub fn review(id: i64, user_id: i64, key: MediaKey, text: &str) -> Review {
    let now = Utc::now();
    Review {
        id,
        user_id,
        media_id: key.media_id,
        media_type: key.media_type,
        review_text: text.to_owned(),
        created_at: now,
        updated_at: now,
    }
}

pub fn authored(review: Review, author: &User) -> AuthoredReview {
    AuthoredReview {
        review,
        author: author.into(),
    }
}

pub fn list(id: i64, owner: &User, is_public: bool) -> ListWithItems {
    let now = Utc::now();
    ListWithItems {
        list: MediaList {
            id,
            user_id: owner.id,
            owner_username: owner.username.clone(),
            name: "Comfort films".to_owned(),
            description: None,
            is_numbered: false,
            is_public,
            created_at: now,
            updated_at: now,
        },
        items: Vec::new(),
    }
}
