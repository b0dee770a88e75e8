//! # Core Traits (Ports)
//!
//! Any adapter must implement these traits to be wired into the binary.
//! Repositories report uniqueness violations as [`DomainError::Conflict`]
//! so services can tell an expected race apart from a real failure.
//!
//! [`DomainError::Conflict`]: crate::errors::DomainError::Conflict

use async_trait::async_trait;
use bytes::Bytes;
use mime::Mime;

use crate::errors::Result;
use crate::models::{
    AuthoredReview, Like, ListChanges, ListWithItems, MediaKey, NewList, NewListItem, NewUser,
    Page, PageRequest, ProfileChanges, PublicUser, RankedEntry, RankedItem, RankingKind, Rating,
    Review, User, UserId, WatchlistEntry,
};

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `Conflict` when the username or email is taken.
    async fn create_user(&self, user: NewUser) -> Result<User>;
    async fn find_user(&self, id: UserId) -> Result<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>>;
    async fn list_users(&self, page: PageRequest) -> Result<Page<PublicUser>>;
    /// Case-insensitive substring match on the username.
    async fn search_users(&self, query: &str, limit: u32) -> Result<Vec<PublicUser>>;
    async fn update_profile(&self, id: UserId, changes: ProfileChanges) -> Result<Option<User>>;
    async fn set_profile_picture(&self, id: UserId, path: Option<String>) -> Result<Option<User>>;
    /// Removes the user and, by cascade, everything the user owns.
    async fn delete_user(&self, id: UserId) -> Result<bool>;
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait RatingRepository: Send + Sync {
    async fn find_rating(&self, user_id: UserId, key: MediaKey) -> Result<Option<Rating>>;
    async fn insert_rating(&self, user_id: UserId, key: MediaKey, score: f64) -> Result<Rating>;
    async fn update_rating(&self, rating_id: i64, score: f64) -> Result<Rating>;
    async fn delete_rating(&self, user_id: UserId, key: MediaKey) -> Result<bool>;
    /// Newest first.
    async fn ratings_for_user(&self, user_id: UserId) -> Result<Vec<Rating>>;
    async fn count_ratings(&self, user_id: UserId) -> Result<i64>;
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait LikeRepository: Send + Sync {
    async fn find_like(&self, user_id: UserId, key: MediaKey) -> Result<Option<Like>>;
    async fn insert_like(&self, user_id: UserId, key: MediaKey) -> Result<Like>;
    async fn delete_like(&self, user_id: UserId, key: MediaKey) -> Result<bool>;
    async fn likes_for_user(&self, user_id: UserId) -> Result<Vec<Like>>;
    async fn count_likes(&self, user_id: UserId) -> Result<i64>;
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait WatchlistRepository: Send + Sync {
    async fn find_watchlist_entry(&self, user_id: UserId, key: MediaKey) -> Result<Option<WatchlistEntry>>;
    /// New entries take the user's watchlist visibility setting.
    async fn insert_watchlist_entry(&self, user_id: UserId, key: MediaKey) -> Result<WatchlistEntry>;
    async fn delete_watchlist_entry(&self, user_id: UserId, key: MediaKey) -> Result<bool>;
    async fn watchlist_for_user(&self, user_id: UserId) -> Result<Vec<WatchlistEntry>>;
    async fn count_watchlist(&self, user_id: UserId) -> Result<i64>;
    /// The per-user setting; public until the user changes it.
    async fn watchlist_visibility(&self, user_id: UserId) -> Result<bool>;
    /// Stores the setting and applies it to every entry; returns the number
    /// of entries touched.
    async fn set_watchlist_visibility(&self, user_id: UserId, is_public: bool) -> Result<u64>;
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    async fn find_review(&self, user_id: UserId, key: MediaKey) -> Result<Option<Review>>;
    async fn insert_review(&self, user_id: UserId, key: MediaKey, text: String) -> Result<Review>;
    async fn update_review(&self, review_id: i64, text: String) -> Result<Review>;
    async fn delete_review(&self, user_id: UserId, key: MediaKey) -> Result<bool>;
    /// Newest first, joined with the author.
    async fn reviews_for_media(&self, key: MediaKey) -> Result<Vec<AuthoredReview>>;
    async fn reviews_by_user(&self, user_id: UserId) -> Result<Vec<Review>>;
    async fn recent_reviews(&self, page: PageRequest) -> Result<Page<AuthoredReview>>;
    async fn count_reviews(&self, user_id: UserId) -> Result<i64>;
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait RankingRepository: Send + Sync {
    /// Atomically drops every entry of `kind` for the user and writes `items`.
    async fn replace_ranking(
        &self,
        user_id: UserId,
        kind: RankingKind,
        items: Vec<RankedItem>,
    ) -> Result<Vec<RankedEntry>>;
    /// Ordered by `order` ascending.
    async fn ranking_for_user(&self, user_id: UserId, kind: RankingKind) -> Result<Vec<RankedEntry>>;
    async fn remove_ranked(&self, user_id: UserId, kind: RankingKind, item_id: i64) -> Result<bool>;
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ListRepository: Send + Sync {
    /// Creates the list and its items as one unit.
    async fn create_list(&self, list: NewList, items: Vec<NewListItem>) -> Result<ListWithItems>;
    async fn find_list(&self, list_id: i64) -> Result<Option<ListWithItems>>;
    /// Applies `changes`; when `items` is given the item set is replaced in
    /// the same transaction.
    async fn update_list(
        &self,
        list_id: i64,
        changes: ListChanges,
        items: Option<Vec<NewListItem>>,
    ) -> Result<Option<ListWithItems>>;
    async fn delete_list(&self, list_id: i64) -> Result<bool>;
    /// Newest first.
    async fn lists_for_user(&self, user_id: UserId, include_private: bool) -> Result<Vec<ListWithItems>>;
    /// Public lists of every user, newest first.
    async fn public_lists(&self, page: PageRequest) -> Result<Page<ListWithItems>>;
    async fn count_public_lists(&self, user_id: UserId) -> Result<i64>;
}

/// Password hashing contract. Implementations are expected to be slow on
/// purpose and must not block the async executor.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait CredentialHasher: Send + Sync {
    async fn hash_password(&self, password: &str) -> Result<String>;
    async fn verify_password(&self, password: &str, hash: &str) -> Result<bool>;
}

/// Bearer token issuance and verification.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait TokenService: Send + Sync {
    fn issue(&self, user_id: UserId) -> Result<String>;
    /// Returns the user id bound to a valid token, `Unauthorized` otherwise.
    fn verify(&self, token: &str) -> Result<UserId>;
}

/// Storage contract for uploaded avatars.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait MediaStorage: Send + Sync {
    /// Normalizes and stores an avatar for `owner`, returning its public path.
    /// Paths are never shared between owners.
    async fn store_avatar(&self, owner: UserId, data: Bytes, content_type: Mime) -> Result<String>;
    /// Removes a file previously returned by `store_avatar`. Unknown paths are ignored.
    async fn remove(&self, public_path: &str) -> Result<()>;
}
