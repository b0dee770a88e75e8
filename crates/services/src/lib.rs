//! # services
//!
//! Business rules of reelshelf. Every service talks to storage, hashing and
//! token issuance through the `domains` ports only, so the same code runs
//! against PostgreSQL, the in-memory store, or mockall mocks.

pub mod accounts;
pub mod activity;
pub mod lists;
pub mod profiles;
pub mod rankings;
pub mod reviews;
pub mod validation;

#[cfg(test)]
mod fixtures;

use std::sync::Arc;

use domains::ports::{
    CredentialHasher, LikeRepository, ListRepository, MediaStorage, RankingRepository,
    RatingRepository, ReviewRepository, TokenService, UserRepository, WatchlistRepository,
};

pub use accounts::{AccountService, ProfileEdit, Registration, Session};
pub use activity::{LikeService, RatingService, WatchlistService};
pub use lists::{ListDraft, ListEdit, ListService};
pub use profiles::ProfileService;
pub use rankings::RankingService;
pub use reviews::ReviewService;

/// One handle per repository port.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub ratings: Arc<dyn RatingRepository>,
    pub likes: Arc<dyn LikeRepository>,
    pub watchlist: Arc<dyn WatchlistRepository>,
    pub reviews: Arc<dyn ReviewRepository>,
    pub rankings: Arc<dyn RankingRepository>,
    pub lists: Arc<dyn ListRepository>,
}

impl Repositories {
    /// Uses a single store that implements every repository port.
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: UserRepository
            + RatingRepository
            + LikeRepository
            + WatchlistRepository
            + ReviewRepository
            + RankingRepository
            + ListRepository
            + 'static,
    {
        Self {
            users: store.clone(),
            ratings: store.clone(),
            likes: store.clone(),
            watchlist: store.clone(),
            reviews: store.clone(),
            rankings: store.clone(),
            lists: store,
        }
    }
}

/// The assembled service layer handed to the web adapter.
#[derive(Clone)]
pub struct Services {
    pub accounts: Arc<AccountService>,
    pub ratings: Arc<RatingService>,
    pub likes: Arc<LikeService>,
    pub watchlist: Arc<WatchlistService>,
    pub reviews: Arc<ReviewService>,
    pub rankings: Arc<RankingService>,
    pub lists: Arc<ListService>,
    pub profiles: Arc<ProfileService>,
}

impl Services {
    pub fn new(
        repos: Repositories,
        hasher: Arc<dyn CredentialHasher>,
        tokens: Arc<dyn TokenService>,
        media: Arc<dyn MediaStorage>,
    ) -> Self {
        Self {
            accounts: Arc::new(AccountService::new(repos.users.clone(), hasher, tokens, media)),
            ratings: Arc::new(RatingService::new(repos.ratings.clone())),
            likes: Arc::new(LikeService::new(repos.likes.clone())),
            watchlist: Arc::new(WatchlistService::new(repos.watchlist.clone())),
            reviews: Arc::new(ReviewService::new(
                repos.reviews.clone(),
                repos.ratings.clone(),
                repos.likes.clone(),
            )),
            rankings: Arc::new(RankingService::new(repos.rankings.clone())),
            lists: Arc::new(ListService::new(repos.lists.clone())),
            profiles: Arc::new(ProfileService::new(repos)),
        }
    }
}
