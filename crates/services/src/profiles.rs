//! Read-side composition for public profile pages and per-user collections.

use domains::errors::{DomainError, Result};
use domains::models::{
    Like, ListWithItems, Page, PageRequest, ProfileStats, PublicUser, RankedEntry, RankingKind,
    Rating, Review, User, UserId, UserProfile, WatchlistEntry,
};

use crate::Repositories;

/// Most users a search returns.
pub const SEARCH_LIMIT: u32 = 20;

pub struct ProfileService {
    repos: Repositories,
}

impl ProfileService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    pub async fn profile(&self, user_id: UserId) -> Result<UserProfile> {
        let user = self.existing(user_id).await?;
        self.compose(user).await
    }

    pub async fn profile_by_username(&self, username: &str) -> Result<UserProfile> {
        let user = self
            .repos
            .users
            .find_user_by_username(username.trim())
            .await?
            .ok_or_else(|| DomainError::not_found("user"))?;
        self.compose(user).await
    }

    pub async fn users(&self, page: PageRequest) -> Result<Page<PublicUser>> {
        self.repos.users.list_users(page).await
    }

    pub async fn search(&self, query: &str) -> Result<Vec<PublicUser>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(DomainError::validation("search query must not be empty"));
        }
        self.repos.users.search_users(query, SEARCH_LIMIT).await
    }

    pub async fn ratings_of(&self, user_id: UserId) -> Result<Vec<Rating>> {
        self.existing(user_id).await?;
        self.repos.ratings.ratings_for_user(user_id).await
    }

    pub async fn likes_of(&self, user_id: UserId) -> Result<Vec<Like>> {
        self.existing(user_id).await?;
        self.repos.likes.likes_for_user(user_id).await
    }

    pub async fn reviews_of(&self, user_id: UserId) -> Result<Vec<Review>> {
        self.existing(user_id).await?;
        self.repos.reviews.reviews_by_user(user_id).await
    }

    /// Public lists only.
    pub async fn lists_of(&self, user_id: UserId) -> Result<Vec<ListWithItems>> {
        self.existing(user_id).await?;
        self.repos.lists.lists_for_user(user_id, false).await
    }

    pub async fn ranking_of(&self, user_id: UserId, kind: RankingKind) -> Result<Vec<RankedEntry>> {
        self.existing(user_id).await?;
        self.repos.rankings.ranking_for_user(user_id, kind).await
    }

    /// A private watchlist is reported as not found, even while empty.
    pub async fn watchlist_of(&self, user_id: UserId) -> Result<Vec<WatchlistEntry>> {
        self.existing(user_id).await?;
        if !self.repos.watchlist.watchlist_visibility(user_id).await? {
            return Err(DomainError::not_found("watchlist"));
        }
        self.repos.watchlist.watchlist_for_user(user_id).await
    }

    async fn existing(&self, user_id: UserId) -> Result<User> {
        self.repos
            .users
            .find_user(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("user"))
    }

    async fn compose(&self, user: User) -> Result<UserProfile> {
        let id = user.id;
        let watchlist = if self.repos.watchlist.watchlist_visibility(id).await? {
            Some(self.repos.watchlist.count_watchlist(id).await?)
        } else {
            None
        };
        let stats = ProfileStats {
            ratings: self.repos.ratings.count_ratings(id).await?,
            likes: self.repos.likes.count_likes(id).await?,
            reviews: self.repos.reviews.count_reviews(id).await?,
            lists: self.repos.lists.count_public_lists(id).await?,
            watchlist,
        };

        Ok(UserProfile {
            user: user.into(),
            stats,
            top_movies: self.repos.rankings.ranking_for_user(id, RankingKind::Movies).await?,
            top_directors: self.repos.rankings.ranking_for_user(id, RankingKind::Directors).await?,
            top_actors: self.repos.rankings.ranking_for_user(id, RankingKind::Actors).await?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use domains::ports::{
        MockLikeRepository, MockListRepository, MockRankingRepository, MockRatingRepository,
        MockReviewRepository, MockUserRepository, MockWatchlistRepository,
    };
    use std::sync::Arc;

    struct Mocks {
        users: MockUserRepository,
        ratings: MockRatingRepository,
        likes: MockLikeRepository,
        watchlist: MockWatchlistRepository,
        reviews: MockReviewRepository,
        rankings: MockRankingRepository,
        lists: MockListRepository,
    }

    impl Mocks {
        fn new() -> Self {
            Self {
                users: MockUserRepository::new(),
                ratings: MockRatingRepository::new(),
                likes: MockLikeRepository::new(),
                watchlist: MockWatchlistRepository::new(),
                reviews: MockReviewRepository::new(),
                rankings: MockRankingRepository::new(),
                lists: MockListRepository::new(),
            }
        }

        fn with_user(mut self, id: UserId) -> Self {
            self.users
                .expect_find_user()
                .returning(move |found| Ok((found == id).then(|| fixtures::user(id, "ada"))));
            self
        }

        fn into_service(self) -> ProfileService {
            ProfileService::new(Repositories {
                users: Arc::new(self.users),
                ratings: Arc::new(self.ratings),
                likes: Arc::new(self.likes),
                watchlist: Arc::new(self.watchlist),
                reviews: Arc::new(self.reviews),
                rankings: Arc::new(self.rankings),
                lists: Arc::new(self.lists),
            })
        }
    }

    #[tokio::test]
    async fn profile_hides_private_watchlist_count() {
        let mut mocks = Mocks::new().with_user(1);
        mocks.ratings.expect_count_ratings().returning(|_| Ok(12));
        mocks.likes.expect_count_likes().returning(|_| Ok(3));
        mocks.reviews.expect_count_reviews().returning(|_| Ok(2));
        mocks.lists.expect_count_public_lists().returning(|_| Ok(1));
        mocks
            .watchlist
            .expect_watchlist_visibility()
            .returning(|_| Ok(false));
        mocks.watchlist.expect_count_watchlist().never();
        mocks
            .rankings
            .expect_ranking_for_user()
            .times(3)
            .returning(|_, _| Ok(Vec::new()));

        let profile = Mocks::into_service(mocks).profile(1).await.unwrap();
        assert_eq!(profile.user.username, "ada");
        assert_eq!(
            profile.stats,
            ProfileStats {
                ratings: 12,
                likes: 3,
                reviews: 2,
                lists: 1,
                watchlist: None,
            }
        );
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let service = Mocks::new().with_user(1).into_service();
        let err = service.ratings_of(99).await.unwrap_err();
        assert_eq!(err, DomainError::not_found("user"));
    }

    #[tokio::test]
    async fn private_watchlist_is_not_found_for_visitors() {
        let mut mocks = Mocks::new().with_user(1);
        mocks
            .watchlist
            .expect_watchlist_visibility()
            .returning(|_| Ok(false));
        mocks.watchlist.expect_watchlist_for_user().never();

        let err = mocks.into_service().watchlist_of(1).await.unwrap_err();
        assert_eq!(err, DomainError::not_found("watchlist"));
    }

    #[tokio::test]
    async fn empty_search_is_rejected() {
        let err = Mocks::new().into_service().search("   ").await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
