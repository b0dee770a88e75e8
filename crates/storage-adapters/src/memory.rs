//! # MemoryStore
//!
//! In-process implementation of every repository port. Used by the test
//! suites and by the binary when no database URL is configured. All tables
//! live behind one lock, so multi-row writes (full replaces, cascades) are
//! atomic exactly like their transactional PostgreSQL counterparts.

use std::collections::{BTreeMap, HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domains::errors::{DomainError, Result};
use domains::models::{
    AuthoredReview, Like, ListChanges, ListItem, ListWithItems, MediaKey, MediaList, NewList,
    NewListItem, NewUser, Page, PageRequest, ProfileChanges, PublicUser, RankedEntry, RankedItem,
    RankingKind, Rating, Review, User, UserId, WatchlistEntry,
};
use domains::ports::{
    LikeRepository, ListRepository, RankingRepository, RatingRepository, ReviewRepository,
    UserRepository, WatchlistRepository,
};
use tokio::sync::RwLock;

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone)]
struct StoredList {
    id: i64,
    user_id: UserId,
    name: String,
    description: Option<String>,
    is_numbered: bool,
    is_public: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Default)]
struct Tables {
    last_id: i64,
    users: BTreeMap<i64, User>,
    ratings: BTreeMap<i64, Rating>,
    likes: BTreeMap<i64, Like>,
    watchlist: BTreeMap<i64, WatchlistEntry>,
    /// Users who made their watchlist private.
    private_watchlists: HashSet<UserId>,
    reviews: BTreeMap<i64, Review>,
    rankings: HashMap<(UserId, RankingKind), Vec<RankedEntry>>,
    lists: BTreeMap<i64, StoredList>,
    list_items: BTreeMap<i64, ListItem>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn username_taken(&self, username: &str, except: Option<UserId>) -> bool {
        self.users
            .values()
            .any(|u| Some(u.id) != except && u.username.eq_ignore_ascii_case(username))
    }

    fn require_user(&self, user_id: UserId) -> Result<()> {
        if self.users.contains_key(&user_id) {
            Ok(())
        } else {
            Err(DomainError::not_found("user"))
        }
    }

    fn public_user(&self, user_id: UserId) -> Result<PublicUser> {
        self.users
            .get(&user_id)
            .map(PublicUser::from)
            .ok_or_else(|| DomainError::internal(format!("dangling author {user_id}")))
    }

    fn hydrate(&self, stored: &StoredList) -> ListWithItems {
        let mut items: Vec<ListItem> = self
            .list_items
            .values()
            .filter(|item| item.list_id == stored.id)
            .cloned()
            .collect();
        items.sort_by_key(|item| item.order);

        ListWithItems {
            list: MediaList {
                id: stored.id,
                user_id: stored.user_id,
                owner_username: self
                    .users
                    .get(&stored.user_id)
                    .map(|u| u.username.clone())
                    .unwrap_or_default(),
                name: stored.name.clone(),
                description: stored.description.clone(),
                is_numbered: stored.is_numbered,
                is_public: stored.is_public,
                created_at: stored.created_at,
                updated_at: stored.updated_at,
            },
            items,
        }
    }

    fn write_items(&mut self, list_id: i64, items: Vec<NewListItem>) {
        self.list_items.retain(|_, item| item.list_id != list_id);
        for item in items {
            let id = self.next_id();
            self.list_items.insert(
                id,
                ListItem {
                    id,
                    list_id,
                    media_id: item.key.media_id,
                    media_type: item.key.media_type,
                    order: item.order,
                },
            );
        }
    }
}

/// Newest first; ids are handed out in creation order.
fn newest_first<T: Clone>(rows: impl DoubleEndedIterator<Item = T>) -> Vec<T> {
    rows.rev().collect()
}

fn page_of<T>(rows: Vec<T>, page: PageRequest) -> Page<T> {
    let total = rows.len() as i64;
    let items = rows
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.limit as usize)
        .collect();
    Page::new(items, page, total)
}

fn duplicate(table: &str) -> DomainError {
    DomainError::Conflict(format!("{table} entry already exists"))
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User> {
        let mut t = self.tables.write().await;
        if t.username_taken(&user.username, None) || t.users.values().any(|u| u.email == user.email) {
            return Err(duplicate("users"));
        }
        let id = t.next_id();
        let created = User {
            id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            profile_picture: None,
            slogan: None,
            created_at: Utc::now(),
        };
        t.users.insert(id, created.clone());
        Ok(created)
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let t = self.tables.read().await;
        Ok(t.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let t = self.tables.read().await;
        Ok(t.users
            .values()
            .find(|u| u.username.eq_ignore_ascii_case(username))
            .cloned())
    }

    async fn list_users(&self, page: PageRequest) -> Result<Page<PublicUser>> {
        let t = self.tables.read().await;
        Ok(page_of(t.users.values().map(PublicUser::from).collect(), page))
    }

    async fn search_users(&self, query: &str, limit: u32) -> Result<Vec<PublicUser>> {
        let needle = query.to_lowercase();
        let t = self.tables.read().await;
        let mut found: Vec<PublicUser> = t
            .users
            .values()
            .filter(|u| u.username.to_lowercase().contains(&needle))
            .map(PublicUser::from)
            .collect();
        found.sort_by(|a, b| a.username.cmp(&b.username));
        found.truncate(limit as usize);
        Ok(found)
    }

    async fn update_profile(&self, id: UserId, changes: ProfileChanges) -> Result<Option<User>> {
        let mut t = self.tables.write().await;
        if let Some(username) = &changes.username {
            if t.username_taken(username, Some(id)) {
                return Err(duplicate("users"));
            }
        }
        let Some(user) = t.users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(username) = changes.username {
            user.username = username;
        }
        if let Some(slogan) = changes.slogan {
            user.slogan = slogan;
        }
        Ok(Some(user.clone()))
    }

    async fn set_profile_picture(&self, id: UserId, path: Option<String>) -> Result<Option<User>> {
        let mut t = self.tables.write().await;
        Ok(t.users.get_mut(&id).map(|user| {
            user.profile_picture = path;
            user.clone()
        }))
    }

    async fn delete_user(&self, id: UserId) -> Result<bool> {
        let mut t = self.tables.write().await;
        if t.users.remove(&id).is_none() {
            return Ok(false);
        }
        t.ratings.retain(|_, r| r.user_id != id);
        t.likes.retain(|_, l| l.user_id != id);
        t.watchlist.retain(|_, w| w.user_id != id);
        t.private_watchlists.remove(&id);
        t.reviews.retain(|_, r| r.user_id != id);
        t.rankings.retain(|(owner, _), _| *owner != id);

        let owned: Vec<i64> = t.lists.values().filter(|l| l.user_id == id).map(|l| l.id).collect();
        t.lists.retain(|_, l| l.user_id != id);
        t.list_items.retain(|_, item| !owned.contains(&item.list_id));
        Ok(true)
    }
}

#[async_trait]
impl RatingRepository for MemoryStore {
    async fn find_rating(&self, user_id: UserId, key: MediaKey) -> Result<Option<Rating>> {
        let t = self.tables.read().await;
        Ok(t.ratings
            .values()
            .find(|r| r.user_id == user_id && r.key() == key)
            .cloned())
    }

    async fn insert_rating(&self, user_id: UserId, key: MediaKey, score: f64) -> Result<Rating> {
        let mut t = self.tables.write().await;
        t.require_user(user_id)?;
        if t.ratings.values().any(|r| r.user_id == user_id && r.key() == key) {
            return Err(duplicate("ratings"));
        }
        let now = Utc::now();
        let id = t.next_id();
        let rating = Rating {
            id,
            user_id,
            media_id: key.media_id,
            media_type: key.media_type,
            score,
            created_at: now,
            updated_at: now,
        };
        t.ratings.insert(id, rating.clone());
        Ok(rating)
    }

    async fn update_rating(&self, rating_id: i64, score: f64) -> Result<Rating> {
        let mut t = self.tables.write().await;
        let rating = t
            .ratings
            .get_mut(&rating_id)
            .ok_or_else(|| DomainError::not_found("rating"))?;
        rating.score = score;
        rating.updated_at = Utc::now();
        Ok(rating.clone())
    }

    async fn delete_rating(&self, user_id: UserId, key: MediaKey) -> Result<bool> {
        let mut t = self.tables.write().await;
        let before = t.ratings.len();
        t.ratings.retain(|_, r| !(r.user_id == user_id && r.key() == key));
        Ok(t.ratings.len() != before)
    }

    async fn ratings_for_user(&self, user_id: UserId) -> Result<Vec<Rating>> {
        let t = self.tables.read().await;
        Ok(newest_first(t.ratings.values().filter(|r| r.user_id == user_id).cloned()))
    }

    async fn count_ratings(&self, user_id: UserId) -> Result<i64> {
        let t = self.tables.read().await;
        Ok(t.ratings.values().filter(|r| r.user_id == user_id).count() as i64)
    }
}

#[async_trait]
impl LikeRepository for MemoryStore {
    async fn find_like(&self, user_id: UserId, key: MediaKey) -> Result<Option<Like>> {
        let t = self.tables.read().await;
        Ok(t.likes
            .values()
            .find(|l| l.user_id == user_id && l.key() == key)
            .cloned())
    }

    async fn insert_like(&self, user_id: UserId, key: MediaKey) -> Result<Like> {
        let mut t = self.tables.write().await;
        t.require_user(user_id)?;
        if t.likes.values().any(|l| l.user_id == user_id && l.key() == key) {
            return Err(duplicate("likes"));
        }
        let id = t.next_id();
        let like = Like {
            id,
            user_id,
            media_id: key.media_id,
            media_type: key.media_type,
            created_at: Utc::now(),
        };
        t.likes.insert(id, like.clone());
        Ok(like)
    }

    async fn delete_like(&self, user_id: UserId, key: MediaKey) -> Result<bool> {
        let mut t = self.tables.write().await;
        let before = t.likes.len();
        t.likes.retain(|_, l| !(l.user_id == user_id && l.key() == key));
        Ok(t.likes.len() != before)
    }

    async fn likes_for_user(&self, user_id: UserId) -> Result<Vec<Like>> {
        let t = self.tables.read().await;
        Ok(newest_first(t.likes.values().filter(|l| l.user_id == user_id).cloned()))
    }

    async fn count_likes(&self, user_id: UserId) -> Result<i64> {
        let t = self.tables.read().await;
        Ok(t.likes.values().filter(|l| l.user_id == user_id).count() as i64)
    }
}

#[async_trait]
impl WatchlistRepository for MemoryStore {
    async fn find_watchlist_entry(&self, user_id: UserId, key: MediaKey) -> Result<Option<WatchlistEntry>> {
        let t = self.tables.read().await;
        Ok(t.watchlist
            .values()
            .find(|w| w.user_id == user_id && w.key() == key)
            .cloned())
    }

    async fn insert_watchlist_entry(&self, user_id: UserId, key: MediaKey) -> Result<WatchlistEntry> {
        let mut t = self.tables.write().await;
        t.require_user(user_id)?;
        if t.watchlist.values().any(|w| w.user_id == user_id && w.key() == key) {
            return Err(duplicate("watchlist"));
        }
        let is_public = !t.private_watchlists.contains(&user_id);
        let id = t.next_id();
        let entry = WatchlistEntry {
            id,
            user_id,
            media_id: key.media_id,
            media_type: key.media_type,
            is_public,
            created_at: Utc::now(),
        };
        t.watchlist.insert(id, entry.clone());
        Ok(entry)
    }

    async fn delete_watchlist_entry(&self, user_id: UserId, key: MediaKey) -> Result<bool> {
        let mut t = self.tables.write().await;
        let before = t.watchlist.len();
        t.watchlist.retain(|_, w| !(w.user_id == user_id && w.key() == key));
        Ok(t.watchlist.len() != before)
    }

    async fn watchlist_for_user(&self, user_id: UserId) -> Result<Vec<WatchlistEntry>> {
        let t = self.tables.read().await;
        Ok(newest_first(t.watchlist.values().filter(|w| w.user_id == user_id).cloned()))
    }

    async fn count_watchlist(&self, user_id: UserId) -> Result<i64> {
        let t = self.tables.read().await;
        Ok(t.watchlist.values().filter(|w| w.user_id == user_id).count() as i64)
    }

    async fn watchlist_visibility(&self, user_id: UserId) -> Result<bool> {
        let t = self.tables.read().await;
        Ok(!t.private_watchlists.contains(&user_id))
    }

    async fn set_watchlist_visibility(&self, user_id: UserId, is_public: bool) -> Result<u64> {
        let mut t = self.tables.write().await;
        if !t.users.contains_key(&user_id) {
            return Ok(0);
        }
        if is_public {
            t.private_watchlists.remove(&user_id);
        } else {
            t.private_watchlists.insert(user_id);
        }
        let mut updated = 0;
        for entry in t.watchlist.values_mut().filter(|w| w.user_id == user_id) {
            entry.is_public = is_public;
            updated += 1;
        }
        Ok(updated)
    }
}

#[async_trait]
impl ReviewRepository for MemoryStore {
    async fn find_review(&self, user_id: UserId, key: MediaKey) -> Result<Option<Review>> {
        let t = self.tables.read().await;
        Ok(t.reviews
            .values()
            .find(|r| r.user_id == user_id && r.key() == key)
            .cloned())
    }

    async fn insert_review(&self, user_id: UserId, key: MediaKey, text: String) -> Result<Review> {
        let mut t = self.tables.write().await;
        t.require_user(user_id)?;
        if t.reviews.values().any(|r| r.user_id == user_id && r.key() == key) {
            return Err(duplicate("reviews"));
        }
        let now = Utc::now();
        let id = t.next_id();
        let review = Review {
            id,
            user_id,
            media_id: key.media_id,
            media_type: key.media_type,
            review_text: text,
            created_at: now,
            updated_at: now,
        };
        t.reviews.insert(id, review.clone());
        Ok(review)
    }

    async fn update_review(&self, review_id: i64, text: String) -> Result<Review> {
        let mut t = self.tables.write().await;
        let review = t
            .reviews
            .get_mut(&review_id)
            .ok_or_else(|| DomainError::not_found("review"))?;
        review.review_text = text;
        review.updated_at = Utc::now();
        Ok(review.clone())
    }

    async fn delete_review(&self, user_id: UserId, key: MediaKey) -> Result<bool> {
        let mut t = self.tables.write().await;
        let before = t.reviews.len();
        t.reviews.retain(|_, r| !(r.user_id == user_id && r.key() == key));
        Ok(t.reviews.len() != before)
    }

    async fn reviews_for_media(&self, key: MediaKey) -> Result<Vec<AuthoredReview>> {
        let t = self.tables.read().await;
        newest_first(t.reviews.values().filter(|r| r.key() == key))
            .into_iter()
            .map(|review| -> Result<AuthoredReview> {
                Ok(AuthoredReview {
                    author: t.public_user(review.user_id)?,
                    review: review.clone(),
                })
            })
            .collect()
    }

    async fn reviews_by_user(&self, user_id: UserId) -> Result<Vec<Review>> {
        let t = self.tables.read().await;
        Ok(newest_first(t.reviews.values().filter(|r| r.user_id == user_id).cloned()))
    }

    async fn recent_reviews(&self, page: PageRequest) -> Result<Page<AuthoredReview>> {
        let t = self.tables.read().await;
        let authored = newest_first(t.reviews.values())
            .into_iter()
            .map(|review| -> Result<AuthoredReview> {
                Ok(AuthoredReview {
                    author: t.public_user(review.user_id)?,
                    review: review.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(page_of(authored, page))
    }

    async fn count_reviews(&self, user_id: UserId) -> Result<i64> {
        let t = self.tables.read().await;
        Ok(t.reviews.values().filter(|r| r.user_id == user_id).count() as i64)
    }
}

#[async_trait]
impl RankingRepository for MemoryStore {
    async fn replace_ranking(
        &self,
        user_id: UserId,
        kind: RankingKind,
        items: Vec<RankedItem>,
    ) -> Result<Vec<RankedEntry>> {
        let mut t = self.tables.write().await;
        t.require_user(user_id)?;
        let now = Utc::now();
        let mut entries: Vec<RankedEntry> = items
            .into_iter()
            .map(|item| RankedEntry {
                user_id,
                item_id: item.item_id,
                order: item.order,
                created_at: now,
            })
            .collect();
        entries.sort_by_key(|e| e.order);
        t.rankings.insert((user_id, kind), entries.clone());
        Ok(entries)
    }

    async fn ranking_for_user(&self, user_id: UserId, kind: RankingKind) -> Result<Vec<RankedEntry>> {
        let t = self.tables.read().await;
        Ok(t.rankings.get(&(user_id, kind)).cloned().unwrap_or_default())
    }

    async fn remove_ranked(&self, user_id: UserId, kind: RankingKind, item_id: i64) -> Result<bool> {
        let mut t = self.tables.write().await;
        let Some(entries) = t.rankings.get_mut(&(user_id, kind)) else {
            return Ok(false);
        };
        let before = entries.len();
        entries.retain(|e| e.item_id != item_id);
        Ok(entries.len() != before)
    }
}

#[async_trait]
impl ListRepository for MemoryStore {
    async fn create_list(&self, list: NewList, items: Vec<NewListItem>) -> Result<ListWithItems> {
        let mut t = self.tables.write().await;
        t.require_user(list.user_id)?;
        let now = Utc::now();
        let id = t.next_id();
        let stored = StoredList {
            id,
            user_id: list.user_id,
            name: list.name,
            description: list.description,
            is_numbered: list.is_numbered,
            is_public: list.is_public,
            created_at: now,
            updated_at: now,
        };
        t.lists.insert(id, stored.clone());
        t.write_items(id, items);
        Ok(t.hydrate(&stored))
    }

    async fn find_list(&self, list_id: i64) -> Result<Option<ListWithItems>> {
        let t = self.tables.read().await;
        Ok(t.lists.get(&list_id).map(|stored| t.hydrate(stored)))
    }

    async fn update_list(
        &self,
        list_id: i64,
        changes: ListChanges,
        items: Option<Vec<NewListItem>>,
    ) -> Result<Option<ListWithItems>> {
        let mut t = self.tables.write().await;
        let Some(stored) = t.lists.get_mut(&list_id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            stored.name = name;
        }
        if let Some(description) = changes.description {
            stored.description = description;
        }
        if let Some(is_numbered) = changes.is_numbered {
            stored.is_numbered = is_numbered;
        }
        if let Some(is_public) = changes.is_public {
            stored.is_public = is_public;
        }
        stored.updated_at = Utc::now();
        let stored = stored.clone();

        if let Some(items) = items {
            t.write_items(list_id, items);
        }
        Ok(Some(t.hydrate(&stored)))
    }

    async fn delete_list(&self, list_id: i64) -> Result<bool> {
        let mut t = self.tables.write().await;
        if t.lists.remove(&list_id).is_none() {
            return Ok(false);
        }
        t.list_items.retain(|_, item| item.list_id != list_id);
        Ok(true)
    }

    async fn lists_for_user(&self, user_id: UserId, include_private: bool) -> Result<Vec<ListWithItems>> {
        let t = self.tables.read().await;
        Ok(newest_first(
            t.lists
                .values()
                .filter(|l| l.user_id == user_id && (include_private || l.is_public)),
        )
        .into_iter()
        .map(|stored| t.hydrate(stored))
        .collect())
    }

    async fn public_lists(&self, page: PageRequest) -> Result<Page<ListWithItems>> {
        let t = self.tables.read().await;
        let public: Vec<&StoredList> = newest_first(t.lists.values().filter(|l| l.is_public));
        let page = page_of(public, page);
        Ok(Page {
            items: page.items.into_iter().map(|stored| t.hydrate(stored)).collect(),
            page: page.page,
            limit: page.limit,
            total: page.total,
        })
    }

    async fn count_public_lists(&self, user_id: UserId) -> Result<i64> {
        let t = self.tables.read().await;
        Ok(t.lists
            .values()
            .filter(|l| l.user_id == user_id && l.is_public)
            .count() as i64)
    }
}
