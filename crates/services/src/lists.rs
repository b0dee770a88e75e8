//! Freeform ordered lists.
//!
//! Only the owner may edit or delete a list; a list that exists but belongs
//! to someone else is reported as not found. Submitting `items` always
//! replaces the whole item set, renumbering from 1.

use std::sync::Arc;

use domains::errors::{DomainError, Result};
use domains::models::{
    ListChanges, ListWithItems, MediaKey, NewList, NewListItem, Page, PageRequest, UserId,
};
use domains::ports::ListRepository;
use tracing::{info, instrument};

use crate::validation;

#[derive(Debug, Clone, Default)]
pub struct ListDraft {
    pub name: String,
    pub description: Option<String>,
    pub is_numbered: Option<bool>,
    pub is_public: Option<bool>,
    pub items: Vec<MediaKey>,
}

#[derive(Debug, Clone, Default)]
pub struct ListEdit {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_numbered: Option<bool>,
    pub is_public: Option<bool>,
    pub items: Option<Vec<MediaKey>>,
}

pub struct ListService {
    lists: Arc<dyn ListRepository>,
}

impl ListService {
    pub fn new(lists: Arc<dyn ListRepository>) -> Self {
        Self { lists }
    }

    #[instrument(skip(self, draft), fields(items = draft.items.len()))]
    pub async fn create(&self, owner: UserId, draft: ListDraft) -> Result<ListWithItems> {
        let list = NewList {
            user_id: owner,
            name: validation::required_text("name", &draft.name, validation::LIST_NAME_MAX)?,
            description: validation::optional_text(
                "description",
                draft.description.as_deref(),
                validation::DESCRIPTION_MAX,
            )?,
            is_numbered: draft.is_numbered.unwrap_or(false),
            is_public: draft.is_public.unwrap_or(true),
        };
        let items = numbered(&draft.items)?;

        let created = self.lists.create_list(list, items).await?;
        info!(list_id = created.list.id, "list created");
        Ok(created)
    }

    /// A single list as seen by anyone: private lists do not exist here.
    pub async fn public(&self, list_id: i64) -> Result<ListWithItems> {
        match self.lists.find_list(list_id).await? {
            Some(found) if found.list.is_public => Ok(found),
            _ => Err(DomainError::not_found("list")),
        }
    }

    #[instrument(skip(self, edit))]
    pub async fn update(&self, list_id: i64, owner: UserId, edit: ListEdit) -> Result<ListWithItems> {
        self.owned(list_id, owner).await?;

        let changes = ListChanges {
            name: edit
                .name
                .as_deref()
                .map(|name| validation::required_text("name", name, validation::LIST_NAME_MAX))
                .transpose()?,
            description: edit
                .description
                .as_deref()
                .map(|text| validation::optional_text("description", Some(text), validation::DESCRIPTION_MAX))
                .transpose()?,
            is_numbered: edit.is_numbered,
            is_public: edit.is_public,
        };
        let items = edit.items.as_deref().map(numbered).transpose()?;

        self.lists
            .update_list(list_id, changes, items)
            .await?
            .ok_or_else(|| DomainError::not_found("list"))
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, list_id: i64, owner: UserId) -> Result<()> {
        self.owned(list_id, owner).await?;
        if !self.lists.delete_list(list_id).await? {
            return Err(DomainError::not_found("list"));
        }
        info!(list_id, "list deleted");
        Ok(())
    }

    /// The caller's lists, private ones included.
    pub async fn own(&self, owner: UserId) -> Result<Vec<ListWithItems>> {
        self.lists.lists_for_user(owner, true).await
    }

    /// Public lists of every user, newest first.
    pub async fn feed(&self, page: PageRequest) -> Result<Page<ListWithItems>> {
        self.lists.public_lists(page).await
    }

    async fn owned(&self, list_id: i64, owner: UserId) -> Result<ListWithItems> {
        match self.lists.find_list(list_id).await? {
            Some(found) if found.list.user_id == owner => Ok(found),
            _ => Err(DomainError::not_found("list")),
        }
    }
}

fn numbered(keys: &[MediaKey]) -> Result<Vec<NewListItem>> {
    for key in keys {
        validation::positive_id("mediaId", key.media_id)?;
    }
    validation::no_duplicates("items", keys.iter().copied())?;
    Ok(keys
        .iter()
        .zip(1..)
        .map(|(&key, order)| NewListItem { key, order })
        .collect())
}
