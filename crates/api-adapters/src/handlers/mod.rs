//! # Handlers
//!
//! Thin request → service → response glue, grouped by resource.

pub mod accounts;
pub mod lists;
pub mod media;
pub mod ops;
pub mod rankings;
pub mod users;

use domains::errors::DomainError;
use domains::models::{MediaKey, MediaType, PageRequest};
use serde::Deserialize;
use services::validation;

use crate::error::ApiResult;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl From<PageQuery> for PageRequest {
    fn from(query: PageQuery) -> Self {
        PageRequest::new(query.page, query.limit)
    }
}

/// `?mediaType=` on reads, `{"mediaType": ...}` on writes.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaTypeParam {
    pub media_type: Option<MediaType>,
}

/// Combines the `:mediaId` path segment with the separately supplied type.
pub(crate) fn media_key(media_id: i64, media_type: Option<MediaType>) -> ApiResult<MediaKey> {
    validation::positive_id("mediaId", media_id)?;
    let media_type = media_type.ok_or_else(|| DomainError::validation("mediaType is required"))?;
    Ok(MediaKey::new(media_id, media_type))
}
