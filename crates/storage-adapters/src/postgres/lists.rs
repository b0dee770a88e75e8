use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domains::errors::{DomainError, Result};
use domains::models::{
    ListChanges, ListItem, ListWithItems, MediaList, NewList, NewListItem, Page, PageRequest, UserId,
};
use domains::ports::ListRepository;
use sqlx::PgConnection;

use super::{db_error, media_type, PgStore};

const LIST_SELECT: &str = "SELECT l.id, l.user_id, u.username AS owner_username, l.name, \
     l.description, l.is_numbered, l.is_public, l.created_at, l.updated_at \
     FROM lists l JOIN users u ON u.id = l.user_id";

#[derive(sqlx::FromRow)]
struct ListRow {
    id: i64,
    user_id: i64,
    owner_username: String,
    name: String,
    description: Option<String>,
    is_numbered: bool,
    is_public: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ListRow> for MediaList {
    fn from(row: ListRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            owner_username: row.owner_username,
            name: row.name,
            description: row.description,
            is_numbered: row.is_numbered,
            is_public: row.is_public,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ListItemRow {
    id: i64,
    list_id: i64,
    media_id: i64,
    media_type: String,
    position: i32,
}

impl TryFrom<ListItemRow> for ListItem {
    type Error = DomainError;

    fn try_from(row: ListItemRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            list_id: row.list_id,
            media_id: row.media_id,
            media_type: media_type(&row.media_type)?,
            order: row.position,
        })
    }
}

/// Loads the items of every list in `rows` with one query and attaches them.
async fn hydrate(conn: &mut PgConnection, rows: Vec<ListRow>) -> Result<Vec<ListWithItems>> {
    let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
    let mut items: HashMap<i64, Vec<ListItem>> = HashMap::new();

    if !ids.is_empty() {
        let item_rows = sqlx::query_as::<_, ListItemRow>(
            "SELECT id, list_id, media_id, media_type, position FROM list_items \
             WHERE list_id = ANY($1) ORDER BY list_id, position, id",
        )
        .bind(&ids)
        .fetch_all(&mut *conn)
        .await
        .map_err(db_error)?;

        for row in item_rows {
            let item = ListItem::try_from(row)?;
            items.entry(item.list_id).or_default().push(item);
        }
    }

    Ok(rows
        .into_iter()
        .map(|row| {
            let items = items.remove(&row.id).unwrap_or_default();
            ListWithItems {
                list: row.into(),
                items,
            }
        })
        .collect())
}

async fn load_list(conn: &mut PgConnection, list_id: i64) -> Result<Option<ListWithItems>> {
    let row = sqlx::query_as::<_, ListRow>(&format!("{LIST_SELECT} WHERE l.id = $1"))
        .bind(list_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(db_error)?;
    match row {
        Some(row) => Ok(hydrate(conn, vec![row]).await?.pop()),
        None => Ok(None),
    }
}

async fn insert_items(conn: &mut PgConnection, list_id: i64, items: &[NewListItem]) -> Result<()> {
    if items.is_empty() {
        return Ok(());
    }
    let media_ids: Vec<i64> = items.iter().map(|item| item.key.media_id).collect();
    let media_types: Vec<String> = items
        .iter()
        .map(|item| item.key.media_type.as_str().to_owned())
        .collect();
    let positions: Vec<i32> = items.iter().map(|item| item.order).collect();

    sqlx::query(
        "INSERT INTO list_items (list_id, media_id, media_type, position) \
         SELECT $1, media_id, media_type, position \
         FROM UNNEST($2::bigint[], $3::text[], $4::int[]) AS t(media_id, media_type, position)",
    )
    .bind(list_id)
    .bind(&media_ids)
    .bind(&media_types)
    .bind(&positions)
    .execute(&mut *conn)
    .await
    .map_err(db_error)?;
    Ok(())
}

#[async_trait]
impl ListRepository for PgStore {
    async fn create_list(&self, list: NewList, items: Vec<NewListItem>) -> Result<ListWithItems> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        let list_id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO lists (user_id, name, description, is_numbered, is_public) \
             VALUES ($1, $2, $3, $4, $5) RETURNING id",
        )
        .bind(list.user_id)
        .bind(&list.name)
        .bind(&list.description)
        .bind(list.is_numbered)
        .bind(list.is_public)
        .fetch_one(&mut *tx)
        .await
        .map_err(|err| match db_error(err) {
            DomainError::NotFound(_) => DomainError::not_found("user"),
            other => other,
        })?;

        insert_items(&mut tx, list_id, &items).await?;
        let created = load_list(&mut tx, list_id)
            .await?
            .ok_or_else(|| DomainError::internal("list vanished inside its own transaction"))?;

        tx.commit().await.map_err(db_error)?;
        Ok(created)
    }

    async fn find_list(&self, list_id: i64) -> Result<Option<ListWithItems>> {
        let mut conn = self.pool.acquire().await.map_err(db_error)?;
        load_list(&mut conn, list_id).await
    }

    async fn update_list(
        &self,
        list_id: i64,
        changes: ListChanges,
        items: Option<Vec<NewListItem>>,
    ) -> Result<Option<ListWithItems>> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        let touch_description = changes.description.is_some();
        let updated = sqlx::query_scalar::<_, i64>(
            "UPDATE lists SET name = COALESCE($2, name), \
             description = CASE WHEN $3 THEN $4 ELSE description END, \
             is_numbered = COALESCE($5, is_numbered), \
             is_public = COALESCE($6, is_public), \
             updated_at = now() \
             WHERE id = $1 RETURNING id",
        )
        .bind(list_id)
        .bind(changes.name)
        .bind(touch_description)
        .bind(changes.description.flatten())
        .bind(changes.is_numbered)
        .bind(changes.is_public)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error)?;

        if updated.is_none() {
            return Ok(None);
        }

        if let Some(items) = items {
            sqlx::query("DELETE FROM list_items WHERE list_id = $1")
                .bind(list_id)
                .execute(&mut *tx)
                .await
                .map_err(db_error)?;
            insert_items(&mut tx, list_id, &items).await?;
        }

        let list = load_list(&mut tx, list_id).await?;
        tx.commit().await.map_err(db_error)?;
        Ok(list)
    }

    async fn delete_list(&self, list_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM lists WHERE id = $1")
            .bind(list_id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn lists_for_user(&self, user_id: UserId, include_private: bool) -> Result<Vec<ListWithItems>> {
        let mut conn = self.pool.acquire().await.map_err(db_error)?;
        let rows = sqlx::query_as::<_, ListRow>(&format!(
            "{LIST_SELECT} WHERE l.user_id = $1 AND (l.is_public OR $2) \
             ORDER BY l.created_at DESC, l.id DESC"
        ))
        .bind(user_id)
        .bind(include_private)
        .fetch_all(&mut *conn)
        .await
        .map_err(db_error)?;
        hydrate(&mut conn, rows).await
    }

    async fn public_lists(&self, page: PageRequest) -> Result<Page<ListWithItems>> {
        let mut conn = self.pool.acquire().await.map_err(db_error)?;
        let rows = sqlx::query_as::<_, ListRow>(&format!(
            "{LIST_SELECT} WHERE l.is_public ORDER BY l.created_at DESC, l.id DESC LIMIT $1 OFFSET $2"
        ))
        .bind(i64::from(page.limit))
        .bind(page.offset())
        .fetch_all(&mut *conn)
        .await
        .map_err(db_error)?;
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM lists WHERE is_public")
            .fetch_one(&mut *conn)
            .await
            .map_err(db_error)?;

        Ok(Page::new(hydrate(&mut conn, rows).await?, page, total))
    }

    async fn count_public_lists(&self, user_id: UserId) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM lists WHERE user_id = $1 AND is_public")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)
    }
}
