use crate::{
    db::{self, Database},
    error::AppError,
    model::item::Item,
};
use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use sqlx::{AnyConnection, Connection};
use tracing::{debug, info, instrument};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateItem {
    /// Missing is treated the same as blank: a validation error.
    #[serde(default)]
    #[schema(example = "E2E Item")]
    pub name: String,
    #[schema(example = "End-to-end test", nullable = true)]
    pub description: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = "Item 1 deleted")]
    pub message: String,
}

/// Create Item
#[utoipa::path(
    post,
    path = "/items",
    request_body = CreateItem,
    responses(
        (status = 200, description = "Item created", body = Item),
        (status = 400, description = "Missing or blank name", body = Object, example = json!({
            "message": "name is required"
        })),
        (status = 503, description = "Database unavailable")
    ),
    tag = "Items"
)]
#[instrument(name = "create_item", skip(db, payload))]
pub async fn create_item(
    db: web::Data<Database>,
    payload: web::Json<CreateItem>,
) -> Result<HttpResponse, AppError> {
    let CreateItem { name, description } = payload.into_inner();

    if name.trim().is_empty() {
        return Err(AppError::Validation("name is required".into()));
    }

    let mut conn = db.acquire().await?;
    let result = insert_item(&mut conn, &name, description.as_deref()).await;
    conn.release().await;

    let item = result?;
    info!(item_id = item.id, "Item created");
    Ok(HttpResponse::Ok().json(item))
}

async fn insert_item(
    conn: &mut AnyConnection,
    name: &str,
    description: Option<&str>,
) -> Result<Item, AppError> {
    let mut tx = conn.begin().await?;

    sqlx::query("INSERT INTO items (name, description) VALUES (?, ?)")
        .bind(name)
        .bind(description)
        .execute(&mut *tx)
        .await?;

    let id = db::last_insert_id(&mut tx).await?;

    let item = sqlx::query_as::<_, Item>("SELECT id, name, description FROM items WHERE id = ?")
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(item)
}

/// List Items
#[utoipa::path(
    get,
    path = "/items",
    responses(
        (status = 200, description = "All items, ordered by id", body = [Item]),
        (status = 503, description = "Database unavailable")
    ),
    tag = "Items"
)]
pub async fn list_items(db: web::Data<Database>) -> Result<HttpResponse, AppError> {
    let mut conn = db.acquire().await?;
    let result = sqlx::query_as::<_, Item>("SELECT id, name, description FROM items ORDER BY id")
        .fetch_all(&mut *conn)
        .await;
    conn.release().await;

    let items = result?;
    debug!(count = items.len(), "Fetched items");
    Ok(HttpResponse::Ok().json(items))
}

/// Get Item by ID
#[utoipa::path(
    get,
    path = "/items/{id}",
    params(
        ("id" = i64, Path, description = "Item ID")
    ),
    responses(
        (status = 200, description = "Item found", body = Item),
        (status = 404, description = "Item not found", body = Object, example = json!({
            "message": "Item not found"
        })),
        (status = 503, description = "Database unavailable")
    ),
    tag = "Items"
)]
#[instrument(name = "get_item", skip(db))]
pub async fn get_item(
    db: web::Data<Database>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let item_id = path.into_inner();

    let mut conn = db.acquire().await?;
    let result = sqlx::query_as::<_, Item>("SELECT id, name, description FROM items WHERE id = ?")
        .bind(item_id)
        .fetch_optional(&mut *conn)
        .await;
    conn.release().await;

    match result? {
        Some(item) => Ok(HttpResponse::Ok().json(item)),
        None => Err(AppError::NotFound("Item")),
    }
}

/// Delete Item
///
/// Deleting an id that does not exist still succeeds.
#[utoipa::path(
    delete,
    path = "/items/{id}",
    params(
        ("id" = i64, Path, description = "Item ID")
    ),
    responses(
        (status = 200, description = "Item deleted (or already absent)", body = MessageResponse),
        (status = 503, description = "Database unavailable")
    ),
    tag = "Items"
)]
#[instrument(name = "delete_item", skip(db))]
pub async fn delete_item(
    db: web::Data<Database>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let item_id = path.into_inner();

    let mut conn = db.acquire().await?;
    let result = sqlx::query("DELETE FROM items WHERE id = ?")
        .bind(item_id)
        .execute(&mut *conn)
        .await;
    conn.release().await;

    let removed = result?.rows_affected();
    debug!(item_id, removed, "Delete item");

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: format!("Item {item_id} deleted"),
    }))
}
