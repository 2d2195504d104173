use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use crate::{error::AppError, state::AppState};

use super::dto::{Message, ProductCreate, ProductQuery, ProductUpdate};
use super::repo::{self, Product};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/productos/", get(list_products).post(create_product))
        .route("/api/productos", get(list_products).post(create_product))
        .route(
            "/api/productos/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
}

fn log_failure(e: &AppError, action: &str) {
    match e {
        AppError::NotFound(_) => {}
        AppError::Conflict(msg) | AppError::Validation(msg) => {
            warn!(detail = %msg, "{action} rejected")
        }
        other => error!(error = %other, "{action} failed"),
    }
}

#[instrument(skip(state, payload))]
pub async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<ProductCreate>,
) -> Result<Json<Product>, AppError> {
    if let Err(e) = payload.validate() {
        log_failure(&e, "create product");
        return Err(e);
    }

    let product = repo::create(&state.db, payload).await.map_err(|e| {
        log_failure(&e, "create product");
        e
    })?;

    info!(product_id = product.id, codigo_barras = %product.codigo_barras, "product created");
    Ok(Json(product))
}

#[instrument(skip(state))]
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<Vec<Product>>, AppError> {
    let products = repo::list(&state.db, query.into_filters())
        .await
        .map_err(|e| {
            log_failure(&e, "list products");
            e
        })?;
    Ok(Json(products))
}

#[instrument(skip(state))]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Product>, AppError> {
    let product = repo::get(&state.db, id).await.map_err(|e| {
        log_failure(&e, "get product");
        e
    })?;
    Ok(Json(product))
}

#[instrument(skip(state, payload))]
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<ProductUpdate>,
) -> Result<Json<Product>, AppError> {
    if let Err(e) = payload.validate() {
        log_failure(&e, "update product");
        return Err(e);
    }

    let product = repo::update(&state.db, id, payload.into_changes())
        .await
        .map_err(|e| {
            log_failure(&e, "update product");
            e
        })?;

    info!(product_id = id, "product updated");
    Ok(Json(product))
}

#[instrument(skip(state))]
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Message>, AppError> {
    repo::delete(&state.db, id).await.map_err(|e| {
        log_failure(&e, "delete product");
        e
    })?;

    info!(product_id = id, "product deleted");
    Ok(Json(Message {
        mensaje: format!("Producto con ID {id} eliminado exitosamente"),
    }))
}
