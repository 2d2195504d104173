use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use crate::{error::AppError, state::AppState};

use super::dto::{DeletedAll, MealList, MealMessage, MealUpdate, Message, NewMeal};
use super::repo::{self, Meal};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/meals", get(list_meals).post(create_meal).delete(delete_all_meals))
        .route("/meals/random/api", get(random_meal))
        .route(
            "/meals/:id",
            get(get_meal).put(update_meal).delete(delete_meal),
        )
}

#[instrument(skip(state))]
pub async fn list_meals(State(state): State<AppState>) -> Result<Json<MealList>, AppError> {
    let meals = repo::list_all(&state.db).await.map_err(|e| {
        error!(error = %e, "list meals failed");
        e
    })?;
    Ok(Json(MealList {
        total: meals.len(),
        meals,
    }))
}

#[instrument(skip(state))]
pub async fn get_meal(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Meal>, AppError> {
    match repo::get(&state.db, id).await {
        Ok(meal) => Ok(Json(meal)),
        Err(e @ AppError::NotFound(_)) => {
            warn!(meal_id = id, "meal not found");
            Err(e)
        }
        Err(e) => {
            error!(error = %e, meal_id = id, "get meal failed");
            Err(e)
        }
    }
}

/// Pulls one meal from the random source and stores it.
#[instrument(skip(state))]
pub async fn random_meal(State(state): State<AppState>) -> Result<Json<MealMessage>, AppError> {
    let data = state.random_meals.fetch().await.map_err(|e| {
        error!(error = %e, "random meal source failed");
        AppError::Upstream(format!("{e:#}"))
    })?;

    let meal = repo::create(&state.db, &data).await.map_err(|e| {
        error!(error = %e, "store random meal failed");
        e
    })?;

    info!(meal_id = meal.id, "random meal stored");
    Ok(Json(MealMessage {
        mensaje: "Comida guardada exitosamente".into(),
        meal,
    }))
}

#[instrument(skip(state, payload))]
pub async fn create_meal(
    State(state): State<AppState>,
    Json(payload): Json<NewMeal>,
) -> Result<Json<MealMessage>, AppError> {
    payload.validate()?;

    let meal = repo::create(&state.db, &payload).await.map_err(|e| {
        error!(error = %e, "create meal failed");
        e
    })?;

    info!(meal_id = meal.id, "meal created");
    Ok(Json(MealMessage {
        mensaje: "Comida creada exitosamente".into(),
        meal,
    }))
}

#[instrument(skip(state, payload))]
pub async fn update_meal(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<MealUpdate>,
) -> Result<Json<MealMessage>, AppError> {
    let meal = repo::update(&state.db, id, payload).await.map_err(|e| {
        if !matches!(e, AppError::NotFound(_)) {
            error!(error = %e, meal_id = id, "update meal failed");
        }
        e
    })?;

    info!(meal_id = id, "meal updated");
    Ok(Json(MealMessage {
        mensaje: "Comida actualizada exitosamente".into(),
        meal,
    }))
}

#[instrument(skip(state))]
pub async fn delete_meal(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Message>, AppError> {
    repo::delete(&state.db, id).await.map_err(|e| {
        if !matches!(e, AppError::NotFound(_)) {
            error!(error = %e, meal_id = id, "delete meal failed");
        }
        e
    })?;

    info!(meal_id = id, "meal deleted");
    Ok(Json(Message {
        mensaje: format!("Comida con ID {id} eliminada exitosamente"),
    }))
}

#[instrument(skip(state))]
pub async fn delete_all_meals(State(state): State<AppState>) -> Result<Json<DeletedAll>, AppError> {
    let count = repo::delete_all(&state.db).await.map_err(|e| {
        error!(error = %e, "delete all meals failed");
        e
    })?;

    info!(count, "all meals deleted");
    Ok(Json(DeletedAll {
        mensaje: format!("Se eliminaron {count} comidas exitosamente"),
        total_eliminados: count,
    }))
}
