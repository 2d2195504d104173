use serde::{Deserialize, Serialize};
use sqlx::{Connection, FromRow};
use tracing::debug;

use crate::db::{self, Database};
use crate::error::{AppError, AppResult};

use super::dto::{MealUpdate, NewMeal};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Meal {
    pub id: i32,
    pub name: String,
    pub categoria: String,
    pub area: String,
    pub image_url: String,
}

impl Meal {
    /// Overlays the non-empty fields of `changes`; empty and absent both keep
    /// the stored value.
    pub fn merged(self, changes: MealUpdate) -> Meal {
        fn pick(new: Option<String>, old: String) -> String {
            match new {
                Some(v) if !v.is_empty() => v,
                _ => old,
            }
        }
        Meal {
            id: self.id,
            name: pick(changes.name, self.name),
            categoria: pick(changes.categoria, self.categoria),
            area: pick(changes.area, self.area),
            image_url: pick(changes.image_url, self.image_url),
        }
    }
}

fn not_found() -> AppError {
    AppError::NotFound("Comida no encontrada".into())
}

pub async fn list_all(db: &Database) -> AppResult<Vec<Meal>> {
    let mut conn = db.connect().await?;
    let rows = sqlx::query_as::<_, Meal>(
        r#"
        SELECT id, name, categoria, area, image_url
        FROM meals
        ORDER BY id DESC
        "#,
    )
    .fetch_all(&mut conn)
    .await?;
    conn.close().await?;
    Ok(rows)
}

pub async fn get(db: &Database, id: i32) -> AppResult<Meal> {
    let mut conn = db.connect().await?;
    let meal = sqlx::query_as::<_, Meal>(
        r#"
        SELECT id, name, categoria, area, image_url
        FROM meals
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(&mut conn)
    .await?;
    conn.close().await?;
    meal.ok_or_else(not_found)
}

pub async fn create(db: &Database, data: &NewMeal) -> AppResult<Meal> {
    let mut conn = db.connect().await?;
    let meal = sqlx::query_as::<_, Meal>(
        r#"
        INSERT INTO meals (name, categoria, area, image_url)
        VALUES ($1, $2, $3, $4)
        RETURNING id, name, categoria, area, image_url
        "#,
    )
    .bind(&data.name)
    .bind(&data.categoria)
    .bind(&data.area)
    .bind(&data.image_url)
    .fetch_one(&mut conn)
    .await?;
    db::release(conn).await;
    debug!(meal_id = meal.id, "meal inserted");
    Ok(meal)
}

/// Read, merge, then write the whole row back. Concurrent updates race and
/// the last write wins.
pub async fn update(db: &Database, id: i32, changes: MealUpdate) -> AppResult<Meal> {
    let mut conn = db.connect().await?;
    let existing = sqlx::query_as::<_, Meal>(
        r#"
        SELECT id, name, categoria, area, image_url
        FROM meals
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(&mut conn)
    .await?
    .ok_or_else(not_found)?;

    let merged = existing.merged(changes);
    sqlx::query(
        r#"
        UPDATE meals
        SET name = $1, categoria = $2, area = $3, image_url = $4
        WHERE id = $5
        "#,
    )
    .bind(&merged.name)
    .bind(&merged.categoria)
    .bind(&merged.area)
    .bind(&merged.image_url)
    .bind(id)
    .execute(&mut conn)
    .await?;
    db::release(conn).await;
    Ok(merged)
}

pub async fn delete(db: &Database, id: i32) -> AppResult<()> {
    let mut conn = db.connect().await?;
    let result = sqlx::query("DELETE FROM meals WHERE id = $1")
        .bind(id)
        .execute(&mut conn)
        .await?;
    db::release(conn).await;
    if result.rows_affected() == 0 {
        return Err(not_found());
    }
    Ok(())
}

/// Returns how many rows existed right before the delete.
pub async fn delete_all(db: &Database) -> AppResult<i64> {
    let mut conn = db.connect().await?;
    let mut tx = conn.begin().await?;
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM meals")
        .fetch_one(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM meals").execute(&mut *tx).await?;
    tx.commit().await?;
    db::release(conn).await;
    Ok(count)
}
