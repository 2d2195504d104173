use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

use super::repo::Meal;

/// Body of `POST /meals`; also what the random source hands back.
#[derive(Debug, Clone, Deserialize)]
pub struct NewMeal {
    pub name: String,
    pub categoria: String,
    pub area: String,
    pub image_url: String,
}

impl NewMeal {
    pub fn validate(&self) -> AppResult<()> {
        for (field, value) in [
            ("name", &self.name),
            ("categoria", &self.categoria),
            ("area", &self.area),
            ("image_url", &self.image_url),
        ] {
            if value.trim().is_empty() {
                return Err(AppError::Validation(format!("{field} es obligatorio")));
            }
        }
        Ok(())
    }
}

/// Body of `PUT /meals/:id`. Null, absent and "" all mean "keep".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MealUpdate {
    pub name: Option<String>,
    pub categoria: Option<String>,
    pub area: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MealList {
    pub total: usize,
    pub meals: Vec<Meal>,
}

#[derive(Debug, Serialize)]
pub struct MealMessage {
    pub mensaje: String,
    pub meal: Meal,
}

#[derive(Debug, Serialize)]
pub struct Message {
    pub mensaje: String,
}

#[derive(Debug, Serialize)]
pub struct DeletedAll {
    pub mensaje: String,
    pub total_eliminados: i64,
}
