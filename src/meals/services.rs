use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::dto::NewMeal;

/// Third-party source of a random meal, read-only.
#[async_trait]
pub trait RandomMealSource: Send + Sync {
    async fn fetch(&self) -> anyhow::Result<NewMeal>;
}

#[derive(Clone)]
pub struct TheMealDb {
    client: reqwest::Client,
    url: String,
}

impl TheMealDb {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RandomResponse {
    meals: Option<Vec<RandomMeal>>,
}

#[derive(Debug, Deserialize)]
struct RandomMeal {
    #[serde(rename = "strMeal")]
    name: Option<String>,
    #[serde(rename = "strCategory")]
    categoria: Option<String>,
    #[serde(rename = "strArea")]
    area: Option<String>,
    #[serde(rename = "strMealThumb")]
    image_url: Option<String>,
}

fn extract(body: RandomResponse) -> anyhow::Result<NewMeal> {
    let meal = body
        .meals
        .and_then(|m| m.into_iter().next())
        .context("random meal response has no meals")?;
    Ok(NewMeal {
        name: meal.name.context("strMeal missing")?,
        categoria: meal.categoria.context("strCategory missing")?,
        area: meal.area.context("strArea missing")?,
        image_url: meal.image_url.context("strMealThumb missing")?,
    })
}

#[async_trait]
impl RandomMealSource for TheMealDb {
    async fn fetch(&self) -> anyhow::Result<NewMeal> {
        let body = self
            .client
            .get(&self.url)
            .send()
            .await
            .context("random meal request")?
            .error_for_status()
            .context("random meal status")?
            .json::<RandomResponse>()
            .await
            .context("random meal body")?;
        let meal = extract(body)?;
        debug!(name = %meal.name, "random meal fetched");
        Ok(meal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_the_four_fields() {
        let body: RandomResponse = serde_json::from_str(
            r#"{"meals":[{"idMeal":"52772","strMeal":"Teriyaki Chicken Casserole",
                "strCategory":"Chicken","strArea":"Japanese",
                "strMealThumb":"https://www.themealdb.com/images/media/meals/wvpsxx1468256321.jpg",
                "strInstructions":"..."}]}"#,
        )
        .unwrap();
        let meal = extract(body).unwrap();
        assert_eq!(meal.name, "Teriyaki Chicken Casserole");
        assert_eq!(meal.categoria, "Chicken");
        assert_eq!(meal.area, "Japanese");
        assert!(meal.image_url.ends_with(".jpg"));
    }

    #[test]
    fn empty_or_null_meals_is_an_error() {
        let body: RandomResponse = serde_json::from_str(r#"{"meals":null}"#).unwrap();
        assert!(extract(body).is_err());
        let body: RandomResponse = serde_json::from_str(r#"{"meals":[]}"#).unwrap();
        assert!(extract(body).is_err());
    }

    #[test]
    fn missing_field_is_an_error() {
        let body: RandomResponse =
            serde_json::from_str(r#"{"meals":[{"strMeal":"X","strCategory":null}]}"#).unwrap();
        let err = extract(body).unwrap_err();
        assert!(err.to_string().contains("strCategory"));
    }
}
