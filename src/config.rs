use anyhow::Context;
use serde::Deserialize;

const DEFAULT_THEMEALDB_URL: &str = "https://www.themealdb.com/api/json/v1/1/random.php";

/// Where the database lives: either a full URL or the individual parts.
#[derive(Debug, Clone, Deserialize)]
pub enum DatabaseConfig {
    Url(String),
    Parts {
        host: String,
        port: u16,
        name: String,
        user: String,
        password: String,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub host: String,
    pub meals_port: u16,
    pub products_port: u16,
    pub themealdb_url: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database = match std::env::var("DATABASE_URL") {
            Ok(url) => DatabaseConfig::Url(url),
            Err(_) => DatabaseConfig::Parts {
                host: std::env::var("DB_HOST").unwrap_or_else(|_| "localhost".into()),
                port: parse_port("DB_PORT", 5432)?,
                name: std::env::var("DB_NAME").context("DB_NAME or DATABASE_URL must be set")?,
                user: std::env::var("DB_USER").context("DB_USER must be set")?,
                password: std::env::var("DB_PASSWORD").context("DB_PASSWORD must be set")?,
            },
        };

        Ok(Self {
            database,
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            meals_port: parse_port("MEALS_PORT", 8000)?,
            products_port: parse_port("PRODUCTS_PORT", 8001)?,
            themealdb_url: std::env::var("THEMEALDB_URL")
                .unwrap_or_else(|_| DEFAULT_THEMEALDB_URL.into()),
        })
    }
}

fn parse_port(var: &str, default: u16) -> anyhow::Result<u16> {
    match std::env::var(var) {
        Ok(v) => v
            .parse::<u16>()
            .with_context(|| format!("{var} is not a valid port: {v}")),
        Err(_) => Ok(default),
    }
}
