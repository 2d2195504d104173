use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{Connection, FromRow, Postgres, QueryBuilder};
use time::{Date, OffsetDateTime};
use tracing::debug;

use crate::db::{self, Database};
use crate::error::{AppError, AppResult};

use super::dto::{ProductChange, ProductCreate, ProductFilter};

const COLUMNS: &str = "id, codigo_barras, nombre, descripcion, categoria, proveedor, \
    precio_compra, precio_venta, stock_actual, stock_minimo, fecha_vencimiento, \
    fecha_creacion, activo";

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Product {
    pub id: i32,
    pub codigo_barras: String,
    pub nombre: String,
    pub descripcion: Option<String>,
    pub categoria: Option<String>,
    pub proveedor: Option<String>,
    pub precio_compra: Decimal,
    pub precio_venta: Decimal,
    pub stock_actual: i32,
    pub stock_minimo: i32,
    #[serde(with = "super::iso_date::option")]
    pub fecha_vencimiento: Option<Date>,
    #[serde(with = "time::serde::rfc3339")]
    pub fecha_creacion: OffsetDateTime,
    pub activo: bool,
}

fn not_found() -> AppError {
    AppError::NotFound("Producto no encontrado".into())
}

fn list_query(filters: Vec<ProductFilter>) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!("SELECT {COLUMNS} FROM productos"));
    for (i, filter) in filters.into_iter().enumerate() {
        qb.push(if i == 0 { " WHERE " } else { " AND " });
        match filter {
            ProductFilter::Activo(v) => qb.push("activo = ").push_bind(v),
            ProductFilter::Categoria(v) => qb.push("categoria = ").push_bind(v),
        };
    }
    qb.push(" ORDER BY nombre");
    qb
}

/// `changes` must not be empty; the caller rejects empty payloads.
fn update_query(id: i32, changes: Vec<ProductChange>) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("UPDATE productos SET ");
    let mut set = qb.separated(", ");
    for change in changes {
        set.push(format_args!("{} = ", change.column()));
        match change {
            ProductChange::CodigoBarras(v)
            | ProductChange::Nombre(v)
            | ProductChange::Descripcion(v)
            | ProductChange::Categoria(v)
            | ProductChange::Proveedor(v) => set.push_bind_unseparated(v),
            ProductChange::PrecioCompra(v) | ProductChange::PrecioVenta(v) => {
                set.push_bind_unseparated(v)
            }
            ProductChange::StockActual(v) | ProductChange::StockMinimo(v) => {
                set.push_bind_unseparated(v)
            }
            ProductChange::FechaVencimiento(v) => set.push_bind_unseparated(v),
            ProductChange::Activo(v) => set.push_bind_unseparated(v),
        };
    }
    qb.push(" WHERE id = ")
        .push_bind(id)
        .push(format_args!(" RETURNING {COLUMNS}"));
    qb
}

pub async fn list(db: &Database, filters: Vec<ProductFilter>) -> AppResult<Vec<Product>> {
    let mut conn = db.connect().await?;
    let mut qb = list_query(filters);
    let rows = qb.build_query_as::<Product>().fetch_all(&mut conn).await?;
    conn.close().await?;
    Ok(rows)
}

pub async fn get(db: &Database, id: i32) -> AppResult<Product> {
    let mut conn = db.connect().await?;
    let product = sqlx::query_as::<_, Product>(&format!(
        "SELECT {COLUMNS} FROM productos WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(&mut conn)
    .await?;
    conn.close().await?;
    product.ok_or_else(not_found)
}

/// Single INSERT ... RETURNING, so the caller always sees the row it created.
pub async fn create(db: &Database, data: ProductCreate) -> AppResult<Product> {
    let mut conn = db.connect().await?;
    let product = sqlx::query_as::<_, Product>(&format!(
        r#"
        INSERT INTO productos (
            codigo_barras, nombre, descripcion, categoria, proveedor,
            precio_compra, precio_venta, stock_actual, stock_minimo, fecha_vencimiento
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING {COLUMNS}
        "#
    ))
    .bind(data.codigo_barras)
    .bind(data.nombre)
    .bind(data.descripcion)
    .bind(data.categoria)
    .bind(data.proveedor)
    .bind(data.precio_compra)
    .bind(data.precio_venta)
    .bind(data.stock_actual)
    .bind(data.stock_minimo)
    .bind(data.fecha_vencimiento)
    .fetch_one(&mut conn)
    .await?;
    db::release(conn).await;
    debug!(product_id = product.id, "product inserted");
    Ok(product)
}

/// Writes only the given columns. No version check: last write wins.
pub async fn update(db: &Database, id: i32, changes: Vec<ProductChange>) -> AppResult<Product> {
    if changes.is_empty() {
        return Err(AppError::Validation(
            "No se enviaron campos para actualizar".into(),
        ));
    }
    let mut conn = db.connect().await?;
    let mut qb = update_query(id, changes);
    let product = qb
        .build_query_as::<Product>()
        .fetch_optional(&mut conn)
        .await?;
    db::release(conn).await;
    product.ok_or_else(not_found)
}

pub async fn delete(db: &Database, id: i32) -> AppResult<()> {
    let mut conn = db.connect().await?;
    let result = sqlx::query("DELETE FROM productos WHERE id = $1")
        .bind(id)
        .execute(&mut conn)
        .await?;
    db::release(conn).await;
    if result.rows_affected() == 0 {
        return Err(not_found());
    }
    Ok(())
}
