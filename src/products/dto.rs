use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::error::{AppError, AppResult};

fn default_stock_minimo() -> i32 {
    10
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductCreate {
    pub codigo_barras: String,
    pub nombre: String,
    pub descripcion: Option<String>,
    pub categoria: Option<String>,
    pub proveedor: Option<String>,
    pub precio_compra: Decimal,
    pub precio_venta: Decimal,
    #[serde(default)]
    pub stock_actual: i32,
    #[serde(default = "default_stock_minimo")]
    pub stock_minimo: i32,
    #[serde(default, with = "super::iso_date::option")]
    pub fecha_vencimiento: Option<Date>,
}

impl ProductCreate {
    pub fn validate(&self) -> AppResult<()> {
        required("codigo_barras", &self.codigo_barras, 50)?;
        required("nombre", &self.nombre, 100)?;
        optional("descripcion", self.descripcion.as_deref(), 255)?;
        optional("categoria", self.categoria.as_deref(), 50)?;
        optional("proveedor", self.proveedor.as_deref(), 100)?;
        price("precio_compra", self.precio_compra)?;
        price("precio_venta", self.precio_venta)?;
        non_negative("stock_actual", self.stock_actual)?;
        non_negative("stock_minimo", self.stock_minimo)?;
        if self.precio_venta < self.precio_compra {
            return Err(AppError::Validation(
                "precio_venta debe ser mayor o igual que precio_compra".into(),
            ));
        }
        Ok(())
    }
}

/// Partial update. An explicit `null` cannot be told apart from a missing
/// field, so nullable columns can be changed but never cleared here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductUpdate {
    pub codigo_barras: Option<String>,
    pub nombre: Option<String>,
    pub descripcion: Option<String>,
    pub categoria: Option<String>,
    pub proveedor: Option<String>,
    pub precio_compra: Option<Decimal>,
    pub precio_venta: Option<Decimal>,
    pub stock_actual: Option<i32>,
    pub stock_minimo: Option<i32>,
    #[serde(default, with = "super::iso_date::option")]
    pub fecha_vencimiento: Option<Date>,
    pub activo: Option<bool>,
}

/// One column assignment in an UPDATE.
#[derive(Debug, Clone, PartialEq)]
pub enum ProductChange {
    CodigoBarras(String),
    Nombre(String),
    Descripcion(String),
    Categoria(String),
    Proveedor(String),
    PrecioCompra(Decimal),
    PrecioVenta(Decimal),
    StockActual(i32),
    StockMinimo(i32),
    FechaVencimiento(Date),
    Activo(bool),
}

impl ProductChange {
    pub fn column(&self) -> &'static str {
        match self {
            ProductChange::CodigoBarras(_) => "codigo_barras",
            ProductChange::Nombre(_) => "nombre",
            ProductChange::Descripcion(_) => "descripcion",
            ProductChange::Categoria(_) => "categoria",
            ProductChange::Proveedor(_) => "proveedor",
            ProductChange::PrecioCompra(_) => "precio_compra",
            ProductChange::PrecioVenta(_) => "precio_venta",
            ProductChange::StockActual(_) => "stock_actual",
            ProductChange::StockMinimo(_) => "stock_minimo",
            ProductChange::FechaVencimiento(_) => "fecha_vencimiento",
            ProductChange::Activo(_) => "activo",
        }
    }
}

impl ProductUpdate {
    /// Field limits of [`ProductCreate`] for whatever is present. The
    /// sale-vs-purchase price rule is only enforced on create.
    pub fn validate(&self) -> AppResult<()> {
        if let Some(v) = &self.codigo_barras {
            required("codigo_barras", v, 50)?;
        }
        if let Some(v) = &self.nombre {
            required("nombre", v, 100)?;
        }
        optional("descripcion", self.descripcion.as_deref(), 255)?;
        optional("categoria", self.categoria.as_deref(), 50)?;
        optional("proveedor", self.proveedor.as_deref(), 100)?;
        if let Some(v) = self.precio_compra {
            price("precio_compra", v)?;
        }
        if let Some(v) = self.precio_venta {
            price("precio_venta", v)?;
        }
        if let Some(v) = self.stock_actual {
            non_negative("stock_actual", v)?;
        }
        if let Some(v) = self.stock_minimo {
            non_negative("stock_minimo", v)?;
        }
        Ok(())
    }

    pub fn into_changes(self) -> Vec<ProductChange> {
        let candidates = [
            self.codigo_barras.map(ProductChange::CodigoBarras),
            self.nombre.map(ProductChange::Nombre),
            self.descripcion.map(ProductChange::Descripcion),
            self.categoria.map(ProductChange::Categoria),
            self.proveedor.map(ProductChange::Proveedor),
            self.precio_compra.map(ProductChange::PrecioCompra),
            self.precio_venta.map(ProductChange::PrecioVenta),
            self.stock_actual.map(ProductChange::StockActual),
            self.stock_minimo.map(ProductChange::StockMinimo),
            self.fecha_vencimiento.map(ProductChange::FechaVencimiento),
            self.activo.map(ProductChange::Activo),
        ];
        candidates.into_iter().flatten().collect()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductQuery {
    pub activo: Option<bool>,
    pub categoria: Option<String>,
}

/// One ANDed predicate of the list query.
#[derive(Debug, Clone, PartialEq)]
pub enum ProductFilter {
    Activo(bool),
    Categoria(String),
}

impl ProductQuery {
    pub fn into_filters(self) -> Vec<ProductFilter> {
        [
            self.activo.map(ProductFilter::Activo),
            self.categoria.map(ProductFilter::Categoria),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

#[derive(Debug, Serialize)]
pub struct Message {
    pub mensaje: String,
}

fn required(field: &str, value: &str, max: usize) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} es obligatorio")));
    }
    optional(field, Some(value), max)
}

fn optional(field: &str, value: Option<&str>, max: usize) -> AppResult<()> {
    match value {
        Some(v) if v.chars().count() > max => Err(AppError::Validation(format!(
            "{field} no puede superar {max} caracteres"
        ))),
        _ => Ok(()),
    }
}

/// Largest value a `NUMERIC(10, 2)` price column holds.
const PRICE_MAX: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

/// Prices are stored as `NUMERIC(10, 2)`: positive, at most two decimals,
/// below 10^8. Anything else would be rounded or rejected by the column.
fn price(field: &str, value: Decimal) -> AppResult<()> {
    if value <= Decimal::ZERO {
        return Err(AppError::Validation(format!("{field} debe ser mayor que 0")));
    }
    if value.normalize().scale() > 2 {
        return Err(AppError::Validation(format!(
            "{field} admite como máximo 2 decimales"
        )));
    }
    if value > PRICE_MAX {
        return Err(AppError::Validation(format!(
            "{field} no puede superar {PRICE_MAX}"
        )));
    }
    Ok(())
}

fn non_negative(field: &str, value: i32) -> AppResult<()> {
    if value < 0 {
        return Err(AppError::Validation(format!("{field} no puede ser negativo")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::date;

    fn milk() -> serde_json::Value {
        json!({
            "codigo_barras": "123",
            "nombre": "Milk",
            "precio_compra": 1.0,
            "precio_venta": 1.5,
            "stock_actual": 5,
            "stock_minimo": 2
        })
    }

    fn assert_validation(result: AppResult<()>, needle: &str) {
        match result {
            Err(AppError::Validation(msg)) => assert!(msg.contains(needle), "{msg}"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn create_defaults_and_passes() {
        let p: ProductCreate = serde_json::from_value(json!({
            "codigo_barras": "7501",
            "nombre": "Pan",
            "precio_compra": 2,
            "precio_venta": 3
        }))
        .unwrap();
        assert_eq!(p.stock_actual, 0);
        assert_eq!(p.stock_minimo, 10);
        assert!(p.fecha_vencimiento.is_none());
        p.validate().unwrap();
    }

    #[test]
    fn sale_price_below_purchase_price_fails() {
        let mut body = milk();
        body["precio_venta"] = json!(0.5);
        let p: ProductCreate = serde_json::from_value(body).unwrap();
        assert_validation(p.validate(), "precio_venta");
    }

    #[test]
    fn equal_prices_are_fine() {
        let mut body = milk();
        body["precio_venta"] = json!(1.0);
        let p: ProductCreate = serde_json::from_value(body).unwrap();
        p.validate().unwrap();
    }

    #[test]
    fn length_and_range_limits() {
        let mut body = milk();
        body["codigo_barras"] = json!("9".repeat(51));
        let p: ProductCreate = serde_json::from_value(body).unwrap();
        assert_validation(p.validate(), "codigo_barras");

        let mut body = milk();
        body["descripcion"] = json!("a".repeat(256));
        let p: ProductCreate = serde_json::from_value(body).unwrap();
        assert_validation(p.validate(), "descripcion");

        let mut body = milk();
        body["precio_compra"] = json!(0);
        let p: ProductCreate = serde_json::from_value(body).unwrap();
        assert_validation(p.validate(), "precio_compra");

        let mut body = milk();
        body["stock_actual"] = json!(-1);
        let p: ProductCreate = serde_json::from_value(body).unwrap();
        assert_validation(p.validate(), "stock_actual");
    }

    #[test]
    fn prices_fit_two_decimal_column() {
        assert_eq!(PRICE_MAX, Decimal::new(9_999_999_999, 2));

        for (value, needle) in [
            (json!(0.001), "2 decimales"),
            (json!(1.234), "2 decimales"),
            (json!(100000000), "99999999.99"),
            (json!(100000000.5), "99999999.99"),
        ] {
            let mut body = milk();
            body["precio_compra"] = value.clone();
            body["precio_venta"] = json!(100000000.99);
            let p: ProductCreate = serde_json::from_value(body).unwrap();
            assert_validation(p.validate(), "precio_compra");
            assert_validation(p.validate(), needle);
        }

        let mut body = milk();
        body["precio_compra"] = json!(1.25);
        body["precio_venta"] = json!(99999999.99);
        let p: ProductCreate = serde_json::from_value(body).unwrap();
        p.validate().unwrap();

        let p = ProductCreate {
            precio_compra: Decimal::new(1500, 3),
            precio_venta: Decimal::new(2000, 3),
            ..serde_json::from_value(milk()).unwrap()
        };
        p.validate().unwrap();
    }

    #[test]
    fn update_prices_fit_two_decimal_column() {
        let u = ProductUpdate {
            precio_venta: Some(Decimal::new(1, 3)),
            ..Default::default()
        };
        assert_validation(u.validate(), "precio_venta admite como máximo 2 decimales");

        let u = ProductUpdate {
            precio_compra: Some(Decimal::new(10_000_000_000, 2)),
            ..Default::default()
        };
        assert_validation(u.validate(), "precio_compra no puede superar 99999999.99");

        let u = ProductUpdate {
            precio_compra: Some(Decimal::new(9_999_999_999, 2)),
            ..Default::default()
        };
        u.validate().unwrap();
    }

    #[test]
    fn expiry_date_parses_iso() {
        let mut body = milk();
        body["fecha_vencimiento"] = json!("2025-03-31");
        let p: ProductCreate = serde_json::from_value(body).unwrap();
        assert_eq!(p.fecha_vencimiento, Some(date!(2025 - 03 - 31)));
    }

    #[test]
    fn update_lists_only_present_fields_in_order() {
        let u: ProductUpdate = serde_json::from_value(json!({
            "activo": false,
            "nombre": "Leche",
            "descripcion": null
        }))
        .unwrap();
        u.validate().unwrap();
        assert_eq!(
            u.into_changes(),
            vec![
                ProductChange::Nombre("Leche".into()),
                ProductChange::Activo(false)
            ]
        );
    }

    #[test]
    fn empty_update_has_no_changes() {
        let u: ProductUpdate = serde_json::from_value(json!({})).unwrap();
        assert!(u.into_changes().is_empty());
    }

    #[test]
    fn update_checks_present_fields_but_not_price_order() {
        let u = ProductUpdate {
            stock_minimo: Some(-3),
            ..Default::default()
        };
        assert_validation(u.validate(), "stock_minimo");

        let u = ProductUpdate {
            precio_compra: Some(Decimal::new(900, 2)),
            precio_venta: Some(Decimal::new(100, 2)),
            ..Default::default()
        };
        u.validate().unwrap();
    }

    #[test]
    fn filters_follow_supplied_fields() {
        let q = ProductQuery {
            activo: Some(true),
            categoria: Some("Lacteos".into()),
        };
        assert_eq!(
            q.into_filters(),
            vec![
                ProductFilter::Activo(true),
                ProductFilter::Categoria("Lacteos".into())
            ]
        );
        assert!(ProductQuery::default().into_filters().is_empty());
    }
}
