use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: i64,
    pub user_id: String,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct NewCategory {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SizeType {
    pub id: i64,
    pub user_id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct NewSizeType {
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct SizeTypePatch {
    pub name: Option<String>,
}

/// Product row joined with its size type and category names
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: i64,
    pub user_id: String,
    pub product_code: String,
    pub product_name: String,
    pub picture: String,
    pub quantity: i32,
    pub position: String,
    pub size_type_id: i64,
    pub size_type_name: String,
    pub category_id: i64,
    pub category_name: String,
    pub buy_price: i64,
    #[serde(rename = "min_retail_price")]
    pub mrp: i64,
    pub defective: i32,
    pub active: bool,
    /// Unix milliseconds
    pub created: i64,
    pub updated: i64,
}

#[derive(Debug, Deserialize)]
pub struct NewProduct {
    pub product_code: String,
    pub product_name: String,
    #[serde(default)]
    pub picture: String,
    #[serde(default)]
    pub position: String,
    pub quantity: i32,
    pub size_type_id: i64,
    pub category_id: i64,
    pub buy_price: i64,
    #[serde(rename = "min_retail_price")]
    pub mrp: i64,
    #[serde(default)]
    pub defective: i32,
    #[serde(default = "default_active")]
    pub active: bool,
}

/// Absent fields are left untouched; `Some(0)` and `Some("")` are real values
#[derive(Debug, Default, Deserialize)]
pub struct ProductPatch {
    pub product_code: Option<String>,
    pub product_name: Option<String>,
    pub picture: Option<String>,
    pub position: Option<String>,
    pub quantity: Option<i32>,
    pub size_type_id: Option<i64>,
    pub category_id: Option<i64>,
    pub buy_price: Option<i64>,
    #[serde(rename = "min_retail_price")]
    pub mrp: Option<i64>,
    pub defective: Option<i32>,
    pub active: Option<bool>,
}

fn default_active() -> bool {
    true
}
