use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Cart row joined with product and size type names
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CartLine {
    pub id: i64,
    pub customer_id: String,
    pub product_id: i64,
    pub product_name: String,
    pub size_type_id: i64,
    pub size_type_name: String,
    pub quantity: i32,
    pub comments: String,
    pub created_at: i64,
}

#[derive(Debug, Deserialize)]
pub struct NewCartLine {
    pub product_id: i64,
    pub quantity: i32,
    pub size_type_id: i64,
    #[serde(default)]
    pub comments: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct CartLinePatch {
    pub product_id: Option<i64>,
    pub quantity: Option<i32>,
    pub size_type_id: Option<i64>,
    pub comments: Option<String>,
}

/// One cart line priced at the product's retail price
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow)]
pub struct PricedLine {
    pub quantity: i32,
    pub unit_price: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Checkout {
    pub id: i64,
    pub customer_id: String,
    pub total_amount: i64,
    pub created_at: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct CheckoutPatch {
    pub total_amount: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Order {
    pub id: i64,
    pub customer_id: String,
    pub total_amount: i64,
    pub order_date: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct OrderPatch {
    pub total_amount: Option<i64>,
    pub order_date: Option<i64>,
}
