use chrono::Utc;

use super::manager::{expect_affected, DatabaseError, Store};
use super::models::{
    CartLine, CartLinePatch, Checkout, CheckoutPatch, NewCartLine, Order, OrderPatch, PricedLine,
};
use crate::services::checkout::checkout_total;

const CART_VIEW: &str = "SELECT c.id, c.customer_id, c.product_id, p.product_name, c.size_type_id, \
     s.name AS size_type_name, c.quantity, c.comments, c.created_at \
     FROM carts c \
     INNER JOIN products p ON c.product_id = p.id \
     INNER JOIN size_type s ON c.size_type_id = s.id";

const PRICED_CART: &str = "SELECT c.quantity, p.mrp AS unit_price \
     FROM carts c INNER JOIN products p ON c.product_id = p.id \
     WHERE c.customer_id = $1";

impl Store {
    // ----- carts -----

    pub async fn insert_cart_line(&self, customer: &str, new: &NewCartLine) -> Result<CartLine, DatabaseError> {
        let now = Utc::now().timestamp_millis();
        let id: i64 = self
            .bounded(
                sqlx::query_scalar(
                    "INSERT INTO carts (customer_id, product_id, quantity, size_type_id, comments, created_at) \
                     VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
                )
                .bind(customer)
                .bind(new.product_id)
                .bind(new.quantity)
                .bind(new.size_type_id)
                .bind(&new.comments)
                .bind(now)
                .fetch_one(self.pool()),
            )
            .await?;
        self.get_cart_line(id, customer).await
    }

    pub async fn list_cart_lines(&self, customer: &str) -> Result<Vec<CartLine>, DatabaseError> {
        let sql = format!("{} WHERE c.customer_id = $1 ORDER BY c.id", CART_VIEW);
        self.bounded(sqlx::query_as::<_, CartLine>(&sql).bind(customer).fetch_all(self.pool())).await
    }

    pub async fn get_cart_line(&self, id: i64, customer: &str) -> Result<CartLine, DatabaseError> {
        let sql = format!("{} WHERE c.id = $1 AND c.customer_id = $2", CART_VIEW);
        self.bounded(
            sqlx::query_as::<_, CartLine>(&sql)
                .bind(id)
                .bind(customer)
                .fetch_optional(self.pool()),
        )
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("cart {} not found", id)))
    }

    pub async fn update_cart_line(
        &self,
        id: i64,
        customer: &str,
        patch: &CartLinePatch,
    ) -> Result<CartLine, DatabaseError> {
        let result = self
            .bounded(
                sqlx::query(
                    "UPDATE carts SET \
                        product_id = COALESCE($1, product_id), \
                        quantity = COALESCE($2, quantity), \
                        size_type_id = COALESCE($3, size_type_id), \
                        comments = COALESCE($4, comments) \
                     WHERE id = $5 AND customer_id = $6",
                )
                .bind(patch.product_id)
                .bind(patch.quantity)
                .bind(patch.size_type_id)
                .bind(&patch.comments)
                .bind(id)
                .bind(customer)
                .execute(self.pool()),
            )
            .await?;
        expect_affected(result.rows_affected(), "cart", id)?;
        self.get_cart_line(id, customer).await
    }

    pub async fn delete_cart_line(&self, id: i64, customer: &str) -> Result<(), DatabaseError> {
        let result = self
            .bounded(
                sqlx::query("DELETE FROM carts WHERE id = $1 AND customer_id = $2")
                    .bind(id)
                    .bind(customer)
                    .execute(self.pool()),
            )
            .await?;
        expect_affected(result.rows_affected(), "cart", id)
    }

    // ----- checkouts -----

    /// Prices the customer's cart and records the checkout in one transaction
    pub async fn create_checkout(&self, customer: &str) -> Result<Checkout, DatabaseError> {
        let now = Utc::now().timestamp_millis();
        let pool = self.pool();
        self.bounded(async move {
            let mut tx = pool.begin().await?;
            let lines = sqlx::query_as::<_, PricedLine>(PRICED_CART)
                .bind(customer)
                .fetch_all(&mut *tx)
                .await?;
            // Returning early drops `tx`, which rolls it back
            let total = checkout_total(&lines).ok_or_else(|| {
                DatabaseError::Rejected("cart total exceeds the supported amount".into())
            })?;

            let checkout = sqlx::query_as::<_, Checkout>(
                "INSERT INTO checkouts (customer_id, total_amount, created_at) VALUES ($1, $2, $3) \
                 RETURNING id, customer_id, total_amount, created_at",
            )
            .bind(customer)
            .bind(total)
            .bind(now)
            .fetch_one(&mut *tx)
            .await?;

            tx.commit().await?;
            Ok::<_, DatabaseError>(checkout)
        })
        .await
    }

    pub async fn list_checkouts(&self, customer: &str) -> Result<Vec<Checkout>, DatabaseError> {
        self.bounded(
            sqlx::query_as::<_, Checkout>(
                "SELECT id, customer_id, total_amount, created_at FROM checkouts \
                 WHERE customer_id = $1 ORDER BY id",
            )
            .bind(customer)
            .fetch_all(self.pool()),
        )
        .await
    }

    pub async fn get_checkout(&self, id: i64, customer: &str) -> Result<Checkout, DatabaseError> {
        self.bounded(
            sqlx::query_as::<_, Checkout>(
                "SELECT id, customer_id, total_amount, created_at FROM checkouts \
                 WHERE id = $1 AND customer_id = $2",
            )
            .bind(id)
            .bind(customer)
            .fetch_optional(self.pool()),
        )
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("checkout {} not found", id)))
    }

    pub async fn update_checkout(
        &self,
        id: i64,
        customer: &str,
        patch: &CheckoutPatch,
    ) -> Result<Checkout, DatabaseError> {
        self.bounded(
            sqlx::query_as::<_, Checkout>(
                "UPDATE checkouts SET total_amount = COALESCE($1, total_amount) \
                 WHERE id = $2 AND customer_id = $3 \
                 RETURNING id, customer_id, total_amount, created_at",
            )
            .bind(patch.total_amount)
            .bind(id)
            .bind(customer)
            .fetch_optional(self.pool()),
        )
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("checkout {} not found", id)))
    }

    pub async fn delete_checkout(&self, id: i64, customer: &str) -> Result<(), DatabaseError> {
        let result = self
            .bounded(
                sqlx::query("DELETE FROM checkouts WHERE id = $1 AND customer_id = $2")
                    .bind(id)
                    .bind(customer)
                    .execute(self.pool()),
            )
            .await?;
        expect_affected(result.rows_affected(), "checkout", id)
    }

    // ----- orders -----

    /// Orders are priced from the current cart, like checkouts
    pub async fn create_order(&self, customer: &str) -> Result<Order, DatabaseError> {
        let now = Utc::now().timestamp_millis();
        let pool = self.pool();
        self.bounded(async move {
            let mut tx = pool.begin().await?;
            let lines = sqlx::query_as::<_, PricedLine>(PRICED_CART)
                .bind(customer)
                .fetch_all(&mut *tx)
                .await?;
            // Returning early drops `tx`, which rolls it back
            let total = checkout_total(&lines).ok_or_else(|| {
                DatabaseError::Rejected("cart total exceeds the supported amount".into())
            })?;

            let order = sqlx::query_as::<_, Order>(
                "INSERT INTO orders (customer_id, total_amount, order_date) VALUES ($1, $2, $3) \
                 RETURNING id, customer_id, total_amount, order_date",
            )
            .bind(customer)
            .bind(total)
            .bind(now)
            .fetch_one(&mut *tx)
            .await?;

            tx.commit().await?;
            Ok::<_, DatabaseError>(order)
        })
        .await
    }

    pub async fn list_orders(&self, customer: &str) -> Result<Vec<Order>, DatabaseError> {
        self.bounded(
            sqlx::query_as::<_, Order>(
                "SELECT id, customer_id, total_amount, order_date FROM orders \
                 WHERE customer_id = $1 ORDER BY id",
            )
            .bind(customer)
            .fetch_all(self.pool()),
        )
        .await
    }

    pub async fn get_order(&self, id: i64, customer: &str) -> Result<Order, DatabaseError> {
        self.bounded(
            sqlx::query_as::<_, Order>(
                "SELECT id, customer_id, total_amount, order_date FROM orders \
                 WHERE id = $1 AND customer_id = $2",
            )
            .bind(id)
            .bind(customer)
            .fetch_optional(self.pool()),
        )
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("order {} not found", id)))
    }

    pub async fn update_order(&self, id: i64, customer: &str, patch: &OrderPatch) -> Result<Order, DatabaseError> {
        self.bounded(
            sqlx::query_as::<_, Order>(
                "UPDATE orders SET \
                    total_amount = COALESCE($1, total_amount), \
                    order_date = COALESCE($2, order_date) \
                 WHERE id = $3 AND customer_id = $4 \
                 RETURNING id, customer_id, total_amount, order_date",
            )
            .bind(patch.total_amount)
            .bind(patch.order_date)
            .bind(id)
            .bind(customer)
            .fetch_optional(self.pool()),
        )
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("order {} not found", id)))
    }

    pub async fn delete_order(&self, id: i64, customer: &str) -> Result<(), DatabaseError> {
        let result = self
            .bounded(
                sqlx::query("DELETE FROM orders WHERE id = $1 AND customer_id = $2")
                    .bind(id)
                    .bind(customer)
                    .execute(self.pool()),
            )
            .await?;
        expect_affected(result.rows_affected(), "order", id)
    }
}
