use chrono::Utc;

use super::manager::{expect_affected, DatabaseError, Store};
use super::models::{
    Category, CategoryPatch, NewCategory, NewProduct, NewSizeType, Product, ProductPatch, SizeType,
    SizeTypePatch,
};

const PRODUCT_COLUMNS: &str = "p.id, p.user_id, p.product_code, p.product_name, p.picture, p.quantity, \
     p.position, p.size_type_id, s.name AS size_type_name, p.category_id, c.name AS category_name, \
     p.buy_price, p.mrp, p.defective, p.active, p.created, p.updated";

const PRODUCT_JOINS: &str = "INNER JOIN category_products c ON p.category_id = c.id \
     INNER JOIN size_type s ON p.size_type_id = s.id";

impl Store {
    // ----- categories -----

    pub async fn insert_category(&self, owner: &str, new: &NewCategory) -> Result<Category, DatabaseError> {
        self.bounded(
            sqlx::query_as::<_, Category>(
                "INSERT INTO category_products (user_id, name, description) VALUES ($1, $2, $3) \
                 RETURNING id, user_id, name, description",
            )
            .bind(owner)
            .bind(&new.name)
            .bind(&new.description)
            .fetch_one(self.pool()),
        )
        .await
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>, DatabaseError> {
        self.bounded(
            sqlx::query_as::<_, Category>(
                "SELECT id, user_id, name, description FROM category_products ORDER BY id",
            )
            .fetch_all(self.pool()),
        )
        .await
    }

    pub async fn get_category(&self, id: i64) -> Result<Category, DatabaseError> {
        self.bounded(
            sqlx::query_as::<_, Category>(
                "SELECT id, user_id, name, description FROM category_products WHERE id = $1",
            )
            .bind(id)
            .fetch_optional(self.pool()),
        )
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("category {} not found", id)))
    }

    pub async fn update_category(
        &self,
        id: i64,
        owner: &str,
        patch: &CategoryPatch,
    ) -> Result<Category, DatabaseError> {
        self.bounded(
            sqlx::query_as::<_, Category>(
                "UPDATE category_products \
                 SET name = COALESCE($1, name), description = COALESCE($2, description) \
                 WHERE id = $3 AND user_id = $4 \
                 RETURNING id, user_id, name, description",
            )
            .bind(&patch.name)
            .bind(&patch.description)
            .bind(id)
            .bind(owner)
            .fetch_optional(self.pool()),
        )
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("category {} not found", id)))
    }

    pub async fn delete_category(&self, id: i64, owner: &str) -> Result<(), DatabaseError> {
        let result = self
            .bounded(
                sqlx::query("DELETE FROM category_products WHERE id = $1 AND user_id = $2")
                    .bind(id)
                    .bind(owner)
                    .execute(self.pool()),
            )
            .await?;
        expect_affected(result.rows_affected(), "category", id)
    }

    // ----- size types -----

    pub async fn insert_size_type(&self, owner: &str, new: &NewSizeType) -> Result<SizeType, DatabaseError> {
        self.bounded(
            sqlx::query_as::<_, SizeType>(
                "INSERT INTO size_type (user_id, name) VALUES ($1, $2) RETURNING id, user_id, name",
            )
            .bind(owner)
            .bind(&new.name)
            .fetch_one(self.pool()),
        )
        .await
    }

    pub async fn list_size_types(&self) -> Result<Vec<SizeType>, DatabaseError> {
        self.bounded(
            sqlx::query_as::<_, SizeType>("SELECT id, user_id, name FROM size_type ORDER BY id")
                .fetch_all(self.pool()),
        )
        .await
    }

    pub async fn get_size_type(&self, id: i64) -> Result<SizeType, DatabaseError> {
        self.bounded(
            sqlx::query_as::<_, SizeType>("SELECT id, user_id, name FROM size_type WHERE id = $1")
                .bind(id)
                .fetch_optional(self.pool()),
        )
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("size type {} not found", id)))
    }

    pub async fn update_size_type(
        &self,
        id: i64,
        owner: &str,
        patch: &SizeTypePatch,
    ) -> Result<SizeType, DatabaseError> {
        self.bounded(
            sqlx::query_as::<_, SizeType>(
                "UPDATE size_type SET name = COALESCE($1, name) \
                 WHERE id = $2 AND user_id = $3 \
                 RETURNING id, user_id, name",
            )
            .bind(&patch.name)
            .bind(id)
            .bind(owner)
            .fetch_optional(self.pool()),
        )
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("size type {} not found", id)))
    }

    pub async fn delete_size_type(&self, id: i64, owner: &str) -> Result<(), DatabaseError> {
        let result = self
            .bounded(
                sqlx::query("DELETE FROM size_type WHERE id = $1 AND user_id = $2")
                    .bind(id)
                    .bind(owner)
                    .execute(self.pool()),
            )
            .await?;
        expect_affected(result.rows_affected(), "size type", id)
    }

    // ----- products -----

    pub async fn insert_product(&self, owner: &str, new: &NewProduct) -> Result<Product, DatabaseError> {
        let now = Utc::now().timestamp_millis();
        let sql = format!(
            "WITH p AS ( \
                INSERT INTO products (user_id, product_code, product_name, picture, quantity, position, \
                    size_type_id, category_id, buy_price, mrp, defective, active, created, updated) \
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $13) \
                RETURNING * \
             ) SELECT {} FROM p {}",
            PRODUCT_COLUMNS, PRODUCT_JOINS
        );

        self.bounded(
            sqlx::query_as::<_, Product>(&sql)
                .bind(owner)
                .bind(&new.product_code)
                .bind(&new.product_name)
                .bind(&new.picture)
                .bind(new.quantity)
                .bind(&new.position)
                .bind(new.size_type_id)
                .bind(new.category_id)
                .bind(new.buy_price)
                .bind(new.mrp)
                .bind(new.defective)
                .bind(new.active)
                .bind(now)
                .fetch_one(self.pool()),
        )
        .await
    }

    pub async fn list_products(&self) -> Result<Vec<Product>, DatabaseError> {
        let sql = format!("SELECT {} FROM products p {} ORDER BY p.id", PRODUCT_COLUMNS, PRODUCT_JOINS);
        self.bounded(sqlx::query_as::<_, Product>(&sql).fetch_all(self.pool())).await
    }

    /// Products owned by one grocery (wholesaler)
    pub async fn list_products_by_owner(&self, owner: &str) -> Result<Vec<Product>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM products p {} WHERE p.user_id = $1 ORDER BY p.id",
            PRODUCT_COLUMNS, PRODUCT_JOINS
        );
        self.bounded(sqlx::query_as::<_, Product>(&sql).bind(owner).fetch_all(self.pool())).await
    }

    pub async fn get_product(&self, id: i64) -> Result<Product, DatabaseError> {
        let sql = format!("SELECT {} FROM products p {} WHERE p.id = $1", PRODUCT_COLUMNS, PRODUCT_JOINS);
        self.bounded(sqlx::query_as::<_, Product>(&sql).bind(id).fetch_optional(self.pool()))
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("product {} not found", id)))
    }

    pub async fn update_product(
        &self,
        id: i64,
        owner: &str,
        patch: &ProductPatch,
    ) -> Result<Product, DatabaseError> {
        let now = Utc::now().timestamp_millis();
        let sql = format!(
            "WITH p AS ( \
                UPDATE products SET \
                    product_code = COALESCE($1, product_code), \
                    product_name = COALESCE($2, product_name), \
                    picture = COALESCE($3, picture), \
                    quantity = COALESCE($4, quantity), \
                    position = COALESCE($5, position), \
                    size_type_id = COALESCE($6, size_type_id), \
                    category_id = COALESCE($7, category_id), \
                    buy_price = COALESCE($8, buy_price), \
                    mrp = COALESCE($9, mrp), \
                    defective = COALESCE($10, defective), \
                    active = COALESCE($11, active), \
                    updated = $12 \
                WHERE id = $13 AND user_id = $14 \
                RETURNING * \
             ) SELECT {} FROM p {}",
            PRODUCT_COLUMNS, PRODUCT_JOINS
        );

        self.bounded(
            sqlx::query_as::<_, Product>(&sql)
                .bind(&patch.product_code)
                .bind(&patch.product_name)
                .bind(&patch.picture)
                .bind(patch.quantity)
                .bind(&patch.position)
                .bind(patch.size_type_id)
                .bind(patch.category_id)
                .bind(patch.buy_price)
                .bind(patch.mrp)
                .bind(patch.defective)
                .bind(patch.active)
                .bind(now)
                .bind(id)
                .bind(owner)
                .fetch_optional(self.pool()),
        )
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("product {} not found", id)))
    }

    pub async fn delete_product(&self, id: i64, owner: &str) -> Result<(), DatabaseError> {
        let result = self
            .bounded(
                sqlx::query("DELETE FROM products WHERE id = $1 AND user_id = $2")
                    .bind(id)
                    .bind(owner)
                    .execute(self.pool()),
            )
            .await?;
        expect_affected(result.rows_affected(), "product", id)
    }
}
