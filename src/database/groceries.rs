use super::manager::{expect_affected, DatabaseError, Store};
use super::models::{NewOperational, Operational, OperationalPatch};

const OPERATIONAL_COLUMNS: &str = "id, groceries_id, day_operational, open, close, active";

impl Store {
    pub async fn insert_operational(
        &self,
        grocery: &str,
        new: &NewOperational,
    ) -> Result<Operational, DatabaseError> {
        let sql = format!(
            "INSERT INTO operationals (groceries_id, day_operational, open, close, active) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            OPERATIONAL_COLUMNS
        );
        self.bounded(
            sqlx::query_as::<_, Operational>(&sql)
                .bind(grocery)
                .bind(&new.day_operational)
                .bind(new.open)
                .bind(new.close)
                .bind(new.active)
                .fetch_one(self.pool()),
        )
        .await
    }

    pub async fn list_operationals(&self) -> Result<Vec<Operational>, DatabaseError> {
        let sql = format!("SELECT {} FROM operationals ORDER BY id", OPERATIONAL_COLUMNS);
        self.bounded(sqlx::query_as::<_, Operational>(&sql).fetch_all(self.pool())).await
    }

    pub async fn get_operational(&self, id: i64) -> Result<Operational, DatabaseError> {
        let sql = format!("SELECT {} FROM operationals WHERE id = $1", OPERATIONAL_COLUMNS);
        self.bounded(sqlx::query_as::<_, Operational>(&sql).bind(id).fetch_optional(self.pool()))
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("operational hours {} not found", id)))
    }

    pub async fn update_operational(
        &self,
        id: i64,
        grocery: &str,
        patch: &OperationalPatch,
    ) -> Result<Operational, DatabaseError> {
        let sql = format!(
            "UPDATE operationals SET \
                day_operational = COALESCE($1, day_operational), \
                open = COALESCE($2, open), \
                close = COALESCE($3, close), \
                active = COALESCE($4, active) \
             WHERE id = $5 AND groceries_id = $6 \
             RETURNING {}",
            OPERATIONAL_COLUMNS
        );
        self.bounded(
            sqlx::query_as::<_, Operational>(&sql)
                .bind(&patch.day_operational)
                .bind(patch.open)
                .bind(patch.close)
                .bind(patch.active)
                .bind(id)
                .bind(grocery)
                .fetch_optional(self.pool()),
        )
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("operational hours {} not found", id)))
    }

    pub async fn delete_operational(&self, id: i64, grocery: &str) -> Result<(), DatabaseError> {
        let result = self
            .bounded(
                sqlx::query("DELETE FROM operationals WHERE id = $1 AND groceries_id = $2")
                    .bind(id)
                    .bind(grocery)
                    .execute(self.pool()),
            )
            .await?;
        expect_affected(result.rows_affected(), "operational hours", id)
    }
}
