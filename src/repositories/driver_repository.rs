//! Repositorio PostgreSQL de conductores

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::driver::Driver;
use crate::repositories::DriverRepository;
use crate::utils::errors::{not_found_error, AppResult};

pub struct PgDriverRepository {
    pool: PgPool,
}

impl PgDriverRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DriverRepository for PgDriverRepository {
    async fn load(&self, driver_id: Uuid) -> AppResult<Driver> {
        sqlx::query_as::<_, Driver>("SELECT * FROM drivers WHERE id = $1")
            .bind(driver_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found_error("Driver", &driver_id.to_string()))
    }
}
