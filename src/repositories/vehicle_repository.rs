//! Repositorio PostgreSQL de vehículos

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::vehicle::Vehicle;
use crate::repositories::VehicleRepository;
use crate::utils::errors::{not_found_error, AppResult};

pub struct PgVehicleRepository {
    pool: PgPool,
}

impl PgVehicleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VehicleRepository for PgVehicleRepository {
    async fn load(&self, vehicle_id: Uuid) -> AppResult<Vehicle> {
        sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles WHERE id = $1")
            .bind(vehicle_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", &vehicle_id.to_string()))
    }

    async fn update_meter(&self, vehicle_id: Uuid, new_meter: i64) -> AppResult<()> {
        let result = sqlx::query("UPDATE vehicles SET meter_number = $2 WHERE id = $1")
            .bind(vehicle_id)
            .bind(new_meter)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(not_found_error("Vehicle", &vehicle_id.to_string()));
        }
        Ok(())
    }

    async fn set_availability(&self, vehicle_id: Uuid, available: bool) -> AppResult<()> {
        let result = sqlx::query("UPDATE vehicles SET availability = $2 WHERE id = $1")
            .bind(vehicle_id)
            .bind(available)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(not_found_error("Vehicle", &vehicle_id.to_string()));
        }
        Ok(())
    }
}
