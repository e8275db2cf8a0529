//! Repositorio PostgreSQL de viajes

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::payment::Payment;
use crate::models::trip::{Trip, TripSnapshot};
use crate::models::trip_cost::OtherTripCost;
use crate::models::vehicle::Vehicle;
use crate::models::waypoint::{NewWaypoint, TripWaypoint};
use crate::repositories::TripRepository;
use crate::utils::errors::{not_found_error, AppResult};

pub struct PgTripRepository {
    pool: PgPool,
}

impl PgTripRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TripRepository for PgTripRepository {
    async fn load(&self, trip_id: Uuid) -> AppResult<TripSnapshot> {
        let trip = sqlx::query_as::<_, Trip>("SELECT * FROM trips WHERE id = $1")
            .bind(trip_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found_error("Trip", &trip_id.to_string()))?;

        let vehicle = sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles WHERE id = $1")
            .bind(trip.vehicle_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", &trip.vehicle_id.to_string()))?;

        let driver = match trip.driver_id {
            Some(driver_id) => {
                sqlx::query_as("SELECT * FROM drivers WHERE id = $1")
                    .bind(driver_id)
                    .fetch_optional(&self.pool)
                    .await?
            }
            None => None,
        };

        let other_costs = sqlx::query_as::<_, OtherTripCost>(
            "SELECT * FROM other_trip_costs WHERE trip_id = $1 ORDER BY id",
        )
        .bind(trip_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(TripSnapshot {
            trip,
            vehicle,
            driver,
            other_costs,
        })
    }

    async fn save(&self, trip: &Trip) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE trips SET
                trip_status = $2,
                actual_return_datetime = $3,
                start_meter = $4,
                end_meter = $5,
                discount = $6,
                damage_cost = $7,
                actual_distance = $8,
                actual_days = $9,
                total_actual_cost = $10,
                payment_amount = $11,
                payment_status = $12,
                profit = $13
            WHERE id = $1
            "#,
        )
        .bind(trip.id)
        .bind(trip.trip_status)
        .bind(trip.actual_return_datetime)
        .bind(trip.start_meter)
        .bind(trip.end_meter)
        .bind(trip.discount)
        .bind(trip.damage_cost)
        .bind(trip.actual_distance)
        .bind(trip.actual_days)
        .bind(trip.total_actual_cost)
        .bind(trip.payment_amount)
        .bind(trip.payment_status)
        .bind(trip.profit)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(not_found_error("Trip", &trip.id.to_string()));
        }
        Ok(())
    }

    async fn insert(&self, trip: &Trip, waypoints: &[NewWaypoint]) -> AppResult<Trip> {
        let mut tx = self.pool.begin().await?;

        // El correlativo se asigna dentro de la misma sentencia; junto con el
        // lock por vehículo esto impide números duplicados bajo concurrencia.
        let inserted = sqlx::query_as::<_, Trip>(
            r#"
            INSERT INTO trips (
                id, trip_number, vehicle_id, driver_id, customer_id, trip_status,
                leaving_datetime, estimated_return_datetime, actual_return_datetime,
                start_meter, end_meter,
                mileage_cost, additional_mileage_cost, fuel_price_per_unit,
                fuel_efficiency, driver_cost_daily, vehicle_rent_daily,
                discount, damage_cost, num_passengers, driver_required, fuel_required,
                actual_distance, actual_days, total_estimated_cost, total_actual_cost,
                payment_amount, payment_status, profit, created_at
            )
            VALUES (
                $1, (SELECT COALESCE(MAX(trip_number), 0) + 1 FROM trips),
                $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15,
                $16, $17, $18, $19, $20, $21, $22, $23, $24, $25, $26, $27, $28, $29
            )
            RETURNING *
            "#,
        )
        .bind(trip.id)
        .bind(trip.vehicle_id)
        .bind(trip.driver_id)
        .bind(trip.customer_id)
        .bind(trip.trip_status)
        .bind(trip.leaving_datetime)
        .bind(trip.estimated_return_datetime)
        .bind(trip.actual_return_datetime)
        .bind(trip.start_meter)
        .bind(trip.end_meter)
        .bind(trip.mileage_cost)
        .bind(trip.additional_mileage_cost)
        .bind(trip.fuel_price_per_unit)
        .bind(trip.fuel_efficiency)
        .bind(trip.driver_cost_daily)
        .bind(trip.vehicle_rent_daily)
        .bind(trip.discount)
        .bind(trip.damage_cost)
        .bind(trip.num_passengers)
        .bind(trip.driver_required)
        .bind(trip.fuel_required)
        .bind(trip.actual_distance)
        .bind(trip.actual_days)
        .bind(trip.total_estimated_cost)
        .bind(trip.total_actual_cost)
        .bind(trip.payment_amount)
        .bind(trip.payment_status)
        .bind(trip.profit)
        .bind(trip.created_at)
        .fetch_one(&mut *tx)
        .await?;

        for waypoint in waypoints {
            let row = TripWaypoint {
                id: Uuid::new_v4(),
                trip_id: inserted.id,
                latitude: waypoint.latitude,
                longitude: waypoint.longitude,
                recorded_at: Utc::now(),
            };
            sqlx::query(
                r#"
                INSERT INTO trip_waypoints (id, trip_id, latitude, longitude, recorded_at)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(row.id)
            .bind(row.trip_id)
            .bind(row.latitude)
            .bind(row.longitude)
            .bind(row.recorded_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(inserted)
    }

    async fn list_payments_of(&self, trip_id: Uuid) -> AppResult<Vec<Payment>> {
        let payments = sqlx::query_as::<_, Payment>(
            "SELECT * FROM payments WHERE trip_id = $1 ORDER BY payment_date",
        )
        .bind(trip_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(payments)
    }

    async fn has_active_trip_overlapping(
        &self,
        vehicle_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<bool> {
        let result: (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM trips
                WHERE vehicle_id = $1
                  AND trip_status IN ('pending', 'ongoing')
                  AND leaving_datetime < $3
                  AND estimated_return_datetime > $2
            )
            "#,
        )
        .bind(vehicle_id)
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await?;
        Ok(result.0)
    }

    async fn add_other_cost(
        &self,
        trip_id: Uuid,
        cost_type: &str,
        amount: Decimal,
    ) -> AppResult<OtherTripCost> {
        let cost = sqlx::query_as::<_, OtherTripCost>(
            r#"
            INSERT INTO other_trip_costs (id, trip_id, cost_type, cost_amount)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(trip_id)
        .bind(cost_type)
        .bind(amount)
        .fetch_one(&self.pool)
        .await?;
        Ok(cost)
    }

    async fn find_other_cost(&self, cost_id: Uuid) -> AppResult<OtherTripCost> {
        sqlx::query_as::<_, OtherTripCost>("SELECT * FROM other_trip_costs WHERE id = $1")
            .bind(cost_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found_error("Other trip cost", &cost_id.to_string()))
    }

    async fn delete_other_cost(&self, cost_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM other_trip_costs WHERE id = $1")
            .bind(cost_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(not_found_error("Other trip cost", &cost_id.to_string()));
        }
        Ok(())
    }
}
