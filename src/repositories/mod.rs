//! Repositorios del sistema
//!
//! Interfaces estrechas de persistencia consumidas por la máquina de
//! estados. Las implementaciones concretas contra PostgreSQL viven en los
//! submódulos; los tests del ciclo de vida usan fakes en memoria contra
//! estos mismos traits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::driver::Driver;
use crate::models::payment::Payment;
use crate::models::trip::{Trip, TripSnapshot};
use crate::models::trip_cost::OtherTripCost;
use crate::models::vehicle::Vehicle;
use crate::models::waypoint::NewWaypoint;
use crate::utils::errors::AppResult;

pub mod driver_repository;
pub mod payment_repository;
pub mod trip_repository;
pub mod vehicle_repository;

#[async_trait]
pub trait TripRepository: Send + Sync {
    /// Carga el viaje con su vehículo, conductor y costos itemizados
    async fn load(&self, trip_id: Uuid) -> AppResult<TripSnapshot>;

    /// Persiste el viaje completo. Todos los campos derivados comprometen
    /// juntos; nunca hay escrituras parciales.
    async fn save(&self, trip: &Trip) -> AppResult<()>;

    /// Inserta un viaje nuevo junto con sus waypoints, asignando el
    /// trip_number correlativo de forma atómica.
    async fn insert(&self, trip: &Trip, waypoints: &[NewWaypoint]) -> AppResult<Trip>;

    async fn list_payments_of(&self, trip_id: Uuid) -> AppResult<Vec<Payment>>;

    /// ¿Existe un viaje Pending/Ongoing del vehículo que se solape con la
    /// ventana dada?
    async fn has_active_trip_overlapping(
        &self,
        vehicle_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<bool>;

    async fn add_other_cost(
        &self,
        trip_id: Uuid,
        cost_type: &str,
        amount: Decimal,
    ) -> AppResult<OtherTripCost>;

    async fn find_other_cost(&self, cost_id: Uuid) -> AppResult<OtherTripCost>;

    async fn delete_other_cost(&self, cost_id: Uuid) -> AppResult<()>;
}

#[async_trait]
pub trait VehicleRepository: Send + Sync {
    async fn load(&self, vehicle_id: Uuid) -> AppResult<Vehicle>;

    /// Actualiza el odómetro. Solo se invoca bajo el lock del viaje que lo
    /// está moviendo más el lock del vehículo.
    async fn update_meter(&self, vehicle_id: Uuid, new_meter: i64) -> AppResult<()>;

    async fn set_availability(&self, vehicle_id: Uuid, available: bool) -> AppResult<()>;
}

#[async_trait]
pub trait DriverRepository: Send + Sync {
    async fn load(&self, driver_id: Uuid) -> AppResult<Driver>;
}

#[async_trait]
pub trait PaymentRepository: Send + Sync {
    async fn create(
        &self,
        trip_id: Uuid,
        amount: Decimal,
        payment_date: DateTime<Utc>,
    ) -> AppResult<Payment>;

    async fn find_by_id(&self, payment_id: Uuid) -> AppResult<Payment>;

    async fn delete(&self, payment_id: Uuid) -> AppResult<()>;
}
