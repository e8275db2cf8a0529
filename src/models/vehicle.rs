//! Modelo de Vehicle
//!
//! Este módulo contiene el struct Vehicle de la flota. El odómetro
//! (meter_number) es mutado por el ciclo de vida de los viajes: al terminar
//! un viaje, meter_number debe quedar igual al end_meter de ese viaje.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use chrono::{DateTime, Utc};
use uuid::Uuid;
use rust_decimal::Decimal;

/// Vehicle principal - mapea exactamente a la tabla vehicles
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Vehicle {
    pub id: Uuid,
    pub registration_number: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    /// Odómetro actual en unidades de distancia
    pub meter_number: i64,
    pub rent_cost_daily: Decimal,
    /// Rendimiento de combustible (unidades de distancia por unidad de combustible)
    pub fuel_efficiency: Option<Decimal>,
    pub availability: bool,
    pub created_at: DateTime<Utc>,
}
