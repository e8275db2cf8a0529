//! Modelo de Driver
//!
//! Conductor asignable a un viaje. Su tarifa diaria actual es la fuente
//! "live" cuando el viaje no fijó su propia tarifa al crearse.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use chrono::{DateTime, Utc};
use uuid::Uuid;
use rust_decimal::Decimal;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Driver {
    pub id: Uuid,
    pub full_name: String,
    pub license_number: String,
    pub daily_charge_rate: Option<Decimal>,
    pub availability: bool,
    pub created_at: DateTime<Utc>,
}
