//! Modelo de OtherTripCost
//!
//! Costo adicional itemizado de un viaje (peajes, lavado, multas...).
//! Contribuye aditivamente al monto bruto del viaje.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use rust_decimal::Decimal;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OtherTripCost {
    pub id: Uuid,
    pub trip_id: Uuid,
    pub cost_type: String,
    pub cost_amount: Decimal,
}
