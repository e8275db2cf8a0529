//! Modelo de Payment
//!
//! Pago registrado contra un viaje. La suma de los pagos de un viaje define
//! payment_amount; nunca se confía en un valor cacheado que pueda desincronizarse.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use chrono::{DateTime, Utc};
use uuid::Uuid;
use rust_decimal::Decimal;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Payment {
    pub id: Uuid,
    pub trip_id: Uuid,
    pub amount: Decimal,
    pub payment_date: DateTime<Utc>,
}
