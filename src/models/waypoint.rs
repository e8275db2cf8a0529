//! Modelo de TripWaypoint
//!
//! Punto GPS asociado a un viaje. Las filas se almacenan tal cual llegan;
//! el sistema no hace ningún procesamiento de tracking sobre ellas.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TripWaypoint {
    pub id: Uuid,
    pub trip_id: Uuid,
    pub latitude: f64,
    pub longitude: f64,
    pub recorded_at: DateTime<Utc>,
}

/// Waypoint entrante al crear un viaje (todavía sin id ni trip_id)
#[derive(Debug, Clone, Deserialize)]
pub struct NewWaypoint {
    pub latitude: f64,
    pub longitude: f64,
}
