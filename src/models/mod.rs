//! Modelos del sistema
//!
//! Este módulo contiene todos los modelos de datos que mapean exactamente
//! al schema PostgreSQL con las convenciones estándar.

pub mod trip;
pub mod vehicle;
pub mod driver;
pub mod payment;
pub mod trip_cost;
pub mod waypoint;
