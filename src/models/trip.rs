//! Modelo de Trip
//!
//! El viaje es la entidad central del sistema. Se crea en estado Pending y
//! solo se muta a través de las operaciones del ciclo de vida
//! (services::trip_lifecycle_service). Los campos derivados
//! (total_actual_cost, payment_amount, payment_status, profit) nunca se
//! escriben directamente desde fuera de la máquina de estados.

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use chrono::{DateTime, Utc};
use uuid::Uuid;
use rust_decimal::Decimal;

use crate::models::driver::Driver;
use crate::models::trip_cost::OtherTripCost;
use crate::models::vehicle::Vehicle;

/// Estado del viaje - mapea al ENUM trip_status
///
/// Pending → Ongoing → Ended → Completed, con Cancelled alcanzable desde
/// Pending u Ongoing. Completed y Cancelled son terminales.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "trip_status", rename_all = "lowercase")]
pub enum TripStatus {
    Pending,
    Ongoing,
    Ended,
    Completed,
    Cancelled,
}

impl std::fmt::Display for TripStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TripStatus::Pending => "Pending",
            TripStatus::Ongoing => "Ongoing",
            TripStatus::Ended => "Ended",
            TripStatus::Completed => "Completed",
            TripStatus::Cancelled => "Cancelled",
        };
        write!(f, "{}", s)
    }
}

/// Estado de pago - mapea al ENUM payment_status
///
/// Siempre derivado de payment_amount vs el total del viaje; nunca es una
/// fuente de verdad independiente.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "payment_status", rename_all = "snake_case")]
pub enum PaymentStatus {
    Unpaid,
    PartiallyPaid,
    Paid,
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PaymentStatus::Unpaid => "Unpaid",
            PaymentStatus::PartiallyPaid => "Partially_Paid",
            PaymentStatus::Paid => "Paid",
        };
        write!(f, "{}", s)
    }
}

/// Trip principal - mapea exactamente a la tabla trips
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Trip {
    pub id: Uuid,
    /// Número correlativo visible para el operador, asignado al insertar
    pub trip_number: i32,
    pub vehicle_id: Uuid,
    pub driver_id: Option<Uuid>,
    pub customer_id: Uuid,
    pub trip_status: TripStatus,

    // Agenda
    pub leaving_datetime: DateTime<Utc>,
    pub estimated_return_datetime: DateTime<Utc>,
    pub actual_return_datetime: Option<DateTime<Utc>>,

    // Odómetro
    pub start_meter: Option<i64>,
    pub end_meter: Option<i64>,

    // Snapshot de tarifas capturado al crear el viaje. Cambios globales de
    // precios posteriores nunca alteran un viaje en curso.
    pub mileage_cost: Decimal,
    pub additional_mileage_cost: Decimal,
    pub fuel_price_per_unit: Decimal,
    pub fuel_efficiency: Option<Decimal>,
    pub driver_cost_daily: Option<Decimal>,
    pub vehicle_rent_daily: Decimal,

    // Ajustables
    pub discount: Decimal,
    pub damage_cost: Decimal,
    pub num_passengers: i32,
    pub driver_required: bool,
    pub fuel_required: bool,

    // Derivados
    pub actual_distance: Option<i64>,
    pub actual_days: Option<i64>,
    pub total_estimated_cost: Decimal,
    pub total_actual_cost: Option<Decimal>,
    pub payment_amount: Decimal,
    pub payment_status: PaymentStatus,
    pub profit: Option<Decimal>,

    pub created_at: DateTime<Utc>,
}

/// Vista inmutable de un viaje con su vehículo, conductor asignado y costos
/// itemizados. Es la entrada del calculador de costos y de las validaciones
/// de la máquina de estados.
#[derive(Debug, Clone)]
pub struct TripSnapshot {
    pub trip: Trip,
    pub vehicle: Vehicle,
    pub driver: Option<Driver>,
    pub other_costs: Vec<OtherTripCost>,
}

impl TripSnapshot {
    /// Política snapshot-or-live para el rendimiento de combustible:
    /// primero el valor fijado en el viaje, después el del vehículo.
    pub fn resolved_fuel_efficiency(&self) -> Option<Decimal> {
        self.trip.fuel_efficiency.or(self.vehicle.fuel_efficiency)
    }

    /// Política snapshot-or-live para la tarifa diaria del conductor:
    /// primero la tarifa fijada en el viaje, después la tarifa actual del
    /// conductor asignado.
    pub fn resolved_driver_daily_rate(&self) -> Option<Decimal> {
        self.trip
            .driver_cost_daily
            .or(self.driver.as_ref().and_then(|d| d.daily_charge_rate))
    }

    /// Suma de los costos itemizados del viaje
    pub fn other_costs_total(&self) -> Decimal {
        self.other_costs.iter().map(|c| c.cost_amount).sum()
    }
}
