//! DTOs del ciclo de vida de viajes
//!
//! Requests y responses de la superficie de comandos. Los montos cruzan la
//! frontera como decimales de precisión fija, nunca como float nativo.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::trip::{PaymentStatus, Trip, TripStatus};
use crate::models::waypoint::NewWaypoint;

// Request para crear un viaje
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTripRequest {
    pub vehicle_id: Uuid,
    pub customer_id: Uuid,
    pub driver_id: Option<Uuid>,
    pub leaving_datetime: DateTime<Utc>,
    pub estimated_return_datetime: DateTime<Utc>,

    #[validate(range(min = 1, max = 60))]
    pub num_passengers: i32,

    pub driver_required: bool,
    pub fuel_required: bool,
    pub discount: Option<Decimal>,

    // Overrides opcionales del snapshot de tarifas; si faltan se usan los
    // valores globales configurados y los del vehículo/conductor
    pub mileage_cost: Option<Decimal>,
    pub additional_mileage_cost: Option<Decimal>,
    pub fuel_price_per_unit: Option<Decimal>,
    pub fuel_efficiency: Option<Decimal>,
    pub driver_cost_daily: Option<Decimal>,

    #[serde(default)]
    pub waypoints: Vec<NewWaypoint>,
}

// Request para iniciar un viaje
#[derive(Debug, Clone, Deserialize)]
pub struct StartTripRequest {
    pub start_meter: i64,
}

// Request para terminar un viaje
#[derive(Debug, Clone, Deserialize)]
pub struct EndTripRequest {
    pub end_meter: i64,
}

// Request para corregir odómetro y/o fechas de un viaje
#[derive(Debug, Clone, Deserialize)]
pub struct AlterMeterRequest {
    pub end_meter: i64,
    pub actual_return_datetime: Option<DateTime<Utc>>,
    /// Fija el número de días ya facturado para que la corrección del
    /// odómetro no lo cambie silenciosamente
    pub locked_days: Option<i64>,
}

// Request para registrar un pago
#[derive(Debug, Clone, Deserialize)]
pub struct AddPaymentRequest {
    pub amount: Decimal,
}

// Request para registrar costo por daños
#[derive(Debug, Clone, Deserialize)]
pub struct AddDamageRequest {
    pub amount: Decimal,
}

// Request para agregar un costo itemizado
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AddOtherCostRequest {
    #[validate(length(min = 2, max = 50))]
    pub cost_type: String,
    pub cost_amount: Decimal,
}

// Response de viaje
#[derive(Debug, Serialize)]
pub struct TripResponse {
    pub id: Uuid,
    pub trip_number: i32,
    pub vehicle_id: Uuid,
    pub driver_id: Option<Uuid>,
    pub customer_id: Uuid,
    pub trip_status: TripStatus,
    pub leaving_datetime: DateTime<Utc>,
    pub estimated_return_datetime: DateTime<Utc>,
    pub actual_return_datetime: Option<DateTime<Utc>>,
    pub start_meter: Option<i64>,
    pub end_meter: Option<i64>,
    pub discount: Decimal,
    pub damage_cost: Decimal,
    pub num_passengers: i32,
    pub driver_required: bool,
    pub fuel_required: bool,
    pub actual_distance: Option<i64>,
    pub actual_days: Option<i64>,
    pub total_estimated_cost: Decimal,
    pub total_actual_cost: Option<Decimal>,
    pub payment_amount: Decimal,
    pub payment_status: PaymentStatus,
    pub profit: Option<Decimal>,
    pub created_at: DateTime<Utc>,
}

impl From<Trip> for TripResponse {
    fn from(trip: Trip) -> Self {
        Self {
            id: trip.id,
            trip_number: trip.trip_number,
            vehicle_id: trip.vehicle_id,
            driver_id: trip.driver_id,
            customer_id: trip.customer_id,
            trip_status: trip.trip_status,
            leaving_datetime: trip.leaving_datetime,
            estimated_return_datetime: trip.estimated_return_datetime,
            actual_return_datetime: trip.actual_return_datetime,
            start_meter: trip.start_meter,
            end_meter: trip.end_meter,
            discount: trip.discount,
            damage_cost: trip.damage_cost,
            num_passengers: trip.num_passengers,
            driver_required: trip.driver_required,
            fuel_required: trip.fuel_required,
            actual_distance: trip.actual_distance,
            actual_days: trip.actual_days,
            total_estimated_cost: trip.total_estimated_cost,
            total_actual_cost: trip.total_actual_cost,
            payment_amount: trip.payment_amount,
            payment_status: trip.payment_status,
            profit: trip.profit,
            created_at: trip.created_at,
        }
    }
}

// Response genérica
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    pub fn success_with_message(data: T, message: String) -> Self {
        Self {
            success: true,
            message: Some(message),
            data: Some(data),
        }
    }
}
