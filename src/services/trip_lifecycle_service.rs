//! Máquina de estados del ciclo de vida de viajes
//!
//! Única autoridad sobre las transiciones Pending → Ongoing → Ended →
//! Completed (y Cancelled) y sobre los campos derivados del viaje
//! (total_actual_cost, payment_amount, payment_status, profit). Cada
//! operación toma el lock del recurso, carga el snapshot actual, valida la
//! legalidad de la transición, recalcula lo que corresponda y persiste.
//! Una transición ilegal o una validación fallida no muta nada.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::dto::trip_dto::{AddOtherCostRequest, AlterMeterRequest, CreateTripRequest};
use crate::models::trip::{PaymentStatus, Trip, TripSnapshot, TripStatus};
use crate::models::trip_cost::OtherTripCost;
use crate::repositories::{DriverRepository, PaymentRepository, TripRepository, VehicleRepository};
use crate::services::cost_calculator::{
    compute_actual_cost, day_span, estimate_cost, ActualCostResult, CostParams,
};
use crate::utils::errors::{AppError, AppResult};
use crate::utils::locks::{LockRegistry, LOCKS};

/// Tarifas globales vigentes, copiadas al snapshot del viaje al crearlo
#[derive(Debug, Clone)]
pub struct PricingDefaults {
    pub mileage_cost: Decimal,
    pub additional_mileage_cost: Decimal,
    pub fuel_price_per_unit: Decimal,
}

/// Política de cancelación. El comportamiento histórico del negocio dejaba
/// los pagos registrados intactos al cancelar; acá queda como decisión
/// configurable del operador.
#[derive(Debug, Clone)]
pub struct LifecyclePolicy {
    /// Permitir cancelar un viaje que ya salió
    pub cancel_from_ongoing: bool,
    /// Al cancelar, eliminar los pagos registrados y dejar el saldo en cero
    pub cancel_clears_payments: bool,
}

impl Default for LifecyclePolicy {
    fn default() -> Self {
        Self {
            cancel_from_ongoing: true,
            cancel_clears_payments: false,
        }
    }
}

/// Deriva el estado de pago comparando lo pagado contra el total del viaje.
/// Se re-ejecuta después de cada mutación de payment_amount o del total;
/// nunca se persiste como un hecho independiente.
pub fn derive_payment_status(payment_amount: Decimal, total: Decimal) -> PaymentStatus {
    if payment_amount >= total {
        PaymentStatus::Paid
    } else if payment_amount > Decimal::ZERO {
        PaymentStatus::PartiallyPaid
    } else {
        PaymentStatus::Unpaid
    }
}

/// Total contra el que se evalúan los pagos: el costo real una vez que el
/// viaje terminó, el estimado mientras tanto.
fn effective_total(trip: &Trip) -> Decimal {
    trip.total_actual_cost.unwrap_or(trip.total_estimated_cost)
}

fn apply_cost_result(trip: &mut Trip, result: &ActualCostResult) {
    trip.actual_distance = Some(result.actual_distance);
    trip.actual_days = Some(result.actual_days);
    trip.total_actual_cost = Some(result.total_actual_cost);
    trip.profit = Some(result.profit);
}

pub struct TripLifecycleService {
    trips: Arc<dyn TripRepository>,
    vehicles: Arc<dyn VehicleRepository>,
    drivers: Arc<dyn DriverRepository>,
    payments: Arc<dyn PaymentRepository>,
    defaults: PricingDefaults,
    policy: LifecyclePolicy,
}

impl TripLifecycleService {
    pub fn new(
        trips: Arc<dyn TripRepository>,
        vehicles: Arc<dyn VehicleRepository>,
        drivers: Arc<dyn DriverRepository>,
        payments: Arc<dyn PaymentRepository>,
        defaults: PricingDefaults,
        policy: LifecyclePolicy,
    ) -> Self {
        Self {
            trips,
            vehicles,
            drivers,
            payments,
            defaults,
            policy,
        }
    }

    /// Re-deriva payment_amount y payment_status desde las filas de pagos.
    async fn recompute_payment_state(&self, trip: &mut Trip) -> AppResult<()> {
        let payments = self.trips.list_payments_of(trip.id).await?;
        trip.payment_amount = payments.iter().map(|p| p.amount).sum();
        trip.payment_status = derive_payment_status(trip.payment_amount, effective_total(trip));
        Ok(())
    }

    pub async fn get_trip(&self, trip_id: Uuid) -> AppResult<Trip> {
        Ok(self.trips.load(trip_id).await?.trip)
    }

    /// Crea un viaje en Pending con el snapshot de tarifas fijado. La
    /// creación se serializa por vehículo para que dos requests simultáneos
    /// no puedan reservarlo dos veces ni duplicar el correlativo.
    pub async fn create_trip(&self, request: CreateTripRequest) -> AppResult<Trip> {
        request.validate()?;

        if request.estimated_return_datetime <= request.leaving_datetime {
            return Err(AppError::Validation(
                "la fecha estimada de retorno debe ser posterior a la salida".to_string(),
            ));
        }
        let discount = request.discount.unwrap_or(Decimal::ZERO);
        if discount < Decimal::ZERO {
            return Err(AppError::Validation(
                "el descuento no puede ser negativo".to_string(),
            ));
        }

        let _guard = LOCKS
            .acquire(&LockRegistry::vehicle_key(request.vehicle_id))
            .await;

        let vehicle = self.vehicles.load(request.vehicle_id).await?;
        if !vehicle.availability {
            return Err(AppError::Conflict(
                "el vehículo no está disponible".to_string(),
            ));
        }
        if self
            .trips
            .has_active_trip_overlapping(
                request.vehicle_id,
                request.leaving_datetime,
                request.estimated_return_datetime,
            )
            .await?
        {
            return Err(AppError::Conflict(
                "el vehículo ya tiene un viaje activo en esa ventana".to_string(),
            ));
        }

        let driver = match request.driver_id {
            Some(driver_id) => Some(self.drivers.load(driver_id).await?),
            None => None,
        };
        let driver_rate = request
            .driver_cost_daily
            .or(driver.as_ref().and_then(|d| d.daily_charge_rate));
        if request.driver_required && driver_rate.is_none() {
            return Err(AppError::Validation(
                "el viaje requiere conductor pero no hay tarifa diaria asignable".to_string(),
            ));
        }

        let estimated_days = day_span(
            request.leaving_datetime,
            request.estimated_return_datetime,
        );
        let total_estimated_cost = estimate_cost(
            estimated_days,
            vehicle.rent_cost_daily,
            driver_rate,
            request.driver_required,
        );

        let trip = Trip {
            id: Uuid::new_v4(),
            // El correlativo real lo asigna el repositorio al insertar
            trip_number: 0,
            vehicle_id: request.vehicle_id,
            driver_id: request.driver_id,
            customer_id: request.customer_id,
            trip_status: TripStatus::Pending,
            leaving_datetime: request.leaving_datetime,
            estimated_return_datetime: request.estimated_return_datetime,
            actual_return_datetime: None,
            start_meter: None,
            end_meter: None,
            mileage_cost: request.mileage_cost.unwrap_or(self.defaults.mileage_cost),
            additional_mileage_cost: request
                .additional_mileage_cost
                .unwrap_or(self.defaults.additional_mileage_cost),
            fuel_price_per_unit: request
                .fuel_price_per_unit
                .unwrap_or(self.defaults.fuel_price_per_unit),
            fuel_efficiency: request.fuel_efficiency,
            driver_cost_daily: request.driver_cost_daily,
            vehicle_rent_daily: vehicle.rent_cost_daily,
            discount,
            damage_cost: Decimal::ZERO,
            num_passengers: request.num_passengers,
            driver_required: request.driver_required,
            fuel_required: request.fuel_required,
            actual_distance: None,
            actual_days: None,
            total_estimated_cost,
            total_actual_cost: None,
            payment_amount: Decimal::ZERO,
            payment_status: PaymentStatus::Unpaid,
            profit: None,
            created_at: Utc::now(),
        };

        let inserted = self.trips.insert(&trip, &request.waypoints).await?;
        info!(
            "🚗 Viaje #{} creado para vehículo {} (estimado {})",
            inserted.trip_number, inserted.vehicle_id, inserted.total_estimated_cost
        );
        Ok(inserted)
    }

    /// Pending → Ongoing. La lectura inicial no puede retroceder respecto
    /// del odómetro conocido del vehículo.
    pub async fn start_trip(&self, trip_id: Uuid, start_meter: i64) -> AppResult<Trip> {
        let _guard = LOCKS.acquire(&LockRegistry::trip_key(trip_id)).await;
        let snapshot = self.trips.load(trip_id).await?;
        let mut trip = snapshot.trip;

        if trip.trip_status != TripStatus::Pending {
            return Err(AppError::InvalidTransition {
                action: "start the trip",
                current: trip.trip_status,
            });
        }
        if start_meter < snapshot.vehicle.meter_number {
            return Err(AppError::Validation(format!(
                "la lectura inicial ({}) no puede ser menor que el odómetro del vehículo ({})",
                start_meter, snapshot.vehicle.meter_number
            )));
        }

        trip.start_meter = Some(start_meter);
        trip.trip_status = TripStatus::Ongoing;
        self.trips.save(&trip).await?;
        self.vehicles.set_availability(trip.vehicle_id, false).await?;

        info!("🟢 Viaje #{} iniciado con odómetro {}", trip.trip_number, start_meter);
        Ok(trip)
    }

    /// Ongoing → Ended. Corre el calculador con el retorno = ahora,
    /// persiste los derivados y sincroniza el odómetro del vehículo.
    pub async fn end_trip(&self, trip_id: Uuid, end_meter: i64) -> AppResult<Trip> {
        let _guard = LOCKS.acquire(&LockRegistry::trip_key(trip_id)).await;
        let snapshot = self.trips.load(trip_id).await?;

        if snapshot.trip.trip_status != TripStatus::Ongoing {
            return Err(AppError::InvalidTransition {
                action: "end the trip",
                current: snapshot.trip.trip_status,
            });
        }
        let start_meter = snapshot.trip.start_meter.ok_or_else(|| {
            AppError::Consistency("el viaje está Ongoing sin lectura inicial".to_string())
        })?;
        if end_meter < start_meter {
            return Err(AppError::Validation(format!(
                "la lectura final ({}) no puede ser menor que la inicial ({})",
                end_meter, start_meter
            )));
        }

        let now = Utc::now();
        let result = compute_actual_cost(
            &snapshot,
            &CostParams {
                end_meter,
                actual_return: Some(now),
                days_override: None,
                now,
            },
        )?;
        if result.total_actual_cost < Decimal::ZERO {
            return Err(AppError::Consistency(
                "el costo total recalculado es negativo".to_string(),
            ));
        }

        let mut trip = snapshot.trip;
        trip.end_meter = Some(end_meter);
        trip.actual_return_datetime = Some(now);
        apply_cost_result(&mut trip, &result);
        trip.trip_status = TripStatus::Ended;
        self.recompute_payment_state(&mut trip).await?;

        self.trips.save(&trip).await?;
        {
            let _vehicle_guard = LOCKS
                .acquire(&LockRegistry::vehicle_key(trip.vehicle_id))
                .await;
            self.vehicles.update_meter(trip.vehicle_id, end_meter).await?;
            self.vehicles.set_availability(trip.vehicle_id, true).await?;
        }

        info!(
            "🏁 Viaje #{} terminado: {} unidades en {} días, total {}",
            trip.trip_number, result.actual_distance, result.actual_days, result.total_actual_cost
        );
        Ok(trip)
    }

    /// Corrección operativa de odómetro y/o fechas sobre un viaje Ongoing o
    /// Ended. En un viaje Ended los días ya facturados quedan fijos salvo
    /// override explícito.
    pub async fn alter_meter(&self, trip_id: Uuid, request: AlterMeterRequest) -> AppResult<Trip> {
        let _guard = LOCKS.acquire(&LockRegistry::trip_key(trip_id)).await;
        let snapshot = self.trips.load(trip_id).await?;

        if !matches!(
            snapshot.trip.trip_status,
            TripStatus::Ongoing | TripStatus::Ended
        ) {
            return Err(AppError::InvalidTransition {
                action: "alter the meter",
                current: snapshot.trip.trip_status,
            });
        }
        let start_meter = snapshot.trip.start_meter.ok_or_else(|| {
            AppError::Consistency("el viaje no tiene lectura inicial de odómetro".to_string())
        })?;
        if request.end_meter < start_meter {
            return Err(AppError::Validation(format!(
                "la lectura final ({}) no puede ser menor que la inicial ({})",
                request.end_meter, start_meter
            )));
        }

        let locked_days = request.locked_days.or_else(|| {
            if snapshot.trip.trip_status == TripStatus::Ended {
                snapshot.trip.actual_days
            } else {
                None
            }
        });
        let result = compute_actual_cost(
            &snapshot,
            &CostParams {
                end_meter: request.end_meter,
                actual_return: request
                    .actual_return_datetime
                    .or(snapshot.trip.actual_return_datetime),
                days_override: locked_days,
                now: Utc::now(),
            },
        )?;

        let mut trip = snapshot.trip;
        trip.end_meter = Some(request.end_meter);
        if let Some(actual_return) = request.actual_return_datetime {
            trip.actual_return_datetime = Some(actual_return);
        }
        apply_cost_result(&mut trip, &result);
        self.recompute_payment_state(&mut trip).await?;

        self.trips.save(&trip).await?;
        {
            let _vehicle_guard = LOCKS
                .acquire(&LockRegistry::vehicle_key(trip.vehicle_id))
                .await;
            self.vehicles
                .update_meter(trip.vehicle_id, request.end_meter)
                .await?;
        }

        info!(
            "🔧 Viaje #{} corregido: odómetro {}, total {}",
            trip.trip_number, request.end_meter, result.total_actual_cost
        );
        Ok(trip)
    }

    /// Registra un pago y re-deriva el estado de pago del viaje.
    pub async fn add_payment(&self, trip_id: Uuid, amount: Decimal) -> AppResult<Trip> {
        if amount <= Decimal::ZERO {
            return Err(AppError::Validation(
                "el monto del pago debe ser mayor a cero".to_string(),
            ));
        }

        let _guard = LOCKS.acquire(&LockRegistry::trip_key(trip_id)).await;
        let snapshot = self.trips.load(trip_id).await?;
        let mut trip = snapshot.trip;

        if !matches!(trip.trip_status, TripStatus::Ongoing | TripStatus::Ended) {
            return Err(AppError::InvalidTransition {
                action: "add a payment",
                current: trip.trip_status,
            });
        }

        self.payments.create(trip_id, amount, Utc::now()).await?;
        self.recompute_payment_state(&mut trip).await?;
        self.trips.save(&trip).await?;

        info!(
            "💰 Pago de {} registrado en viaje #{} ({})",
            amount, trip.trip_number, trip.payment_status
        );
        Ok(trip)
    }

    /// Elimina un pago (operación administrativa, válida en cualquier
    /// estado) y re-deriva payment_amount y payment_status.
    pub async fn delete_payment(&self, payment_id: Uuid) -> AppResult<Trip> {
        let payment = self.payments.find_by_id(payment_id).await?;

        let _guard = LOCKS
            .acquire(&LockRegistry::trip_key(payment.trip_id))
            .await;
        let snapshot = self.trips.load(payment.trip_id).await?;
        let mut trip = snapshot.trip;

        self.payments.delete(payment_id).await?;
        self.recompute_payment_state(&mut trip).await?;
        self.trips.save(&trip).await?;

        info!(
            "🗑️ Pago {} eliminado del viaje #{} ({})",
            payment_id, trip.trip_number, trip.payment_status
        );
        Ok(trip)
    }

    /// Registra el costo por daños de un viaje terminado. El total cobrado
    /// sube; el profit no cambia porque el daño se traslada al responsable.
    pub async fn add_damage(&self, trip_id: Uuid, amount: Decimal) -> AppResult<Trip> {
        if amount < Decimal::ZERO {
            return Err(AppError::Validation(
                "el costo por daños no puede ser negativo".to_string(),
            ));
        }

        let _guard = LOCKS.acquire(&LockRegistry::trip_key(trip_id)).await;
        let mut snapshot = self.trips.load(trip_id).await?;

        if snapshot.trip.trip_status != TripStatus::Ended {
            return Err(AppError::InvalidTransition {
                action: "add damage cost",
                current: snapshot.trip.trip_status,
            });
        }

        snapshot.trip.damage_cost = amount;
        let result = self.recompute_ended_trip(&snapshot)?;

        let mut trip = snapshot.trip;
        apply_cost_result(&mut trip, &result);
        self.recompute_payment_state(&mut trip).await?;
        self.trips.save(&trip).await?;

        info!(
            "🔨 Daño de {} cargado al viaje #{}, nuevo total {}",
            amount, trip.trip_number, result.total_actual_cost
        );
        Ok(trip)
    }

    /// Agrega un costo itemizado. Si el viaje ya terminó, el total se
    /// recalcula en la misma operación.
    pub async fn add_other_cost(
        &self,
        trip_id: Uuid,
        request: AddOtherCostRequest,
    ) -> AppResult<Trip> {
        request.validate()?;
        if request.cost_amount <= Decimal::ZERO {
            return Err(AppError::Validation(
                "el monto del costo debe ser mayor a cero".to_string(),
            ));
        }

        let _guard = LOCKS.acquire(&LockRegistry::trip_key(trip_id)).await;
        let mut snapshot = self.trips.load(trip_id).await?;

        if !matches!(
            snapshot.trip.trip_status,
            TripStatus::Ongoing | TripStatus::Ended
        ) {
            return Err(AppError::InvalidTransition {
                action: "add a cost item",
                current: snapshot.trip.trip_status,
            });
        }

        // Cálculo prospectivo antes de insertar: si el recálculo falla no
        // queda ninguna escritura parcial
        let result = if snapshot.trip.trip_status == TripStatus::Ended {
            snapshot.other_costs.push(OtherTripCost {
                id: Uuid::new_v4(),
                trip_id,
                cost_type: request.cost_type.clone(),
                cost_amount: request.cost_amount,
            });
            Some(self.recompute_ended_trip(&snapshot)?)
        } else {
            None
        };

        self.trips
            .add_other_cost(trip_id, &request.cost_type, request.cost_amount)
            .await?;

        let mut trip = snapshot.trip;
        if let Some(result) = result {
            apply_cost_result(&mut trip, &result);
        }
        self.recompute_payment_state(&mut trip).await?;
        self.trips.save(&trip).await?;
        Ok(trip)
    }

    /// Elimina un costo itemizado. Si al recalcular el descuento quedara
    /// por encima del nuevo bruto, la operación aborta sin tocar nada.
    pub async fn delete_other_cost(&self, cost_id: Uuid) -> AppResult<Trip> {
        let cost = self.trips.find_other_cost(cost_id).await?;

        let _guard = LOCKS.acquire(&LockRegistry::trip_key(cost.trip_id)).await;
        let mut snapshot = self.trips.load(cost.trip_id).await?;

        if !matches!(
            snapshot.trip.trip_status,
            TripStatus::Ongoing | TripStatus::Ended
        ) {
            return Err(AppError::InvalidTransition {
                action: "delete a cost item",
                current: snapshot.trip.trip_status,
            });
        }

        let result = if snapshot.trip.trip_status == TripStatus::Ended {
            snapshot.other_costs.retain(|c| c.id != cost_id);
            let result = self.recompute_ended_trip(&snapshot)?;
            if snapshot.trip.discount > result.gross_trip_amount {
                return Err(AppError::Consistency(format!(
                    "el descuento ({}) excedería el monto bruto del viaje ({})",
                    snapshot.trip.discount, result.gross_trip_amount
                )));
            }
            Some(result)
        } else {
            None
        };

        self.trips.delete_other_cost(cost_id).await?;

        let mut trip = snapshot.trip;
        if let Some(result) = result {
            apply_cost_result(&mut trip, &result);
        }
        self.recompute_payment_state(&mut trip).await?;
        self.trips.save(&trip).await?;
        Ok(trip)
    }

    /// Ended → Completed, solo con el viaje totalmente pagado. El estado de
    /// pago se re-deriva desde las filas antes de decidir.
    pub async fn complete_trip(&self, trip_id: Uuid) -> AppResult<Trip> {
        let _guard = LOCKS.acquire(&LockRegistry::trip_key(trip_id)).await;
        let snapshot = self.trips.load(trip_id).await?;
        let mut trip = snapshot.trip;

        if trip.trip_status != TripStatus::Ended {
            return Err(AppError::InvalidTransition {
                action: "complete the trip",
                current: trip.trip_status,
            });
        }
        self.recompute_payment_state(&mut trip).await?;
        if trip.payment_status != PaymentStatus::Paid {
            return Err(AppError::InvalidTransition {
                action: "complete an unpaid trip",
                current: trip.trip_status,
            });
        }

        trip.trip_status = TripStatus::Completed;
        self.trips.save(&trip).await?;

        info!("✅ Viaje #{} completado", trip.trip_number);
        Ok(trip)
    }

    /// Cancela un viaje Pending (siempre) u Ongoing (según política). Los
    /// pagos registrados se conservan o se eliminan según configuración.
    pub async fn cancel_trip(&self, trip_id: Uuid) -> AppResult<Trip> {
        let _guard = LOCKS.acquire(&LockRegistry::trip_key(trip_id)).await;
        let snapshot = self.trips.load(trip_id).await?;
        let mut trip = snapshot.trip;

        let was_ongoing = match trip.trip_status {
            TripStatus::Pending => false,
            TripStatus::Ongoing if self.policy.cancel_from_ongoing => true,
            _ => {
                return Err(AppError::InvalidTransition {
                    action: "cancel the trip",
                    current: trip.trip_status,
                });
            }
        };

        if self.policy.cancel_clears_payments {
            for payment in self.trips.list_payments_of(trip_id).await? {
                self.payments.delete(payment.id).await?;
            }
        }
        self.recompute_payment_state(&mut trip).await?;

        trip.trip_status = TripStatus::Cancelled;
        self.trips.save(&trip).await?;
        if was_ongoing {
            self.vehicles.set_availability(trip.vehicle_id, true).await?;
        }

        info!("⛔ Viaje #{} cancelado", trip.trip_number);
        Ok(trip)
    }

    /// Recalcula un viaje Ended con los días y odómetro ya persistidos.
    fn recompute_ended_trip(&self, snapshot: &TripSnapshot) -> AppResult<ActualCostResult> {
        let end_meter = snapshot.trip.end_meter.ok_or_else(|| {
            AppError::Consistency("el viaje terminó sin lectura final de odómetro".to_string())
        })?;
        compute_actual_cost(
            snapshot,
            &CostParams {
                end_meter,
                actual_return: snapshot.trip.actual_return_datetime,
                days_override: snapshot.trip.actual_days,
                now: Utc::now(),
            },
        )
    }
}
