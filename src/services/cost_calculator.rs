//! Calculador de costos reales de un viaje
//!
//! Función pura y síncrona: recibe un TripSnapshot y los parámetros de
//! cierre (odómetro final, fecha de retorno, override de días) y produce el
//! desglose completo de costos. No toca base de datos ni lee el reloj; el
//! "ahora" entra como parámetro.
//!
//! Reglas de negocio:
//! - Cada día otorga 100 unidades de distancia a tarifa base; el excedente
//!   se cobra a la tarifa adicional.
//! - El combustible es un costo operativo interno: entra al cálculo de
//!   profit pero no al total cobrado al cliente.
//! - El daño se suma a lo que debe el cliente después del descuento y queda
//!   fuera del profit (se traslada al responsable).

use chrono::{DateTime, Utc};
use num_traits::Zero;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::trip::TripSnapshot;
use crate::utils::errors::{AppError, AppResult};

/// Unidades de distancia libres por día antes de aplicar la tarifa adicional
pub const FREE_DISTANCE_PER_DAY: i64 = 100;

const SECONDS_PER_DAY: i64 = 86_400;

/// Parámetros de entrada del cálculo
#[derive(Debug, Clone)]
pub struct CostParams {
    /// Lectura final del odómetro
    pub end_meter: i64,
    /// Fecha de retorno explícita; si falta se usa la almacenada en el viaje
    /// y en último término `now`
    pub actual_return: Option<DateTime<Utc>>,
    /// Si está presente, fija el número de días e ignora las fechas. Se usa
    /// al corregir el odómetro sin alterar los días ya facturados.
    pub days_override: Option<i64>,
    /// Reloj inyectado por el llamador
    pub now: DateTime<Utc>,
}

/// Resultado del cálculo: todos los montos en 2 decimales
#[derive(Debug, Clone, PartialEq)]
pub struct ActualCostResult {
    pub actual_distance: i64,
    pub actual_days: i64,
    pub default_distance: i64,
    pub additional_distance: i64,
    pub default_distance_cost: Decimal,
    pub additional_distance_cost: Decimal,
    pub fuel_cost: Decimal,
    pub driver_cost: Decimal,
    pub other_costs: Decimal,
    pub gross_trip_amount: Decimal,
    pub discount_applied: Decimal,
    pub damage_cost: Decimal,
    pub total_actual_cost: Decimal,
    pub profit: Decimal,
}

/// Días enteros (techo) entre dos instantes, mínimo 1
pub fn day_span(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    let secs = (to - from).num_seconds();
    if secs <= 0 {
        return 1;
    }
    let full_days = secs / SECONDS_PER_DAY;
    let days = if secs % SECONDS_PER_DAY == 0 {
        full_days
    } else {
        full_days + 1
    };
    days.max(1)
}

fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Calcula distancia, días y el desglose económico real del viaje.
///
/// El clamp de distancia a 0 cuando end_meter < start_meter es defensivo:
/// el rechazo de negocio de esa condición ocurre antes, en la máquina de
/// estados.
pub fn compute_actual_cost(
    snapshot: &TripSnapshot,
    params: &CostParams,
) -> AppResult<ActualCostResult> {
    let trip = &snapshot.trip;

    let start_meter = trip.start_meter.ok_or_else(|| {
        AppError::Consistency("el viaje no tiene lectura inicial de odómetro".to_string())
    })?;

    if trip.vehicle_rent_daily < Decimal::zero() {
        return Err(AppError::Consistency(
            "la tarifa diaria del vehículo en el snapshot es negativa".to_string(),
        ));
    }

    // 1. Distancia real, nunca negativa
    let actual_distance = (params.end_meter - start_meter).max(0);

    // 2. Días reales: override explícito o techo de la diferencia de fechas
    let actual_days = match params.days_override {
        Some(days) if days > 0 => days,
        Some(days) => {
            return Err(AppError::Validation(format!(
                "el override de días debe ser positivo, se recibió {}",
                days
            )));
        }
        None => {
            let return_date = params
                .actual_return
                .or(trip.actual_return_datetime)
                .unwrap_or(params.now);
            day_span(trip.leaving_datetime, return_date)
        }
    };

    // 3. Kilometraje escalonado
    let allowance = actual_days * FREE_DISTANCE_PER_DAY;
    let default_distance = actual_distance.min(allowance);
    let additional_distance = (actual_distance - allowance).max(0);
    let default_distance_cost = round_money(Decimal::from(default_distance) * trip.mileage_cost);
    let additional_distance_cost =
        round_money(Decimal::from(additional_distance) * trip.additional_mileage_cost);

    // 4. Combustible: solo con rendimiento positivo resuelto
    let fuel_cost = match snapshot.resolved_fuel_efficiency() {
        Some(efficiency) if efficiency > Decimal::zero() => round_money(
            Decimal::from(actual_distance) / efficiency * trip.fuel_price_per_unit,
        ),
        _ => Decimal::zero(),
    };

    // 5. Conductor
    let driver_cost = if trip.driver_required {
        let rate = snapshot.resolved_driver_daily_rate().ok_or_else(|| {
            AppError::Consistency(
                "el viaje requiere conductor pero no hay tarifa diaria resoluble".to_string(),
            )
        })?;
        round_money(rate * Decimal::from(actual_days))
    } else {
        Decimal::zero()
    };

    // 6. Costos itemizados
    let other_costs = round_money(snapshot.other_costs_total());

    // 7. Monto bruto
    let vehicle_cost = round_money(trip.vehicle_rent_daily * Decimal::from(actual_days));
    let gross_trip_amount =
        vehicle_cost + default_distance_cost + additional_distance_cost + driver_cost + other_costs;

    // 8. Descuento acotado al bruto
    let discount_applied = trip.discount.min(gross_trip_amount);

    // 9. Total cobrado: bruto - descuento + daño (el daño no se netea en profit)
    let damage_cost = round_money(trip.damage_cost);
    let total_actual_cost = gross_trip_amount - discount_applied + damage_cost;

    // 10-11. Base interna de costos y profit (combustible adentro, daño afuera)
    let internal_costs = vehicle_cost + driver_cost + other_costs + fuel_cost;
    let profit = gross_trip_amount - internal_costs - discount_applied;

    Ok(ActualCostResult {
        actual_distance,
        actual_days,
        default_distance,
        additional_distance,
        default_distance_cost,
        additional_distance_cost,
        fuel_cost,
        driver_cost,
        other_costs,
        gross_trip_amount,
        discount_applied,
        damage_cost,
        total_actual_cost,
        profit,
    })
}

/// Costo estimado al crear el viaje: tarifa diaria del vehículo más el
/// conductor si fue solicitado. La distancia todavía no se conoce.
pub fn estimate_cost(
    estimated_days: i64,
    vehicle_rent_daily: Decimal,
    driver_daily_rate: Option<Decimal>,
    driver_required: bool,
) -> Decimal {
    let vehicle = vehicle_rent_daily * Decimal::from(estimated_days);
    let driver = if driver_required {
        driver_daily_rate.unwrap_or_else(Decimal::zero) * Decimal::from(estimated_days)
    } else {
        Decimal::zero()
    };
    round_money(vehicle + driver)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::driver::Driver;
    use crate::models::trip::{PaymentStatus, Trip, TripStatus};
    use crate::models::trip_cost::OtherTripCost;
    use crate::models::vehicle::Vehicle;
    use chrono::Duration;
    use uuid::Uuid;

    fn dec(value: i64) -> Decimal {
        Decimal::from(value)
    }

    fn base_snapshot() -> TripSnapshot {
        let leaving = Utc::now() - Duration::days(10);
        let trip = Trip {
            id: Uuid::new_v4(),
            trip_number: 1,
            vehicle_id: Uuid::new_v4(),
            driver_id: None,
            customer_id: Uuid::new_v4(),
            trip_status: TripStatus::Ongoing,
            leaving_datetime: leaving,
            estimated_return_datetime: leaving + Duration::days(3),
            actual_return_datetime: None,
            start_meter: Some(1000),
            end_meter: None,
            mileage_cost: dec(10),
            additional_mileage_cost: dec(15),
            fuel_price_per_unit: dec(150),
            fuel_efficiency: Some(dec(10)),
            driver_cost_daily: Some(dec(1500)),
            vehicle_rent_daily: dec(5000),
            discount: Decimal::ZERO,
            damage_cost: Decimal::ZERO,
            num_passengers: 2,
            driver_required: false,
            fuel_required: true,
            actual_distance: None,
            actual_days: None,
            total_estimated_cost: dec(15000),
            total_actual_cost: None,
            payment_amount: Decimal::ZERO,
            payment_status: PaymentStatus::Unpaid,
            profit: None,
            created_at: leaving,
        };
        let vehicle = Vehicle {
            id: trip.vehicle_id,
            registration_number: "AB-1234".to_string(),
            brand: Some("Toyota".to_string()),
            model: Some("Hiace".to_string()),
            meter_number: 1000,
            rent_cost_daily: dec(5000),
            fuel_efficiency: Some(dec(8)),
            availability: false,
            created_at: leaving,
        };
        TripSnapshot {
            trip,
            vehicle,
            driver: None,
            other_costs: Vec::new(),
        }
    }

    fn params_with_days(end_meter: i64, days: i64) -> CostParams {
        CostParams {
            end_meter,
            actual_return: None,
            days_override: Some(days),
            now: Utc::now(),
        }
    }

    #[test]
    fn test_distance_clamped_to_zero_when_end_meter_below_start() {
        let snapshot = base_snapshot();
        let result = compute_actual_cost(&snapshot, &params_with_days(900, 1)).unwrap();
        assert_eq!(result.actual_distance, 0);
        assert_eq!(result.default_distance_cost, Decimal::ZERO);
        assert_eq!(result.additional_distance_cost, Decimal::ZERO);
    }

    #[test]
    fn test_day_span_ceils_and_floors_at_one() {
        let t0 = Utc::now();
        assert_eq!(day_span(t0, t0), 1);
        assert_eq!(day_span(t0, t0 + Duration::hours(5)), 1);
        assert_eq!(day_span(t0, t0 + Duration::days(2)), 2);
        assert_eq!(day_span(t0, t0 + Duration::days(2) + Duration::hours(1)), 3);
        // Fecha de retorno anterior a la salida: nunca menos de un día
        assert_eq!(day_span(t0, t0 - Duration::days(4)), 1);
    }

    #[test]
    fn test_mileage_tier_within_allowance() {
        let snapshot = base_snapshot();
        // 3 días => 300 de franquicia, 250 recorridos quedan todos en tarifa base
        let result = compute_actual_cost(&snapshot, &params_with_days(1250, 3)).unwrap();
        assert_eq!(result.default_distance, 250);
        assert_eq!(result.additional_distance, 0);
        assert_eq!(result.default_distance_cost, dec(2500));
        assert_eq!(result.additional_distance_cost, Decimal::ZERO);
    }

    #[test]
    fn test_mileage_tier_above_allowance() {
        let snapshot = base_snapshot();
        // 2 días => 200 de franquicia, 50 excedentes a tarifa adicional
        let result = compute_actual_cost(&snapshot, &params_with_days(1250, 2)).unwrap();
        assert_eq!(result.default_distance, 200);
        assert_eq!(result.additional_distance, 50);
        assert_eq!(result.default_distance_cost, dec(2000));
        assert_eq!(result.additional_distance_cost, dec(750));
    }

    #[test]
    fn test_discount_capped_at_gross_amount() {
        let mut snapshot = base_snapshot();
        snapshot.trip.discount = dec(1_000_000);
        let result = compute_actual_cost(&snapshot, &params_with_days(1100, 1)).unwrap();
        assert_eq!(result.discount_applied, result.gross_trip_amount);
        assert_eq!(result.total_actual_cost, Decimal::ZERO);
        assert!(result.total_actual_cost >= Decimal::ZERO);
    }

    #[test]
    fn test_days_override_makes_result_independent_of_return_date() {
        let snapshot = base_snapshot();
        let mut params_a = params_with_days(1500, 2);
        params_a.actual_return = Some(snapshot.trip.leaving_datetime + Duration::days(9));
        let mut params_b = params_with_days(1500, 2);
        params_b.actual_return = Some(snapshot.trip.leaving_datetime + Duration::days(1));

        let result_a = compute_actual_cost(&snapshot, &params_a).unwrap();
        let result_b = compute_actual_cost(&snapshot, &params_b).unwrap();
        assert_eq!(result_a.actual_days, 2);
        assert_eq!(result_a.actual_days, result_b.actual_days);
        assert_eq!(result_a.default_distance_cost, result_b.default_distance_cost);
        assert_eq!(
            result_a.additional_distance_cost,
            result_b.additional_distance_cost
        );
    }

    #[test]
    fn test_days_override_must_be_positive() {
        let snapshot = base_snapshot();
        let result = compute_actual_cost(&snapshot, &params_with_days(1500, 0));
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_days_from_dates_when_no_override() {
        let snapshot = base_snapshot();
        let params = CostParams {
            end_meter: 1100,
            actual_return: Some(snapshot.trip.leaving_datetime + Duration::days(2) + Duration::hours(6)),
            days_override: None,
            now: Utc::now(),
        };
        let result = compute_actual_cost(&snapshot, &params).unwrap();
        assert_eq!(result.actual_days, 3);
    }

    #[test]
    fn test_fuel_efficiency_falls_back_to_vehicle() {
        let mut snapshot = base_snapshot();
        snapshot.trip.fuel_efficiency = None;
        // 400 de distancia / 8 (del vehículo) * 150 = 7500
        let result = compute_actual_cost(&snapshot, &params_with_days(1400, 2)).unwrap();
        assert_eq!(result.fuel_cost, dec(7500));
    }

    #[test]
    fn test_fuel_cost_zero_without_positive_efficiency() {
        let mut snapshot = base_snapshot();
        snapshot.trip.fuel_efficiency = None;
        snapshot.vehicle.fuel_efficiency = None;
        let result = compute_actual_cost(&snapshot, &params_with_days(1400, 2)).unwrap();
        assert_eq!(result.fuel_cost, Decimal::ZERO);

        snapshot.vehicle.fuel_efficiency = Some(Decimal::ZERO);
        let result = compute_actual_cost(&snapshot, &params_with_days(1400, 2)).unwrap();
        assert_eq!(result.fuel_cost, Decimal::ZERO);
    }

    #[test]
    fn test_driver_cost_only_when_required() {
        let mut snapshot = base_snapshot();
        snapshot.trip.driver_required = false;
        let result = compute_actual_cost(&snapshot, &params_with_days(1100, 2)).unwrap();
        assert_eq!(result.driver_cost, Decimal::ZERO);

        snapshot.trip.driver_required = true;
        let result = compute_actual_cost(&snapshot, &params_with_days(1100, 2)).unwrap();
        assert_eq!(result.driver_cost, dec(3000));
    }

    #[test]
    fn test_driver_rate_falls_back_to_assigned_driver() {
        let mut snapshot = base_snapshot();
        snapshot.trip.driver_required = true;
        snapshot.trip.driver_cost_daily = None;
        snapshot.driver = Some(Driver {
            id: Uuid::new_v4(),
            full_name: "Carlos Pérez".to_string(),
            license_number: "LIC-99".to_string(),
            daily_charge_rate: Some(dec(1200)),
            availability: true,
            created_at: Utc::now(),
        });
        let result = compute_actual_cost(&snapshot, &params_with_days(1100, 3)).unwrap();
        assert_eq!(result.driver_cost, dec(3600));
    }

    #[test]
    fn test_driver_required_without_resolvable_rate_is_fatal() {
        let mut snapshot = base_snapshot();
        snapshot.trip.driver_required = true;
        snapshot.trip.driver_cost_daily = None;
        snapshot.driver = None;
        let result = compute_actual_cost(&snapshot, &params_with_days(1100, 3));
        assert!(matches!(result, Err(AppError::Consistency(_))));
    }

    #[test]
    fn test_missing_start_meter_is_fatal() {
        let mut snapshot = base_snapshot();
        snapshot.trip.start_meter = None;
        let result = compute_actual_cost(&snapshot, &params_with_days(1100, 1));
        assert!(matches!(result, Err(AppError::Consistency(_))));
    }

    #[test]
    fn test_damage_enters_total_but_not_profit() {
        let mut snapshot = base_snapshot();
        let without_damage = compute_actual_cost(&snapshot, &params_with_days(1100, 2)).unwrap();

        snapshot.trip.damage_cost = dec(900);
        let with_damage = compute_actual_cost(&snapshot, &params_with_days(1100, 2)).unwrap();

        assert_eq!(
            with_damage.total_actual_cost,
            without_damage.total_actual_cost + dec(900)
        );
        assert_eq!(with_damage.profit, without_damage.profit);
    }

    #[test]
    fn test_full_breakdown_matches_invariant() {
        let mut snapshot = base_snapshot();
        snapshot.trip.driver_required = true;
        snapshot.trip.discount = dec(750);
        snapshot.trip.damage_cost = dec(400);
        snapshot.other_costs = vec![OtherTripCost {
            id: Uuid::new_v4(),
            trip_id: snapshot.trip.id,
            cost_type: "peaje".to_string(),
            cost_amount: dec(250),
        }];

        // 3 días, 500 de distancia: 300 en franquicia, 200 adicionales
        let result = compute_actual_cost(&snapshot, &params_with_days(1500, 3)).unwrap();
        assert_eq!(result.actual_distance, 500);
        assert_eq!(result.default_distance, 300);
        assert_eq!(result.additional_distance, 200);
        assert_eq!(result.default_distance_cost, dec(3000));
        assert_eq!(result.additional_distance_cost, dec(3000));
        assert_eq!(result.driver_cost, dec(4500));
        assert_eq!(result.fuel_cost, dec(7500));
        assert_eq!(result.other_costs, dec(250));
        // 15000 vehículo + 3000 + 3000 + 4500 conductor + 250 otros
        assert_eq!(result.gross_trip_amount, dec(25750));
        assert_eq!(result.discount_applied, dec(750));
        // total = bruto - descuento + daño
        assert_eq!(
            result.total_actual_cost,
            result.gross_trip_amount - result.discount_applied + result.damage_cost
        );
        assert_eq!(result.total_actual_cost, dec(25400));
        // profit = bruto - (vehículo + conductor + otros + combustible) - descuento
        assert_eq!(result.profit, dec(25750) - dec(27250) - dec(750));
    }

    #[test]
    fn test_estimate_cost() {
        assert_eq!(estimate_cost(3, dec(5000), Some(dec(1500)), true), dec(19500));
        assert_eq!(estimate_cost(3, dec(5000), Some(dec(1500)), false), dec(15000));
        assert_eq!(estimate_cost(2, dec(5000), None, true), dec(10000));
    }
}
