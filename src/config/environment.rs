//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno, las tarifas globales
//! por defecto (que se copian al snapshot de cada viaje al crearlo) y la
//! política de cancelación.

use std::env;

use rust_decimal::Decimal;

use crate::services::trip_lifecycle_service::{LifecyclePolicy, PricingDefaults};

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub cors_origins: Vec<String>,
    // Tarifas globales vigentes
    pub default_mileage_cost: Decimal,
    pub default_additional_mileage_cost: Decimal,
    pub default_fuel_price_per_unit: Decimal,
    // Política de cancelación
    pub cancel_from_ongoing: bool,
    pub cancel_clears_payments: bool,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            environment: env::var("ENVIRONMENT").expect("ENVIRONMENT must be set"),
            port: env::var("PORT")
                .expect("PORT must be set")
                .parse()
                .expect("PORT must be a valid number"),
            host: env::var("HOST").expect("HOST must be set"),
            cors_origins: env::var("CORS_ORIGINS")
                .expect("CORS_ORIGINS must be set")
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            default_mileage_cost: decimal_env("DEFAULT_MILEAGE_COST", "10"),
            default_additional_mileage_cost: decimal_env("DEFAULT_ADDITIONAL_MILEAGE_COST", "15"),
            default_fuel_price_per_unit: decimal_env("DEFAULT_FUEL_PRICE_PER_UNIT", "150"),
            cancel_from_ongoing: bool_env("CANCEL_FROM_ONGOING", true),
            cancel_clears_payments: bool_env("CANCEL_CLEARS_PAYMENTS", false),
        }
    }
}

impl EnvironmentConfig {
    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Verificar si estamos en modo producción
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Obtener la URL del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Tarifas por defecto para el snapshot de precios de un viaje nuevo
    pub fn pricing_defaults(&self) -> PricingDefaults {
        PricingDefaults {
            mileage_cost: self.default_mileage_cost,
            additional_mileage_cost: self.default_additional_mileage_cost,
            fuel_price_per_unit: self.default_fuel_price_per_unit,
        }
    }

    /// Política de cancelación configurada
    pub fn lifecycle_policy(&self) -> LifecyclePolicy {
        LifecyclePolicy {
            cancel_from_ongoing: self.cancel_from_ongoing,
            cancel_clears_payments: self.cancel_clears_payments,
        }
    }
}

fn decimal_env(name: &str, default: &str) -> Decimal {
    env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .unwrap_or_else(|_| panic!("{} must be a valid decimal", name))
}

fn bool_env(name: &str, default: bool) -> bool {
    match env::var(name) {
        Ok(value) => value == "true" || value == "1",
        Err(_) => default,
    }
}
