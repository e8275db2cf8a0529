//! Services module
//!
//! Este módulo contiene la lógica de negocio de la aplicación: el cálculo
//! de costos reales y la máquina de estados del ciclo de vida de viajes.

pub mod cost_calculator;
pub mod trip_lifecycle_service;
