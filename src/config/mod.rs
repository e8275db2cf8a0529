//! Configuración del proyecto
//!
//! Este módulo contiene la configuración de variables de entorno,
//! tarifas por defecto y política de cancelación.

pub mod environment;

pub use environment::*;
