//! Controller del ciclo de vida de viajes
//!
//! Capa delgada entre las rutas HTTP y la máquina de estados: arma el
//! servicio con los repositorios PostgreSQL y traduce los resultados a la
//! envoltura ApiResponse.

use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;

use crate::config::environment::EnvironmentConfig;
use crate::dto::trip_dto::{
    AddDamageRequest, AddOtherCostRequest, AddPaymentRequest, AlterMeterRequest, ApiResponse,
    CreateTripRequest, EndTripRequest, StartTripRequest, TripResponse,
};
use crate::repositories::driver_repository::PgDriverRepository;
use crate::repositories::payment_repository::PgPaymentRepository;
use crate::repositories::trip_repository::PgTripRepository;
use crate::repositories::vehicle_repository::PgVehicleRepository;
use crate::services::trip_lifecycle_service::TripLifecycleService;
use crate::utils::errors::AppError;

pub struct TripController {
    service: TripLifecycleService,
}

impl TripController {
    pub fn new(pool: PgPool, config: &EnvironmentConfig) -> Self {
        let service = TripLifecycleService::new(
            Arc::new(PgTripRepository::new(pool.clone())),
            Arc::new(PgVehicleRepository::new(pool.clone())),
            Arc::new(PgDriverRepository::new(pool.clone())),
            Arc::new(PgPaymentRepository::new(pool)),
            config.pricing_defaults(),
            config.lifecycle_policy(),
        );
        Self { service }
    }

    pub async fn create(
        &self,
        request: CreateTripRequest,
    ) -> Result<ApiResponse<TripResponse>, AppError> {
        let trip = self.service.create_trip(request).await?;
        Ok(ApiResponse::success_with_message(
            trip.into(),
            "Viaje creado exitosamente".to_string(),
        ))
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<ApiResponse<TripResponse>, AppError> {
        let trip = self.service.get_trip(id).await?;
        Ok(ApiResponse::success(trip.into()))
    }

    pub async fn start(
        &self,
        id: Uuid,
        request: StartTripRequest,
    ) -> Result<ApiResponse<TripResponse>, AppError> {
        let trip = self.service.start_trip(id, request.start_meter).await?;
        Ok(ApiResponse::success_with_message(
            trip.into(),
            "Viaje iniciado exitosamente".to_string(),
        ))
    }

    pub async fn end(
        &self,
        id: Uuid,
        request: EndTripRequest,
    ) -> Result<ApiResponse<TripResponse>, AppError> {
        let trip = self.service.end_trip(id, request.end_meter).await?;
        Ok(ApiResponse::success_with_message(
            trip.into(),
            "Viaje terminado exitosamente".to_string(),
        ))
    }

    pub async fn alter_meter(
        &self,
        id: Uuid,
        request: AlterMeterRequest,
    ) -> Result<ApiResponse<TripResponse>, AppError> {
        let trip = self.service.alter_meter(id, request).await?;
        Ok(ApiResponse::success_with_message(
            trip.into(),
            "Odómetro del viaje corregido exitosamente".to_string(),
        ))
    }

    pub async fn add_payment(
        &self,
        id: Uuid,
        request: AddPaymentRequest,
    ) -> Result<ApiResponse<TripResponse>, AppError> {
        let trip = self.service.add_payment(id, request.amount).await?;
        Ok(ApiResponse::success_with_message(
            trip.into(),
            "Pago registrado exitosamente".to_string(),
        ))
    }

    pub async fn delete_payment(
        &self,
        payment_id: Uuid,
    ) -> Result<ApiResponse<TripResponse>, AppError> {
        let trip = self.service.delete_payment(payment_id).await?;
        Ok(ApiResponse::success_with_message(
            trip.into(),
            "Pago eliminado exitosamente".to_string(),
        ))
    }

    pub async fn add_damage(
        &self,
        id: Uuid,
        request: AddDamageRequest,
    ) -> Result<ApiResponse<TripResponse>, AppError> {
        let trip = self.service.add_damage(id, request.amount).await?;
        Ok(ApiResponse::success_with_message(
            trip.into(),
            "Costo por daños registrado exitosamente".to_string(),
        ))
    }

    pub async fn add_other_cost(
        &self,
        id: Uuid,
        request: AddOtherCostRequest,
    ) -> Result<ApiResponse<TripResponse>, AppError> {
        let trip = self.service.add_other_cost(id, request).await?;
        Ok(ApiResponse::success_with_message(
            trip.into(),
            "Costo adicional registrado exitosamente".to_string(),
        ))
    }

    pub async fn delete_other_cost(
        &self,
        cost_id: Uuid,
    ) -> Result<ApiResponse<TripResponse>, AppError> {
        let trip = self.service.delete_other_cost(cost_id).await?;
        Ok(ApiResponse::success_with_message(
            trip.into(),
            "Costo adicional eliminado exitosamente".to_string(),
        ))
    }

    pub async fn complete(&self, id: Uuid) -> Result<ApiResponse<TripResponse>, AppError> {
        let trip = self.service.complete_trip(id).await?;
        Ok(ApiResponse::success_with_message(
            trip.into(),
            "Viaje completado exitosamente".to_string(),
        ))
    }

    pub async fn cancel(&self, id: Uuid) -> Result<ApiResponse<TripResponse>, AppError> {
        let trip = self.service.cancel_trip(id).await?;
        Ok(ApiResponse::success_with_message(
            trip.into(),
            "Viaje cancelado exitosamente".to_string(),
        ))
    }
}
