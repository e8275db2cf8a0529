use axum::{
    extract::{Path, State},
    routing::{delete, get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::trip_controller::TripController;
use crate::dto::trip_dto::{
    AddDamageRequest, AddOtherCostRequest, AddPaymentRequest, AlterMeterRequest, ApiResponse,
    CreateTripRequest, EndTripRequest, StartTripRequest, TripResponse,
};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_trip_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_trip))
        .route("/:id", get(get_trip))
        .route("/:id/start", post(start_trip))
        .route("/:id/end", post(end_trip))
        .route("/:id/meter", post(alter_meter))
        .route("/:id/payments", post(add_payment))
        .route("/payments/:payment_id", delete(delete_payment))
        .route("/:id/damage", post(add_damage))
        .route("/:id/costs", post(add_other_cost))
        .route("/costs/:cost_id", delete(delete_other_cost))
        .route("/:id/complete", post(complete_trip))
        .route("/:id/cancel", post(cancel_trip))
}

async fn create_trip(
    State(state): State<AppState>,
    Json(request): Json<CreateTripRequest>,
) -> Result<Json<ApiResponse<TripResponse>>, AppError> {
    let controller = TripController::new(state.pool.clone(), &state.config);
    let response = controller.create(request).await?;
    Ok(Json(response))
}

async fn get_trip(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<TripResponse>>, AppError> {
    let controller = TripController::new(state.pool.clone(), &state.config);
    let response = controller.get_by_id(id).await?;
    Ok(Json(response))
}

async fn start_trip(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<StartTripRequest>,
) -> Result<Json<ApiResponse<TripResponse>>, AppError> {
    let controller = TripController::new(state.pool.clone(), &state.config);
    let response = controller.start(id, request).await?;
    Ok(Json(response))
}

async fn end_trip(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<EndTripRequest>,
) -> Result<Json<ApiResponse<TripResponse>>, AppError> {
    let controller = TripController::new(state.pool.clone(), &state.config);
    let response = controller.end(id, request).await?;
    Ok(Json(response))
}

async fn alter_meter(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<AlterMeterRequest>,
) -> Result<Json<ApiResponse<TripResponse>>, AppError> {
    let controller = TripController::new(state.pool.clone(), &state.config);
    let response = controller.alter_meter(id, request).await?;
    Ok(Json(response))
}

async fn add_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<AddPaymentRequest>,
) -> Result<Json<ApiResponse<TripResponse>>, AppError> {
    let controller = TripController::new(state.pool.clone(), &state.config);
    let response = controller.add_payment(id, request).await?;
    Ok(Json(response))
}

async fn delete_payment(
    State(state): State<AppState>,
    Path(payment_id): Path<Uuid>,
) -> Result<Json<ApiResponse<TripResponse>>, AppError> {
    let controller = TripController::new(state.pool.clone(), &state.config);
    let response = controller.delete_payment(payment_id).await?;
    Ok(Json(response))
}

async fn add_damage(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<AddDamageRequest>,
) -> Result<Json<ApiResponse<TripResponse>>, AppError> {
    let controller = TripController::new(state.pool.clone(), &state.config);
    let response = controller.add_damage(id, request).await?;
    Ok(Json(response))
}

async fn add_other_cost(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<AddOtherCostRequest>,
) -> Result<Json<ApiResponse<TripResponse>>, AppError> {
    let controller = TripController::new(state.pool.clone(), &state.config);
    let response = controller.add_other_cost(id, request).await?;
    Ok(Json(response))
}

async fn delete_other_cost(
    State(state): State<AppState>,
    Path(cost_id): Path<Uuid>,
) -> Result<Json<ApiResponse<TripResponse>>, AppError> {
    let controller = TripController::new(state.pool.clone(), &state.config);
    let response = controller.delete_other_cost(cost_id).await?;
    Ok(Json(response))
}

async fn complete_trip(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<TripResponse>>, AppError> {
    let controller = TripController::new(state.pool.clone(), &state.config);
    let response = controller.complete(id).await?;
    Ok(Json(response))
}

async fn cancel_trip(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<TripResponse>>, AppError> {
    let controller = TripController::new(state.pool.clone(), &state.config);
    let response = controller.cancel(id).await?;
    Ok(Json(response))
}
