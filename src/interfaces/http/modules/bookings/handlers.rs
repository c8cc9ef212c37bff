//! Booking HTTP handlers
//!
//! Thin adapters: parse the request, call [`BookingService`], wrap the
//! result in [`ApiResponse`]. Every rule lives in the service.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use uuid::Uuid;

use crate::application::bookings::{BookingService, CreateBooking, StatusUpdate};
use crate::domain::booking::{BookingStatus, PaymentStatus, TimeWindow};
use crate::domain::{Caller, DomainResult};
use crate::interfaces::http::common::{ApiError, ApiResponse, PaginatedResponse, ValidatedJson};
use crate::shared::types::pagination::PageRequest;

use super::dto::*;

/// Application state for booking handlers.
#[derive(Clone)]
pub struct BookingAppState {
    pub service: Arc<BookingService>,
}

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

fn parse_status_filter(status: Option<&str>) -> DomainResult<Option<BookingStatus>> {
    status
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .transpose()
}

#[utoipa::path(
    post,
    path = "/api/v1/bookings",
    tag = "Bookings",
    security(("user_id" = [])),
    request_body = CreateBookingRequest,
    responses(
        (status = 201, description = "Booking created as pending", body = ApiResponse<BookingDetailsDto>),
        (status = 403, description = "Own spot or someone else's vehicle"),
        (status = 404, description = "Spot or vehicle not found"),
        (status = 409, description = "Window overlaps a confirmed or active booking"),
        (status = 422, description = "Invalid window or vehicle info"),
        (status = 502, description = "Spot or vehicle lookup failed")
    )
)]
pub async fn create_booking(
    State(state): State<BookingAppState>,
    Extension(caller): Extension<Caller>,
    ValidatedJson(request): ValidatedJson<CreateBookingRequest>,
) -> Result<(StatusCode, Json<ApiResponse<BookingDetailsDto>>), ApiError> {
    let window = TimeWindow::parse(&request.start_time, &request.end_time)?;
    let view = state
        .service
        .create(
            &caller,
            CreateBooking {
                spot_id: request.spot_id,
                vehicle_id: request.vehicle_id,
                window,
                vehicle_info: request.vehicle_info.into(),
                special_instructions: request.special_instructions,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(view.into()))))
}

#[utoipa::path(
    get,
    path = "/api/v1/bookings/{id}",
    tag = "Bookings",
    security(("user_id" = [])),
    params(("id" = Uuid, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking details", body = ApiResponse<BookingDetailsDto>),
        (status = 403, description = "Caller is neither renter nor spot owner"),
        (status = 404, description = "Booking not found")
    )
)]
pub async fn get_booking(
    State(state): State<BookingAppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
) -> ApiResult<BookingDetailsDto> {
    let view = state.service.get(&caller, id).await?;
    Ok(Json(ApiResponse::success(view.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/bookings/mine",
    tag = "Bookings",
    security(("user_id" = [])),
    params(BookingListQuery),
    responses(
        (status = 200, description = "Caller's bookings, newest start first", body = ApiResponse<PaginatedResponse<BookingDto>>),
        (status = 422, description = "Unknown status filter")
    )
)]
pub async fn list_my_bookings(
    State(state): State<BookingAppState>,
    Extension(caller): Extension<Caller>,
    Query(query): Query<BookingListQuery>,
) -> ApiResult<PaginatedResponse<BookingDto>> {
    let status = parse_status_filter(query.status.as_deref())?;
    let page = state
        .service
        .list_for_renter(&caller, status, PageRequest::new(query.page, query.limit))
        .await?;
    Ok(Json(ApiResponse::success(PaginatedResponse::from_page(
        page,
        BookingDto::from,
    ))))
}

#[utoipa::path(
    get,
    path = "/api/v1/bookings/hosting",
    tag = "Bookings",
    security(("user_id" = [])),
    params(BookingListQuery),
    responses(
        (status = 200, description = "Bookings on the caller's spots, newest start first", body = ApiResponse<PaginatedResponse<BookingDto>>),
        (status = 403, description = "Caller is not a host")
    )
)]
pub async fn list_hosted_bookings(
    State(state): State<BookingAppState>,
    Extension(caller): Extension<Caller>,
    Query(query): Query<BookingListQuery>,
) -> ApiResult<PaginatedResponse<BookingDto>> {
    let status = parse_status_filter(query.status.as_deref())?;
    let page = state
        .service
        .list_for_owner(&caller, status, PageRequest::new(query.page, query.limit))
        .await?;
    Ok(Json(ApiResponse::success(PaginatedResponse::from_page(
        page,
        BookingDto::from,
    ))))
}

#[utoipa::path(
    patch,
    path = "/api/v1/bookings/{id}/status",
    tag = "Bookings",
    security(("user_id" = [])),
    params(("id" = Uuid, Path, description = "Booking ID")),
    request_body = UpdateBookingStatusRequest,
    responses(
        (status = 200, description = "Updated booking", body = ApiResponse<BookingDetailsDto>),
        (status = 400, description = "Illegal transition or inside the cancellation window"),
        (status = 403, description = "Caller may not trigger this transition"),
        (status = 409, description = "Slot taken or booking changed concurrently")
    )
)]
pub async fn update_booking_status(
    State(state): State<BookingAppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateBookingStatusRequest>,
) -> ApiResult<BookingDetailsDto> {
    let update = StatusUpdate {
        status: request
            .status
            .as_deref()
            .map(str::parse::<BookingStatus>)
            .transpose()?,
        payment_status: request
            .payment_status
            .as_deref()
            .map(PaymentStatus::parse_update)
            .transpose()?,
    };
    let view = state.service.update_status(&caller, id, update).await?;
    Ok(Json(ApiResponse::success(view.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/bookings/{id}/cancel",
    tag = "Bookings",
    security(("user_id" = [])),
    params(("id" = Uuid, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Cancelled booking", body = ApiResponse<BookingDto>),
        (status = 400, description = "Not cancellable or inside the cancellation window"),
        (status = 403, description = "Caller is not the renter")
    )
)]
pub async fn cancel_booking(
    State(state): State<BookingAppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
) -> ApiResult<BookingDto> {
    let booking = state.service.cancel(&caller, id).await?;
    Ok(Json(ApiResponse::success(booking.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/spots/{spot_id}/availability",
    tag = "Bookings",
    security(("user_id" = [])),
    params(("spot_id" = Uuid, Path, description = "Parking spot ID"), AvailabilityQuery),
    responses(
        (status = 200, description = "Availability and blocking windows", body = ApiResponse<AvailabilityDto>),
        (status = 404, description = "Spot not found"),
        (status = 422, description = "Invalid window")
    )
)]
pub async fn check_availability(
    State(state): State<BookingAppState>,
    Path(spot_id): Path<Uuid>,
    Query(query): Query<AvailabilityQuery>,
) -> ApiResult<AvailabilityDto> {
    let window = TimeWindow::parse(&query.start, &query.end)?;
    let report = state.service.check_availability(spot_id, window).await?;
    Ok(Json(ApiResponse::success(report.into())))
}
