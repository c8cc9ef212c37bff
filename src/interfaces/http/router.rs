//! API Router with Swagger UI

use std::sync::Arc;
use std::time::Instant;

use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::application::BookingService;
use crate::interfaces::http::common::{ApiResponse, ErrorDetails, PaginatedResponse};
use crate::interfaces::http::middleware::{identity_middleware, USER_ID_HEADER};
use crate::interfaces::http::modules::{bookings, health, metrics};

/// Everything the HTTP layer needs from the running service
pub struct ApiContext {
    pub bookings: Arc<BookingService>,
    /// Pinged by `/health`; `None` on the in-memory store
    pub db: Option<DatabaseConnection>,
    /// Serves `/metrics` when a recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

/// Security scheme modifier for OpenAPI
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "user_id",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                    USER_ID_HEADER,
                    "Caller id set by the authentication gateway; optional X-User-Role (user, host, admin)",
                ))),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        bookings::create_booking,
        bookings::get_booking,
        bookings::list_my_bookings,
        bookings::list_hosted_bookings,
        bookings::update_booking_status,
        bookings::cancel_booking,
        bookings::check_availability,
    ),
    components(
        schemas(
            ApiResponse<String>,
            ErrorDetails,
            PaginatedResponse<bookings::BookingDto>,
            bookings::CreateBookingRequest,
            bookings::UpdateBookingStatusRequest,
            bookings::VehicleInfoDto,
            bookings::BookingDto,
            bookings::BookingDetailsDto,
            bookings::SpotSummaryDto,
            bookings::AvailabilityDto,
            bookings::TimeWindowDto,
            health::HealthResponse,
            health::ComponentHealth,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Server health check endpoints"),
        (name = "Bookings", description = "Parking spot bookings: create, transition, cancel, availability"),
    ),
    info(
        title = "Spotbook Booking API",
        version = "1.0.0",
        description = "Booking lifecycle and availability for shared parking spots",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// Create the API router with all routes
pub fn create_api_router(ctx: ApiContext) -> Router {
    let booking_routes = Router::new()
        .route("/bookings", post(bookings::create_booking))
        .route("/bookings/mine", get(bookings::list_my_bookings))
        .route("/bookings/hosting", get(bookings::list_hosted_bookings))
        .route("/bookings/{id}", get(bookings::get_booking))
        .route("/bookings/{id}/status", patch(bookings::update_booking_status))
        .route("/bookings/{id}/cancel", post(bookings::cancel_booking))
        .route(
            "/spots/{spot_id}/availability",
            get(bookings::check_availability),
        )
        .layer(middleware::from_fn(identity_middleware))
        .with_state(bookings::BookingAppState {
            service: ctx.bookings,
        });

    let health_routes = Router::new()
        .route("/health", get(health::health_check))
        .with_state(health::HealthState {
            db: ctx.db,
            started_at: Arc::new(Instant::now()),
        });

    let mut router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .merge(health_routes)
        .nest("/api/v1", booking_routes);

    if let Some(handle) = ctx.metrics {
        router = router.merge(
            Router::new()
                .route("/metrics", get(metrics::prometheus_metrics))
                .with_state(metrics::MetricsState { handle }),
        );
    }

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    router
        .route_layer(middleware::from_fn(metrics::http_metrics_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::BookingPolicy;
    use crate::domain::booking::BookingStatus;
    use crate::domain::{RepositoryProvider, SpotDetails};
    use crate::infrastructure::storage::InMemoryRepositoryProvider;
    use crate::interfaces::http::middleware::USER_ROLE_HEADER;
    use crate::shared::testing::{at, booking, spot};
    use crate::shared::time::FixedClock;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use rust_decimal::Decimal;
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    struct TestApp {
        router: Router,
        repos: Arc<InMemoryRepositoryProvider>,
        host: Uuid,
        renter: Uuid,
        vehicle: Uuid,
        spot: SpotDetails,
    }

    fn app() -> TestApp {
        let repos = Arc::new(InMemoryRepositoryProvider::new());
        let host = Uuid::new_v4();
        let renter = Uuid::new_v4();
        let vehicle = Uuid::new_v4();
        let spot = spot(host, Decimal::new(500, 2));
        repos.directory().add_spot(spot.clone());
        repos.directory().add_vehicle(vehicle, renter);

        let service = BookingService::new(
            repos.clone(),
            BookingPolicy::default(),
            Arc::new(FixedClock::new(at(8, 0))),
        );
        let router = create_api_router(ApiContext {
            bookings: Arc::new(service),
            db: None,
            metrics: None,
        });
        TestApp {
            router,
            repos,
            host,
            renter,
            vehicle,
            spot,
        }
    }

    impl TestApp {
        async fn call(
            &self,
            method: &str,
            uri: &str,
            caller: Option<(Uuid, &str)>,
            body: Option<Value>,
        ) -> (StatusCode, Value) {
            let mut req = Request::builder().method(method).uri(uri);
            if let Some((id, role)) = caller {
                req = req
                    .header(USER_ID_HEADER, id.to_string())
                    .header(USER_ROLE_HEADER, role);
            }
            let req = match body {
                Some(b) => req
                    .header("content-type", "application/json")
                    .body(Body::from(b.to_string())),
                None => req.body(Body::empty()),
            }
            .unwrap();

            let resp = self.router.clone().oneshot(req).await.unwrap();
            let status = resp.status();
            let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
            (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
        }

        fn create_body(&self, start: &str, end: &str) -> Value {
            json!({
                "spot_id": self.spot.id,
                "vehicle_id": self.vehicle,
                "start_time": start,
                "end_time": end,
                "vehicle_info": { "license_plate": "ab 123", "color": "red" },
                "special_instructions": "Park nose in"
            })
        }

        async fn create(&self) -> Value {
            let (status, body) = self
                .call(
                    "POST",
                    "/api/v1/bookings",
                    Some((self.renter, "user")),
                    Some(self.create_body("2030-06-03T10:00:00Z", "2030-06-03T12:00:00Z")),
                )
                .await;
            assert_eq!(status, StatusCode::CREATED, "{body}");
            body
        }
    }

    #[tokio::test]
    async fn create_returns_priced_pending_booking() {
        let app = app();
        let body = app.create().await;

        assert_eq!(body["success"], true);
        let booking = &body["data"]["booking"];
        assert_eq!(booking["status"], "pending");
        assert_eq!(booking["payment_status"], "pending");
        assert_eq!(booking["total_hours"], "2.00");
        assert_eq!(booking["total_price"], "10.00");
        assert_eq!(booking["vehicle_info"]["license_plate"], "AB 123");
        assert_eq!(body["data"]["spot"]["title"], app.spot.title);
    }

    #[tokio::test]
    async fn missing_identity_is_401() {
        let app = app();
        let (status, body) = app
            .call("GET", &format!("/api/v1/bookings/{}", Uuid::new_v4()), None, None)
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn bad_timestamp_is_422_with_details() {
        let app = app();
        let (status, body) = app
            .call(
                "POST",
                "/api/v1/bookings",
                Some((app.renter, "user")),
                Some(app.create_body("tomorrow", "2030-06-03T12:00:00Z")),
            )
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["details"]["field"], "start_time");
    }

    #[tokio::test]
    async fn self_booking_is_403() {
        let app = app();
        let (status, _) = app
            .call(
                "POST",
                "/api/v1/bookings",
                Some((app.host, "host")),
                Some(app.create_body("2030-06-03T10:00:00Z", "2030-06-03T12:00:00Z")),
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn overlap_with_confirmed_is_409() {
        let app = app();
        app.repos
            .bookings()
            .insert_if_available(booking(app.spot.id, 10, 12, BookingStatus::Confirmed))
            .await
            .unwrap();

        let (status, body) = app
            .call(
                "POST",
                "/api/v1/bookings",
                Some((app.renter, "user")),
                Some(app.create_body("2030-06-03T11:00:00Z", "2030-06-03T13:00:00Z")),
            )
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn status_patch_follows_transition_table() {
        let app = app();
        let created = app.create().await;
        let id = created["data"]["booking"]["id"].as_str().unwrap().to_string();

        let (status, _) = app
            .call(
                "PATCH",
                &format!("/api/v1/bookings/{id}/status"),
                Some((app.renter, "user")),
                Some(json!({ "status": "active" })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = app
            .call(
                "PATCH",
                &format!("/api/v1/bookings/{id}/status"),
                Some((app.host, "host")),
                Some(json!({ "status": "confirmed", "payment_status": "paid" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["data"]["booking"]["status"], "confirmed");
        assert_eq!(body["data"]["booking"]["payment_status"], "paid");

        let (status, body) = app
            .call(
                "PATCH",
                &format!("/api/v1/bookings/{id}/status"),
                Some((app.host, "host")),
                Some(json!({ "status": "finished" })),
            )
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["details"]["field"], "status");
    }

    #[tokio::test]
    async fn get_and_cancel() {
        let app = app();
        let created = app.create().await;
        let id = created["data"]["booking"]["id"].as_str().unwrap().to_string();

        let (status, _) = app
            .call("GET", &format!("/api/v1/bookings/{id}"), Some((app.host, "host")), None)
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = app
            .call(
                "GET",
                &format!("/api/v1/bookings/{id}"),
                Some((Uuid::new_v4(), "user")),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = app
            .call(
                "POST",
                &format!("/api/v1/bookings/{id}/cancel"),
                Some((app.renter, "user")),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "cancelled");

        let (status, _) = app
            .call(
                "GET",
                &format!("/api/v1/bookings/{}", Uuid::new_v4()),
                Some((app.renter, "user")),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn listings_are_paginated() {
        let app = app();
        app.create().await;

        let (status, body) = app
            .call(
                "GET",
                "/api/v1/bookings/mine?page=0&limit=500",
                Some((app.renter, "user")),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["total"], 1);
        assert_eq!(body["data"]["page"], 1);
        assert_eq!(body["data"]["limit"], 100);
        assert_eq!(body["data"]["has_next"], false);

        let (status, body) = app
            .call(
                "GET",
                "/api/v1/bookings/hosting?status=pending",
                Some((app.host, "host")),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["items"].as_array().map(Vec::len), Some(1));

        let (status, _) = app
            .call("GET", "/api/v1/bookings/hosting", Some((app.renter, "user")), None)
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn page_number_at_u64_max_returns_empty_page() {
        let app = app();
        app.create().await;

        let (status, body) = app
            .call(
                "GET",
                "/api/v1/bookings/mine?page=18446744073709551615&limit=100",
                Some((app.renter, "user")),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["items"].as_array().map(Vec::len), Some(0));
        assert_eq!(body["data"]["total"], 1);
        assert_eq!(body["data"]["pages"], 1);
        assert_eq!(body["data"]["has_prev"], true);
        assert_eq!(body["data"]["has_next"], false);
    }

    #[tokio::test]
    async fn availability_endpoint() {
        let app = app();
        app.repos
            .bookings()
            .insert_if_available(booking(app.spot.id, 10, 12, BookingStatus::Active))
            .await
            .unwrap();

        let (status, body) = app
            .call(
                "GET",
                &format!(
                    "/api/v1/spots/{}/availability?start=2030-06-03T11:00:00Z&end=2030-06-03T13:00:00Z",
                    app.spot.id
                ),
                Some((app.renter, "user")),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["available"], false);
        assert_eq!(body["data"]["conflicts"].as_array().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn health_without_database() {
        let app = app();
        let (status, body) = app.call("GET", "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[test]
    fn openapi_lists_booking_paths() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/v1/bookings"));
        assert!(doc.paths.paths.contains_key("/api/v1/spots/{spot_id}/availability"));
    }
}
