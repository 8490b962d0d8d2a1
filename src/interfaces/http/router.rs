//! API Router with Swagger UI

use axum::{
    middleware,
    routing::{delete, get, patch, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::domain::UserRole;
use crate::interfaces::http::common::{ApiResponse, PaginatedResponse, ValidationErrorResponse};
use crate::interfaces::http::middleware::{auth_middleware, require_role, AuthState};
use crate::interfaces::http::modules::{
    auth, batteries, bookings, health, memberships, metrics, payments, reports, request_id,
    stations, transfers, vehicles,
};
use crate::interfaces::http::state::ApiState;
use crate::interfaces::ws::{self, ws_notifications_handler};

/// Security scheme modifier for OpenAPI
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT Bearer token"))
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health::health_check,
        // Auth
        auth::login,
        auth::register,
        auth::me,
        auth::create_account,
        auth::create_qr_session,
        auth::approve_qr_session,
        auth::poll_qr_session,
        // Stations
        stations::list_stations,
        stations::nearest_stations,
        stations::get_station,
        stations::list_station_slots,
        stations::create_station,
        stations::update_station,
        stations::deactivate_station,
        stations::create_cabinet,
        stations::slot_history,
        // Batteries
        batteries::list_batteries,
        batteries::get_battery,
        batteries::battery_history,
        batteries::create_battery,
        batteries::update_battery_status,
        batteries::retire_battery,
        batteries::list_battery_types,
        batteries::create_battery_type,
        // Vehicles
        vehicles::register_vehicle,
        vehicles::list_my_vehicles,
        vehicles::deactivate_vehicle,
        vehicles::list_vehicle_types,
        vehicles::create_vehicle_type,
        // Memberships
        memberships::list_plans,
        memberships::create_plan,
        memberships::deactivate_plan,
        memberships::purchase_membership,
        memberships::list_my_memberships,
        // Bookings
        bookings::create_booking,
        bookings::list_my_bookings,
        bookings::get_booking,
        bookings::cancel_booking,
        bookings::check_in,
        bookings::take_battery,
        bookings::put_battery,
        bookings::list_station_bookings,
        // Payments
        payments::get_transaction,
        payments::renew_payment_link,
        payments::sync_payment,
        payments::payment_webhook,
        // Transfers
        transfers::create_transfer,
        transfers::list_transfers,
        transfers::get_transfer,
        transfers::cancel_transfer,
        transfers::take_for_transfer,
        transfers::put_from_transfer,
        // Reports
        reports::swap_report,
        // Notifications
        ws::notifications::ws_notifications_handler,
    ),
    components(
        schemas(
            // Common
            ApiResponse<String>,
            ValidationErrorResponse,
            PaginatedResponse<stations::StationResponse>,
            PaginatedResponse<bookings::BookingResponse>,
            // Health
            health::HealthResponse,
            health::ComponentHealth,
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            auth::RegisterRequest,
            auth::CreateAccountRequest,
            auth::UserInfo,
            auth::QrSessionResponse,
            auth::QrPollResponse,
            // Stations
            stations::StationResponse,
            stations::StationDetailResponse,
            stations::NearbyStationResponse,
            stations::CabinetResponse,
            stations::SlotResponse,
            stations::SlotViewResponse,
            stations::SlotHistoryResponse,
            stations::CreateStationRequest,
            stations::UpdateStationRequest,
            stations::CreateCabinetRequest,
            // Batteries
            batteries::BatteryResponse,
            batteries::BatteryTypeResponse,
            batteries::BatteryUseResponse,
            batteries::CreateBatteryRequest,
            batteries::UpdateBatteryStatusRequest,
            batteries::CreateBatteryTypeRequest,
            // Vehicles
            vehicles::VehicleResponse,
            vehicles::VehicleTypeResponse,
            vehicles::RegisterVehicleRequest,
            vehicles::CreateVehicleTypeRequest,
            // Memberships
            memberships::PlanResponse,
            memberships::MembershipResponse,
            memberships::PurchaseResponse,
            memberships::CreatePlanRequest,
            memberships::PurchaseRequest,
            // Bookings
            bookings::CreateBookingRequest,
            bookings::BookingCreatedResponse,
            bookings::BookingResponse,
            bookings::BookingDetailResponse,
            bookings::BookingViewResponse,
            bookings::TakeBatteryRequest,
            bookings::PutBatteryRequest,
            bookings::TakeBatteryResponse,
            bookings::PutBatteryResponse,
            // Payments
            payments::TransactionResponse,
            payments::PaymentLinkResponse,
            payments::WebhookAck,
            // Transfers
            transfers::CreateTransferRequest,
            transfers::TransferResponse,
            transfers::TransferDetailResponse,
            transfers::TransferViewResponse,
            transfers::TransferMoveResponse,
            transfers::TransferTakeRequest,
            transfers::TransferPutRequest,
            // Reports
            reports::SwapReportResponse,
            reports::StationSwapsResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Server health check endpoints"),
        (name = "Authentication", description = "Login (JWT), registration, QR login, staff accounts"),
        (name = "Stations", description = "Stations, cabinets and slots"),
        (name = "Batteries", description = "Battery stock, status and usage history"),
        (name = "Vehicles", description = "Driver vehicles and vehicle types"),
        (name = "Memberships", description = "Membership plans and purchases"),
        (name = "Bookings", description = "Swap bookings, check-in and battery take/put"),
        (name = "Payments", description = "Payment transactions and gateway callbacks"),
        (name = "Transfers", description = "Battery transfers between stations"),
        (name = "Reports", description = "Swap and revenue reports"),
        (name = "Notifications", description = "Real-time event notifications via WebSocket"),
    ),
    info(
        title = "EV Swap Service API",
        version = "1.0.0",
        description = "REST API for the battery-swap station network",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// Create the API router with all routes.
///
/// `metrics` is `None` when the Prometheus recorder could not be installed;
/// `/metrics` is then not served.
pub fn create_api_router(state: ApiState, metrics: Option<metrics::MetricsState>) -> Router {
    let auth_state = AuthState {
        jwt_config: state.services.auth.jwt_config().clone(),
    };

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // ── Public ─────────────────────────────────────────────────
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/register", post(auth::register))
        .route("/api/v1/auth/qr", post(auth::create_qr_session))
        .route("/api/v1/auth/qr/{session_id}", get(auth::poll_qr_session))
        .route("/api/v1/payments/webhook", post(payments::payment_webhook))
        .route("/api/v1/notifications/ws", get(ws_notifications_handler));

    // ── Any signed-in user ─────────────────────────────────────
    // Admin-only writes that share a path with these reads check the
    // role inside the handler.
    let user_routes = Router::new()
        .route("/api/v1/auth/me", get(auth::me))
        .route(
            "/api/v1/auth/qr/{session_id}/approve",
            post(auth::approve_qr_session),
        )
        .route(
            "/api/v1/stations",
            get(stations::list_stations).post(stations::create_station),
        )
        .route("/api/v1/stations/nearest", get(stations::nearest_stations))
        .route(
            "/api/v1/stations/{id}",
            get(stations::get_station)
                .put(stations::update_station)
                .delete(stations::deactivate_station),
        )
        .route("/api/v1/stations/{id}/slots", get(stations::list_station_slots))
        .route("/api/v1/stations/{id}/cabinets", post(stations::create_cabinet))
        .route(
            "/api/v1/battery-types",
            get(batteries::list_battery_types).post(batteries::create_battery_type),
        )
        .route("/api/v1/vehicles", post(vehicles::register_vehicle))
        .route("/api/v1/vehicles/mine", get(vehicles::list_my_vehicles))
        .route("/api/v1/vehicles/{id}", delete(vehicles::deactivate_vehicle))
        .route(
            "/api/v1/vehicle-types",
            get(vehicles::list_vehicle_types).post(vehicles::create_vehicle_type),
        )
        .route(
            "/api/v1/membership-plans",
            get(memberships::list_plans).post(memberships::create_plan),
        )
        .route(
            "/api/v1/membership-plans/{id}",
            delete(memberships::deactivate_plan),
        )
        .route("/api/v1/memberships", post(memberships::purchase_membership))
        .route("/api/v1/memberships/mine", get(memberships::list_my_memberships))
        .route("/api/v1/bookings", post(bookings::create_booking))
        .route("/api/v1/bookings/mine", get(bookings::list_my_bookings))
        .route("/api/v1/bookings/{id}", get(bookings::get_booking))
        .route("/api/v1/bookings/{id}/cancel", post(bookings::cancel_booking))
        .route("/api/v1/bookings/{id}/check-in", post(bookings::check_in))
        .route("/api/v1/bookings/{id}/take", post(bookings::take_battery))
        .route("/api/v1/bookings/{id}/put", post(bookings::put_battery))
        .route("/api/v1/payments/{id}", get(payments::get_transaction))
        .route("/api/v1/payments/{id}/link", post(payments::renew_payment_link));

    // ── Staff ──────────────────────────────────────────────────
    // Battery writes on these paths are admin-checked in the handler.
    let staff_routes = Router::new()
        .route(
            "/api/v1/batteries",
            get(batteries::list_batteries).post(batteries::create_battery),
        )
        .route(
            "/api/v1/batteries/{id}",
            get(batteries::get_battery).delete(batteries::retire_battery),
        )
        .route("/api/v1/batteries/{id}/history", get(batteries::battery_history))
        .route(
            "/api/v1/batteries/{id}/status",
            patch(batteries::update_battery_status),
        )
        .route("/api/v1/slots/{id}/history", get(stations::slot_history))
        .route(
            "/api/v1/stations/{id}/bookings",
            get(bookings::list_station_bookings),
        )
        .route(
            "/api/v1/payments/sync/{order_code}",
            post(payments::sync_payment),
        )
        .route(
            "/api/v1/transfers",
            get(transfers::list_transfers).post(transfers::create_transfer),
        )
        .route("/api/v1/transfers/take", post(transfers::take_for_transfer))
        .route("/api/v1/transfers/put", post(transfers::put_from_transfer))
        .route("/api/v1/transfers/{id}", get(transfers::get_transfer))
        .route("/api/v1/transfers/{id}/cancel", post(transfers::cancel_transfer))
        .layer(middleware::from_fn_with_state(UserRole::Staff, require_role));

    // ── Admin ──────────────────────────────────────────────────
    let admin_routes = Router::new()
        .route("/api/v1/users", post(auth::create_account))
        .route("/api/v1/reports/swaps", get(reports::swap_report))
        .layer(middleware::from_fn_with_state(UserRole::Admin, require_role));

    // Role guards read the user that auth_middleware stores, so the auth
    // layer is added last and runs first.
    let protected_routes = user_routes
        .merge(staff_routes)
        .merge(admin_routes)
        .layer(middleware::from_fn_with_state(auth_state, auth_middleware));

    let mut app = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    if let Some(metrics_state) = metrics {
        app = app.merge(
            Router::new()
                .route("/metrics", get(metrics::prometheus_metrics))
                .with_state(metrics_state),
        );
    }

    app.layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(middleware::from_fn(metrics::http_metrics_middleware))
        .layer(middleware::from_fn(request_id::request_id_middleware))
}
