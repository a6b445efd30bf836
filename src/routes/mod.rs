use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use crate::handlers::{auth, customer, driver, manager, superadmin};
use crate::middleware::auth::{
    auth_middleware, require_driver, require_manager, require_superadmin,
};
use crate::middleware::rate_limit::create_public_governor;
use crate::middleware::role_rate_limit::{create_role_governor, RateLimitedRole};
use crate::AppState;

async fn health() -> &'static str {
    "Live"
}

pub fn create_router(state: AppState) -> Router {
    // Create role-specific governor layers
    let customer_governor = create_role_governor(RateLimitedRole::Customer);
    let driver_governor = create_role_governor(RateLimitedRole::Driver);
    let manager_governor = create_role_governor(RateLimitedRole::Manager);
    // Create IP-based governor for public routes (with customer-level limits)
    let public_governor = create_public_governor();

    // Public routes (with customer-level rate limiting per IP)
    let auth_routes = Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .layer(public_governor);

    // Customer routes (requires auth only; any account can park a car)
    // Rate limit: 100 requests per minute (1x base)
    let customer_routes = Router::new()
        .route("/profile", get(customer::profile))
        .route("/update-profile", put(customer::update_profile))
        .route("/cars", get(customer::list_cars))
        .route("/add-car", post(customer::add_car))
        .route("/update-car/{id}", put(customer::update_car))
        .route("/delete-car/{id}", delete(customer::delete_car))
        .route("/park-car", post(customer::park_car))
        .route("/active-parked-car", get(customer::active_parked_car))
        .route("/retrieve-car/{id}", put(customer::retrieve_car))
        .route("/recent-parked-cars", get(customer::recent_parked_cars))
        .route("/payments", get(customer::list_payments))
        .layer(customer_governor)
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Driver routes (requires auth + approved driver record)
    // Rate limit: 500 requests per minute (5x base)
    let driver_routes = Router::new()
        .route("/unassigned-cars", get(driver::unassigned_cars))
        .route("/parking-cars", get(driver::parking_cars))
        .route("/assign/{parked_car_id}", put(driver::assign))
        .route("/update-status/{parked_car_id}", put(driver::update_status))
        .layer(driver_governor)
        .layer(middleware::from_fn_with_state(state.clone(), require_driver))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Manager routes (requires auth + approved manager record)
    // Rate limit: 1000 requests per minute (10x base)
    let manager_routes = Router::new()
        .route("/daily-stats", get(manager::daily_stats))
        .route("/parked-cars", get(manager::parked_cars))
        .route("/drivers", get(manager::drivers))
        .route("/assign-driver", put(manager::assign_driver))
        .route("/add-driver", post(manager::add_driver))
        .layer(manager_governor)
        .layer(middleware::from_fn_with_state(state.clone(), require_manager))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Super-admin routes (requires auth + SUPERADMIN role)
    let superadmin_routes = Router::new()
        .route("/parking-spots", get(superadmin::parking_spots))
        .route("/overview/{parking_spot_id}", get(superadmin::overview))
        .route("/pending-approvals", get(superadmin::pending_approvals))
        .route("/pending-drivers", get(superadmin::pending_drivers))
        .route("/approve-manager/{id}", post(superadmin::approve_manager))
        .route("/reject-manager/{id}", post(superadmin::reject_manager))
        .route("/approve-driver/{id}", post(superadmin::approve_driver))
        .route("/reject-driver/{id}", post(superadmin::reject_driver))
        .layer(middleware::from_fn_with_state(state.clone(), require_superadmin))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Combine all routes
    Router::new()
        .route("/", get(health))
        .nest("/api/v1/auth", auth_routes)
        .nest("/api/v1/user", customer_routes)
        .nest("/api/v1/driver", driver_routes)
        .nest("/api/v1/manager", manager_routes)
        .nest("/api/v1/superadmin", superadmin_routes)
        .with_state(state)
}
