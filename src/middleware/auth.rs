use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::entities::user::UserRole;
use crate::entities::{driver, manager, user};
use crate::error::{AppError, AppResult};
use crate::utils::jwt::{verify_token, Claims};
use crate::AppState;

/// Role record resolved by the driver gate, attached to the request for
/// handlers to read the acting driver and their site from.
#[derive(Debug, Clone)]
pub struct DriverContext {
    pub driver_id: Uuid,
    pub user_id: Uuid,
    pub parking_spot_id: Uuid,
}

/// Role record resolved by the manager gate.
#[derive(Debug, Clone)]
pub struct ManagerContext {
    pub manager_id: Uuid,
    pub user_id: Uuid,
    pub parking_spot_id: Uuid,
}

/// Extract and validate the JWT bearer token from the Authorization header
pub async fn auth_middleware(
    State(state): State<AppState>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> AppResult<Response> {
    let auth = auth.ok_or_else(|| AppError::Unauthorized("Access token required".to_string()))?;
    let claims = verify_token(auth.token(), &state.config.jwt_secret)?;
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

fn claims_of(request: &Request) -> AppResult<&Claims> {
    request
        .extensions()
        .get::<Claims>()
        .ok_or_else(|| AppError::Unauthorized("No authentication found".to_string()))
}

/// Load the authenticated user's base role, read fresh per request so role
/// changes and rejections take effect immediately.
async fn resolve_role(state: &AppState, user_id: Uuid) -> AppResult<UserRole> {
    let user = user::Entity::find_by_id(user_id)
        .filter(user::Column::Deleted.eq(false))
        .one(&*state.db)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;
    Ok(user.role)
}

/// Require the super-admin role
pub async fn require_superadmin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> AppResult<Response> {
    let claims = claims_of(&request)?;
    let role = resolve_role(&state, claims.sub).await?;

    if !role.satisfies(UserRole::SuperAdmin) {
        return Err(AppError::Forbidden(
            "Access denied. Super Admin role required.".to_string(),
        ));
    }

    Ok(next.run(request).await)
}

/// Require at least the manager role plus an approved manager record, and
/// attach the record to the request
pub async fn require_manager(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> AppResult<Response> {
    let claims = claims_of(&request)?;
    let user_id = claims.sub;
    let role = resolve_role(&state, user_id).await?;

    if !role.satisfies(UserRole::Manager) {
        return Err(AppError::Forbidden(
            "Access denied. Manager role required.".to_string(),
        ));
    }

    let manager = manager::Entity::find()
        .filter(manager::Column::UserId.eq(user_id))
        .filter(manager::Column::Deleted.eq(false))
        .one(&*state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Manager record not found".to_string()))?;

    if !manager.approved {
        return Err(AppError::Forbidden(
            "Manager account not yet approved".to_string(),
        ));
    }

    request.extensions_mut().insert(ManagerContext {
        manager_id: manager.id,
        user_id,
        parking_spot_id: manager.parking_spot_id,
    });

    Ok(next.run(request).await)
}

/// Require at least the driver role plus an approved driver record, and
/// attach the record to the request
pub async fn require_driver(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> AppResult<Response> {
    let claims = claims_of(&request)?;
    let user_id = claims.sub;
    let role = resolve_role(&state, user_id).await?;

    if !role.satisfies(UserRole::Driver) {
        return Err(AppError::Forbidden(
            "Access denied. Driver role required.".to_string(),
        ));
    }

    let driver = driver::Entity::find()
        .filter(driver::Column::UserId.eq(user_id))
        .filter(driver::Column::Deleted.eq(false))
        .one(&*state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Driver record not found".to_string()))?;

    if !driver.approved {
        return Err(AppError::Forbidden(
            "Driver account not yet approved".to_string(),
        ));
    }

    request.extensions_mut().insert(DriverContext {
        driver_id: driver.id,
        user_id,
        parking_spot_id: driver.parking_spot_id,
    });

    Ok(next.run(request).await)
}
