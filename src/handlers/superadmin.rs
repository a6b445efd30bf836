use axum::extract::{Path, State};
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set};
use serde::Serialize;
use uuid::Uuid;

use crate::entities::parked_car::ParkStatus;
use crate::entities::user::UserRole;
use crate::entities::{driver, manager, parked_car, parking_spot, user};
use crate::error::{AppError, AppResult};
use crate::extract::Json;
use crate::handlers::manager::{completed_revenue, today_window};
use crate::response::ApiResponse;
use crate::AppState;

/// All undeleted parking sites
pub async fn parking_spots(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<parking_spot::Model>>>> {
    let spots = parking_spot::Entity::find()
        .filter(parking_spot::Column::Deleted.eq(false))
        .order_by_asc(parking_spot::Column::Name)
        .all(&*state.db)
        .await?;

    Ok(Json(ApiResponse::new(
        "Parking spots fetched successfully",
        spots,
    )))
}

// ============ Site Overview ============

#[derive(Debug, Serialize)]
pub struct TodaysPerformance {
    pub tickets_issued: u64,
    pub collection: f64,
}

#[derive(Debug, Serialize)]
pub struct OverallStatistics {
    pub total_tickets: u64,
    pub total_collection: f64,
    pub active_parking: u64,
}

#[derive(Debug, Serialize)]
pub struct OverviewData {
    pub parking_spot: parking_spot::Model,
    pub todays_performance: TodaysPerformance,
    pub overall_statistics: OverallStatistics,
}

/// Per-site figures: today's ticket count and collection next to the
/// all-time totals and the number of tickets still in progress
pub async fn overview(
    State(state): State<AppState>,
    Path(parking_spot_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<OverviewData>>> {
    let spot = parking_spot::Entity::find_by_id(parking_spot_id)
        .filter(parking_spot::Column::Deleted.eq(false))
        .one(&*state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Parking spot not found".to_string()))?;

    let (start, end) = today_window();

    let tickets_issued = parked_car::Entity::find()
        .filter(parked_car::Column::ParkingSpotId.eq(spot.id))
        .filter(parked_car::Column::Deleted.eq(false))
        .filter(parked_car::Column::ParkedAt.gte(start))
        .filter(parked_car::Column::ParkedAt.lt(end))
        .count(&*state.db)
        .await?;

    let collection = completed_revenue(&state, spot.id, Some((start, end))).await?;

    let total_tickets = parked_car::Entity::find()
        .filter(parked_car::Column::ParkingSpotId.eq(spot.id))
        .filter(parked_car::Column::Deleted.eq(false))
        .count(&*state.db)
        .await?;

    let total_collection = completed_revenue(&state, spot.id, None).await?;

    let active_parking = parked_car::Entity::find()
        .filter(parked_car::Column::ParkingSpotId.eq(spot.id))
        .filter(parked_car::Column::Deleted.eq(false))
        .filter(parked_car::Column::Status.ne(ParkStatus::Retrieved))
        .count(&*state.db)
        .await?;

    Ok(Json(ApiResponse::new(
        "Parking spot overview fetched successfully",
        OverviewData {
            parking_spot: spot,
            todays_performance: TodaysPerformance {
                tickets_issued,
                collection,
            },
            overall_statistics: OverallStatistics {
                total_tickets,
                total_collection,
                active_parking,
            },
        },
    )))
}

// ============ Approval Queues ============

#[derive(Debug, Serialize)]
pub struct PendingUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Serialize)]
pub struct PendingSpot {
    pub id: Uuid,
    pub name: String,
    pub location: String,
}

#[derive(Debug, Serialize)]
pub struct PendingApproval {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub user: Option<PendingUser>,
    pub parking_spot: Option<PendingSpot>,
}

async fn hydrate_pending(
    state: &AppState,
    records: Vec<(Uuid, Uuid, Uuid, DateTime<Utc>)>,
) -> AppResult<Vec<PendingApproval>> {
    let user_ids: Vec<Uuid> = records.iter().map(|(_, uid, _, _)| *uid).collect();
    let spot_ids: Vec<Uuid> = records.iter().map(|(_, _, sid, _)| *sid).collect();

    let users = user::Entity::find()
        .filter(user::Column::Id.is_in(user_ids))
        .all(&*state.db)
        .await?;
    let spots = parking_spot::Entity::find()
        .filter(parking_spot::Column::Id.is_in(spot_ids))
        .all(&*state.db)
        .await?;

    Ok(records
        .into_iter()
        .map(|(id, user_id, spot_id, created_at)| PendingApproval {
            id,
            created_at,
            user: users.iter().find(|u| u.id == user_id).map(|u| PendingUser {
                id: u.id,
                name: u.name.clone(),
                email: u.email.clone(),
                phone: u.phone.clone(),
            }),
            parking_spot: spots.iter().find(|s| s.id == spot_id).map(|s| PendingSpot {
                id: s.id,
                name: s.name.clone(),
                location: s.location.clone(),
            }),
        })
        .collect())
}

/// Manager records awaiting approval
pub async fn pending_approvals(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<PendingApproval>>>> {
    let managers = manager::Entity::find()
        .filter(manager::Column::Deleted.eq(false))
        .filter(manager::Column::Approved.eq(false))
        .order_by_asc(manager::Column::CreatedAt)
        .all(&*state.db)
        .await?;

    let records = managers
        .into_iter()
        .map(|m| (m.id, m.user_id, m.parking_spot_id, m.created_at.with_timezone(&Utc)))
        .collect();
    let pending = hydrate_pending(&state, records).await?;

    Ok(Json(ApiResponse::new(
        "Pending manager approvals fetched successfully",
        pending,
    )))
}

/// Driver records awaiting approval
pub async fn pending_drivers(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<PendingApproval>>>> {
    let drivers = driver::Entity::find()
        .filter(driver::Column::Deleted.eq(false))
        .filter(driver::Column::Approved.eq(false))
        .order_by_asc(driver::Column::CreatedAt)
        .all(&*state.db)
        .await?;

    let records = drivers
        .into_iter()
        .map(|d| (d.id, d.user_id, d.parking_spot_id, d.created_at.with_timezone(&Utc)))
        .collect();
    let pending = hydrate_pending(&state, records).await?;

    Ok(Json(ApiResponse::new(
        "Pending driver approvals fetched successfully",
        pending,
    )))
}

// ============ Approval Actions ============

/// Raise the user's role if the new one outranks the current. Approving a
/// driver never demotes a manager.
async fn promote_user(state: &AppState, user_id: Uuid, role: UserRole) -> AppResult<()> {
    let user = user::Entity::find_by_id(user_id)
        .filter(user::Column::Deleted.eq(false))
        .one(&*state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    if !user.role.satisfies(role) {
        let mut active: user::ActiveModel = user.into();
        active.role = Set(role);
        active.updated_at = Set(Utc::now().into());
        active.update(&*state.db).await?;
    }

    Ok(())
}

/// Approve a pending manager and grant the MANAGER role
pub async fn approve_manager(
    State(state): State<AppState>,
    Path(manager_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<manager::Model>>> {
    let record = manager::Entity::find_by_id(manager_id)
        .filter(manager::Column::Deleted.eq(false))
        .one(&*state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Manager record not found".to_string()))?;

    let user_id = record.user_id;
    let mut active: manager::ActiveModel = record.into();
    active.approved = Set(true);
    let updated = active.update(&*state.db).await?;

    promote_user(&state, user_id, UserRole::Manager).await?;

    Ok(Json(ApiResponse::new(
        "Manager approved successfully",
        updated,
    )))
}

/// Reject a pending manager by soft-deleting the record
pub async fn reject_manager(
    State(state): State<AppState>,
    Path(manager_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<manager::Model>>> {
    let record = manager::Entity::find_by_id(manager_id)
        .filter(manager::Column::Deleted.eq(false))
        .one(&*state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Manager record not found".to_string()))?;

    let mut active: manager::ActiveModel = record.into();
    active.deleted = Set(true);
    let updated = active.update(&*state.db).await?;

    Ok(Json(ApiResponse::new(
        "Manager rejected successfully",
        updated,
    )))
}

/// Approve a pending driver and grant the DRIVER role
pub async fn approve_driver(
    State(state): State<AppState>,
    Path(driver_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<driver::Model>>> {
    let record = driver::Entity::find_by_id(driver_id)
        .filter(driver::Column::Deleted.eq(false))
        .one(&*state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Driver record not found".to_string()))?;

    let user_id = record.user_id;
    let mut active: driver::ActiveModel = record.into();
    active.approved = Set(true);
    let updated = active.update(&*state.db).await?;

    promote_user(&state, user_id, UserRole::Driver).await?;

    Ok(Json(ApiResponse::new(
        "Driver approved successfully",
        updated,
    )))
}

/// Reject a pending driver by soft-deleting the record
pub async fn reject_driver(
    State(state): State<AppState>,
    Path(driver_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<driver::Model>>> {
    let record = driver::Entity::find_by_id(driver_id)
        .filter(driver::Column::Deleted.eq(false))
        .one(&*state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Driver record not found".to_string()))?;

    let mut active: driver::ActiveModel = record.into();
    active.deleted = Set(true);
    let updated = active.update(&*state.db).await?;

    Ok(Json(ApiResponse::new(
        "Driver rejected successfully",
        updated,
    )))
}
