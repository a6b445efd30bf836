use axum::{
    extract::{Query, State},
    http::StatusCode,
    Extension,
};
use chrono::{DateTime, Duration, Local, NaiveTime, Utc};
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, JoinType, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Set,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::parked_car::ParkStatus;
use crate::entities::payment::{PaymentStatus, PaymentType};
use crate::entities::{car, driver, parked_car, parking_spot, payment, user};
use crate::error::{AppError, AppResult};
use crate::extract::Json;
use crate::handlers::customer::{CarInfo, SpotInfo};
use crate::handlers::driver::CustomerInfo;
use crate::middleware::auth::ManagerContext;
use crate::response::{ApiResponse, ManagerPagination};
use crate::utils::pagination::total_pages;
use crate::AppState;

pub type DateTimeTz = sea_orm::prelude::DateTimeWithTimeZone;

/// Local-midnight-to-next-midnight window for "today" filters
pub(crate) fn today_window() -> (DateTimeTz, DateTimeTz) {
    let now = Local::now();
    // A DST jump exactly at midnight leaves no unique local midnight; fall
    // back to the current instant rather than guessing.
    let start = now.with_time(NaiveTime::MIN).single().unwrap_or(now);
    let end = start + Duration::days(1);
    (start.fixed_offset(), end.fixed_offset())
}

/// Sum of completed, undeleted payments for tickets at a site, optionally
/// restricted to a time window on the payment's creation
pub(crate) async fn completed_revenue(
    state: &AppState,
    parking_spot_id: Uuid,
    window: Option<(DateTimeTz, DateTimeTz)>,
) -> AppResult<f64> {
    let mut query = payment::Entity::find()
        .join(JoinType::InnerJoin, payment::Relation::ParkedCar.def())
        .filter(
            Expr::col((parked_car::Entity, parked_car::Column::ParkingSpotId))
                .eq(parking_spot_id),
        )
        .filter(payment::Column::Deleted.eq(false))
        .filter(payment::Column::Status.eq(PaymentStatus::Completed));

    if let Some((start, end)) = window {
        query = query
            .filter(payment::Column::CreatedAt.gte(start))
            .filter(payment::Column::CreatedAt.lt(end));
    }

    let total: Option<f64> = query
        .select_only()
        .column_as(payment::Column::Amount.sum(), "total")
        .into_tuple()
        .one(&*state.db)
        .await?
        .flatten();

    Ok(total.unwrap_or(0.0))
}

// ============ Daily Stats ============

#[derive(Debug, Serialize)]
pub struct DailySummary {
    pub active_cars_count: u64,
    pub total_cars_today: u64,
    pub revenue_today: f64,
}

#[derive(Debug, Serialize)]
pub struct DailyStatsData {
    pub parking_spot: Option<SpotInfo>,
    pub summary: DailySummary,
    pub active_cars: Vec<ActiveCarRow>,
}

#[derive(Debug, Serialize)]
pub struct ActiveCarRow {
    pub id: Uuid,
    pub status: ParkStatus,
    pub parked_pos: String,
    pub parked_at: DateTime<Utc>,
    pub car: Option<CarInfo>,
    pub user: Option<CustomerInfo>,
}

/// Today's operational picture for the manager's site
pub async fn daily_stats(
    State(state): State<AppState>,
    Extension(ctx): Extension<ManagerContext>,
) -> AppResult<Json<ApiResponse<DailyStatsData>>> {
    let (start, end) = today_window();
    let spot_id = ctx.parking_spot_id;

    let active_cars = parked_car::Entity::find()
        .filter(parked_car::Column::ParkingSpotId.eq(spot_id))
        .filter(parked_car::Column::Deleted.eq(false))
        .filter(parked_car::Column::Status.ne(ParkStatus::Retrieved))
        .filter(parked_car::Column::ParkedAt.gte(start))
        .filter(parked_car::Column::ParkedAt.lt(end))
        .order_by_desc(parked_car::Column::ParkedAt)
        .all(&*state.db)
        .await?;

    let total_cars_today = parked_car::Entity::find()
        .filter(parked_car::Column::ParkingSpotId.eq(spot_id))
        .filter(parked_car::Column::Deleted.eq(false))
        .filter(parked_car::Column::ParkedAt.gte(start))
        .filter(parked_car::Column::ParkedAt.lt(end))
        .count(&*state.db)
        .await?;

    let revenue_today = completed_revenue(&state, spot_id, Some((start, end))).await?;

    let spot = parking_spot::Entity::find_by_id(spot_id)
        .filter(parking_spot::Column::Deleted.eq(false))
        .one(&*state.db)
        .await?;

    let car_ids: Vec<Uuid> = active_cars.iter().map(|t| t.car_id).collect();
    let user_ids: Vec<Uuid> = active_cars.iter().map(|t| t.user_id).collect();
    let cars = car::Entity::find()
        .filter(car::Column::Id.is_in(car_ids))
        .all(&*state.db)
        .await?;
    let users = user::Entity::find()
        .filter(user::Column::Id.is_in(user_ids))
        .all(&*state.db)
        .await?;

    let active_count = active_cars.len() as u64;
    let rows: Vec<ActiveCarRow> = active_cars
        .into_iter()
        .map(|t| {
            let car = cars.iter().find(|c| c.id == t.car_id);
            let owner = users.iter().find(|u| u.id == t.user_id);
            ActiveCarRow {
                id: t.id,
                status: t.status,
                parked_pos: t.parked_pos,
                parked_at: t.parked_at.with_timezone(&Utc),
                car: car.map(CarInfo::from),
                user: owner.map(CustomerInfo::from),
            }
        })
        .collect();

    Ok(Json(ApiResponse::new(
        "Daily statistics fetched successfully",
        DailyStatsData {
            parking_spot: spot.as_ref().map(SpotInfo::from),
            summary: DailySummary {
                active_cars_count: active_count,
                total_cars_today,
                revenue_today,
            },
            active_cars: rows,
        },
    )))
}

// ============ Parked Car Listing ============

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub keyword: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DriverSummary {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
}

#[derive(Debug, Serialize)]
pub struct PaymentSummary {
    pub amount: f64,
    pub payment_type: PaymentType,
    pub status: PaymentStatus,
}

#[derive(Debug, Serialize)]
pub struct ManagerTicketRow {
    pub id: Uuid,
    pub status: ParkStatus,
    pub parked_pos: String,
    pub parked_at: DateTime<Utc>,
    pub retrieved_at: Option<DateTime<Utc>>,
    pub car: Option<CarInfo>,
    pub user: Option<CustomerInfo>,
    pub driver: Option<DriverSummary>,
    pub payment: Option<PaymentSummary>,
}

#[derive(Debug, Serialize)]
pub struct StatusCounts {
    pub all: u64,
    pub parking: u64,
    pub parked: u64,
    pub retrieve: u64,
    pub retrieved: u64,
}

#[derive(Debug, Serialize)]
pub struct ManagerListData {
    pub cars: Vec<ManagerTicketRow>,
    pub counts: StatusCounts,
    pub pagination: ManagerPagination,
}

/// Base query for today's tickets at a site, with the optional keyword
/// filter applied. Counts and the page itself share this so tab counts
/// follow the search term.
fn today_tickets_query(
    parking_spot_id: Uuid,
    window: (DateTimeTz, DateTimeTz),
    keyword: Option<&str>,
) -> sea_orm::Select<parked_car::Entity> {
    let (start, end) = window;
    let mut query = parked_car::Entity::find()
        .filter(parked_car::Column::ParkingSpotId.eq(parking_spot_id))
        .filter(parked_car::Column::Deleted.eq(false))
        .filter(parked_car::Column::ParkedAt.gte(start))
        .filter(parked_car::Column::ParkedAt.lt(end));

    if let Some(keyword) = keyword {
        let pattern = format!("%{}%", keyword);
        query = query
            .join(JoinType::InnerJoin, parked_car::Relation::Car.def())
            .join(JoinType::InnerJoin, parked_car::Relation::User.def())
            .filter(
                Condition::any()
                    .add(
                        Expr::col((car::Entity, car::Column::LicensePlate))
                            .ilike(pattern.clone()),
                    )
                    .add(Expr::col((user::Entity, user::Column::Name)).ilike(pattern)),
            );
    }

    query
}

/// Search, filter and paginate today's tickets at the manager's site
pub async fn parked_cars(
    State(state): State<AppState>,
    Extension(ctx): Extension<ManagerContext>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<ApiResponse<ManagerListData>>> {
    let page = query.page.filter(|p| *p >= 1).unwrap_or(1);
    let limit = query.limit.filter(|l| *l >= 1).unwrap_or(10);
    let keyword = query
        .keyword
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty());

    let status = match query.status.as_deref().filter(|s| !s.is_empty()) {
        Some(raw) => Some(ParkStatus::parse(raw).ok_or_else(|| {
            AppError::BadRequest(
                "Invalid status. Must be one of: PARKING, PARKED, RETRIEVE, RETRIEVED".to_string(),
            )
        })?),
        None => None,
    };

    let window = today_window();
    let counts_base = today_tickets_query(ctx.parking_spot_id, window, keyword);

    // Counts reflect the keyword and date filter, not the status tab
    let all = counts_base.clone().count(&*state.db).await?;
    let parking = counts_base
        .clone()
        .filter(parked_car::Column::Status.eq(ParkStatus::Parking))
        .count(&*state.db)
        .await?;
    let parked = counts_base
        .clone()
        .filter(parked_car::Column::Status.eq(ParkStatus::Parked))
        .count(&*state.db)
        .await?;
    let retrieve = counts_base
        .clone()
        .filter(parked_car::Column::Status.eq(ParkStatus::Retrieve))
        .count(&*state.db)
        .await?;
    let retrieved = counts_base
        .clone()
        .filter(parked_car::Column::Status.eq(ParkStatus::Retrieved))
        .count(&*state.db)
        .await?;

    let mut page_query = counts_base;
    if let Some(status) = status {
        page_query = page_query.filter(parked_car::Column::Status.eq(status));
    }

    let tickets = page_query
        .order_by_desc(parked_car::Column::ParkedAt)
        .paginate(&*state.db, limit)
        .fetch_page(page - 1)
        .await?;

    // Hydrate the page's relations
    let ticket_ids: Vec<Uuid> = tickets.iter().map(|t| t.id).collect();
    let car_ids: Vec<Uuid> = tickets.iter().map(|t| t.car_id).collect();
    let user_ids: Vec<Uuid> = tickets.iter().map(|t| t.user_id).collect();
    let driver_ids: Vec<Uuid> = tickets.iter().filter_map(|t| t.driver_id).collect();

    let cars = car::Entity::find()
        .filter(car::Column::Id.is_in(car_ids))
        .all(&*state.db)
        .await?;
    let users = user::Entity::find()
        .filter(user::Column::Id.is_in(user_ids))
        .all(&*state.db)
        .await?;
    let drivers = driver::Entity::find()
        .filter(driver::Column::Id.is_in(driver_ids))
        .all(&*state.db)
        .await?;
    let driver_user_ids: Vec<Uuid> = drivers.iter().map(|d| d.user_id).collect();
    let driver_users = user::Entity::find()
        .filter(user::Column::Id.is_in(driver_user_ids))
        .all(&*state.db)
        .await?;
    let payments = payment::Entity::find()
        .filter(payment::Column::ParkedCarId.is_in(ticket_ids))
        .filter(payment::Column::Deleted.eq(false))
        .all(&*state.db)
        .await?;

    let rows: Vec<ManagerTicketRow> = tickets
        .into_iter()
        .map(|t| {
            let car = cars.iter().find(|c| c.id == t.car_id);
            let owner = users.iter().find(|u| u.id == t.user_id);
            let driver = t
                .driver_id
                .and_then(|did| drivers.iter().find(|d| d.id == did))
                .and_then(|d| {
                    driver_users
                        .iter()
                        .find(|u| u.id == d.user_id)
                        .map(|u| DriverSummary {
                            id: d.id,
                            name: u.name.clone(),
                            phone: u.phone.clone(),
                        })
                });
            let payment = payments
                .iter()
                .find(|p| p.parked_car_id == t.id)
                .map(|p| PaymentSummary {
                    amount: p.amount,
                    payment_type: p.payment_type,
                    status: p.status,
                });

            ManagerTicketRow {
                id: t.id,
                status: t.status,
                parked_pos: t.parked_pos,
                parked_at: t.parked_at.with_timezone(&Utc),
                retrieved_at: t.retrieved_at.map(|r| r.with_timezone(&Utc)),
                car: car.map(CarInfo::from),
                user: owner.map(CustomerInfo::from),
                driver,
                payment,
            }
        })
        .collect();

    let total_items = match status {
        Some(ParkStatus::Parking) => parking,
        Some(ParkStatus::Parked) => parked,
        Some(ParkStatus::Retrieve) => retrieve,
        Some(ParkStatus::Retrieved) => retrieved,
        None => all,
    };

    Ok(Json(ApiResponse::new(
        "Parked cars fetched successfully",
        ManagerListData {
            cars: rows,
            counts: StatusCounts {
                all,
                parking,
                parked,
                retrieve,
                retrieved,
            },
            pagination: ManagerPagination {
                current_page: page,
                total_pages: total_pages(total_items, limit),
                total_items,
                items_per_page: limit,
            },
        },
    )))
}

// ============ Driver Roster ============

#[derive(Debug, Serialize)]
pub struct RosterEntry {
    pub id: Uuid,
    pub user: RosterUser,
}

#[derive(Debug, Serialize)]
pub struct RosterUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Approved drivers at the manager's site, ordered by name
pub async fn drivers(
    State(state): State<AppState>,
    Extension(ctx): Extension<ManagerContext>,
) -> AppResult<Json<ApiResponse<Vec<RosterEntry>>>> {
    let rows = driver::Entity::find()
        .filter(driver::Column::ParkingSpotId.eq(ctx.parking_spot_id))
        .filter(driver::Column::Deleted.eq(false))
        .filter(driver::Column::Approved.eq(true))
        .find_also_related(user::Entity)
        .order_by_asc(user::Column::Name)
        .all(&*state.db)
        .await?;

    let entries: Vec<RosterEntry> = rows
        .into_iter()
        .filter_map(|(d, u)| {
            let u = u?;
            Some(RosterEntry {
                id: d.id,
                user: RosterUser {
                    id: u.id,
                    name: u.name,
                    email: u.email,
                    phone: u.phone,
                },
            })
        })
        .collect();

    Ok(Json(ApiResponse::new(
        "Drivers fetched successfully",
        entries,
    )))
}

// ============ Assignment ============

#[derive(Debug, Deserialize)]
pub struct AssignDriverRequest {
    pub parked_car_id: Uuid,
    pub driver_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct AssignedTicketRow {
    pub id: Uuid,
    pub status: ParkStatus,
    pub parked_pos: String,
    pub parked_at: DateTime<Utc>,
    pub car: Option<CarInfo>,
    pub user: Option<CustomerInfo>,
    pub driver: Option<DriverSummary>,
}

/// Assign a driver to a ticket at the manager's site, or clear the
/// assignment when no driver id is supplied. Unlike a driver self-claim,
/// this always overwrites.
pub async fn assign_driver(
    State(state): State<AppState>,
    Extension(ctx): Extension<ManagerContext>,
    Json(payload): Json<AssignDriverRequest>,
) -> AppResult<Json<ApiResponse<AssignedTicketRow>>> {
    let ticket = parked_car::Entity::find_by_id(payload.parked_car_id)
        .filter(parked_car::Column::Deleted.eq(false))
        .one(&*state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Parked car not found".to_string()))?;

    if ticket.parking_spot_id != ctx.parking_spot_id {
        return Err(AppError::Forbidden(
            "Access denied. This parked car does not belong to your parking spot".to_string(),
        ));
    }

    if let Some(driver_id) = payload.driver_id {
        let driver = driver::Entity::find_by_id(driver_id)
            .filter(driver::Column::Deleted.eq(false))
            .one(&*state.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Driver not found".to_string()))?;

        if !driver.approved {
            return Err(AppError::BadRequest("Driver is not approved".to_string()));
        }

        if driver.parking_spot_id != ctx.parking_spot_id {
            return Err(AppError::Forbidden(
                "Driver does not belong to your parking spot".to_string(),
            ));
        }
    }

    let assigning = payload.driver_id.is_some();
    let mut active: parked_car::ActiveModel = ticket.into();
    active.driver_id = Set(payload.driver_id);
    active.updated_at = Set(Utc::now().into());

    let updated = active.update(&*state.db).await?;

    let car = car::Entity::find_by_id(updated.car_id).one(&*state.db).await?;
    let owner = user::Entity::find_by_id(updated.user_id).one(&*state.db).await?;
    let driver = match updated.driver_id {
        Some(did) => {
            let d = driver::Entity::find_by_id(did).one(&*state.db).await?;
            match d {
                Some(d) => user::Entity::find_by_id(d.user_id)
                    .one(&*state.db)
                    .await?
                    .map(|u| DriverSummary {
                        id: d.id,
                        name: u.name,
                        phone: u.phone,
                    }),
                None => None,
            }
        }
        None => None,
    };

    let message = if assigning {
        "Driver assigned successfully"
    } else {
        "Driver unassigned successfully"
    };

    Ok(Json(ApiResponse::new(
        message,
        AssignedTicketRow {
            id: updated.id,
            status: updated.status,
            parked_pos: updated.parked_pos,
            parked_at: updated.parked_at.with_timezone(&Utc),
            car: car.as_ref().map(CarInfo::from),
            user: owner.as_ref().map(CustomerInfo::from),
            driver,
        },
    )))
}

// ============ Driver Onboarding ============

#[derive(Debug, Deserialize)]
pub struct AddDriverRequest {
    pub email: String,
}

/// Provision an unapproved driver record at the manager's site for an
/// existing user; the record becomes usable after super-admin approval
pub async fn add_driver(
    State(state): State<AppState>,
    Extension(ctx): Extension<ManagerContext>,
    Json(payload): Json<AddDriverRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<RosterEntry>>)> {
    if payload.email.trim().is_empty() {
        return Err(AppError::BadRequest("Email is required".to_string()));
    }

    let user = user::Entity::find()
        .filter(user::Column::Email.eq(payload.email.trim().to_lowercase()))
        .filter(user::Column::Deleted.eq(false))
        .one(&*state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User with this email not found".to_string()))?;

    let existing = driver::Entity::find()
        .filter(driver::Column::UserId.eq(user.id))
        .filter(driver::Column::Deleted.eq(false))
        .one(&*state.db)
        .await?;

    if existing.is_some() {
        return Err(AppError::Conflict("User is already a driver".to_string()));
    }

    let new_driver = driver::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.id),
        parking_spot_id: Set(ctx.parking_spot_id),
        approved: Set(false),
        ..Default::default()
    };

    let created = new_driver.insert(&*state.db).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            "Driver added successfully",
            RosterEntry {
                id: created.id,
                user: RosterUser {
                    id: user.id,
                    name: user.name,
                    email: user.email,
                    phone: user.phone,
                },
            },
        )),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_today_window_spans_one_day() {
        let (start, end) = today_window();
        assert_eq!(end - start, Duration::days(1));
    }

    #[test]
    fn test_today_window_contains_now() {
        let (start, end) = today_window();
        let now = Local::now().fixed_offset();
        assert!(start <= now);
        assert!(now < end);
    }
}
