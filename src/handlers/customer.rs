use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension,
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::parked_car::ParkStatus;
use crate::entities::payment::{PaymentStatus, PaymentType};
use crate::entities::{car, parked_car, parking_spot, payment, user};
use crate::error::{AppError, AppResult};
use crate::extract::Json;
use crate::response::{ApiResponse, CustomerPagination, PaginatedResponse};
use crate::utils::jwt::Claims;
use crate::utils::pagination::{total_pages, PageQuery};
use crate::AppState;

#[derive(Debug, Serialize, Clone)]
pub struct CarInfo {
    pub id: Uuid,
    pub brand: String,
    pub model: String,
    pub license_plate: String,
}

impl From<&car::Model> for CarInfo {
    fn from(c: &car::Model) -> Self {
        Self {
            id: c.id,
            brand: c.brand.clone(),
            model: c.model.clone(),
            license_plate: c.license_plate.clone(),
        }
    }
}

#[derive(Debug, Serialize, Clone)]
pub struct SpotInfo {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    pub capacity: i32,
}

impl From<&parking_spot::Model> for SpotInfo {
    fn from(s: &parking_spot::Model) -> Self {
        Self {
            id: s.id,
            name: s.name.clone(),
            location: s.location.clone(),
            capacity: s.capacity,
        }
    }
}

#[derive(Debug, Serialize, Clone)]
pub struct PaymentInfo {
    pub id: Uuid,
    pub amount: f64,
    pub payment_type: PaymentType,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

impl From<&payment::Model> for PaymentInfo {
    fn from(p: &payment::Model) -> Self {
        Self {
            id: p.id,
            amount: p.amount,
            payment_type: p.payment_type,
            status: p.status,
            created_at: p.created_at.with_timezone(&Utc),
        }
    }
}

// ============ Profile ============

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
}

/// Fetch the logged-in user's profile
pub async fn profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<ApiResponse<ProfileResponse>>> {
    let user = user::Entity::find_by_id(claims.sub)
        .filter(user::Column::Deleted.eq(false))
        .one(&*state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(ApiResponse::new(
        "Profile fetched successfully",
        ProfileResponse {
            id: user.id,
            email: user.email,
            name: user.name,
            phone: user.phone,
            created_at: user.created_at.with_timezone(&Utc),
        },
    )))
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub email: String,
    pub name: String,
    pub phone: String,
}

#[derive(Debug, Serialize)]
pub struct UpdatedProfileResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub phone: String,
    pub updated_at: DateTime<Utc>,
}

/// Update the logged-in user's profile
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<UpdateProfileRequest>,
) -> AppResult<Json<ApiResponse<UpdatedProfileResponse>>> {
    if payload.email.trim().is_empty()
        || payload.name.trim().is_empty()
        || payload.phone.trim().is_empty()
    {
        return Err(AppError::BadRequest(
            "email, name, and phone are required".to_string(),
        ));
    }

    let user = user::Entity::find_by_id(claims.sub)
        .filter(user::Column::Deleted.eq(false))
        .one(&*state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let mut active: user::ActiveModel = user.into();
    active.email = Set(payload.email.trim().to_lowercase());
    active.name = Set(payload.name.clone());
    active.phone = Set(payload.phone.clone());
    active.updated_at = Set(Utc::now().into());

    let updated = active.update(&*state.db).await?;

    Ok(Json(ApiResponse::new(
        "Profile updated successfully",
        UpdatedProfileResponse {
            id: updated.id,
            email: updated.email,
            name: updated.name,
            phone: updated.phone,
            updated_at: updated.updated_at.with_timezone(&Utc),
        },
    )))
}

// ============ Car Registry ============

#[derive(Debug, Deserialize)]
pub struct CarRequest {
    pub brand: String,
    pub model: String,
    pub license_plate: String,
}

#[derive(Debug, Serialize)]
pub struct CarResponse {
    pub id: Uuid,
    pub brand: String,
    pub model: String,
    pub license_plate: String,
    pub created_at: DateTime<Utc>,
}

/// List the logged-in user's cars
pub async fn list_cars(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<ApiResponse<Vec<CarResponse>>>> {
    let cars = car::Entity::find()
        .filter(car::Column::UserId.eq(claims.sub))
        .filter(car::Column::Deleted.eq(false))
        .order_by_desc(car::Column::CreatedAt)
        .all(&*state.db)
        .await?;

    let responses: Vec<CarResponse> = cars
        .into_iter()
        .map(|c| CarResponse {
            id: c.id,
            brand: c.brand,
            model: c.model,
            license_plate: c.license_plate,
            created_at: c.created_at.with_timezone(&Utc),
        })
        .collect();

    Ok(Json(ApiResponse::new("Cars fetched successfully", responses)))
}

/// Register a new car for the logged-in user
pub async fn add_car(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CarRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<CarResponse>>)> {
    if payload.brand.trim().is_empty()
        || payload.model.trim().is_empty()
        || payload.license_plate.trim().is_empty()
    {
        return Err(AppError::BadRequest(
            "brand, model, and license_plate are required".to_string(),
        ));
    }

    let new_car = car::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(claims.sub),
        brand: Set(payload.brand.clone()),
        model: Set(payload.model.clone()),
        license_plate: Set(payload.license_plate.clone()),
        ..Default::default()
    };

    let created = new_car.insert(&*state.db).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            "Car added successfully",
            CarResponse {
                id: created.id,
                brand: created.brand,
                model: created.model,
                license_plate: created.license_plate,
                created_at: created.created_at.with_timezone(&Utc),
            },
        )),
    ))
}

/// Find a car owned by the caller; absence and foreign ownership are both 404
async fn find_owned_car(state: &AppState, car_id: Uuid, user_id: Uuid) -> AppResult<car::Model> {
    car::Entity::find_by_id(car_id)
        .filter(car::Column::UserId.eq(user_id))
        .filter(car::Column::Deleted.eq(false))
        .one(&*state.db)
        .await?
        .ok_or_else(|| {
            AppError::NotFound("Car not found or does not belong to the user".to_string())
        })
}

/// Update a car owned by the logged-in user
pub async fn update_car(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(car_id): Path<Uuid>,
    Json(payload): Json<CarRequest>,
) -> AppResult<Json<ApiResponse<CarResponse>>> {
    if payload.brand.trim().is_empty()
        || payload.model.trim().is_empty()
        || payload.license_plate.trim().is_empty()
    {
        return Err(AppError::BadRequest(
            "brand, model, and license_plate are required".to_string(),
        ));
    }

    let existing = find_owned_car(&state, car_id, claims.sub).await?;

    let mut active: car::ActiveModel = existing.into();
    active.brand = Set(payload.brand.clone());
    active.model = Set(payload.model.clone());
    active.license_plate = Set(payload.license_plate.clone());
    active.updated_at = Set(Utc::now().into());

    let updated = active.update(&*state.db).await?;

    Ok(Json(ApiResponse::new(
        "Car updated successfully",
        CarResponse {
            id: updated.id,
            brand: updated.brand,
            model: updated.model,
            license_plate: updated.license_plate,
            created_at: updated.created_at.with_timezone(&Utc),
        },
    )))
}

/// Soft-delete a car owned by the logged-in user
pub async fn delete_car(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(car_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<()>>> {
    let existing = find_owned_car(&state, car_id, claims.sub).await?;

    let mut active: car::ActiveModel = existing.into();
    active.deleted = Set(true);
    active.updated_at = Set(Utc::now().into());
    active.update(&*state.db).await?;

    Ok(Json(ApiResponse::new("Car deleted successfully", ())))
}

// ============ Parking Intake ============

#[derive(Debug, Deserialize)]
pub struct ParkCarRequest {
    pub car_id: Uuid,
    pub parking_spot_id: Uuid,
    pub amount: f64,
    pub payment_type: String,
    pub payment_status: String,
}

#[derive(Debug, Serialize)]
pub struct ParkedCarCreated {
    pub id: Uuid,
    pub car_id: Uuid,
    pub parking_spot_id: Uuid,
    pub status: ParkStatus,
    pub parked_pos: String,
    pub parked_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ParkCarData {
    pub parked_car: ParkedCarCreated,
    pub payment: PaymentInfo,
}

/// Park a car: create the ticket and its payment in one transaction
pub async fn park_car(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<ParkCarRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<ParkCarData>>)> {
    if payload.amount <= 0.0 {
        return Err(AppError::BadRequest(
            "car_id, parking_spot_id, amount, payment_type, and payment_status are required"
                .to_string(),
        ));
    }

    let payment_type = PaymentType::parse(&payload.payment_type).ok_or_else(|| {
        AppError::BadRequest(
            "Invalid payment_type. Must be one of: CASH, NET_BANKING, UPI, CARD".to_string(),
        )
    })?;

    let payment_status = PaymentStatus::parse(&payload.payment_status).ok_or_else(|| {
        AppError::BadRequest("Invalid payment_status. Must be one of: PENDING, COMPLETED".to_string())
    })?;

    let car = find_owned_car(&state, payload.car_id, claims.sub).await?;

    parking_spot::Entity::find_by_id(payload.parking_spot_id)
        .filter(parking_spot::Column::Deleted.eq(false))
        .one(&*state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Parking spot not found".to_string()))?;

    // One active ticket per car
    let open_ticket = parked_car::Entity::find()
        .filter(parked_car::Column::CarId.eq(car.id))
        .filter(parked_car::Column::Deleted.eq(false))
        .filter(parked_car::Column::Status.ne(ParkStatus::Retrieved))
        .one(&*state.db)
        .await?;

    if open_ticket.is_some() {
        return Err(AppError::Conflict(
            "This car already has an active parking ticket".to_string(),
        ));
    }

    let parked_pos = state.slots.allocate(payload.parking_spot_id);
    let user_id = claims.sub;
    let car_id = car.id;
    let parking_spot_id = payload.parking_spot_id;
    let amount = payload.amount;

    // Ticket and payment are created together or not at all
    let (parked, paid) = state
        .db
        .transaction::<_, (parked_car::Model, payment::Model), sea_orm::DbErr>(move |txn| {
            Box::pin(async move {
                let parked = parked_car::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    car_id: Set(car_id),
                    user_id: Set(user_id),
                    parking_spot_id: Set(parking_spot_id),
                    driver_id: Set(None),
                    status: Set(ParkStatus::Parking),
                    parked_pos: Set(parked_pos),
                    retrieved_at: Set(None),
                    ..Default::default()
                }
                .insert(txn)
                .await?;

                let paid = payment::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    user_id: Set(user_id),
                    parked_car_id: Set(parked.id),
                    amount: Set(amount),
                    payment_type: Set(payment_type),
                    status: Set(payment_status),
                    ..Default::default()
                }
                .insert(txn)
                .await?;

                Ok((parked, paid))
            })
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            "Car parked and payment initiated successfully",
            ParkCarData {
                parked_car: ParkedCarCreated {
                    id: parked.id,
                    car_id: parked.car_id,
                    parking_spot_id: parked.parking_spot_id,
                    status: parked.status,
                    parked_pos: parked.parked_pos,
                    parked_at: parked.parked_at.with_timezone(&Utc),
                    created_at: parked.created_at.with_timezone(&Utc),
                },
                payment: PaymentInfo::from(&paid),
            },
        )),
    ))
}

// ============ Active Ticket / Retrieval ============

#[derive(Debug, Serialize)]
pub struct ActiveParkedCarResponse {
    pub id: Uuid,
    pub status: ParkStatus,
    pub parked_pos: String,
    pub parked_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub car: Option<CarInfo>,
    pub parking_spot: Option<SpotInfo>,
    pub payment: Option<PaymentInfo>,
}

/// Fetch the oldest still-open ticket for the logged-in user
pub async fn active_parked_car(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<ApiResponse<ActiveParkedCarResponse>>> {
    let ticket = parked_car::Entity::find()
        .filter(parked_car::Column::UserId.eq(claims.sub))
        .filter(parked_car::Column::Deleted.eq(false))
        .filter(parked_car::Column::Status.ne(ParkStatus::Retrieved))
        .order_by_asc(parked_car::Column::CreatedAt)
        .one(&*state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("No active parked car found".to_string()))?;

    let car = car::Entity::find_by_id(ticket.car_id).one(&*state.db).await?;
    let spot = parking_spot::Entity::find_by_id(ticket.parking_spot_id)
        .one(&*state.db)
        .await?;
    let payment = payment::Entity::find()
        .filter(payment::Column::ParkedCarId.eq(ticket.id))
        .filter(payment::Column::Deleted.eq(false))
        .one(&*state.db)
        .await?;

    Ok(Json(ApiResponse::new(
        "Active parked car fetched successfully",
        ActiveParkedCarResponse {
            id: ticket.id,
            status: ticket.status,
            parked_pos: ticket.parked_pos,
            parked_at: ticket.parked_at.with_timezone(&Utc),
            created_at: ticket.created_at.with_timezone(&Utc),
            car: car.as_ref().map(CarInfo::from),
            parking_spot: spot.as_ref().map(SpotInfo::from),
            payment: payment.as_ref().map(PaymentInfo::from),
        },
    )))
}

#[derive(Debug, Serialize)]
pub struct RetrieveCarResponse {
    pub id: Uuid,
    pub status: ParkStatus,
    pub updated_at: DateTime<Utc>,
}

/// Request retrieval of the caller's parked car
pub async fn retrieve_car(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(parked_car_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<RetrieveCarResponse>>> {
    let ticket = parked_car::Entity::find_by_id(parked_car_id)
        .filter(parked_car::Column::UserId.eq(claims.sub))
        .filter(parked_car::Column::Deleted.eq(false))
        .one(&*state.db)
        .await?
        .ok_or_else(|| {
            AppError::NotFound("Parked car not found or does not belong to the user".to_string())
        })?;

    let mut active: parked_car::ActiveModel = ticket.into();
    active.status = Set(ParkStatus::Retrieve);
    active.updated_at = Set(Utc::now().into());

    let updated = active.update(&*state.db).await?;

    Ok(Json(ApiResponse::new(
        "Car retrieval requested successfully",
        RetrieveCarResponse {
            id: updated.id,
            status: updated.status,
            updated_at: updated.updated_at.with_timezone(&Utc),
        },
    )))
}

// ============ History ============

#[derive(Debug, Serialize)]
pub struct HistoryItem {
    pub id: Uuid,
    pub status: ParkStatus,
    pub parked_at: DateTime<Utc>,
    pub retrieved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub car: Option<CarInfo>,
    pub parking_spot: Option<SpotInfo>,
    pub payment: Option<PaymentInfo>,
}

/// Paginated parking history for the logged-in user, newest first
pub async fn recent_parked_cars(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PaginatedResponse<Vec<HistoryItem>>>> {
    let page = query.page();
    let limit = query.limit_or(5);

    let base = parked_car::Entity::find()
        .filter(parked_car::Column::UserId.eq(claims.sub))
        .filter(parked_car::Column::Deleted.eq(false));

    let total_count = base.clone().count(&*state.db).await?;
    let pages = total_pages(total_count, limit);

    let tickets = base
        .order_by_desc(parked_car::Column::CreatedAt)
        .paginate(&*state.db, limit)
        .fetch_page(page - 1)
        .await?;

    let car_ids: Vec<Uuid> = tickets.iter().map(|t| t.car_id).collect();
    let spot_ids: Vec<Uuid> = tickets.iter().map(|t| t.parking_spot_id).collect();
    let ticket_ids: Vec<Uuid> = tickets.iter().map(|t| t.id).collect();

    let cars = car::Entity::find()
        .filter(car::Column::Id.is_in(car_ids))
        .all(&*state.db)
        .await?;
    let spots = parking_spot::Entity::find()
        .filter(parking_spot::Column::Id.is_in(spot_ids))
        .all(&*state.db)
        .await?;
    let payments = payment::Entity::find()
        .filter(payment::Column::ParkedCarId.is_in(ticket_ids))
        .filter(payment::Column::Deleted.eq(false))
        .order_by_desc(payment::Column::CreatedAt)
        .all(&*state.db)
        .await?;

    let items: Vec<HistoryItem> = tickets
        .into_iter()
        .map(|t| {
            let car = cars.iter().find(|c| c.id == t.car_id);
            let spot = spots.iter().find(|s| s.id == t.parking_spot_id);
            let payment = payments.iter().find(|p| p.parked_car_id == t.id);

            HistoryItem {
                id: t.id,
                status: t.status,
                parked_at: t.parked_at.with_timezone(&Utc),
                retrieved_at: t.retrieved_at.map(|r| r.with_timezone(&Utc)),
                created_at: t.created_at.with_timezone(&Utc),
                car: car.map(CarInfo::from),
                parking_spot: spot.map(SpotInfo::from),
                payment: payment.map(PaymentInfo::from),
            }
        })
        .collect();

    Ok(Json(PaginatedResponse::new(
        "Recent parked cars fetched successfully",
        items,
        CustomerPagination {
            current_page: page,
            total_pages: pages,
            total_count,
            limit,
            has_next_page: page < pages,
            has_prev_page: page > 1,
        },
    )))
}

// ============ Payments ============

#[derive(Debug, Serialize)]
pub struct PaymentHistoryItem {
    pub id: Uuid,
    pub amount: f64,
    pub payment_type: PaymentType,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub parking_location: Option<String>,
    pub car_brand: Option<String>,
    pub car_model: Option<String>,
    pub car_license_plate: Option<String>,
    pub parking_spot_name: Option<String>,
}

/// List the logged-in user's payments, newest first, flattened with car and
/// site info
pub async fn list_payments(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<ApiResponse<Vec<PaymentHistoryItem>>>> {
    let payments = payment::Entity::find()
        .filter(payment::Column::UserId.eq(claims.sub))
        .filter(payment::Column::Deleted.eq(false))
        .order_by_desc(payment::Column::CreatedAt)
        .all(&*state.db)
        .await?;

    let ticket_ids: Vec<Uuid> = payments.iter().map(|p| p.parked_car_id).collect();
    let tickets = parked_car::Entity::find()
        .filter(parked_car::Column::Id.is_in(ticket_ids))
        .all(&*state.db)
        .await?;

    let car_ids: Vec<Uuid> = tickets.iter().map(|t| t.car_id).collect();
    let spot_ids: Vec<Uuid> = tickets.iter().map(|t| t.parking_spot_id).collect();
    let cars = car::Entity::find()
        .filter(car::Column::Id.is_in(car_ids))
        .all(&*state.db)
        .await?;
    let spots = parking_spot::Entity::find()
        .filter(parking_spot::Column::Id.is_in(spot_ids))
        .all(&*state.db)
        .await?;

    let items: Vec<PaymentHistoryItem> = payments
        .into_iter()
        .map(|p| {
            let ticket = tickets.iter().find(|t| t.id == p.parked_car_id);
            let car = ticket.and_then(|t| cars.iter().find(|c| c.id == t.car_id));
            let spot = ticket.and_then(|t| spots.iter().find(|s| s.id == t.parking_spot_id));

            PaymentHistoryItem {
                id: p.id,
                amount: p.amount,
                payment_type: p.payment_type,
                status: p.status,
                created_at: p.created_at.with_timezone(&Utc),
                parking_location: spot.map(|s| s.location.clone()),
                car_brand: car.map(|c| c.brand.clone()),
                car_model: car.map(|c| c.model.clone()),
                car_license_plate: car.map(|c| c.license_plate.clone()),
                parking_spot_name: spot.map(|s| s.name.clone()),
            }
        })
        .collect();

    Ok(Json(ApiResponse::new(
        "Payments fetched successfully",
        items,
    )))
}
