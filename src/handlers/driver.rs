use axum::{
    extract::{Path, State},
    Extension,
};
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::parked_car::ParkStatus;
use crate::entities::{car, parked_car, user};
use crate::error::{AppError, AppResult};
use crate::extract::Json;
use crate::handlers::customer::CarInfo;
use crate::middleware::auth::DriverContext;
use crate::response::ApiResponse;
use crate::AppState;

#[derive(Debug, Serialize, Clone)]
pub struct CustomerInfo {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
}

impl From<&user::Model> for CustomerInfo {
    fn from(u: &user::Model) -> Self {
        Self {
            id: u.id,
            name: u.name.clone(),
            phone: u.phone.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TicketRow {
    pub id: Uuid,
    pub status: ParkStatus,
    pub parked_pos: String,
    pub parked_at: DateTime<Utc>,
    pub car: Option<CarInfo>,
    pub user: Option<CustomerInfo>,
}

async fn hydrate_rows(
    state: &AppState,
    tickets: Vec<parked_car::Model>,
) -> AppResult<Vec<TicketRow>> {
    let car_ids: Vec<Uuid> = tickets.iter().map(|t| t.car_id).collect();
    let user_ids: Vec<Uuid> = tickets.iter().map(|t| t.user_id).collect();

    let cars = car::Entity::find()
        .filter(car::Column::Id.is_in(car_ids))
        .all(&*state.db)
        .await?;
    let users = user::Entity::find()
        .filter(user::Column::Id.is_in(user_ids))
        .all(&*state.db)
        .await?;

    Ok(tickets
        .into_iter()
        .map(|t| {
            let car = cars.iter().find(|c| c.id == t.car_id);
            let owner = users.iter().find(|u| u.id == t.user_id);
            TicketRow {
                id: t.id,
                status: t.status,
                parked_pos: t.parked_pos,
                parked_at: t.parked_at.with_timezone(&Utc),
                car: car.map(CarInfo::from),
                user: owner.map(CustomerInfo::from),
            }
        })
        .collect())
}

/// Unassigned queue: open tickets at the driver's site with no driver yet
pub async fn unassigned_cars(
    State(state): State<AppState>,
    Extension(ctx): Extension<DriverContext>,
) -> AppResult<Json<ApiResponse<Vec<TicketRow>>>> {
    let tickets = parked_car::Entity::find()
        .filter(parked_car::Column::ParkingSpotId.eq(ctx.parking_spot_id))
        .filter(parked_car::Column::Deleted.eq(false))
        .filter(parked_car::Column::DriverId.is_null())
        .filter(parked_car::Column::Status.ne(ParkStatus::Retrieved))
        .order_by_desc(parked_car::Column::ParkedAt)
        .all(&*state.db)
        .await?;

    let rows = hydrate_rows(&state, tickets).await?;

    Ok(Json(ApiResponse::new(
        "Unassigned parking cars fetched successfully",
        rows,
    )))
}

/// Active work queue: the driver's own tickets still needing action
pub async fn parking_cars(
    State(state): State<AppState>,
    Extension(ctx): Extension<DriverContext>,
) -> AppResult<Json<ApiResponse<Vec<TicketRow>>>> {
    let tickets = parked_car::Entity::find()
        .filter(parked_car::Column::ParkingSpotId.eq(ctx.parking_spot_id))
        .filter(parked_car::Column::Deleted.eq(false))
        .filter(parked_car::Column::DriverId.eq(ctx.driver_id))
        .filter(
            parked_car::Column::Status.is_in([ParkStatus::Parking, ParkStatus::Retrieve]),
        )
        .order_by_desc(parked_car::Column::ParkedAt)
        .all(&*state.db)
        .await?;

    let rows = hydrate_rows(&state, tickets).await?;

    Ok(Json(ApiResponse::new(
        "Parking cars fetched successfully",
        rows,
    )))
}

/// Self-claim an unassigned ticket. The claim is a single conditional update
/// matching on `driver_id IS NULL`, so two drivers racing for the same
/// ticket cannot both win.
pub async fn assign(
    State(state): State<AppState>,
    Extension(ctx): Extension<DriverContext>,
    Path(parked_car_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<parked_car::Model>>> {
    let result = parked_car::Entity::update_many()
        .col_expr(parked_car::Column::DriverId, Expr::value(ctx.driver_id))
        .col_expr(
            parked_car::Column::UpdatedAt,
            Expr::current_timestamp().into(),
        )
        .filter(parked_car::Column::Id.eq(parked_car_id))
        .filter(parked_car::Column::Deleted.eq(false))
        .filter(parked_car::Column::DriverId.is_null())
        .exec(&*state.db)
        .await?;

    if result.rows_affected == 0 {
        // Lost the claim or no such ticket; a follow-up read tells which
        let existing = parked_car::Entity::find_by_id(parked_car_id)
            .filter(parked_car::Column::Deleted.eq(false))
            .one(&*state.db)
            .await?;

        return match existing {
            Some(_) => Err(AppError::Conflict(
                "This car is already assigned to a driver".to_string(),
            )),
            None => Err(AppError::NotFound("Parked car not found".to_string())),
        };
    }

    let updated = parked_car::Entity::find_by_id(parked_car_id)
        .one(&*state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Parked car not found".to_string()))?;

    Ok(Json(ApiResponse::new(
        "Assignment accepted successfully",
        updated,
    )))
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

/// Move a ticket to a new lifecycle status, stamping the acting driver.
/// Only the transition to RETRIEVED sets `retrieved_at`.
pub async fn update_status(
    State(state): State<AppState>,
    Extension(ctx): Extension<DriverContext>,
    Path(parked_car_id): Path<Uuid>,
    Json(payload): Json<UpdateStatusRequest>,
) -> AppResult<Json<ApiResponse<parked_car::Model>>> {
    let status = ParkStatus::parse(&payload.status).ok_or_else(|| {
        AppError::BadRequest(
            "Invalid status. Must be one of: PARKING, PARKED, RETRIEVE, RETRIEVED".to_string(),
        )
    })?;

    let ticket = parked_car::Entity::find_by_id(parked_car_id)
        .filter(parked_car::Column::Deleted.eq(false))
        .one(&*state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Parked car not found".to_string()))?;

    let mut active: parked_car::ActiveModel = ticket.into();
    active.status = Set(status);
    active.driver_id = Set(Some(ctx.driver_id));
    active.updated_at = Set(Utc::now().into());
    if status == ParkStatus::Retrieved {
        active.retrieved_at = Set(Some(Utc::now().into()));
    }

    let updated = active.update(&*state.db).await?;

    Ok(Json(ApiResponse::new(
        "Parked car status updated successfully",
        updated,
    )))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};

    use super::*;
    use crate::config::Config;
    use crate::utils::slot::RandomSlotAllocator;

    fn test_state(db: DatabaseConnection) -> AppState {
        AppState {
            db: Arc::new(db),
            config: Config {
                database_url: "postgres://localhost/test".to_string(),
                jwt_secret: "test-secret".to_string(),
                jwt_expiration_hours: 1,
                server_host: "127.0.0.1".to_string(),
                server_port: 0,
            },
            slots: Arc::new(RandomSlotAllocator),
        }
    }

    fn driver_ctx() -> DriverContext {
        DriverContext {
            driver_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            parking_spot_id: Uuid::new_v4(),
        }
    }

    fn ticket(id: Uuid, driver_id: Option<Uuid>) -> parked_car::Model {
        let now = Utc::now().fixed_offset();
        parked_car::Model {
            id,
            car_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            parking_spot_id: Uuid::new_v4(),
            driver_id,
            status: ParkStatus::Parking,
            parked_pos: "Level 1 - A01".to_string(),
            parked_at: now,
            retrieved_at: None,
            deleted: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn update_statements(db: Arc<DatabaseConnection>) -> Vec<String> {
        Arc::try_unwrap(db)
            .ok()
            .expect("db still shared")
            .into_transaction_log()
            .iter()
            .map(|t| format!("{:?}", t))
            .filter(|s| s.contains("UPDATE"))
            .collect()
    }

    #[tokio::test]
    async fn test_update_status_to_retrieved_stamps_retrieved_at() {
        let id = Uuid::new_v4();
        let existing = ticket(id, None);
        let mut done = existing.clone();
        done.status = ParkStatus::Retrieved;
        done.retrieved_at = Some(Utc::now().fixed_offset());

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![existing]])
            .append_query_results([vec![done]])
            .into_connection();
        let state = test_state(db);

        update_status(
            State(state.clone()),
            Extension(driver_ctx()),
            Path(id),
            Json(UpdateStatusRequest {
                status: "RETRIEVED".to_string(),
            }),
        )
        .await
        .unwrap();

        let updates = update_statements(state.db);
        assert_eq!(updates.len(), 1);
        let set_clause = updates[0].split("RETURNING").next().unwrap().to_string();
        assert!(set_clause.contains("retrieved_at"));
    }

    #[tokio::test]
    async fn test_update_status_to_parked_leaves_retrieved_at_alone() {
        let id = Uuid::new_v4();
        let existing = ticket(id, None);
        let mut done = existing.clone();
        done.status = ParkStatus::Parked;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![existing]])
            .append_query_results([vec![done]])
            .into_connection();
        let state = test_state(db);

        update_status(
            State(state.clone()),
            Extension(driver_ctx()),
            Path(id),
            Json(UpdateStatusRequest {
                status: "PARKED".to_string(),
            }),
        )
        .await
        .unwrap();

        let updates = update_statements(state.db);
        assert_eq!(updates.len(), 1);
        let set_clause = updates[0].split("RETURNING").next().unwrap().to_string();
        assert!(!set_clause.contains("retrieved_at"));
    }

    #[tokio::test]
    async fn test_lost_claim_is_a_conflict_without_further_writes() {
        let id = Uuid::new_v4();
        let taken = ticket(id, Some(Uuid::new_v4()));

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .append_query_results([vec![taken]])
            .into_connection();
        let state = test_state(db);

        let err = match assign(State(state.clone()), Extension(driver_ctx()), Path(id)).await {
            Ok(_) => panic!("claim of an assigned ticket should be rejected"),
            Err(err) => err,
        };
        assert!(matches!(err, AppError::Conflict(_)));

        // The only write attempted is the guarded claim itself
        let updates = update_statements(state.db);
        assert_eq!(updates.len(), 1);
        assert!(updates[0].contains("driver_id"));
    }

    #[tokio::test]
    async fn test_claim_of_missing_ticket_is_not_found() {
        let id = Uuid::new_v4();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .append_query_results([Vec::<parked_car::Model>::new()])
            .into_connection();
        let state = test_state(db);

        let err = match assign(State(state), Extension(driver_ctx()), Path(id)).await {
            Ok(_) => panic!("claim of a missing ticket should be rejected"),
            Err(err) => err,
        };
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
