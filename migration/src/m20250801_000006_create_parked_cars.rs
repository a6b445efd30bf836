use sea_orm_migration::{prelude::*, schema::*, sea_orm::sea_query::extension::postgres::Type};

use super::m20250801_000001_create_users::User;
use super::m20250801_000002_create_parking_spots::ParkingSpot;
use super::m20250801_000003_create_cars::Car;
use super::m20250801_000004_create_drivers::Driver;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create parked car status enum
        manager
            .create_type(
                Type::create()
                    .as_enum(ParkStatus::Enum)
                    .values([
                        ParkStatus::Parking,
                        ParkStatus::Parked,
                        ParkStatus::Retrieve,
                        ParkStatus::Retrieved,
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ParkedCar::Table)
                    .if_not_exists()
                    .col(uuid(ParkedCar::Id).primary_key())
                    .col(uuid(ParkedCar::CarId).not_null())
                    .col(uuid(ParkedCar::UserId).not_null())
                    .col(uuid(ParkedCar::ParkingSpotId).not_null())
                    .col(uuid_null(ParkedCar::DriverId))
                    .col(
                        ColumnDef::new(ParkedCar::Status)
                            .custom(ParkStatus::Enum)
                            .not_null(),
                    )
                    .col(string_len(ParkedCar::ParkedPos, 50).not_null())
                    .col(
                        timestamp_with_time_zone(ParkedCar::ParkedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(timestamp_with_time_zone_null(ParkedCar::RetrievedAt))
                    .col(boolean(ParkedCar::Deleted).not_null().default(false))
                    .col(
                        timestamp_with_time_zone(ParkedCar::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(ParkedCar::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_parked_car_car")
                            .from(ParkedCar::Table, ParkedCar::CarId)
                            .to(Car::Table, Car::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_parked_car_user")
                            .from(ParkedCar::Table, ParkedCar::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_parked_car_parking_spot")
                            .from(ParkedCar::Table, ParkedCar::ParkingSpotId)
                            .to(ParkingSpot::Table, ParkingSpot::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_parked_car_driver")
                            .from(ParkedCar::Table, ParkedCar::DriverId)
                            .to(Driver::Table, Driver::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ParkedCar::Table).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(ParkStatus::Enum).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum ParkedCar {
    Table,
    Id,
    CarId,
    UserId,
    ParkingSpotId,
    DriverId,
    Status,
    ParkedPos,
    ParkedAt,
    RetrievedAt,
    Deleted,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub enum ParkStatus {
    #[sea_orm(iden = "park_status")]
    Enum,
    #[sea_orm(iden = "PARKING")]
    Parking,
    #[sea_orm(iden = "PARKED")]
    Parked,
    #[sea_orm(iden = "RETRIEVE")]
    Retrieve,
    #[sea_orm(iden = "RETRIEVED")]
    Retrieved,
}
