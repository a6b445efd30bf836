use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ParkingSpot::Table)
                    .if_not_exists()
                    .col(uuid(ParkingSpot::Id).primary_key())
                    .col(string_len(ParkingSpot::Name, 100).not_null())
                    .col(string_len(ParkingSpot::Location, 255).not_null())
                    .col(integer(ParkingSpot::Capacity).not_null())
                    .col(boolean(ParkingSpot::Deleted).not_null().default(false))
                    .col(
                        timestamp_with_time_zone(ParkingSpot::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ParkingSpot::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum ParkingSpot {
    Table,
    Id,
    Name,
    Location,
    Capacity,
    Deleted,
    CreatedAt,
}
