use sea_orm_migration::{prelude::*, schema::*};

use super::m20250801_000001_create_users::User;
use super::m20250801_000002_create_parking_spots::ParkingSpot;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Manager::Table)
                    .if_not_exists()
                    .col(uuid(Manager::Id).primary_key())
                    .col(uuid(Manager::UserId).not_null())
                    .col(uuid(Manager::ParkingSpotId).not_null())
                    .col(boolean(Manager::Approved).not_null().default(false))
                    .col(boolean(Manager::Deleted).not_null().default(false))
                    .col(
                        timestamp_with_time_zone(Manager::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_manager_user")
                            .from(Manager::Table, Manager::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_manager_parking_spot")
                            .from(Manager::Table, Manager::ParkingSpotId)
                            .to(ParkingSpot::Table, ParkingSpot::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Manager::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Manager {
    Table,
    Id,
    UserId,
    ParkingSpotId,
    Approved,
    Deleted,
    CreatedAt,
}
