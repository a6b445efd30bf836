use sea_orm_migration::{prelude::*, schema::*, sea_orm::sea_query::extension::postgres::Type};

use super::m20250801_000001_create_users::User;
use super::m20250801_000006_create_parked_cars::ParkedCar;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_type(
                Type::create()
                    .as_enum(PaymentType::Enum)
                    .values([
                        PaymentType::Cash,
                        PaymentType::NetBanking,
                        PaymentType::Upi,
                        PaymentType::Card,
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .create_type(
                Type::create()
                    .as_enum(PaymentStatus::Enum)
                    .values([PaymentStatus::Pending, PaymentStatus::Completed])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Payment::Table)
                    .if_not_exists()
                    .col(uuid(Payment::Id).primary_key())
                    .col(uuid(Payment::UserId).not_null())
                    .col(uuid(Payment::ParkedCarId).not_null())
                    .col(double(Payment::Amount).not_null())
                    .col(
                        ColumnDef::new(Payment::PaymentType)
                            .custom(PaymentType::Enum)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Payment::Status)
                            .custom(PaymentStatus::Enum)
                            .not_null(),
                    )
                    .col(boolean(Payment::Deleted).not_null().default(false))
                    .col(
                        timestamp_with_time_zone(Payment::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payment_user")
                            .from(Payment::Table, Payment::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payment_parked_car")
                            .from(Payment::Table, Payment::ParkedCarId)
                            .to(ParkedCar::Table, ParkedCar::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Payment::Table).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(PaymentStatus::Enum).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(PaymentType::Enum).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Payment {
    Table,
    Id,
    UserId,
    ParkedCarId,
    Amount,
    PaymentType,
    Status,
    Deleted,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum PaymentType {
    #[sea_orm(iden = "payment_type")]
    Enum,
    #[sea_orm(iden = "CASH")]
    Cash,
    #[sea_orm(iden = "NET_BANKING")]
    NetBanking,
    #[sea_orm(iden = "UPI")]
    Upi,
    #[sea_orm(iden = "CARD")]
    Card,
}

#[derive(DeriveIden)]
pub enum PaymentStatus {
    #[sea_orm(iden = "payment_status")]
    Enum,
    #[sea_orm(iden = "PENDING")]
    Pending,
    #[sea_orm(iden = "COMPLETED")]
    Completed,
}
