use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_type")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentType {
    #[sea_orm(string_value = "CASH")]
    Cash,
    #[sea_orm(string_value = "NET_BANKING")]
    NetBanking,
    #[sea_orm(string_value = "UPI")]
    Upi,
    #[sea_orm(string_value = "CARD")]
    Card,
}

impl PaymentType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "CASH" => Some(PaymentType::Cash),
            "NET_BANKING" => Some(PaymentType::NetBanking),
            "UPI" => Some(PaymentType::Upi),
            "CARD" => Some(PaymentType::Card),
            _ => None,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_status")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "COMPLETED")]
    Completed,
}

impl PaymentStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "PENDING" => Some(PaymentStatus::Pending),
            "COMPLETED" => Some(PaymentStatus::Completed),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payment")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub parked_car_id: Uuid,
    pub amount: f64,
    pub payment_type: PaymentType,
    pub status: PaymentStatus,
    pub deleted: bool,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::parked_car::Entity",
        from = "Column::ParkedCarId",
        to = "super::parked_car::Column::Id"
    )]
    ParkedCar,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::parked_car::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ParkedCar.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_type_parse() {
        assert_eq!(PaymentType::parse("CASH"), Some(PaymentType::Cash));
        assert_eq!(
            PaymentType::parse("NET_BANKING"),
            Some(PaymentType::NetBanking)
        );
        assert_eq!(PaymentType::parse("UPI"), Some(PaymentType::Upi));
        assert_eq!(PaymentType::parse("CARD"), Some(PaymentType::Card));
        assert_eq!(PaymentType::parse("BITCOIN"), None);
        assert_eq!(PaymentType::parse("upi"), None);
    }

    #[test]
    fn test_payment_status_parse() {
        assert_eq!(PaymentStatus::parse("PENDING"), Some(PaymentStatus::Pending));
        assert_eq!(
            PaymentStatus::parse("COMPLETED"),
            Some(PaymentStatus::Completed)
        );
        assert_eq!(PaymentStatus::parse("REFUNDED"), None);
    }
}
