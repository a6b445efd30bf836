use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Parked car lifecycle status. The write paths accept exactly these four
/// values; `retrieved_at` is stamped only on the transition to `Retrieved`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "park_status")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParkStatus {
    #[sea_orm(string_value = "PARKING")]
    Parking,
    #[sea_orm(string_value = "PARKED")]
    Parked,
    #[sea_orm(string_value = "RETRIEVE")]
    Retrieve,
    #[sea_orm(string_value = "RETRIEVED")]
    Retrieved,
}

impl ParkStatus {
    /// Parse a client-supplied status string, rejecting anything outside
    /// the four-value set.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "PARKING" => Some(ParkStatus::Parking),
            "PARKED" => Some(ParkStatus::Parked),
            "RETRIEVE" => Some(ParkStatus::Retrieve),
            "RETRIEVED" => Some(ParkStatus::Retrieved),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "parked_car")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub car_id: Uuid,
    pub user_id: Uuid,
    pub parking_spot_id: Uuid,
    pub driver_id: Option<Uuid>,
    pub status: ParkStatus,
    pub parked_pos: String,
    pub parked_at: DateTimeWithTimeZone,
    pub retrieved_at: Option<DateTimeWithTimeZone>,
    pub deleted: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::car::Entity",
        from = "Column::CarId",
        to = "super::car::Column::Id"
    )]
    Car,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::parking_spot::Entity",
        from = "Column::ParkingSpotId",
        to = "super::parking_spot::Column::Id"
    )]
    ParkingSpot,
    #[sea_orm(
        belongs_to = "super::driver::Entity",
        from = "Column::DriverId",
        to = "super::driver::Column::Id"
    )]
    Driver,
    #[sea_orm(has_many = "super::payment::Entity")]
    Payments,
}

impl Related<super::car::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Car.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::parking_spot::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ParkingSpot.def()
    }
}

impl Related<super::driver::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Driver.def()
    }
}

impl Related<super::payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_the_four_statuses() {
        assert_eq!(ParkStatus::parse("PARKING"), Some(ParkStatus::Parking));
        assert_eq!(ParkStatus::parse("PARKED"), Some(ParkStatus::Parked));
        assert_eq!(ParkStatus::parse("RETRIEVE"), Some(ParkStatus::Retrieve));
        assert_eq!(ParkStatus::parse("RETRIEVED"), Some(ParkStatus::Retrieved));
    }

    #[test]
    fn test_parse_rejects_everything_else() {
        assert_eq!(ParkStatus::parse("parking"), None);
        assert_eq!(ParkStatus::parse("DONE"), None);
        assert_eq!(ParkStatus::parse(""), None);
    }
}
