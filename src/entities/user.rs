use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "user_role")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    #[sea_orm(string_value = "CUSTOMER")]
    Customer,
    #[sea_orm(string_value = "DRIVER")]
    Driver,
    #[sea_orm(string_value = "MANAGER")]
    Manager,
    #[sea_orm(string_value = "SUPERADMIN")]
    SuperAdmin,
}

impl UserRole {
    fn rank(self) -> u8 {
        match self {
            UserRole::Customer => 0,
            UserRole::Driver => 1,
            UserRole::Manager => 2,
            UserRole::SuperAdmin => 3,
        }
    }

    /// Role hierarchy check: SUPERADMIN may act as MANAGER or DRIVER,
    /// MANAGER may act as DRIVER.
    pub fn satisfies(self, required: UserRole) -> bool {
        self.rank() >= required.rank()
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: String,
    pub phone: String,
    pub role: UserRole,
    pub deleted: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::car::Entity")]
    Cars,
    #[sea_orm(has_many = "super::parked_car::Entity")]
    ParkedCars,
    #[sea_orm(has_many = "super::payment::Entity")]
    Payments,
    #[sea_orm(has_many = "super::driver::Entity")]
    Drivers,
    #[sea_orm(has_many = "super::manager::Entity")]
    Managers,
}

impl Related<super::car::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cars.def()
    }
}

impl Related<super::parked_car::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ParkedCars.def()
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
    fn test_superadmin_satisfies_every_role() {
        for required in [
            UserRole::Customer,
            UserRole::Driver,
            UserRole::Manager,
            UserRole::SuperAdmin,
        ] {
            assert!(UserRole::SuperAdmin.satisfies(required));
        }
    }

    #[test]
    fn test_manager_satisfies_driver_but_not_superadmin() {
        assert!(UserRole::Manager.satisfies(UserRole::Driver));
        assert!(UserRole::Manager.satisfies(UserRole::Manager));
        assert!(!UserRole::Manager.satisfies(UserRole::SuperAdmin));
    }

    #[test]
    fn test_customer_satisfies_only_customer() {
        assert!(UserRole::Customer.satisfies(UserRole::Customer));
        assert!(!UserRole::Customer.satisfies(UserRole::Driver));
        assert!(!UserRole::Customer.satisfies(UserRole::Manager));
    }
}
