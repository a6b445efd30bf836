pub use sea_orm_migration::prelude::*;

mod m20250801_000001_create_users;
mod m20250801_000002_create_parking_spots;
mod m20250801_000003_create_cars;
mod m20250801_000004_create_drivers;
mod m20250801_000005_create_managers;
mod m20250801_000006_create_parked_cars;
mod m20250801_000007_create_payments;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250801_000001_create_users::Migration),
            Box::new(m20250801_000002_create_parking_spots::Migration),
            Box::new(m20250801_000003_create_cars::Migration),
            Box::new(m20250801_000004_create_drivers::Migration),
            Box::new(m20250801_000005_create_managers::Migration),
            Box::new(m20250801_000006_create_parked_cars::Migration),
            Box::new(m20250801_000007_create_payments::Migration),
        ]
    }
}
