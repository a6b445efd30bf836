pub mod car;
pub mod driver;
pub mod manager;
pub mod parked_car;
pub mod parking_spot;
pub mod payment;
pub mod user;
