pub mod auth;
pub mod customer;
pub mod driver;
pub mod manager;
pub mod superadmin;
