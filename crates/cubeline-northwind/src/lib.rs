//! Cubeline Northwind - source adapter for the Northwind OData service
//!
//! This crate builds the Products, Customers, Employees, Time and Measures
//! dimensions from the Northwind sample data set and turns its orders into
//! cell updates for the sales cube.

pub mod customers;
pub mod employees;
pub mod measures;
pub mod orders;
pub mod products;
pub mod records;
pub mod source;
pub mod time;

#[cfg(test)]
mod fixtures;

/// Public read-only Northwind service
pub const SERVICE_ROOT: &str = "https://services.odata.org/V4/Northwind/Northwind.svc/";

// Re-exports
pub use employees::Generation;
pub use measures::measures;
pub use orders::SalesCube;
pub use source::Northwind;
pub use time::{day_id, time_dimension};
