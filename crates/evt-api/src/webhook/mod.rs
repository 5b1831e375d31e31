//! Delivery status callbacks from the email provider.

pub mod payload;
pub mod routes;

pub use routes::routes;
