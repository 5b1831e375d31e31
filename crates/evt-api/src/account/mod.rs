pub mod email_verification;
pub mod routes;

pub use routes::routes;
