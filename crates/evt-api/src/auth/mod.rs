pub mod jwt;
pub mod middleware;
pub mod service;

pub use middleware::AuthOrganizer;
