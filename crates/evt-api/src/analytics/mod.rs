pub mod routes;
pub mod series;

pub use routes::routes;
