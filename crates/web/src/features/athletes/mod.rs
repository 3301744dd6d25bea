pub mod handlers;
pub mod services;
mod routes;

pub use routes::routes;
