pub mod error;
pub mod handlers;
pub mod media;
pub mod middleware;
pub mod routes;

pub use error::ApiError;
pub use routes::create_router;
