pub mod handlers;
pub mod middleware;
pub mod posters;
pub mod routes;

pub use routes::create_router;
