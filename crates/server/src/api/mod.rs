mod handlers;
mod jobs;
mod routes;

pub use routes::create_router;
