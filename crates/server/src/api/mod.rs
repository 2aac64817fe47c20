pub mod downloads;
pub mod handlers;
pub mod media;
pub mod middleware;
pub mod progress;
pub mod routes;
pub mod sports;
pub mod torrents;
pub mod vision;
pub mod watchlist;

pub use routes::create_router;
