//! HTTP surface on a single listener
//!
//! - GET / - realtime WebSocket upgrade, or index.html for plain requests
//! - GET /health - Health check
//! - anything else - static assets from the public directory

mod handlers;
mod routes;
mod socket;
mod state;

pub use routes::create_router;
pub use socket::write_outbound;
pub use state::AppState;
