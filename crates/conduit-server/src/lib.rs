//! Streaming surface: the composition root wiring the agent catalog,
//! cost tracker, provider registry, agent dispatcher, plan store, and plan
//! executor into a running axum service with a REST surface and a duplex
//! WebSocket channel.

pub mod dispatch_bridge;
pub mod error;
pub mod handlers;
pub mod rate_limit;
pub mod server;
pub mod state;

pub use error::ServerError;
pub use server::{ConduitServer, ConduitServerConfig};
pub use state::AppState;
