//! Request handlers for the runtime's HTTP and WebSocket surface.

pub mod agents;
pub mod costs;
pub mod health;
pub mod stream;
pub mod tasks;
pub mod workflows;

pub use agents::router as agents_router;
pub use costs::router as costs_router;
pub use health::router as health_router;
pub use stream::router as stream_router;
pub use tasks::router as tasks_router;
pub use workflows::router as workflows_router;
