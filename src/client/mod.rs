//! Client-facing protocol: typed messages and the FIFO multiplexer that
//! queues them for the connection's socket writer

pub mod messages;
pub mod multiplexer;

pub use messages::ClientMessage;
pub use multiplexer::{ClientMultiplexer, Outbound};
