//! UI layer: the axum server, its routes and handlers.

mod handler;
mod server;
mod signal;
pub mod state;

pub use server::Server;
