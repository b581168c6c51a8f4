//! # parley-web
//!
//! The relay proxy behind `parley serve`. `POST /api/chat` validates the turn
//! history, forwards it to the upstream chat service and pipes the upstream's
//! event stream back unchanged.

pub mod routes;
pub mod server;

mod error;
mod upstream;

pub use error::{Result, WebError};
pub use server::{build_router, start_server, AppState};
pub use upstream::UpstreamClient;
