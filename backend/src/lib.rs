//! Role-gated account pages: signup, login, session-backed landing page, and
//! logout over an in-memory credential store.

pub mod config;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod seed;

pub use middleware::Trace;
