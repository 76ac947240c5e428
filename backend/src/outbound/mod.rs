//! Outbound adapters implementing domain ports.
//!
//! - **memory**: process-local credential store guarded by an async lock.
//! - **hashing**: bcrypt password hasher running on the blocking pool.
//! - **sessions**: server-side session state behind the session cookie.
//!
//! Adapters translate between domain types and their backing mechanism and
//! hold no business rules beyond what the port contract demands.

pub mod hashing;
pub mod memory;
pub mod sessions;

pub use hashing::BcryptPasswordHasher;
pub use memory::InMemoryCredentialStore;
pub use sessions::InMemorySessionStore;
