//! Inbound adapters translating HTTP requests into account use cases.

pub mod http;
