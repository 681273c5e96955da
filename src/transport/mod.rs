//! HTTP transport to the completion service.

pub mod http;
pub mod wire;

pub use http::{HttpCompletionClient, TransportError, KEYRING_SERVICE};
