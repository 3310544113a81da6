//! Shared networking infrastructure.

pub mod client;
#[cfg(test)]
pub(crate) mod mock;
pub mod request;
pub mod transport;

pub use client::HttpClient;
pub use request::{ApiResponse, FilePart, RequestBody, RequestDescriptor};
pub use transport::{REQUEST_ID_HEADER, ReqwestTransport, Transport};
