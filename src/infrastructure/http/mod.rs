//! HTTP access to upstream JSON APIs

pub mod fetcher;
pub mod transport;

pub use fetcher::{Fetcher, RawPayload};
pub use transport::{HttpTransport, ReqwestTransport, TlsMode};
