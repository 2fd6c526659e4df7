//! Infrastructure layer - network access to upstream sources

pub mod http;

pub use http::{Fetcher, HttpTransport, RawPayload, ReqwestTransport, TlsMode};
