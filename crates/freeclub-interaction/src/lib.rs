//! Backend access for the Freeclub client: HTTP transport, the resource
//! gateway, token decoding and the short-lived read cache.

pub mod gateway;
pub mod read_cache;
pub mod token;
pub mod transport;

pub use gateway::ResourceGateway;
pub use read_cache::ReadCache;
pub use token::decode_subject;
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Method, RequestBody, ReqwestTransport};
