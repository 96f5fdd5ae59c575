//! Request execution
//!
//! - `request`: transport-independent request model
//! - `call`: deferred calls and per-call options
//! - `multipart`: multipart upload parts and their reqwest forms
//! - `transport`: async and blocking transport collaborator traits
//! - `reqwest_transport`: bundled reqwest collaborators
//! - `interceptor`: request/response hooks
//! - `core`: shared preparation, classification and decoding

pub mod call;
pub mod core;
pub mod interceptor;
pub mod multipart;
pub mod reqwest_transport;
pub mod request;
pub mod transport;

pub use call::PendingCall;
pub use self::core::ClientCore;
pub use multipart::MultipartBody;
pub use interceptor::{HttpInterceptor, LoggingInterceptor, RequestContext};
pub use reqwest_transport::{BlockingReqwestTransport, ReqwestTransport};
pub use request::ApiRequest;
pub use transport::{
    BlockingBody, BlockingHttpTransport, ByteStream, HttpTransport, RequestBody, TransportRequest,
    TransportResponse, once_stream,
};
