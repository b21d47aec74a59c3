//! HTTP transport abstraction.

mod http;
mod traits;

pub use http::ReqwestTransport;
pub use traits::{HttpMethod, HttpRequest, HttpResponse, HttpTransport};
