pub mod fake_transport;
pub mod http_transport;

pub use fake_transport::FakeTransport;
pub use http_transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
