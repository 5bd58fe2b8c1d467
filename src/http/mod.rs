pub mod client;
pub mod request;
pub mod response;
pub mod transport;
pub mod types;

// Re-export commonly used types for convenient access
pub use client::Client;
pub use request::RequestDescriptor;
pub use response::ResponseModel;
pub use transport::{Transport, TransportError, TransportRequest, TransportResponse};
pub use types::{AuthType, Authorization, Method, StatusClass};
