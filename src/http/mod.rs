pub mod client;
pub mod digest;
pub mod method;
pub mod request;
pub mod response;

pub use client::ApiClient;
pub use method::HttpMethod;
pub use request::RequestSpec;
pub use response::ApiResponse;
