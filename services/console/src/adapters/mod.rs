pub mod http;
pub mod records;
pub mod session;

pub use http::{HttpAuthClient, HttpResourceClient};
pub use records::WireResource;
pub use session::SessionStore;
