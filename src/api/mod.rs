pub mod types;
pub mod client;
pub mod http_client;

pub use types::*;
pub use client::*;
pub use http_client::*;
