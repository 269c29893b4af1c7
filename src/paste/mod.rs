pub mod types;
pub mod form;
pub mod link;

pub use types::*;
pub use form::*;
pub use link::*;
