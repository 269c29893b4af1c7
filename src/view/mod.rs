pub mod types;
pub mod countdown;
pub mod flow;
pub mod actions;

pub use types::*;
pub use countdown::*;
pub use flow::*;
pub use actions::*;
