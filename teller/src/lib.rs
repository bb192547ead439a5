mod config;
mod error;
mod liquidation;
mod memory;
mod notify;
mod service;
mod store;
pub use config::*;
pub use error::*;
pub use liquidation::*;
pub use memory::*;
pub use notify::*;
pub use service::*;
pub use store::*;
