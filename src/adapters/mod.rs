//! Collaborators the cart talks to: stock lookups, persistence and
//! user notifications.

pub mod http_oracle;
pub mod notifier;
pub mod stock_oracle;
pub mod storage;

pub use http_oracle::*;
pub use notifier::*;
pub use stock_oracle::*;
pub use storage::*;
