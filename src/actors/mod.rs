//! The actors: the cart itself and a local catalog it can check stock against.

pub mod cart_service;
pub mod catalog_service;

pub use cart_service::*;
pub use catalog_service::*;
