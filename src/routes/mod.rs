pub mod common;
pub mod store;

pub use common::common_routes;
pub use store::{store_route_docs, store_routes};
