pub mod store;

pub use store::{StoreRow, StoreService};
