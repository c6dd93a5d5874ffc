//! Contains data structures representing database entities.

pub mod inventory_item;
pub mod order;
pub mod sale;
pub mod user;

// Re-export the model structs for convenient access
pub use inventory_item::InventoryItem;
pub use order::{OrderLine, OrderSummary};
pub use sale::Sale;
pub use user::User;
