// Declare handler modules
pub mod account_handlers;
pub mod auth_handlers;
pub mod checkout_handlers;
pub mod product_handlers;
