//! Storefront server: catalog reads, client cart rules, checkout-session
//! creation against a payment gateway, order history and magic-link auth.

pub mod cart;
pub mod config;
pub mod errors;
pub mod models;
pub mod services;
pub mod state;
pub mod web;
