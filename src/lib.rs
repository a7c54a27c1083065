pub mod config;
pub mod error;
pub mod fees;
pub mod fx;
pub mod payments;
pub mod psp;
pub mod services;
pub mod webhooks;
