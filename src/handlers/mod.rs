pub mod charge_handlers;
pub mod health;
