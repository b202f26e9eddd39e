pub mod accounts;
pub mod auth;
pub mod health;
pub mod menu;
pub mod preferences;
pub mod responsible;
