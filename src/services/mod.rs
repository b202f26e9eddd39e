pub mod accounts;
pub mod auth;
pub mod menu;
pub mod notifications;
pub mod preferences;
