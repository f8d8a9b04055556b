pub mod config;
pub mod container;
pub mod event;
pub mod health;
