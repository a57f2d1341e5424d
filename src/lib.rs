pub mod app;
pub mod assistant;
pub mod config;
pub mod error;
pub mod event;
pub mod session;
pub mod theme;
pub mod ui;
