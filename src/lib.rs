pub mod api;
pub mod app;
pub mod controller;
pub mod state;
pub mod utils;
#[cfg(feature = "gui")]
pub mod ui;
