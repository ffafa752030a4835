pub mod app;
pub mod auth;
pub mod config;
pub mod controller;
pub mod errors;
pub mod handlers;
pub mod insights;
pub mod models;
pub mod state;
pub mod stats;
pub mod storage;
pub mod store;
pub mod subscription;
pub mod ui;
pub mod view_model;

pub use app::router;
pub use config::Config;
pub use controller::{Controller, ControllerHandle};
pub use state::AppState;
pub use storage::load_data;
