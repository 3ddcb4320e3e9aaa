pub mod app;
pub mod config;
pub mod errors;
pub mod state;
pub mod workspace;

pub use app::create_app;
