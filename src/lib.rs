#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod config;
pub mod error;
pub mod paint;
pub mod photos;
pub mod raster;
pub mod typing;
pub mod ui;
pub mod util;

pub use app::KioskApp;
pub use config::KioskConfig;
pub use error::{PersistenceError, PersistenceResult};
