mod app;
mod application;
mod domain;
mod infrastructure;
mod interfaces;
mod shared;

pub use app::run;
pub use domain::error::{AppError, Result};
