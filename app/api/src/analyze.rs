pub mod analyzer;
pub mod cache;
mod controller;
pub mod model;
pub mod prompt;

pub use controller::routes;
