pub mod config;
pub mod errors;
pub mod repository;
pub mod util;

pub use repository::*;
