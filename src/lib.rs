pub mod catalog;
pub mod config;
pub mod error;
pub mod favorites;
pub mod models;
pub mod storage;

pub use error::{Error, Result};
