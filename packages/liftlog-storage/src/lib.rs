pub mod catalog;
pub mod db;
pub mod measurements;
pub mod models;
pub mod schema;
pub mod workouts;

mod error;

pub use error::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;
