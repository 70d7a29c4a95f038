//! Nutrition tracker: search, view, add, update and delete food records
//! stored in a MySQL `foods` table.

#[macro_use]
extern crate diesel;

pub mod config;
pub mod error;
pub mod executor;
pub mod models;
pub mod repository;
pub mod routes;
pub mod schema;

mod query;

pub use config::{AppConfig, DatabaseConfig};
pub use error::{ConfigError, RepoError, RepoResult, StorageError};
pub use executor::{MemoryExecutor, MysqlExecutor, QueryExecutor};
pub use models::{Food, FoodForm, FoodId, FoodRow, NewFoodRow};
pub use repository::FoodRepository;
