//! Relational query executor the repository runs its statements through.
//!
//! A statement is a typed value; every user-supplied part of it is bound as
//! a parameter by the executor, never spliced into statement text.

use async_trait::async_trait;

use crate::error::StorageError;
use crate::models::{FoodId, FoodRow, NewFoodRow};

pub mod memory;
pub mod mysql;

pub use memory::MemoryExecutor;
pub use mysql::MysqlExecutor;

/// Read statements over the `foods` table.
#[derive(Debug, Clone, PartialEq)]
pub enum Select {
    ById(FoodId),
    /// Case-insensitive substring match on `name`. An empty term matches all rows.
    NameContains(String),
    All,
}

/// Write statements over the `foods` table.
#[derive(Debug, Clone, PartialEq)]
pub enum Write {
    Insert(NewFoodRow),
    Update(FoodId, NewFoodRow),
    Delete(FoodId),
}

impl Write {
    pub fn operation(&self) -> &'static str {
        match self {
            Self::Insert(_) => "insert",
            Self::Update(..) => "update",
            Self::Delete(_) => "delete",
        }
    }
}

/// What a write statement reports back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOutcome {
    pub affected_rows: usize,
    /// Only set by inserts.
    pub last_insert_id: Option<u64>,
}

#[async_trait]
pub trait QueryExecutor: Send + Sync + 'static {
    /// Runs a read statement and returns its result set in storage order.
    async fn fetch(&self, select: Select) -> Result<Vec<FoodRow>, StorageError>;

    /// Runs a write statement and returns its affected-row count.
    async fn execute(&self, write: Write) -> Result<WriteOutcome, StorageError>;
}
