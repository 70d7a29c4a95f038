//! In-process executor holding `foods` rows in a `Vec`.
//!
//! Ids come from a monotonically increasing counter and are never reused,
//! matching an auto-increment primary key. Rows can also be seeded verbatim
//! (duplicate ids included), the next call can be made to fail, and the next
//! write can report a forced outcome, so integrity and connectivity failures
//! are reproducible without a server.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

use super::{QueryExecutor, Select, Write, WriteOutcome};
use crate::error::StorageError;
use crate::models::FoodRow;

#[derive(Debug, Default)]
pub struct MemoryExecutor {
    state: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    rows: Vec<FoodRow>,
    last_id: i32,
    fail_next: Option<String>,
    next_outcome: Option<WriteOutcome>,
    calls: usize,
}

impl MemoryExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `row` as-is, bypassing id assignment.
    pub fn seed_row(&self, row: FoodRow) {
        let mut state = self.lock();
        state.last_id = state.last_id.max(row.id);
        state.rows.push(row);
    }

    /// Makes the next statement fail as if the connection dropped.
    pub fn fail_next(&self, message: impl Into<String>) {
        self.lock().fail_next = Some(message.into());
    }

    /// Makes the next write report `outcome` without touching any row.
    pub fn override_next_outcome(&self, outcome: WriteOutcome) {
        self.lock().next_outcome = Some(outcome);
    }

    /// Number of statements received so far.
    pub fn calls(&self) -> usize {
        self.lock().calls
    }

    pub fn row_count(&self) -> usize {
        self.lock().rows.len()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        // A poisoned lock only means a test panicked mid-statement.
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn begin(&self) -> Result<MutexGuard<'_, MemoryState>, StorageError> {
        let mut state = self.lock();
        state.calls += 1;
        if let Some(message) = state.fail_next.take() {
            return Err(StorageError::Query(DieselError::DatabaseError(
                DatabaseErrorKind::UnableToSendCommand,
                Box::new(message),
            )));
        }
        Ok(state)
    }
}

#[async_trait]
impl QueryExecutor for MemoryExecutor {
    async fn fetch(&self, select: Select) -> Result<Vec<FoodRow>, StorageError> {
        let state = self.begin()?;
        let rows = match select {
            Select::ById(id) => state
                .rows
                .iter()
                .filter(|row| row.id == id.get())
                .cloned()
                .collect(),
            Select::NameContains(term) => {
                let needle = term.to_lowercase();
                state
                    .rows
                    .iter()
                    .filter(|row| row.name.to_lowercase().contains(&needle))
                    .cloned()
                    .collect()
            }
            Select::All => state.rows.clone(),
        };
        Ok(rows)
    }

    async fn execute(&self, write: Write) -> Result<WriteOutcome, StorageError> {
        let mut state = self.begin()?;
        if let Some(outcome) = state.next_outcome.take() {
            return Ok(outcome);
        }

        let outcome = match write {
            Write::Insert(values) => {
                // INT auto-increment overflow surfaces as a duplicate primary key.
                let last_id = state.last_id;
                let id = last_id.checked_add(1).ok_or_else(|| {
                    StorageError::Query(DieselError::DatabaseError(
                        DatabaseErrorKind::UniqueViolation,
                        Box::new(format!("Duplicate entry '{last_id}' for key 'PRIMARY'")),
                    ))
                })?;
                state.last_id = id;
                state.rows.push(FoodRow::with_id(id, values));
                WriteOutcome {
                    affected_rows: 1,
                    last_insert_id: u64::try_from(id).ok(),
                }
            }
            Write::Update(id, values) => {
                let mut affected_rows = 0;
                for row in state.rows.iter_mut().filter(|row| row.id == id.get()) {
                    *row = FoodRow::with_id(row.id, values.clone());
                    affected_rows += 1;
                }
                WriteOutcome {
                    affected_rows,
                    last_insert_id: None,
                }
            }
            Write::Delete(id) => {
                let before = state.rows.len();
                state.rows.retain(|row| row.id != id.get());
                WriteOutcome {
                    affected_rows: before - state.rows.len(),
                    last_insert_id: None,
                }
            }
        };
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryExecutor;
    use crate::error::StorageError;
    use crate::executor::{QueryExecutor, Select, Write, WriteOutcome};
    use crate::models::{FoodId, FoodRow, NewFoodRow};
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    fn values(name: &str) -> NewFoodRow {
        NewFoodRow {
            name: name.to_string(),
            serving_size: 100.0,
            serving_size_units: "g".to_string(),
            calories: 52.0,
            carbs: 14.0,
            protein: 0.3,
            fat: 0.2,
            salt: 0.0,
            sugar: 10.0,
        }
    }

    #[actix_web::test]
    async fn ids_are_not_reused_after_delete() {
        let executor = MemoryExecutor::new();
        let first = executor
            .execute(Write::Insert(values("Apple")))
            .await
            .expect("insert succeeds");
        let id = FoodId::try_from(1).expect("valid id");
        executor
            .execute(Write::Delete(id))
            .await
            .expect("delete succeeds");
        let second = executor
            .execute(Write::Insert(values("Pear")))
            .await
            .expect("insert succeeds");

        assert_eq!(first.last_insert_id, Some(1));
        assert_eq!(second.last_insert_id, Some(2));
    }

    #[actix_web::test]
    async fn fail_next_affects_exactly_one_call() {
        let executor = MemoryExecutor::new();
        executor.fail_next("connection reset");

        let err = executor
            .fetch(Select::All)
            .await
            .expect_err("first call should fail");
        assert!(matches!(err, StorageError::Query(_)));
        assert!(executor.fetch(Select::All).await.is_ok());
        assert_eq!(executor.calls(), 2);
    }

    #[actix_web::test]
    async fn insert_past_max_id_fails_instead_of_overflowing() {
        let executor = MemoryExecutor::new();
        executor.seed_row(FoodRow::with_id(i32::MAX, values("Last")));

        let err = executor
            .execute(Write::Insert(values("One more")))
            .await
            .expect_err("id space is exhausted");

        assert!(matches!(
            err,
            StorageError::Query(DieselError::DatabaseError(
                DatabaseErrorKind::UniqueViolation,
                _
            ))
        ));
        assert_eq!(executor.row_count(), 1);
    }

    #[actix_web::test]
    async fn overridden_outcome_is_reported_once_without_writing() {
        let executor = MemoryExecutor::new();
        let forced = WriteOutcome {
            affected_rows: 0,
            last_insert_id: None,
        };
        executor.override_next_outcome(forced);

        let first = executor
            .execute(Write::Insert(values("Apple")))
            .await
            .expect("insert reports");
        let second = executor
            .execute(Write::Insert(values("Apple")))
            .await
            .expect("insert reports");

        assert_eq!(first, forced);
        assert_eq!(second.affected_rows, 1);
        assert_eq!(executor.row_count(), 1);
    }
}
