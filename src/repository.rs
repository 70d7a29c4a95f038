//! Food repository: typed CRUD and search over the `foods` table.
//!
//! # Invariants
//! - Write paths validate and coerce the submitted form before any statement runs.
//! - Every write must affect exactly one row; anything else is an error
//!   (except `delete`, where zero rows means "nothing to delete").
//! - Inserted and updated foods are re-read from storage before returning.
//! - Storage errors pass through unmodified; nothing is retried.

use log::{debug, info, warn};

use crate::error::{RepoError, RepoResult};
use crate::executor::{QueryExecutor, Select, Write, WriteOutcome};
use crate::models::{Food, FoodForm, FoodId};

/// Repository over an injected query executor. Holds no state of its own.
pub struct FoodRepository<E> {
    executor: E,
}

impl<E: QueryExecutor> FoodRepository<E> {
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Loads the single food stored under `id`.
    ///
    /// # Errors
    /// - `RepoError::NotFound` when zero rows, or more than one, carry `id`.
    pub async fn fetch_by_id(&self, id: FoodId) -> RepoResult<Food> {
        let mut rows = self.executor.fetch(Select::ById(id)).await?;
        if rows.len() != 1 {
            if rows.len() > 1 {
                warn!(
                    "event=food_fetch module=repo status=error id={} matched={} error_code=duplicate_id",
                    id,
                    rows.len()
                );
            }
            return Err(RepoError::NotFound {
                id,
                matched: rows.len(),
            });
        }

        let row = rows.remove(0);
        Ok(Food::from_row(row))
    }

    /// Case-insensitive substring search on `name`. An empty term lists everything.
    pub async fn search_by_name(&self, term: &str) -> RepoResult<Vec<Food>> {
        let rows = self
            .executor
            .fetch(Select::NameContains(term.to_string()))
            .await?;
        debug!(
            "event=food_search module=repo status=ok term_len={} matched={}",
            term.chars().count(),
            rows.len()
        );
        Ok(rows.into_iter().map(Food::from_row).collect())
    }

    pub async fn list_all(&self) -> RepoResult<Vec<Food>> {
        let rows = self.executor.fetch(Select::All).await?;
        Ok(rows.into_iter().map(Food::from_row).collect())
    }

    /// Inserts a new food and returns it as stored, with its assigned id.
    ///
    /// # Errors
    /// - `RepoError::Validation` for blank names or non-numeric quantities.
    /// - `RepoError::Persistence` when the insert did not affect exactly one row.
    /// - `RepoError::InsertId` when storage did not report a usable id.
    pub async fn insert(&self, form: &FoodForm) -> RepoResult<Food> {
        let values = form.validate()?;
        let write = Write::Insert(values);
        let operation = write.operation();
        let outcome = self.executor.execute(write).await?;
        expect_single_row(operation, &outcome)?;

        let id = outcome
            .last_insert_id
            .and_then(|raw| i32::try_from(raw).ok())
            .and_then(|raw| FoodId::try_from(raw).ok())
            .ok_or(RepoError::InsertId(outcome.last_insert_id))?;

        info!("event=food_insert module=repo status=ok id={}", id);
        self.fetch_by_id(id).await
    }

    /// Replaces every field of food `id`, carbs included.
    ///
    /// # Errors
    /// - `RepoError::Validation` for an invalid form.
    /// - `RepoError::Persistence` when `id` does not exist (0 rows) or is duplicated.
    pub async fn update(&self, id: FoodId, form: &FoodForm) -> RepoResult<Food> {
        let values = form.validate()?;
        let write = Write::Update(id, values);
        let operation = write.operation();
        let outcome = self.executor.execute(write).await?;
        expect_single_row(operation, &outcome)?;

        info!("event=food_update module=repo status=ok id={}", id);
        self.fetch_by_id(id).await
    }

    /// Deletes food `id`. Returns `false` when there was nothing to delete.
    ///
    /// # Errors
    /// - `RepoError::Persistence` when more than one row was removed.
    pub async fn delete(&self, id: FoodId) -> RepoResult<bool> {
        let write = Write::Delete(id);
        let operation = write.operation();
        let outcome = self.executor.execute(write).await?;
        if outcome.affected_rows > 1 {
            return Err(persistence_error(operation, outcome.affected_rows));
        }

        let deleted = outcome.affected_rows == 1;
        info!(
            "event=food_delete module=repo status=ok id={} deleted={}",
            id, deleted
        );
        Ok(deleted)
    }
}

fn expect_single_row(operation: &'static str, outcome: &WriteOutcome) -> RepoResult<()> {
    if outcome.affected_rows != 1 {
        return Err(persistence_error(operation, outcome.affected_rows));
    }
    Ok(())
}

fn persistence_error(operation: &'static str, affected: usize) -> RepoError {
    warn!(
        "event=food_{} module=repo status=error affected_rows={} error_code=affected_rows_mismatch",
        operation, affected
    );
    RepoError::Persistence { operation, affected }
}
