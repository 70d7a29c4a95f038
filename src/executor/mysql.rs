use std::time::Instant;

use actix_web::web;
use async_trait::async_trait;
use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager};
use failsafe::backoff::EqualJittered;
use failsafe::failure_policy::{ConsecutiveFailures, OrElse, SuccessRateOverTimeWindow};
use failsafe::{CircuitBreaker, Config, StateMachine};
use log::{error, info};

use super::{QueryExecutor, Select, Write, WriteOutcome};
use crate::config::DatabaseConfig;
use crate::error::StorageError;
use crate::models::FoodRow;
use crate::query;

pub type DbPool = r2d2::Pool<ConnectionManager<MysqlConnection>>;

type CircuitBreakerType = StateMachine<
    OrElse<SuccessRateOverTimeWindow<EqualJittered>, ConsecutiveFailures<EqualJittered>>,
    (),
>;

/// MySQL executor backed by an r2d2 pool.
///
/// Diesel is synchronous, so each statement runs on actix's blocking thread
/// pool and the calling task only awaits its completion. Every call goes
/// through a circuit breaker; a rejected call is reported as
/// `StorageError::Rejected` and never retried here.
#[derive(Clone)]
pub struct MysqlExecutor {
    pool: DbPool,
    circuit_breaker: CircuitBreakerType,
}

impl MysqlExecutor {
    /// Builds the connection pool described by `config`.
    ///
    /// # Errors
    /// - `StorageError::Pool` when the pool cannot open its connections
    ///   within `config.connection_timeout`.
    pub fn connect(config: &DatabaseConfig) -> Result<Self, StorageError> {
        let started_at = Instant::now();
        let manager = ConnectionManager::<MysqlConnection>::new(config.url.as_str());
        let pool = r2d2::Pool::builder()
            .max_size(config.pool_max_size)
            .connection_timeout(config.connection_timeout)
            .build(manager)
            .map_err(|err| {
                error!(
                    "event=db_pool module=executor status=error duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                StorageError::Pool(err)
            })?;

        info!(
            "event=db_pool module=executor status=ok max_size={} duration_ms={}",
            config.pool_max_size,
            started_at.elapsed().as_millis()
        );
        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: DbPool) -> Self {
        Self {
            pool,
            circuit_breaker: Config::new().build(),
        }
    }

    async fn guarded<T, F>(&self, statement: F) -> Result<T, StorageError>
    where
        T: Send + 'static,
        F: FnOnce(&MysqlConnection) -> QueryResult<T> + Send + 'static,
    {
        let pool = self.pool.clone();
        let circuit_breaker = self.circuit_breaker.clone();

        web::block(move || {
            let result = circuit_breaker.call(|| -> Result<T, StorageError> {
                let conn = pool.get()?;
                Ok(statement(&*conn)?)
            });
            match result {
                Ok(value) => Ok(value),
                Err(failsafe::Error::Inner(err)) => Err(err),
                Err(failsafe::Error::Rejected) => Err(StorageError::Rejected),
            }
        })
        .await?
    }
}

#[async_trait]
impl QueryExecutor for MysqlExecutor {
    async fn fetch(&self, select: Select) -> Result<Vec<FoodRow>, StorageError> {
        self.guarded(move |conn| query::find_foods(&select, conn)).await
    }

    async fn execute(&self, write: Write) -> Result<WriteOutcome, StorageError> {
        self.guarded(move |conn| query::run_write(&write, conn)).await
    }
}
