use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tokio::time::Instant;

use crate::storage::{Repository, Scope};

use super::LedgerError;

/// Future returned by the body of an atomic scope. It borrows the scope for `'c`.
pub type ScopeFuture<'c, T> = Pin<Box<dyn Future<Output = Result<T, LedgerError>> + Send + 'c>>;

/// Opens, commits and aborts atomic scopes over the ledger store.
///
/// A handle is passed explicitly to every workflow; there is no global
/// manager. Each call opens exactly one top-level scope.
#[derive(Clone)]
pub struct UnitOfWork {
    repo: Repository,
    scope_timeout: Duration,
}

impl UnitOfWork {
    pub fn new(repo: Repository, scope_timeout: Duration) -> Self {
        Self {
            repo,
            scope_timeout,
        }
    }

    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    /// Run `body` inside a write scope.
    ///
    /// Commits when `body` returns `Ok`. On `Err`, on timeout, or when the
    /// returned future is dropped before completion, every mutation made by
    /// `body` is discarded.
    ///
    /// The scope timeout covers opening the scope and running `body`. The
    /// commit itself is never cut short: once `body` has succeeded the outcome
    /// reported is the commit's own.
    pub async fn run<T, F>(&self, body: F) -> Result<T, LedgerError>
    where
        T: Send,
        F: for<'c> FnOnce(&'c mut Scope) -> ScopeFuture<'c, T> + Send,
    {
        let deadline = Instant::now() + self.scope_timeout;
        let mut scope = self
            .within(deadline, async {
                self.repo.begin_write().await.map_err(LedgerError::from)
            })
            .await?;

        let outcome = self.within(deadline, body(&mut scope)).await;
        match outcome {
            Ok(value) => {
                scope.commit().await?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = scope.rollback().await {
                    tracing::error!(error = %rollback_err, "rollback failed; dropping scope");
                }
                Err(err)
            }
        }
    }

    /// Run `body` inside a read scope. All reads observe one snapshot.
    /// The scope is always rolled back; it has nothing to publish.
    pub async fn read<T, F>(&self, body: F) -> Result<T, LedgerError>
    where
        T: Send,
        F: for<'c> FnOnce(&'c mut Scope) -> ScopeFuture<'c, T> + Send,
    {
        let deadline = Instant::now() + self.scope_timeout;
        let mut scope = self
            .within(deadline, async {
                self.repo.begin_read().await.map_err(LedgerError::from)
            })
            .await?;

        let outcome = self.within(deadline, body(&mut scope)).await;
        if let Err(err) = scope.rollback().await {
            tracing::warn!(error = %err, "failed to release read scope");
        }
        outcome
    }

    async fn within<T>(
        &self,
        deadline: Instant,
        work: impl Future<Output = Result<T, LedgerError>>,
    ) -> Result<T, LedgerError> {
        match tokio::time::timeout_at(deadline, work).await {
            Ok(outcome) => outcome,
            Err(_) => {
                tracing::warn!(timeout = ?self.scope_timeout, "atomic scope timed out; aborted");
                Err(LedgerError::Timeout(self.scope_timeout))
            }
        }
    }
}
