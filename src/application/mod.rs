// Application layer - workflows over atomic scopes.
// Each workflow is constructed around an explicit UnitOfWork handle and
// exposed on its own; `Ledger` only wires them together.

pub mod accounts;
pub mod balance;
pub mod error;
pub mod purchase;
pub mod query;
pub mod service;
pub mod transfer;
pub mod unit_of_work;

pub use accounts::*;
pub use error::*;
pub use purchase::*;
pub use query::*;
pub use service::*;
pub use transfer::*;
pub use unit_of_work::*;

/// Log a failed workflow at a level matching its kind.
pub(crate) fn report_failure(operation: &'static str, err: &LedgerError) {
    match err.kind() {
        ErrorKind::BusinessRule => {
            tracing::warn!(operation, code = err.code(), "{}", err)
        }
        ErrorKind::Transient => {
            tracing::warn!(operation, code = err.code(), error = %err, "store unavailable")
        }
        ErrorKind::Internal => {
            tracing::error!(operation, error = ?err, "internal ledger failure")
        }
    }
}
