use tracing::instrument;

use crate::domain::{Account, AccountId, NewAccount, hash_credential};

use super::{LedgerError, UnitOfWork, report_failure};

/// Result of a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authenticated {
    pub account_id: AccountId,
    pub username: String,
    /// True when this login registered the account
    pub created: bool,
}

/// Identity resolution and registration.
///
/// Token issuance belongs to the transport layer; this only answers "who is
/// this" and hands back an account id that workflows take explicitly.
#[derive(Clone)]
pub struct AccountDirectory {
    uow: UnitOfWork,
    salt: String,
}

impl AccountDirectory {
    pub fn new(uow: UnitOfWork, salt: impl Into<String>) -> Self {
        Self {
            uow,
            salt: salt.into(),
        }
    }

    /// Look up an account by username.
    pub async fn resolve(&self, username: &str) -> Result<Option<Account>, LedgerError> {
        let username = username.to_string();
        self.uow
            .read(move |scope| {
                Box::pin(async move { Ok(scope.find_account_by_username(&username).await?) })
            })
            .await
    }

    /// Look up an account by id.
    pub async fn get(&self, account_id: AccountId) -> Result<Account, LedgerError> {
        self.uow
            .read(move |scope| {
                Box::pin(async move {
                    scope
                        .get_account(account_id)
                        .await?
                        .ok_or(LedgerError::AccountNotFound(account_id))
                })
            })
            .await
    }

    /// Create an account with the starting balance.
    #[instrument(skip(self, password))]
    pub async fn register(&self, username: &str, password: &str) -> Result<AccountId, LedgerError> {
        validate_credentials(username, password)?;
        let account = NewAccount::new(username, hash_credential(password, &self.salt));

        let outcome = self
            .uow
            .run(move |scope| {
                Box::pin(async move {
                    if scope.find_account_by_username(&account.username).await?.is_some() {
                        return Err(LedgerError::UsernameTaken(account.username.clone()));
                    }
                    Ok(scope.insert_account(&account).await?)
                })
            })
            .await;

        match &outcome {
            Ok(account_id) => tracing::info!(account_id, "account registered"),
            Err(err) => report_failure("register", err),
        }
        outcome
    }

    /// Verify a username/password pair. An unknown username is registered on
    /// the spot with the given password.
    #[instrument(skip(self, password))]
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Authenticated, LedgerError> {
        validate_credentials(username, password)?;
        let credential_hash = hash_credential(password, &self.salt);
        let username = username.to_string();

        let outcome = self
            .uow
            .run(move |scope| {
                Box::pin(async move {
                    let existing = scope.find_account_by_username(&username).await?;
                    match existing {
                        Some(account) if account.credential_hash == credential_hash => {
                            Ok(Authenticated {
                                account_id: account.id,
                                username: account.username,
                                created: false,
                            })
                        }
                        Some(_) => Err(LedgerError::IncorrectPassword(username.clone())),
                        None => {
                            let account = NewAccount::new(username.clone(), credential_hash);
                            let account_id = scope.insert_account(&account).await?;
                            Ok(Authenticated {
                                account_id,
                                username,
                                created: true,
                            })
                        }
                    }
                })
            })
            .await;

        match &outcome {
            Ok(session) => tracing::info!(
                account_id = session.account_id,
                created = session.created,
                "authenticated"
            ),
            Err(err) => report_failure("authenticate", err),
        }
        outcome
    }
}

fn validate_credentials(username: &str, password: &str) -> Result<(), LedgerError> {
    if username.trim().is_empty() {
        return Err(LedgerError::InvalidCredentials("username is empty".into()));
    }
    if password.is_empty() {
        return Err(LedgerError::InvalidCredentials("password is empty".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_credentials() {
        assert!(validate_credentials("alice", "pw").is_ok());
        assert!(matches!(
            validate_credentials("  ", "pw"),
            Err(LedgerError::InvalidCredentials(_))
        ));
        assert!(matches!(
            validate_credentials("alice", ""),
            Err(LedgerError::InvalidCredentials(_))
        ));
    }
}
