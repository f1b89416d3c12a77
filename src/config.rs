use std::time::Duration;

/// Default location of the SQLite database file.
pub const DEFAULT_DATABASE: &str = "coinshop.db";

/// Salt mixed into credential hashes when none is configured.
pub const DEFAULT_CREDENTIAL_SALT: &str = "coinshop-default-salt";

/// Runtime settings for the ledger store and its atomic scopes.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Path to the SQLite database file
    pub database: String,
    /// Upper bound on pooled store connections
    pub max_connections: u32,
    /// Bounded wait for a free pooled connection
    pub acquire_timeout: Duration,
    /// Bounded wait on a locked database before the store reports busy
    pub busy_timeout: Duration,
    /// Bounded wall-clock time for one whole atomic scope
    pub scope_timeout: Duration,
    pub credential_salt: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            database: DEFAULT_DATABASE.to_string(),
            max_connections: 8,
            acquire_timeout: Duration::from_secs(5),
            busy_timeout: Duration::from_secs(5),
            scope_timeout: Duration::from_secs(10),
            credential_salt: DEFAULT_CREDENTIAL_SALT.to_string(),
        }
    }
}

impl LedgerConfig {
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            ..Self::default()
        }
    }

    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections.max(1);
        self
    }

    pub fn with_scope_timeout(mut self, timeout: Duration) -> Self {
        self.scope_timeout = timeout;
        self
    }

    pub fn with_acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    pub fn with_credential_salt(mut self, salt: impl Into<String>) -> Self {
        self.credential_salt = salt.into();
        self
    }
}
