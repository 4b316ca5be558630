use thiserror::Error;

/// A write to the key-value store could not be completed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    /// The store rejected the command or the connection is gone.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<redis::RedisError> for StoreError {
    fn from(e: redis::RedisError) -> Self {
        Self::Unavailable(e.to_string())
    }
}

/// The reporter cannot be built from the given configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid store target {host}:{port}: {reason}")]
    InvalidTarget {
        host: String,
        port: u16,
        reason: String,
    },
    #[error("invalid report period {0:?}, expected at least 1ms")]
    InvalidPeriod(std::time::Duration),
    #[error("invalid time zone \"{0}\", expected an offset such as +02:00")]
    InvalidTimeZone(String),
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// The reporter could not be started against its store.
#[derive(Debug, Error)]
pub enum StartError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
