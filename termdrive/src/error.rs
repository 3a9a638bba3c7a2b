//! Error types for termdrive.

use std::time::Duration;

use thiserror::Error;

/// Main error type for termdrive operations.
#[derive(Error, Debug)]
pub enum Error {
    /// SSH transport-level errors
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Channel operation errors
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    /// Session-level errors (priming, mode transitions, commit)
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    /// Platform/vendor errors
    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),
}

impl Error {
    /// Device text collected before the failure, when the error carries any.
    pub fn output(&self) -> Option<&str> {
        match self {
            Error::Channel(ChannelError::PatternTimeout { output, .. }) => Some(output),
            Error::Driver(DriverError::SessionPriming { output, .. })
            | Error::Driver(DriverError::ModeTransition { output, .. })
            | Error::Driver(DriverError::CommitFailed { output }) => Some(output),
            _ => None,
        }
    }
}

/// Transport layer errors (SSH connection, authentication).
#[derive(Error, Debug)]
pub enum TransportError {
    /// SSH handshake or protocol error
    #[error("SSH error: {0}")]
    Ssh(#[from] russh::Error),

    /// Authentication failed
    #[error("Authentication failed for user '{user}'")]
    AuthenticationFailed { user: String },

    /// SSH key error
    #[error("SSH key error: {0}")]
    Key(String),

    /// Host is not present in known_hosts (strict checking)
    #[error("Host key for {host}:{port} is not known")]
    HostKeyUnknown { host: String, port: u16 },

    /// Host key differs from the one in known_hosts
    #[error("Host key for {host}:{port} changed (known_hosts line {line})")]
    HostKeyChanged { host: String, port: u16, line: usize },

    /// known_hosts could not be read or written
    #[error("known_hosts error: {0}")]
    KnownHosts(String),

    /// Operation timed out
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),
}

/// Channel layer errors (pattern waits, reads and writes).
#[derive(Error, Debug)]
pub enum ChannelError {
    /// Pattern did not show up before the deadline.
    #[error("Pattern '{pattern}' not found within {timeout:?}")]
    PatternTimeout {
        pattern: String,
        timeout: Duration,
        /// Everything read while waiting.
        output: String,
    },

    /// Channel closed unexpectedly
    #[error("Channel closed")]
    Closed,

    /// SSH protocol error on the channel
    #[error("Channel SSH error: {0}")]
    Ssh(#[from] russh::Error),

    /// Invalid regex pattern
    #[error("Invalid regex pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Session-level errors.
#[derive(Error, Debug)]
pub enum DriverError {
    /// Session was closed
    #[error("Session not connected")]
    NotConnected,

    /// No recognizable prompt showed up while priming the session.
    /// The connection should be torn down and re-established.
    #[error("Session priming failed: {message}")]
    SessionPriming { message: String, output: String },

    /// Contradictory commit arguments. Raised before anything is written.
    #[error("Invalid commit arguments: {reason}")]
    InvalidCommitArguments { reason: String },

    /// The device did not reach the requested mode.
    #[error("Failed to {target}")]
    ModeTransition { target: String, output: String },

    /// The commit output lacks the expected success marker.
    #[error("Commit failed with the following errors:\n\n{output}")]
    CommitFailed { output: String },

    /// The platform has no such operation
    #[error("Platform '{platform}' does not support {operation}")]
    Unsupported { platform: String, operation: String },

    /// Invalid configuration in the session builder
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

/// Platform/vendor definition errors.
#[derive(Error, Debug)]
pub enum PlatformError {
    /// Invalid platform definition
    #[error("Invalid platform definition: {message}")]
    InvalidDefinition { message: String },

    /// No platform registered under this name
    #[error("Unknown platform '{name}'")]
    UnknownPlatform { name: String },

    /// A platform with this name is already registered
    #[error("Platform '{name}' is already registered")]
    AlreadyRegistered { name: String },
}

impl From<regex::Error> for Error {
    fn from(err: regex::Error) -> Self {
        Error::Channel(ChannelError::InvalidPattern(err))
    }
}

/// Result type alias using termdrive's Error.
pub type Result<T> = std::result::Result<T, Error>;
