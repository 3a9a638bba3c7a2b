//! Candidate-configuration commit.
//!
//! Arguments are validated into a [`CommitRequest`] before anything is
//! written, so contradictory options never reach the device. Success is
//! judged only by a variant-specific marker string in the output.

use std::fmt;

use log::{debug, warn};

use super::session::{Mode, Session};
use crate::channel::Channel;
use crate::error::{DriverError, Error, Result};

/// Marker printed by `commit check` on success.
pub const CHECK_MARKER: &str = "configuration check succeeds";

/// Marker printed by `commit confirmed` on success.
pub const CONFIRMED_MARKER: &str = "commit confirmed will be automatically rolled back in";

/// Marker printed by a plain `commit` on success.
pub const COMMIT_MARKER: &str = "commit complete";

/// Caller-facing commit options.
///
/// ```
/// use termdrive::CommitOptions;
///
/// let options = CommitOptions::default()
///     .confirmed(Some(5))
///     .with_comment("rollback if BGP drops");
/// assert!(options.confirm);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommitOptions {
    /// Commit with automatic rollback unless confirmed.
    pub confirm: bool,

    /// Rollback delay in minutes. Only valid with `confirm`.
    pub confirm_delay: Option<u32>,

    /// Validate only; nothing is committed.
    pub check: bool,

    /// Commit log comment. Must not contain `"`. An empty comment is ignored.
    pub comment: Option<String>,

    /// Leave config mode after a successful commit.
    pub and_quit: bool,

    /// Per-call delay factor. Defaults to 1.
    pub delay_factor: Option<f64>,
}

impl CommitOptions {
    /// A plain commit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate only.
    pub fn check(mut self) -> Self {
        self.check = true;
        self
    }

    /// Commit with automatic rollback after `delay` minutes (device default
    /// when `None`).
    pub fn confirmed(mut self, delay: Option<u32>) -> Self {
        self.confirm = true;
        self.confirm_delay = delay;
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn and_quit(mut self) -> Self {
        self.and_quit = true;
        self
    }

    pub fn with_delay_factor(mut self, delay_factor: f64) -> Self {
        self.delay_factor = Some(delay_factor);
        self
    }
}

/// Which commit is being performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitVariant {
    /// `commit`
    Plain,
    /// `commit confirmed [N]`
    Confirmed,
    /// `commit check`
    Check,
}

impl CommitVariant {
    /// Substring whose presence in the output means success.
    pub fn marker(self) -> &'static str {
        match self {
            CommitVariant::Plain => COMMIT_MARKER,
            CommitVariant::Confirmed => CONFIRMED_MARKER,
            CommitVariant::Check => CHECK_MARKER,
        }
    }
}

impl fmt::Display for CommitVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommitVariant::Plain => write!(f, "commit"),
            CommitVariant::Confirmed => write!(f, "commit confirmed"),
            CommitVariant::Check => write!(f, "commit check"),
        }
    }
}

/// A validated commit, ready to be turned into a command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRequest {
    variant: CommitVariant,
    confirm_delay: Option<u32>,
    comment: Option<String>,
    and_quit: bool,
}

impl CommitRequest {
    /// Validate caller options. Nothing is written to the device here.
    pub fn new(options: CommitOptions) -> Result<Self> {
        Self::try_from(options)
    }

    fn invalid(reason: &str) -> Error {
        DriverError::InvalidCommitArguments {
            reason: reason.to_string(),
        }
        .into()
    }

    pub fn variant(&self) -> CommitVariant {
        self.variant
    }

    pub fn and_quit(&self) -> bool {
        self.and_quit
    }

    /// The command line to send.
    pub fn command(&self) -> String {
        let mut command = self.variant.to_string();
        if let Some(delay) = self.confirm_delay {
            command.push_str(&format!(" {}", delay));
        }
        if let Some(comment) = &self.comment {
            command.push_str(&format!(" comment \"{}\"", comment));
        }
        if self.and_quit {
            command.push_str(" and-quit");
        }
        command
    }
}

impl TryFrom<CommitOptions> for CommitRequest {
    type Error = Error;

    fn try_from(mut options: CommitOptions) -> Result<Self> {
        options.comment = options.comment.filter(|c| !c.is_empty());
        if options.check && (options.confirm || options.confirm_delay.is_some()) {
            return Err(Self::invalid("check cannot be combined with confirm"));
        }
        if options.check && options.comment.is_some() {
            return Err(Self::invalid("check cannot be combined with a comment"));
        }
        if options.confirm_delay.is_some() && !options.confirm {
            return Err(Self::invalid("confirm_delay requires confirm"));
        }
        if options.confirm_delay == Some(0) {
            return Err(Self::invalid("confirm_delay must be a positive number of minutes"));
        }
        if options.comment.as_deref().is_some_and(|c| c.contains('"')) {
            return Err(Self::invalid("comment must not contain a double quote"));
        }

        let variant = if options.check {
            CommitVariant::Check
        } else if options.confirm {
            CommitVariant::Confirmed
        } else {
            CommitVariant::Plain
        };

        Ok(Self {
            variant,
            confirm_delay: options.confirm_delay,
            comment: options.comment,
            and_quit: options.and_quit,
        })
    }
}

/// Outcome of a successful commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitResult {
    pub variant: CommitVariant,

    /// The marker that was found.
    pub marker: &'static str,

    /// Everything read, including the config-mode entry.
    pub output: String,
}

impl fmt::Display for CommitResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.output)
    }
}

impl<C: Channel> Session<C> {
    /// Commit the candidate configuration.
    ///
    /// Config mode is entered first if needed. Fast mode is off for the
    /// duration of the call and restored afterwards, whatever the outcome.
    pub async fn commit(&mut self, options: CommitOptions) -> Result<CommitResult> {
        let requested_delay = options.delay_factor.unwrap_or(1.0);
        let request = CommitRequest::new(options)?;
        if !self.platform.has_commit {
            return Err(DriverError::Unsupported {
                platform: self.platform.name.clone(),
                operation: "commit".to_string(),
            }
            .into());
        }
        self.ensure_open()?;

        let mut delay_factor = self.select_delay_factor(requested_delay);
        if self.fast_cli && delay_factor < 1.0 {
            delay_factor = 1.0;
        }

        let saved_fast_cli = self.fast_cli;
        self.fast_cli = false;
        let result = self.run_commit(&request, delay_factor).await;
        self.fast_cli = saved_fast_cli;

        if let Err(e) = &result {
            warn!("{} failed: {}", request.variant(), e);
        }
        result
    }

    async fn run_commit(
        &mut self,
        request: &CommitRequest,
        delay_factor: f64,
    ) -> Result<CommitResult> {
        let mut output = self.enter_config(None, None).await?;

        // The prompt pattern covers both terminators, so it also matches the
        // operational prompt that `and-quit` lands on.
        let command = request.command();
        debug!("sending '{}'", command);
        self.write_line(&command).await?;
        let timeout = self.timeout.mul_f64(delay_factor);
        output.push_str(&self.channel.read_until(&self.prompt_regex, timeout).await?);

        let marker = request.variant().marker();
        if !output.contains(marker) {
            return Err(DriverError::CommitFailed { output }.into());
        }

        if request.and_quit() {
            self.mode = Mode::Operational;
        }

        Ok(CommitResult {
            variant: request.variant(),
            marker,
            output,
        })
    }
}
