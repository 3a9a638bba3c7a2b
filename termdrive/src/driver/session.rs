//! The session: one live CLI connection and its mode state.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::future::BoxFuture;
use log::{debug, trace, warn};
use regex::Regex;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use super::response::Response;
use super::sanitize;
use crate::channel::patterns::base_prompt_pattern;
use crate::channel::{Channel, Clock, TokioClock};
use crate::error::{DriverError, Result};
use crate::platform::PlatformDefinition;

/// Pause between polls of a timing read.
const TIMING_POLL: Duration = Duration::from_millis(100);

/// Extra wait confirming that output has really stopped.
const TIMING_QUIET: Duration = Duration::from_millis(200);

/// Upper bound on polls in one timing read.
const MAX_TIMING_POLLS: u32 = 150;

/// CLI mode the session believes the device is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Default command state.
    #[default]
    Operational,
    /// Accepting configuration changes.
    Config,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Operational => write!(f, "operational"),
            Mode::Config => write!(f, "configuration"),
        }
    }
}

/// Tunable session knobs.
///
/// Deserializable so the values can come from a config file; every field
/// has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionOptions {
    /// Multiplier applied to every delay and timeout. Must be positive.
    pub delay_factor: f64,

    /// Fast mode. `None` uses the platform default.
    pub fast_cli: Option<bool>,

    /// Base timeout for pattern waits, before delay scaling.
    pub timeout: Duration,

    /// Line terminator override. `None` uses the platform default.
    pub line_terminator: Option<String>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            delay_factor: 1.0,
            fast_cli: None,
            timeout: Duration::from_secs(30),
            line_terminator: None,
        }
    }
}

/// A live CLI session over a [`Channel`].
///
/// Every operation takes `&mut self`, so one session only ever has one
/// command in flight. Use [`SharedSession`](super::SharedSession) to hand a
/// session to several tasks.
pub struct Session<C> {
    pub(super) channel: C,
    pub(super) platform: PlatformDefinition,
    pub(super) clock: Arc<dyn Clock>,
    pub(super) base_prompt: String,
    pub(super) prompt_regex: Regex,
    pub(super) mode: Mode,
    pub(super) delay_factor: f64,
    pub(super) fast_cli: bool,
    pub(super) timeout: Duration,
    pub(super) line_terminator: String,
    pub(super) secret: Option<SecretString>,
    pub(super) open: bool,
}

impl<C: Channel> Session<C> {
    /// Wrap an already connected channel.
    ///
    /// No I/O happens here; call [`prime`](Session::prime) before issuing
    /// commands.
    pub fn new(channel: C, platform: PlatformDefinition, options: SessionOptions) -> Result<Self> {
        if !(options.delay_factor.is_finite() && options.delay_factor > 0.0) {
            return Err(DriverError::InvalidConfig {
                message: format!(
                    "delay factor must be positive, got {}",
                    options.delay_factor
                ),
            }
            .into());
        }

        let fast_cli = options.fast_cli.unwrap_or(platform.fast_cli);
        let line_terminator = options
            .line_terminator
            .unwrap_or_else(|| platform.line_terminator.clone());
        let prompt_regex = platform.prompt_pattern.clone();

        Ok(Self {
            channel,
            platform,
            clock: Arc::new(TokioClock),
            base_prompt: String::new(),
            prompt_regex,
            mode: Mode::Operational,
            delay_factor: options.delay_factor,
            fast_cli,
            timeout: options.timeout,
            line_terminator,
            secret: None,
            open: true,
        })
    }

    /// Replace the clock used for paced polling.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Set the secret sent when the privileged tier asks for a password.
    pub fn with_secret(mut self, secret: SecretString) -> Self {
        self.secret = Some(secret);
        self
    }

    /// Current base prompt (empty before priming).
    pub fn base_prompt(&self) -> &str {
        &self.base_prompt
    }

    /// Pattern matching the trailing prompt.
    pub fn prompt_pattern(&self) -> &Regex {
        &self.prompt_regex
    }

    /// Mode as last observed or transitioned to.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn platform(&self) -> &PlatformDefinition {
        &self.platform
    }

    pub fn delay_factor(&self) -> f64 {
        self.delay_factor
    }

    /// Change the global delay factor. Non-positive values are ignored.
    pub fn set_delay_factor(&mut self, delay_factor: f64) {
        if delay_factor.is_finite() && delay_factor > 0.0 {
            self.delay_factor = delay_factor;
        } else {
            warn!("ignoring invalid delay factor {}", delay_factor);
        }
    }

    pub fn fast_cli(&self) -> bool {
        self.fast_cli
    }

    pub fn set_fast_cli(&mut self, fast_cli: bool) {
        self.fast_cli = fast_cli;
    }

    /// Base timeout before delay scaling.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn line_terminator(&self) -> &str {
        &self.line_terminator
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Borrow the underlying channel.
    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// Mutably borrow the underlying channel.
    pub fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    /// Pick the delay factor for one call.
    ///
    /// In fast mode a smaller requested factor wins over the global one;
    /// otherwise the larger of the two wins.
    pub fn select_delay_factor(&self, requested: f64) -> f64 {
        if self.fast_cli {
            if requested > 0.0 && requested <= self.delay_factor {
                requested
            } else {
                self.delay_factor
            }
        } else if requested >= self.delay_factor {
            requested
        } else {
            self.delay_factor
        }
    }

    /// Timeout for a pattern wait at the default per-call delay factor.
    pub(super) fn wait_timeout(&self) -> Duration {
        self.timeout.mul_f64(self.select_delay_factor(1.0))
    }

    /// Sleep for `base` scaled by the global delay factor.
    pub(super) fn pause(&self, base: Duration) -> BoxFuture<'static, ()> {
        self.clock.sleep(base.mul_f64(self.delay_factor))
    }

    pub(super) fn ensure_open(&self) -> Result<()> {
        if self.open {
            Ok(())
        } else {
            Err(DriverError::NotConnected.into())
        }
    }

    /// Write `text` followed by the line terminator.
    pub(super) async fn write_line(&mut self, text: &str) -> Result<()> {
        trace!("write: {:?}", text);
        let line = format!("{}{}", text, self.line_terminator);
        self.channel.write(&line).await
    }

    /// Wait for the trailing prompt.
    pub(super) async fn read_until_prompt(&mut self) -> Result<String> {
        let timeout = self.wait_timeout();
        let output = self.channel.read_until(&self.prompt_regex, timeout).await?;
        trace!("read: {:?}", output);
        Ok(output)
    }

    /// Store a new base prompt and rebuild the prompt pattern around it.
    pub(super) fn set_base_prompt(&mut self, base_prompt: &str) -> Result<()> {
        self.prompt_regex = base_prompt_pattern(base_prompt, &self.platform.prompt_terminators)?;
        self.base_prompt = base_prompt.to_string();
        debug!("base prompt set to {:?}", self.base_prompt);
        Ok(())
    }

    /// Send a command and collect output until the device goes quiet.
    ///
    /// For commands whose reply does not end in a recognizable prompt
    /// (questions, confirmations).
    pub async fn send_command_timing(&mut self, command: &str) -> Result<String> {
        self.ensure_open()?;
        self.write_line(command).await?;

        let factor = self.select_delay_factor(1.0);
        let mut output = String::new();

        for _ in 0..MAX_TIMING_POLLS {
            self.clock.sleep(TIMING_POLL.mul_f64(factor)).await;
            let chunk = self.channel.read_nonblocking().await?;
            if !chunk.is_empty() {
                output.push_str(&chunk);
                continue;
            }
            if output.is_empty() {
                continue;
            }

            self.clock.sleep(TIMING_QUIET.mul_f64(factor)).await;
            let chunk = self.channel.read_nonblocking().await?;
            if chunk.is_empty() {
                break;
            }
            output.push_str(&chunk);
        }

        trace!("timing read: {:?}", output);
        Ok(output)
    }

    /// Send a command and wait for `expect` (or the prompt).
    ///
    /// The result has the command echo and trailing prompt removed and is
    /// sanitized; the raw text is kept alongside.
    pub async fn send_command(&mut self, command: &str, expect: Option<&str>) -> Result<Response> {
        self.ensure_open()?;
        let start = Instant::now();

        let pattern = match expect {
            Some(p) => Regex::new(p)?,
            None => self.prompt_regex.clone(),
        };

        self.write_line(command).await?;
        let timeout = self.wait_timeout();
        let raw_result = self.channel.read_until(&pattern, timeout).await?;
        let elapsed = start.elapsed();

        let prompt = raw_result
            .lines()
            .last()
            .filter(|line| self.prompt_regex.is_match(line))
            .map(|line| line.trim().to_string())
            .unwrap_or_default();

        let result = self.normalize_output(&raw_result, command);

        if let Some(failure) = self
            .platform
            .failed_when_contains
            .iter()
            .find(|pattern| result.contains(pattern.as_str()))
        {
            return Ok(Response::failed(
                command,
                result.clone(),
                raw_result,
                prompt,
                elapsed,
                failure.clone(),
            ));
        }

        Ok(Response::new(command, result, raw_result, prompt, elapsed))
    }

    /// Strip echo and prompt, then drop trailing context annotations.
    fn normalize_output(&self, raw: &str, command: &str) -> String {
        let output = sanitize::strip_command_echo(raw, command);
        let output = sanitize::strip_trailing_prompt(output, &self.prompt_regex);
        self.sanitize(output).trim_end().to_string()
    }

    /// Remove a trailing context annotation line (e.g. `[edit]`).
    pub fn sanitize(&self, output: &str) -> String {
        sanitize::sanitize(output, &self.platform.context_patterns)
    }

    /// Persist the running configuration.
    pub async fn save_config(&mut self) -> Result<Response> {
        let command = self.platform.save_command.clone().ok_or_else(|| {
            DriverError::Unsupported {
                platform: self.platform.name.clone(),
                operation: "save_config".to_string(),
            }
        })?;
        self.send_command(&command, None).await
    }

    /// Tear the session down.
    ///
    /// Leaving config mode is attempted but its failure is only logged; the
    /// exit command is sent and the channel closed regardless.
    pub async fn close(&mut self) -> Result<()> {
        if !self.open {
            return Ok(());
        }

        if let Err(e) = self.exit_config(None).await {
            warn!("failed to leave config mode during close: {}", e);
        }

        let close_command = self.platform.close_command.clone();
        if let Err(e) = self.write_line(&close_command).await {
            warn!("failed to send '{}' during close: {}", close_command, e);
        }

        self.open = false;
        debug!("closing {} session", self.platform.name);
        self.channel.close().await
    }
}

impl<C> fmt::Debug for Session<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("platform", &self.platform.name)
            .field("base_prompt", &self.base_prompt)
            .field("mode", &self.mode)
            .field("delay_factor", &self.delay_factor)
            .field("fast_cli", &self.fast_cli)
            .field("timeout", &self.timeout)
            .field("open", &self.open)
            .finish()
    }
}
