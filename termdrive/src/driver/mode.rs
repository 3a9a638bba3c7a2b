//! Mode state machine: config mode and the privileged tier.
//!
//! ```text
//!   OPERATIONAL --enter_config--> CONFIG
//!   CONFIG --exit_config--> OPERATIONAL
//!   CONFIG --commit(and_quit)--> OPERATIONAL
//! ```
//!
//! The prompt is the only signal of the current mode. Every transition is
//! confirmed by reading a fresh prompt and looking for the platform's check
//! string.

use log::{debug, trace};
use regex::Regex;
use secrecy::ExposeSecret;

use super::session::{Mode, Session};
use crate::channel::Channel;
use crate::error::{DriverError, Result};
use crate::platform::PrivilegeTier;

impl<C: Channel> Session<C> {
    /// Send an empty line and return the fresh prompt output.
    async fn probe_prompt(&mut self) -> Result<String> {
        self.write_line("").await?;
        self.read_until_prompt().await
    }

    /// Whether the device is in config mode right now.
    ///
    /// `check_string` overrides the platform's marker for this call.
    pub async fn check_config_mode(&mut self, check_string: Option<&str>) -> Result<bool> {
        self.ensure_open()?;
        let check = check_string
            .unwrap_or(&self.platform.mode.check_string)
            .to_string();

        let output = self.probe_prompt().await?;
        let in_config = output.contains(&check);
        trace!("config check {:?} in {:?}: {}", check, output, in_config);

        self.mode = if in_config {
            Mode::Config
        } else {
            Mode::Operational
        };
        Ok(in_config)
    }

    /// Enter config mode.
    ///
    /// A no-op returning empty output when already there. `command` and
    /// `pattern` override the platform defaults; an empty pattern means
    /// "wait for the prompt".
    pub async fn enter_config(
        &mut self,
        command: Option<&str>,
        pattern: Option<&str>,
    ) -> Result<String> {
        if self.check_config_mode(None).await? {
            return Ok(String::new());
        }

        let command = command
            .unwrap_or(&self.platform.mode.enter_command)
            .to_string();
        let pattern = pattern
            .map(str::to_string)
            .or_else(|| self.platform.mode.enter_pattern.clone())
            .filter(|p| !p.is_empty());

        debug!("entering config mode with '{}'", command);
        self.write_line(&command).await?;

        let mut output = match &pattern {
            Some(p) => {
                let re = Regex::new(p)?;
                let timeout = self.wait_timeout();
                self.channel.read_until(&re, timeout).await?
            }
            None => self.read_until_prompt().await?,
        };
        if pattern.is_some() && !self.prompt_regex.is_match(&output) {
            output.push_str(&self.read_until_prompt().await?);
        }

        if !self.check_config_mode(None).await? {
            return Err(DriverError::ModeTransition {
                target: "enter configuration mode".to_string(),
                output,
            }
            .into());
        }

        Ok(output)
    }

    /// Leave config mode.
    ///
    /// A no-op returning empty output when not in config mode. If the
    /// device asks about uncommitted changes the platform's reply is sent
    /// exactly once.
    pub async fn exit_config(&mut self, command: Option<&str>) -> Result<String> {
        if !self.check_config_mode(None).await? {
            return Ok(String::new());
        }

        let command = command
            .unwrap_or(&self.platform.mode.exit_command)
            .to_string();
        debug!("leaving config mode with '{}'", command);

        let mut output = match self.platform.mode.exit_pattern.clone() {
            Some(p) => {
                let re = Regex::new(&p)?;
                self.write_line(&command).await?;
                let timeout = self.wait_timeout();
                self.channel.read_until(&re, timeout).await?
            }
            None => self.send_command_timing(&command).await?,
        };

        if let Some(question) = self.platform.mode.uncommitted_prompt.clone() {
            if output.contains(&question) {
                let reply = self.platform.mode.uncommitted_reply.clone();
                debug!("answering uncommitted changes question with '{}'", reply);
                output.push_str(&self.send_command_timing(&reply).await?);
            }
        }

        if self.check_config_mode(None).await? {
            return Err(DriverError::ModeTransition {
                target: "exit configuration mode".to_string(),
                output,
            }
            .into());
        }

        Ok(output)
    }

    /// Whether the device is in the privileged tier.
    ///
    /// Platforms without a tier report `true`: there is nothing above the
    /// current level to reach. Platforms that alias the tier to config mode
    /// report whether config mode is active.
    pub async fn check_enable_mode(&mut self) -> Result<bool> {
        self.ensure_open()?;
        match self.platform.mode.privilege.clone() {
            PrivilegeTier::Separate { check_string, .. } => {
                let output = self.probe_prompt().await?;
                Ok(output.contains(&check_string))
            }
            PrivilegeTier::AliasConfig => self.check_config_mode(None).await,
            PrivilegeTier::Absent => Ok(true),
        }
    }

    /// Enter the privileged tier, answering a password prompt with the
    /// session secret if one is asked.
    pub async fn enable(&mut self) -> Result<String> {
        self.ensure_open()?;
        let (enable_command, password_pattern) = match self.platform.mode.privilege.clone() {
            PrivilegeTier::Separate {
                enable_command,
                password_pattern,
                ..
            } => (enable_command, password_pattern),
            PrivilegeTier::AliasConfig => return self.enter_config(None, None).await,
            PrivilegeTier::Absent => return Ok(String::new()),
        };

        if self.check_enable_mode().await? {
            return Ok(String::new());
        }

        debug!("entering privileged mode with '{}'", enable_command);
        self.write_line(&enable_command).await?;

        let password = Regex::new(&password_pattern)?;
        let either = Regex::new(&format!(
            "(?:{})|(?:{})",
            password_pattern,
            self.prompt_regex.as_str()
        ))?;
        let timeout = self.wait_timeout();
        let mut output = self.channel.read_until(&either, timeout).await?;

        if password.is_match(&output) {
            let secret = self
                .secret
                .as_ref()
                .map(|s| s.expose_secret().to_string())
                .unwrap_or_default();
            // Written directly so the secret never reaches the write trace.
            let line = format!("{}{}", secret, self.line_terminator);
            self.channel.write(&line).await?;
            output.push_str(&self.read_until_prompt().await?);
        }

        if !self.check_enable_mode().await? {
            return Err(DriverError::ModeTransition {
                target: "enter privileged mode".to_string(),
                output,
            }
            .into());
        }

        Ok(output)
    }

    /// Leave the privileged tier.
    pub async fn exit_enable_mode(&mut self) -> Result<String> {
        self.ensure_open()?;
        let exit_command = match self.platform.mode.privilege.clone() {
            PrivilegeTier::Separate { exit_command, .. } => exit_command,
            PrivilegeTier::AliasConfig => return self.exit_config(None).await,
            PrivilegeTier::Absent => return Ok(String::new()),
        };

        if !self.check_enable_mode().await? {
            return Ok(String::new());
        }

        debug!("leaving privileged mode with '{}'", exit_command);
        self.write_line(&exit_command).await?;
        let output = self.read_until_prompt().await?;

        if self.check_enable_mode().await? {
            return Err(DriverError::ModeTransition {
                target: "exit privileged mode".to_string(),
                output,
            }
            .into());
        }

        Ok(output)
    }
}
