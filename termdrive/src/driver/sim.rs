//! Scripted device used by the session tests.
//!
//! Each dialect echoes commands, answers a handful of them, and ends every
//! reply with its current prompt. Writes are recorded so tests can assert on
//! exactly what the session sent.

use std::sync::Arc;
use std::time::Duration;

use regex::Regex;

use super::session::{Session, SessionOptions};
use crate::channel::{Channel, RecordingClock};
use crate::error::{ChannelError, Result};
use crate::platform::PlatformDefinition;

const BANNER: &str = "Press Y or ENTER to continue, N to exit.\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dialect {
    Junos,
    Comware,
    Icos,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Shell,
    Operational,
    Privileged,
    Config,
    ConfirmExit,
    Password,
}

#[derive(Debug)]
pub(crate) struct SimDevice {
    dialect: Dialect,
    state: State,
    pending: String,
    input: String,
    writes: Vec<String>,
    banner_remaining: usize,
    dirty: bool,
    stuck_in_config: bool,
    commit_error: Option<String>,
    rejected: Vec<String>,
    last_password: Option<String>,
    closed: bool,
}

impl SimDevice {
    fn new(dialect: Dialect) -> Self {
        let mut device = Self {
            dialect,
            state: State::Operational,
            pending: String::new(),
            input: String::new(),
            writes: Vec::new(),
            banner_remaining: 0,
            dirty: false,
            stuck_in_config: false,
            commit_error: None,
            rejected: Vec::new(),
            last_password: None,
            closed: false,
        };
        device.pending = format!("Last login: Sat Oct 17 09:12:44 2026{}", device.prompt());
        device
    }

    pub(crate) fn junos() -> Self {
        Self::new(Dialect::Junos)
    }

    pub(crate) fn comware() -> Self {
        Self::new(Dialect::Comware)
    }

    pub(crate) fn icos() -> Self {
        Self::new(Dialect::Icos)
    }

    /// Hold the prompt back until Enter has been pressed `presses` times.
    pub(crate) fn with_banner(mut self, presses: usize) -> Self {
        self.banner_remaining = presses;
        self.pending = format!("\n{}", BANNER);
        self
    }

    /// Start in the JUNOS root shell.
    pub(crate) fn at_shell_prompt(mut self) -> Self {
        self.state = State::Shell;
        self.pending = self.prompt().to_string();
        self
    }

    pub(crate) fn at_config_prompt(mut self) -> Self {
        self.state = State::Config;
        self.pending = self.prompt().to_string();
        self
    }

    pub(crate) fn dirty(mut self) -> Self {
        self.dirty = true;
        self
    }

    pub(crate) fn stuck_in_config(mut self) -> Self {
        self.stuck_in_config = true;
        self
    }

    pub(crate) fn set_stuck_in_config(&mut self, stuck: bool) {
        self.stuck_in_config = stuck;
    }

    /// Make every commit print `error` instead of a success marker.
    pub(crate) fn failing_commits(mut self, error: &str) -> Self {
        self.commit_error = Some(error.to_string());
        self
    }

    /// Answer `command` with an error and leave the state alone.
    pub(crate) fn rejecting(mut self, command: &str) -> Self {
        self.rejected.push(command.to_string());
        self
    }

    /// Every `write` call, verbatim.
    pub(crate) fn writes(&self) -> &[String] {
        &self.writes
    }

    /// Everything written, split into lines without terminators.
    pub(crate) fn lines_written(&self) -> Vec<String> {
        let joined = self.writes.concat();
        let mut lines: Vec<String> = joined
            .split('\n')
            .map(|line| line.trim_end_matches('\r').to_string())
            .collect();
        if joined.ends_with('\n') {
            lines.pop();
        }
        lines
    }

    pub(crate) fn in_config(&self) -> bool {
        self.state == State::Config
    }

    pub(crate) fn in_shell(&self) -> bool {
        self.state == State::Shell
    }

    pub(crate) fn is_privileged(&self) -> bool {
        matches!(self.state, State::Privileged | State::Config) && self.dialect == Dialect::Icos
    }

    pub(crate) fn last_password(&self) -> Option<&str> {
        self.last_password.as_deref()
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed
    }

    fn prompt(&self) -> &'static str {
        match (self.dialect, self.state) {
            (Dialect::Junos, State::Shell) => "\nroot@router:RE:0% ",
            (Dialect::Junos, State::Config) => "\n[edit]\nuser@router# ",
            (Dialect::Junos, _) => "\nuser@router> ",
            (Dialect::Comware, State::Config) => "\n[HPE]",
            (Dialect::Comware, _) => "\n<HPE>",
            (Dialect::Icos, State::Config) => "\n(Switch) (Config)#",
            (Dialect::Icos, State::Privileged) => "\n(Switch) #",
            (Dialect::Icos, _) => "\n(Switch) >",
        }
    }

    fn receive(&mut self, line: &str) {
        if self.banner_remaining > 0 {
            self.banner_remaining -= 1;
            if self.banner_remaining == 0 {
                let prompt = self.prompt();
                self.pending.push_str(prompt);
            } else {
                self.pending.push_str(BANNER);
            }
            return;
        }

        if self.state == State::Password {
            self.last_password = Some(line.to_string());
            self.state = State::Privileged;
            let prompt = self.prompt();
            self.pending.push_str(prompt);
            return;
        }

        if line.is_empty() && self.state != State::ConfirmExit {
            let prompt = self.prompt();
            self.pending.push_str(prompt);
            return;
        }

        self.pending.push_str(line);
        self.pending.push('\n');

        if self.rejected.iter().any(|r| r == line) {
            self.pending.push_str("error: command rejected\n");
            let prompt = self.prompt();
            self.pending.push_str(prompt);
            return;
        }

        let reply = match self.dialect {
            Dialect::Junos => self.reply_junos(line),
            Dialect::Comware => self.reply_comware(line),
            Dialect::Icos => self.reply_icos(line),
        };
        self.pending.push_str(&reply);
    }

    fn leave_config(&mut self, to: State) {
        if !self.stuck_in_config {
            self.state = to;
        }
    }

    fn reply_junos(&mut self, line: &str) -> String {
        let body = match (self.state, line) {
            (State::Shell, "cli") => {
                self.state = State::Operational;
                String::new()
            }
            (State::Shell, _) => format!("sh: {}: not found\n", line),
            (State::ConfirmExit, "no") => {
                self.state = State::Config;
                String::new()
            }
            (State::ConfirmExit, _) => {
                self.state = State::Config;
                self.leave_config(State::Operational);
                "Exiting configuration mode\n".to_string()
            }
            (State::Operational, "configure") => {
                self.state = State::Config;
                "Entering configuration mode\n".to_string()
            }
            (State::Operational, "show version") => {
                "Hostname: router\nModel: mx960\nJunos: 21.4R3-S1\n".to_string()
            }
            (_, "set cli screen-width 511") => "Screen width set to 511\n".to_string(),
            (_, "set cli complete-on-space off") => "Disabling complete-on-space\n".to_string(),
            (_, "set cli screen-length 0") => "Screen length set to 0\n".to_string(),
            (State::Config, "exit configuration-mode") | (State::Config, "exit") => {
                if self.dirty && !self.stuck_in_config {
                    self.state = State::ConfirmExit;
                    return "The configuration has been changed but not committed\n\
                            Exit with uncommitted changes? [yes,no] (yes) "
                        .to_string();
                }
                self.leave_config(State::Operational);
                if self.state == State::Config {
                    String::new()
                } else {
                    "Exiting configuration mode\n".to_string()
                }
            }
            (State::Config, "show system host-name") => "host-name router;\n".to_string(),
            (State::Config, cmd) if cmd.starts_with("set ") || cmd.starts_with("delete ") => {
                self.dirty = true;
                String::new()
            }
            (State::Config, cmd) if cmd.starts_with("commit") => self.reply_junos_commit(cmd),
            _ => "                  ^\nunknown command.\n".to_string(),
        };
        format!("{}{}", body, self.prompt())
    }

    fn reply_junos_commit(&mut self, cmd: &str) -> String {
        if let Some(error) = &self.commit_error {
            return format!("{}\nerror: commit failed: (statements constraint check failed)\n", error);
        }

        let mut body = String::new();
        if cmd.starts_with("commit check") {
            body.push_str("configuration check succeeds\n");
        } else if cmd.starts_with("commit confirmed") {
            let minutes = cmd
                .split_whitespace()
                .nth(2)
                .and_then(|n| n.parse::<u32>().ok())
                .unwrap_or(10);
            body.push_str(&format!(
                "configuration check succeeds\n\
                 commit confirmed will be automatically rolled back in {} minutes unless confirmed\n\
                 commit complete\n",
                minutes
            ));
            self.dirty = false;
        } else {
            body.push_str("commit complete\n");
            self.dirty = false;
        }

        if cmd.ends_with("and-quit") {
            self.leave_config(State::Operational);
            body.push_str("Exiting configuration mode\n");
        }
        body
    }

    fn reply_comware(&mut self, line: &str) -> String {
        let body = match (self.state, line) {
            (State::Operational, "system-view") => {
                self.state = State::Config;
                "System View: return to User View with Ctrl+Z.\n".to_string()
            }
            (State::Config, "return") | (State::Config, "quit") => {
                self.leave_config(State::Operational);
                String::new()
            }
            (State::Config, cmd) if cmd.starts_with("sysname ") || cmd.starts_with("undo ") => {
                String::new()
            }
            (_, "screen-length disable") => String::new(),
            (_, "display version") => "HPE Comware Software, Version 7.1.070\n".to_string(),
            (_, "save force") => "Validating file. Please wait...\n\
                                  Saved the current configuration to mainboard device successfully.\n"
                .to_string(),
            _ => "              ^\n % Unrecognized command found at '^' position.\n".to_string(),
        };
        format!("{}{}", body, self.prompt())
    }

    fn reply_icos(&mut self, line: &str) -> String {
        let body = match (self.state, line) {
            (State::Operational, "enable") => {
                self.state = State::Password;
                return "Password:".to_string();
            }
            (State::Privileged, "configure") => {
                self.state = State::Config;
                String::new()
            }
            (State::Config, "exit") => {
                self.leave_config(State::Privileged);
                String::new()
            }
            (State::Privileged, "exit") => {
                self.state = State::Operational;
                String::new()
            }
            (_, "terminal width 511") | (_, "terminal length 0") => String::new(),
            (State::Privileged, "write memory") => "This operation may take a few minutes.\n\
                                                    Configuration Saved!\n"
                .to_string(),
            _ => "\n% Invalid input detected at '^' marker.\n".to_string(),
        };
        format!("{}{}", body, self.prompt())
    }
}

impl Channel for SimDevice {
    async fn write(&mut self, data: &str) -> Result<()> {
        if self.closed {
            return Err(ChannelError::Closed.into());
        }
        self.writes.push(data.to_string());
        self.input.push_str(data);
        while let Some(pos) = self.input.find('\n') {
            let line: String = self.input.drain(..=pos).collect();
            let line = line.trim_end_matches(['\r', '\n']).to_string();
            self.receive(&line);
        }
        Ok(())
    }

    async fn read_nonblocking(&mut self) -> Result<String> {
        Ok(std::mem::take(&mut self.pending))
    }

    async fn read_until(&mut self, pattern: &Regex, timeout: Duration) -> Result<String> {
        match pattern.find(&self.pending) {
            Some(m) => {
                let rest = self.pending.split_off(m.end());
                Ok(std::mem::replace(&mut self.pending, rest))
            }
            None => Err(ChannelError::PatternTimeout {
                pattern: pattern.as_str().to_string(),
                timeout,
                output: std::mem::take(&mut self.pending),
            }
            .into()),
        }
    }

    async fn clear_buffer(&mut self) -> Result<String> {
        Ok(std::mem::take(&mut self.pending))
    }

    async fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}

/// Session over `device` with a clock that never waits.
pub(crate) fn session_for(device: SimDevice, platform: PlatformDefinition) -> Session<SimDevice> {
    let _ = env_logger::builder().is_test(true).try_init();
    Session::new(device, platform, SessionOptions::default())
        .expect("default options are valid")
        .with_clock(Arc::new(RecordingClock::new()))
}

/// Primed session over `device`.
pub(crate) async fn primed(device: SimDevice, platform: PlatformDefinition) -> Session<SimDevice> {
    let mut session = session_for(device, platform);
    session.prime().await.expect("priming the simulated device");
    session
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_echo_and_prompt() {
        let mut device = SimDevice::junos();
        device.clear_buffer().await.unwrap();
        device.write("show version\n").await.unwrap();
        let output = device.read_nonblocking().await.unwrap();
        assert!(output.starts_with("show version\nHostname: router"));
        assert!(output.ends_with("\nuser@router> "));
    }

    #[tokio::test]
    async fn test_read_until_keeps_remainder() {
        let mut device = SimDevice::junos();
        device.clear_buffer().await.unwrap();
        device.write("configure\n").await.unwrap();
        let first = device
            .read_until(&Regex::new("Entering configuration mode").unwrap(), Duration::ZERO)
            .await
            .unwrap();
        assert_eq!(first, "configure\nEntering configuration mode");
        assert_eq!(device.read_nonblocking().await.unwrap(), "\n\n[edit]\nuser@router# ");
    }

    #[test]
    fn test_lines_written() {
        let mut device = SimDevice::comware();
        device.writes = vec!["\n".into(), "return\r\n".into(), "a".into()];
        assert_eq!(device.lines_written(), vec!["", "return", "a"]);
    }
}
