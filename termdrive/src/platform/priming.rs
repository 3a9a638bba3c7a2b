//! Session priming recipe: what a dialect needs right after connect.

use std::time::Duration;

/// A command sent while priming, with the text that confirms it took effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupCommand {
    pub command: String,

    /// Pattern confirming the command. `None` waits for the prompt.
    pub verify_pattern: Option<String>,
}

impl SetupCommand {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            verify_pattern: None,
        }
    }

    /// Verify the command with `pattern` instead of the prompt.
    pub fn verified_by(mut self, pattern: impl Into<String>) -> Self {
        self.verify_pattern = Some(pattern.into());
        self
    }
}

/// Escape from a Unix shell into the device CLI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellEscape {
    /// Pattern identifying a shell prompt.
    pub pattern: String,
    /// Command that starts the CLI from the shell.
    pub command: String,
}

/// Per-vendor priming recipe.
///
/// Delays are in base units; the session scales them by its delay factor.
#[derive(Debug, Clone)]
pub struct PrimingSpec {
    /// How many line terminators to send to get through login banners.
    pub banner_keystrokes: u32,

    /// Pause before each banner keystroke.
    pub keystroke_interval: Duration,

    /// Stop sending banner keystrokes once a prompt character shows up.
    pub stop_on_prompt: bool,

    /// Shell prompt detection and escape, for devices that can log in to a shell.
    pub shell_escape: Option<ShellEscape>,

    /// Pause before output is discarded as noise.
    pub settle: Duration,

    /// Enter the privileged tier after detecting the prompt.
    pub escalate: bool,

    /// Terminal width and paging commands.
    pub setup_commands: Vec<SetupCommand>,
}

impl Default for PrimingSpec {
    fn default() -> Self {
        Self {
            banner_keystrokes: 0,
            keystroke_interval: Duration::from_millis(100),
            stop_on_prompt: false,
            shell_escape: None,
            settle: Duration::from_millis(300),
            escalate: false,
            setup_commands: Vec::new(),
        }
    }
}

impl PrimingSpec {
    /// Send `count` keystrokes, `interval` apart, to absorb banners.
    pub fn with_banner_keystrokes(mut self, count: u32, interval: Duration) -> Self {
        self.banner_keystrokes = count;
        self.keystroke_interval = interval;
        self
    }

    /// Stop the keystroke loop as soon as a prompt shows up.
    pub fn stop_on_prompt(mut self) -> Self {
        self.stop_on_prompt = true;
        self
    }

    /// Set the shell escape.
    pub fn with_shell_escape(
        mut self,
        pattern: impl Into<String>,
        command: impl Into<String>,
    ) -> Self {
        self.shell_escape = Some(ShellEscape {
            pattern: pattern.into(),
            command: command.into(),
        });
        self
    }

    /// Set the settle delay.
    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    /// Enter the privileged tier while priming.
    pub fn with_escalation(mut self) -> Self {
        self.escalate = true;
        self
    }

    /// Add a setup command.
    pub fn with_setup_command(mut self, command: SetupCommand) -> Self {
        self.setup_commands.push(command);
        self
    }
}
