//! Platform definition for vendor-specific configurations.

use regex::Regex;

use super::mode_spec::ModeSpec;
use super::priming::PrimingSpec;
use crate::channel::patterns::compile_prompt_pattern;
use crate::error::{PlatformError, Result};

/// Platform definition containing all vendor-specific configuration.
///
/// A session is fully described by one of these: how to prime it, how to
/// move in and out of config mode, how to recognize prompts, and which
/// trailing annotations to strip from output.
#[derive(Debug, Clone)]
pub struct PlatformDefinition {
    /// Platform name (e.g., "juniper_junos", "hp_comware").
    pub name: String,

    /// Prompt shape used before the base prompt is known.
    pub prompt_pattern: Regex,

    /// Characters that may surround the base prompt (e.g. `<>[]`).
    pub prompt_terminators: String,

    /// Config mode transitions.
    pub mode: ModeSpec,

    /// End of a reply to a configuration line (the config prompt's tail).
    pub config_terminator: Regex,

    /// Startup recipe.
    pub priming: PrimingSpec,

    /// Trailing context lines stripped from output (e.g. `[edit]`).
    pub context_patterns: Vec<Regex>,

    /// Patterns that indicate command failure.
    pub failed_when_contains: Vec<String>,

    /// Command that persists the running configuration, if any.
    pub save_command: Option<String>,

    /// Whether the platform stages changes and needs an explicit commit.
    pub has_commit: bool,

    /// Default for the session's fast mode flag.
    pub fast_cli: bool,

    /// Line terminator sent after each command.
    pub line_terminator: String,

    /// Command sent last when the session is closed.
    pub close_command: String,
}

impl PlatformDefinition {
    /// Create a new platform definition with minimal required fields.
    pub fn new(name: impl Into<String>, prompt_pattern: &str, mode: ModeSpec) -> Result<Self> {
        let name = name.into();
        let prompt_pattern =
            compile_prompt_pattern(prompt_pattern).map_err(|e| PlatformError::InvalidDefinition {
                message: format!("platform '{}': bad prompt pattern: {}", name, e),
            })?;
        let config_terminator = compile_prompt_pattern("#").map_err(|e| {
            PlatformError::InvalidDefinition {
                message: format!("platform '{}': bad config terminator: {}", name, e),
            }
        })?;

        Ok(Self {
            name,
            prompt_pattern,
            prompt_terminators: "#>".to_string(),
            mode,
            config_terminator,
            priming: PrimingSpec::default(),
            context_patterns: vec![],
            failed_when_contains: vec![],
            save_command: None,
            has_commit: false,
            fast_cli: false,
            line_terminator: "\n".to_string(),
            close_command: "exit".to_string(),
        })
    }

    /// Set the prompt terminator characters.
    pub fn with_prompt_terminators(mut self, terminators: impl Into<String>) -> Self {
        self.prompt_terminators = terminators.into();
        self
    }

    /// Set the pattern that ends each reply in [`send_config_set`].
    ///
    /// Anchored to the end of output like a prompt pattern.
    ///
    /// [`send_config_set`]: crate::Session::send_config_set
    pub fn with_config_terminator(mut self, pattern: &str) -> Result<Self> {
        self.config_terminator =
            compile_prompt_pattern(pattern).map_err(|e| PlatformError::InvalidDefinition {
                message: format!("platform '{}': bad config terminator: {}", self.name, e),
            })?;
        Ok(self)
    }

    /// Set the priming recipe.
    pub fn with_priming(mut self, priming: PrimingSpec) -> Self {
        self.priming = priming;
        self
    }

    /// Add a trailing context annotation pattern.
    pub fn with_context_pattern(mut self, pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|e| PlatformError::InvalidDefinition {
            message: format!("platform '{}': bad context pattern: {}", self.name, e),
        })?;
        self.context_patterns.push(regex);
        Ok(self)
    }

    /// Add a failure pattern.
    pub fn with_failure_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.failed_when_contains.push(pattern.into());
        self
    }

    /// Set the save-config command.
    pub fn with_save_command(mut self, command: impl Into<String>) -> Self {
        self.save_command = Some(command.into());
        self
    }

    /// Mark the platform as having a commit protocol.
    pub fn with_commit(mut self) -> Self {
        self.has_commit = true;
        self
    }

    /// Set the default fast mode flag.
    pub fn with_fast_cli(mut self, fast_cli: bool) -> Self {
        self.fast_cli = fast_cli;
        self
    }

    /// Set the line terminator.
    pub fn with_line_terminator(mut self, terminator: impl Into<String>) -> Self {
        self.line_terminator = terminator.into();
        self
    }

    /// Rename the platform (used for transport variants of one dialect).
    pub fn renamed(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definition_defaults() {
        let platform =
            PlatformDefinition::new("test", r"[>#]\s*$", ModeSpec::new("conf", "end", ")#"))
                .unwrap();
        assert_eq!(platform.line_terminator, "\n");
        assert_eq!(platform.close_command, "exit");
        assert!(!platform.has_commit);
        assert!(platform.prompt_pattern.is_match("router# "));
        assert!(platform.config_terminator.is_match("[edit]\nuser@router# "));
        assert!(!platform.config_terminator.is_match("set snmp community #1\nmore"));
    }

    #[test]
    fn test_invalid_patterns_rejected() {
        let err = PlatformDefinition::new("bad", r"[>#", ModeSpec::new("conf", "end", ")#"))
            .unwrap_err();
        assert!(matches!(
            err,
            crate::Error::Platform(PlatformError::InvalidDefinition { .. })
        ));

        let platform =
            PlatformDefinition::new("ok", r"#$", ModeSpec::new("conf", "end", ")#")).unwrap();
        assert!(platform.clone().with_context_pattern(r"(\{master").is_err());
        assert!(platform.with_config_terminator(r"[\]").is_err());
    }
}
