//! Mode transition spec: how a dialect moves between operational and config mode.

/// How a dialect handles the privileged ("enable") tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrivilegeTier {
    /// A distinct privileged tier between operational and config mode.
    Separate {
        /// Command that enters the tier (e.g. `enable`).
        enable_command: String,
        /// Pattern of the password prompt the tier may ask for.
        password_pattern: String,
        /// Substring present in the prompt while in the tier.
        check_string: String,
        /// Command that leaves the tier.
        exit_command: String,
    },

    /// No separate tier; enable operations act on config mode instead.
    AliasConfig,

    /// No separate tier; enable operations do nothing.
    Absent,
}

/// Immutable per-vendor description of the config mode transitions.
///
/// One value is injected into the generic session; everything that differs
/// between dialects for entering, leaving and detecting config mode lives here.
#[derive(Debug, Clone)]
pub struct ModeSpec {
    /// Command that enters config mode.
    pub enter_command: String,

    /// Pattern confirming the transition. `None` waits for the prompt.
    pub enter_pattern: Option<String>,

    /// Command that leaves config mode.
    pub exit_command: String,

    /// Pattern confirming the exit. `None` collects output by timing.
    pub exit_pattern: Option<String>,

    /// Substring present in the prompt area only while in config mode.
    pub check_string: String,

    /// Question asked when leaving with uncommitted changes.
    pub uncommitted_prompt: Option<String>,

    /// Answer sent (once) to the uncommitted-changes question.
    pub uncommitted_reply: String,

    /// Privileged tier handling.
    pub privilege: PrivilegeTier,
}

impl ModeSpec {
    /// Create a spec from the enter/exit commands and the check string.
    pub fn new(
        enter_command: impl Into<String>,
        exit_command: impl Into<String>,
        check_string: impl Into<String>,
    ) -> Self {
        Self {
            enter_command: enter_command.into(),
            enter_pattern: None,
            exit_command: exit_command.into(),
            exit_pattern: None,
            check_string: check_string.into(),
            uncommitted_prompt: None,
            uncommitted_reply: "yes".to_string(),
            privilege: PrivilegeTier::Absent,
        }
    }

    /// Set the pattern that confirms entering config mode.
    pub fn with_enter_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.enter_pattern = Some(pattern.into());
        self
    }

    /// Set the pattern that confirms leaving config mode.
    pub fn with_exit_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.exit_pattern = Some(pattern.into());
        self
    }

    /// Set the uncommitted-changes question answered on exit.
    pub fn with_uncommitted_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.uncommitted_prompt = Some(prompt.into());
        self
    }

    /// Set the privileged tier handling.
    pub fn with_privilege(mut self, privilege: PrivilegeTier) -> Self {
        self.privilege = privilege;
        self
    }

    pub fn has_separate_privilege_tier(&self) -> bool {
        matches!(self.privilege, PrivilegeTier::Separate { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_spec_defaults() {
        let spec = ModeSpec::new("configure", "exit", ")#");
        assert_eq!(spec.enter_pattern, None);
        assert_eq!(spec.exit_pattern, None);
        assert_eq!(spec.uncommitted_reply, "yes");
        assert_eq!(spec.privilege, PrivilegeTier::Absent);
        assert!(!spec.has_separate_privilege_tier());
    }

    #[test]
    fn test_separate_privilege_tier() {
        let spec = ModeSpec::new("configure", "exit", ")#").with_privilege(
            PrivilegeTier::Separate {
                enable_command: "enable".to_string(),
                password_pattern: "ssword".to_string(),
                check_string: "#".to_string(),
                exit_command: "exit".to_string(),
            },
        );
        assert!(spec.has_separate_privilege_tier());

        let aliased = spec.with_privilege(PrivilegeTier::AliasConfig);
        assert!(!aliased.has_separate_privilege_tier());
    }
}
