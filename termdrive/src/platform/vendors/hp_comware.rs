//! HP Comware platform definition.
//!
//! Comware prompts are bracketed: `<HPE>` in user view and `[HPE]` in system
//! view. There is no separate privileged tier; `system-view` is both "enable"
//! and config mode. Logins may stop at a "Press Y or ENTER to continue"
//! banner, so priming presses enter a few times before looking for a prompt.

use std::time::Duration;

use crate::platform::{ModeSpec, PlatformDefinition, PrimingSpec, PrivilegeTier, SetupCommand};

/// Platform name for HP Comware over SSH.
pub const PLATFORM_NAME: &str = "hp_comware";

/// Platform name for HP Comware over Telnet.
pub const TELNET_PLATFORM_NAME: &str = "hp_comware_telnet";

/// Create the HP Comware platform definition.
pub fn platform() -> PlatformDefinition {
    let mode = ModeSpec::new("system-view", "return", "]")
        .with_exit_pattern(">")
        .with_privilege(PrivilegeTier::AliasConfig);

    let priming = PrimingSpec::default()
        .with_banner_keystrokes(4, Duration::from_millis(500))
        .with_settle(Duration::from_millis(300))
        .with_setup_command(SetupCommand::new("screen-length disable"));

    PlatformDefinition::new(PLATFORM_NAME, r"[>\]]\s*$", mode)
        .expect("static Comware prompt pattern")
        .with_config_terminator(r"\]")
        .expect("static Comware config terminator")
        .with_prompt_terminators("<>[]")
        .with_priming(priming)
        .with_save_command("save force")
        .with_failure_pattern("% Unrecognized command found at")
        .with_failure_pattern("% Incomplete command found at")
        .with_failure_pattern("% Wrong parameter found at")
        .with_failure_pattern("% Too many parameters found at")
        .with_failure_pattern("% Ambiguous command found at")
}

/// Comware reached over Telnet, which wants `\r\n` line endings.
pub fn telnet_platform() -> PlatformDefinition {
    platform()
        .renamed(TELNET_PLATFORM_NAME)
        .with_line_terminator("\r\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comware_platform() {
        let platform = platform();
        assert_eq!(platform.name, "hp_comware");
        assert!(!platform.has_commit);
        assert!(!platform.fast_cli);
        assert_eq!(platform.mode.privilege, PrivilegeTier::AliasConfig);
        assert_eq!(platform.mode.enter_command, "system-view");
        assert_eq!(platform.mode.exit_command, "return");
        assert_eq!(platform.save_command.as_deref(), Some("save force"));
        assert!(platform.context_patterns.is_empty());
        assert!(platform.config_terminator.is_match("sysname edge-1\n[HPE]"));
        assert!(!platform.config_terminator.is_match("\n<HPE>"));
    }

    #[test]
    fn test_priming_recipe() {
        let priming = platform().priming;
        assert_eq!(priming.banner_keystrokes, 4);
        assert_eq!(priming.keystroke_interval, Duration::from_millis(500));
        assert!(!priming.stop_on_prompt);
        assert!(!priming.escalate);
        assert_eq!(
            priming.setup_commands,
            vec![SetupCommand::new("screen-length disable")]
        );
    }

    #[test]
    fn test_prompt_shape() {
        let platform = platform();
        assert!(platform.prompt_pattern.is_match("\r\n<HPE>"));
        assert!(platform.prompt_pattern.is_match("[HPE-GigabitEthernet1/0/1]"));
        assert!(
            !platform
                .prompt_pattern
                .is_match("Press Y or ENTER to continue, N to exit.")
        );
    }
}
