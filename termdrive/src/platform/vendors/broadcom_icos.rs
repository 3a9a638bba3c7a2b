//! Broadcom ICOS platform definition.
//!
//! ICOS follows the Cisco layout: `(Switch) >` user exec, `enable` to
//! `(Switch) #`, and `configure` to `(Switch) (Config)#`.

use crate::platform::{ModeSpec, PlatformDefinition, PrimingSpec, PrivilegeTier, SetupCommand};

/// Platform name for Broadcom ICOS.
pub const PLATFORM_NAME: &str = "broadcom_icos";

/// Create the Broadcom ICOS platform definition.
pub fn platform() -> PlatformDefinition {
    let mode = ModeSpec::new("configure", "exit", ")#")
        .with_exit_pattern(r"#\s*$")
        .with_privilege(PrivilegeTier::Separate {
            enable_command: "enable".to_string(),
            password_pattern: "ssword".to_string(),
            check_string: "#".to_string(),
            exit_command: "exit".to_string(),
        });

    let priming = PrimingSpec::default()
        .with_escalation()
        .with_setup_command(SetupCommand::new("terminal width 511"))
        .with_setup_command(SetupCommand::new("terminal length 0"));

    PlatformDefinition::new(PLATFORM_NAME, r"[>#]\s*$", mode)
        .expect("static ICOS prompt pattern")
        .with_prompt_terminators("#>")
        .with_priming(priming)
        .with_save_command("write memory")
        .with_failure_pattern("% Invalid input detected")
        .with_failure_pattern("% Incomplete command")
        .with_failure_pattern("% Ambiguous command")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broadcom_platform() {
        let platform = platform();
        assert_eq!(platform.name, "broadcom_icos");
        assert!(platform.mode.has_separate_privilege_tier());
        assert_eq!(platform.mode.check_string, ")#");
        assert_eq!(platform.save_command.as_deref(), Some("write memory"));
        assert!(platform.priming.escalate);
        assert_eq!(platform.priming.banner_keystrokes, 0);
        assert_eq!(
            platform.priming.setup_commands,
            vec![
                SetupCommand::new("terminal width 511"),
                SetupCommand::new("terminal length 0"),
            ]
        );
    }

    #[test]
    fn test_prompt_shape() {
        let platform = platform();
        assert!(platform.prompt_pattern.is_match("(Switch) >"));
        assert!(platform.prompt_pattern.is_match("(Switch) #"));
        assert!(platform.prompt_pattern.is_match("(Switch) (Config)#"));
    }
}
