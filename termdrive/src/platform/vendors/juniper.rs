//! Juniper JUNOS platform definition.
//!
//! JUNOS has no separate privileged tier: a login lands in operational mode
//! (`>` prompt) and `configure` enters a candidate configuration (`#` prompt)
//! that must be committed. A root login may land in the FreeBSD shell first,
//! in which case priming starts the CLI with `cli`.
//!
//! # Prompt Examples
//!
//! ```text
//! user@router>              # operational mode
//! [edit]                    # config context (separate line)
//! user@router#              # configuration mode
//! root@router:RE:0%         # root shell
//! {master:0}                # routing-engine indicator (separate line)
//! ```

use std::time::Duration;

use crate::platform::{ModeSpec, PlatformDefinition, PrimingSpec, PrivilegeTier, SetupCommand};

/// Platform name for Juniper JUNOS over SSH.
pub const PLATFORM_NAME: &str = "juniper_junos";

/// Platform name for Juniper JUNOS over Telnet.
pub const TELNET_PLATFORM_NAME: &str = "juniper_junos_telnet";

/// Question JUNOS asks when leaving config mode with a dirty candidate.
pub const UNCOMMITTED_PROMPT: &str = "Exit with uncommitted changes?";

/// Create the Juniper JUNOS platform definition.
pub fn platform() -> PlatformDefinition {
    let mode = ModeSpec::new("configure", "exit configuration-mode", "]")
        .with_enter_pattern("Entering configuration mode")
        .with_uncommitted_prompt(UNCOMMITTED_PROMPT)
        .with_privilege(PrivilegeTier::Absent);

    let priming = PrimingSpec::default()
        .with_banner_keystrokes(50, Duration::from_millis(100))
        .stop_on_prompt()
        .with_shell_escape(r"(?m)root@[^\n]*%\s*$|^\s*%\s*$", "cli")
        .with_settle(Duration::from_millis(300))
        .with_setup_command(
            SetupCommand::new("set cli screen-width 511").verified_by("Screen width set to"),
        )
        .with_setup_command(
            SetupCommand::new("set cli complete-on-space off")
                .verified_by("Disabling complete-on-space"),
        )
        .with_setup_command(
            SetupCommand::new("set cli screen-length 0").verified_by("Screen length set to"),
        );

    let mut platform = PlatformDefinition::new(PLATFORM_NAME, r"[>#]\s*$", mode)
        .expect("static JUNOS prompt pattern")
        .with_prompt_terminators("#>")
        .with_priming(priming)
        .with_commit()
        .with_fast_cli(true)
        .with_failure_pattern("unknown command")
        .with_failure_pattern("syntax error")
        .with_failure_pattern("error:")
        .with_failure_pattern("missing argument")
        .with_failure_pattern("is ambiguous")
        .with_failure_pattern("No valid completions");

    for context in [
        r"\[edit.*\]",
        r"\{master:.*\}",
        r"\{backup:.*\}",
        r"\{line.*\}",
        r"\{primary.*\}",
        r"\{secondary.*\}",
    ] {
        platform = platform
            .with_context_pattern(context)
            .expect("static JUNOS context pattern");
    }

    platform
}

/// JUNOS reached over Telnet, which wants `\r\n` line endings.
pub fn telnet_platform() -> PlatformDefinition {
    platform()
        .renamed(TELNET_PLATFORM_NAME)
        .with_line_terminator("\r\n")
}
