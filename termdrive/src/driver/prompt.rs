//! Base prompt detection.

use log::debug;

use super::session::Session;
use crate::channel::Channel;
use crate::error::{DriverError, Result};

/// Reduce a prompt line to its base prompt.
///
/// Surrounding whitespace is trimmed, then one leading and one trailing
/// terminator character are removed. `<HPE>` and `[HPE]` both give `HPE`;
/// `user@router>` gives `user@router`.
pub fn base_prompt_from_line(line: &str, terminators: &str) -> String {
    let mut base = line.trim();

    if let Some(first) = base.chars().next() {
        if terminators.contains(first) {
            base = &base[first.len_utf8()..];
        }
    }
    if let Some(last) = base.chars().next_back() {
        if terminators.contains(last) {
            base = &base[..base.len() - last.len_utf8()];
        }
    }

    base.to_string()
}

/// Last non-blank line of `output`, trimmed.
pub(super) fn last_line(output: &str) -> &str {
    output
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("")
}

impl<C: Channel> Session<C> {
    /// Ask the device for a fresh prompt and store its base form.
    ///
    /// The prompt pattern used by later reads is rebuilt around the new
    /// base prompt.
    pub async fn detect_base_prompt(&mut self) -> Result<String> {
        self.write_line("").await?;
        let timeout = self.wait_timeout();
        let output = self
            .channel
            .read_until(&self.platform.prompt_pattern, timeout)
            .await?;

        let base = base_prompt_from_line(last_line(&output), &self.platform.prompt_terminators);
        if base.is_empty() {
            return Err(DriverError::SessionPriming {
                message: "could not determine the base prompt".to_string(),
                output,
            }
            .into());
        }

        debug!("detected base prompt {:?}", base);
        self.set_base_prompt(&base)?;
        Ok(base)
    }
}

#[cfg(test)]
mod tests {
    use tokio_test::assert_ok;

    use super::*;
    use crate::driver::Mode;
    use crate::driver::sim::{SimDevice, session_for};
    use crate::platform::vendors::{broadcom_icos, hp_comware, juniper};

    #[test]
    fn test_base_prompt_from_line() {
        assert_eq!(base_prompt_from_line("<HPE>", "<>[]"), "HPE");
        assert_eq!(base_prompt_from_line("[HPE]", "<>[]"), "HPE");
        assert_eq!(base_prompt_from_line("user@router> ", "#>"), "user@router");
        assert_eq!(base_prompt_from_line("user@router#", "#>"), "user@router");
        assert_eq!(base_prompt_from_line("(Switch) >", "#>"), "(Switch) ");
        assert_eq!(base_prompt_from_line("(Switch) #", "#>"), "(Switch) ");
    }

    #[test]
    fn test_base_prompt_from_line_idempotent() {
        for (line, terms) in [("<HPE>", "<>[]"), ("user@router>", "#>"), ("router", "#>")] {
            let once = base_prompt_from_line(line, terms);
            assert_eq!(base_prompt_from_line(&once, terms), once);
        }
    }

    #[test]
    fn test_last_line() {
        assert_eq!(last_line("banner\n\nuser@router> \n\n"), "user@router>");
        assert_eq!(last_line(""), "");
    }

    #[tokio::test]
    async fn test_detect_in_either_mode_gives_same_base() {
        let mut session = session_for(SimDevice::comware(), hp_comware::platform());
        let operational = assert_ok!(session.detect_base_prompt().await);

        let mut session = session_for(SimDevice::comware().at_config_prompt(), hp_comware::platform());
        let config = assert_ok!(session.detect_base_prompt().await);

        assert_eq!(operational, "HPE");
        assert_eq!(operational, config);
        assert_eq!(session.base_prompt(), "HPE");
        assert!(session.prompt_pattern().is_match("\n<HPE>"));
        assert!(session.prompt_pattern().is_match("\n[HPE-GigabitEthernet1/0/1]"));
        assert_eq!(session.mode(), Mode::Operational);
    }

    #[tokio::test]
    async fn test_detect_juniper_and_broadcom() {
        let mut session = session_for(SimDevice::junos().at_config_prompt(), juniper::platform());
        assert_eq!(assert_ok!(session.detect_base_prompt().await), "user@router");

        let mut session = session_for(SimDevice::icos(), broadcom_icos::platform());
        assert_eq!(assert_ok!(session.detect_base_prompt().await), "(Switch) ");
        assert!(session.prompt_pattern().is_match("(Switch) (Config)#"));
    }
}
