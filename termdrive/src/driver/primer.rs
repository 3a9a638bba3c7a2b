//! Session priming: get from a fresh login to a clean, known prompt.
//!
//! A new session may be sitting behind a login banner, in a root shell, or
//! at an unprivileged prompt with paging enabled. Priming walks it to a
//! state where every later read can rely on the prompt pattern:
//!
//! 1. Absorb banners with a bounded number of Enter keystrokes. If the
//!    last one still shows no prompt, give up.
//! 2. Let output settle and throw it away.
//! 3. Probe with one more keystroke and insist on a prompt.
//! 4. Learn the base prompt.
//! 5. Escalate to the privileged tier if the platform wants it.
//! 6. Run the platform's terminal setup commands.
//! 7. Flush whatever is left.

use log::{debug, trace};
use regex::Regex;

use super::session::{Mode, Session};
use crate::channel::Channel;
use crate::error::{ChannelError, DriverError, Error, Result};

impl<C: Channel> Session<C> {
    /// Prime a freshly opened session.
    ///
    /// Fails with [`DriverError::SessionPriming`] if the banner keystrokes
    /// run out before a prompt shows up, or if the probe gets no prompt; the
    /// session should then be discarded.
    pub async fn prime(&mut self) -> Result<()> {
        self.ensure_open()?;
        let priming = self.platform.priming.clone();
        debug!("priming {} session", self.platform.name);

        let shell = priming
            .shell_escape
            .as_ref()
            .map(|escape| Regex::new(&escape.pattern))
            .transpose()?;

        let mut seen = String::new();
        let mut reached_cli = false;
        for attempt in 1..=priming.banner_keystrokes {
            self.write_line("").await?;
            self.pause(priming.keystroke_interval).await;

            let output = self.channel.read_nonblocking().await?;
            trace!("keystroke {}: {:?}", attempt, output);
            seen.push_str(&output);

            if let (Some(shell), Some(escape)) = (&shell, &priming.shell_escape) {
                if shell.is_match(&output) {
                    debug!("shell prompt found, starting CLI with '{}'", escape.command);
                    self.write_line(&escape.command).await?;
                    reached_cli = true;
                    break;
                }
            }
            if self.platform.prompt_pattern.is_match(&output) {
                trace!("prompt seen after {} keystroke(s)", attempt);
                reached_cli = true;
                if priming.stop_on_prompt {
                    break;
                }
            }
        }

        self.pause(priming.settle).await;
        let discarded = self.channel.clear_buffer().await?;
        trace!("discarded before probe: {:?}", discarded);

        if priming.banner_keystrokes > 0 && !reached_cli {
            seen.push_str(&discarded);
            if !self.platform.prompt_pattern.is_match(&discarded) {
                return Err(DriverError::SessionPriming {
                    message: format!(
                        "no prompt after {} keystroke(s)",
                        priming.banner_keystrokes
                    ),
                    output: seen,
                }
                .into());
            }
        }

        self.write_line("").await?;
        let timeout = self.timeout.mul_f64(self.delay_factor);
        if let Err(e) = self
            .channel
            .read_until(&self.platform.prompt_pattern, timeout)
            .await
        {
            return Err(match e {
                Error::Channel(ChannelError::PatternTimeout { output, .. }) => {
                    DriverError::SessionPriming {
                        message: format!(
                            "no prompt in reply to the probe after {} keystroke(s)",
                            priming.banner_keystrokes
                        ),
                        output,
                    }
                    .into()
                }
                other => other,
            });
        }

        self.detect_base_prompt().await?;

        if priming.escalate && self.platform.mode.has_separate_privilege_tier() {
            self.enable().await?;
            self.detect_base_prompt().await?;
        }

        for setup in &priming.setup_commands {
            self.write_line(&setup.command).await?;
            let output = match &setup.verify_pattern {
                Some(pattern) => {
                    let verify = Regex::new(pattern)?;
                    let timeout = self.wait_timeout();
                    self.channel.read_until(&verify, timeout).await?
                }
                None => self.read_until_prompt().await?,
            };
            trace!("setup '{}': {:?}", setup.command, output);
        }

        self.pause(priming.settle).await;
        self.channel.clear_buffer().await?;
        self.mode = Mode::Operational;

        debug!("session primed, base prompt {:?}", self.base_prompt);
        Ok(())
    }
}
