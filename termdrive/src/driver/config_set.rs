//! Push configuration lines through config mode.

use log::{debug, trace, warn};

use super::session::Session;
use crate::channel::Channel;
use crate::error::Result;

impl<C: Channel> Session<C> {
    /// Send configuration lines from config mode.
    ///
    /// Config mode is entered first if needed. Each line waits for the
    /// platform's config terminator before the next is sent. With
    /// `exit_config` the session returns to operational mode afterwards;
    /// on a platform with commit an uncommitted candidate is abandoned when
    /// it does. Blank lines are skipped.
    ///
    /// Returns everything read, including the mode transitions.
    pub async fn send_config_set<I, S>(&mut self, commands: I, exit_config: bool) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.ensure_open()?;
        let mut output = self.enter_config(None, None).await?;

        let terminator = self.platform.config_terminator.clone();
        let mut sent = 0usize;
        for command in commands {
            let command = command.as_ref().trim();
            if command.is_empty() {
                continue;
            }
            self.write_line(command).await?;
            let timeout = self.wait_timeout();
            let reply = self.channel.read_until(&terminator, timeout).await?;
            trace!("config '{}': {:?}", command, reply);

            if let Some(failure) = self
                .platform
                .failed_when_contains
                .iter()
                .find(|f| reply.contains(f.as_str()))
            {
                warn!("config line '{}' reported '{}'", command, failure);
            }
            output.push_str(&reply);
            sent += 1;
        }
        debug!("sent {} config line(s)", sent);

        if exit_config {
            output.push_str(&self.exit_config(None).await?);
        }
        Ok(output)
    }
}
