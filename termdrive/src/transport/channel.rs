//! [`Channel`] over an SSH shell.

use std::time::Duration;

use futures_util::FutureExt;
use log::{debug, trace};
use regex::Regex;
use russh::client::{Handle, Msg};
use russh::{ChannelMsg, Disconnect};
use tokio::time::Instant;

use super::ssh::SshHandler;
use crate::channel::{Channel, PatternBuffer};
use crate::error::{ChannelError, Result, TransportError};

/// Interactive shell on an SSH connection.
///
/// Incoming data is stripped of terminal escapes as it arrives and kept in a
/// [`PatternBuffer`]; pattern waits search its tail.
pub struct SshChannel {
    session: Handle<SshHandler>,
    channel: russh::Channel<Msg>,
    buffer: PatternBuffer,
    closed: bool,
}

impl SshChannel {
    pub(crate) fn new(session: Handle<SshHandler>, channel: russh::Channel<Msg>) -> Self {
        Self {
            session,
            channel,
            buffer: PatternBuffer::default(),
            closed: false,
        }
    }

    /// Whether the SSH connection is still up.
    pub fn is_alive(&self) -> bool {
        !self.closed && !self.session.is_closed()
    }

    /// Fold one channel message into the buffer.
    fn absorb(&mut self, msg: Option<ChannelMsg>) {
        match msg {
            Some(ChannelMsg::Data { data }) => self.buffer.extend(&data),
            Some(ChannelMsg::ExtendedData { data, .. }) => self.buffer.extend(&data),
            Some(ChannelMsg::Eof) | Some(ChannelMsg::Close) | None => {
                debug!("SSH channel closed by peer");
                self.closed = true;
            }
            Some(other) => trace!("ignoring channel message {:?}", other),
        }
    }

    /// Absorb every message already queued, without waiting.
    fn drain_ready(&mut self) {
        while !self.closed {
            match self.channel.wait().now_or_never() {
                Some(msg) => self.absorb(msg),
                None => break,
            }
        }
    }
}

impl Channel for SshChannel {
    async fn write(&mut self, data: &str) -> Result<()> {
        if self.closed {
            return Err(ChannelError::Closed.into());
        }
        self.channel
            .data(data.as_bytes())
            .await
            .map_err(ChannelError::Ssh)?;
        Ok(())
    }

    async fn read_nonblocking(&mut self) -> Result<String> {
        self.drain_ready();
        Ok(self.buffer.take())
    }

    async fn read_until(&mut self, pattern: &Regex, timeout: Duration) -> Result<String> {
        let deadline = Instant::now() + timeout;

        loop {
            if let Some(end) = self.buffer.search_tail(pattern) {
                return Ok(self.buffer.split_to(end));
            }
            if self.closed {
                return Err(ChannelError::Closed.into());
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            match tokio::time::timeout(remaining, self.channel.wait()).await {
                Ok(msg) => self.absorb(msg),
                Err(_) => {
                    return Err(ChannelError::PatternTimeout {
                        pattern: pattern.as_str().to_string(),
                        timeout,
                        output: self.buffer.take(),
                    }
                    .into());
                }
            }
        }
    }

    async fn clear_buffer(&mut self) -> Result<String> {
        self.drain_ready();
        Ok(self.buffer.take())
    }

    async fn close(&mut self) -> Result<()> {
        if !self.closed {
            // The peer may already be gone; an eof failure changes nothing.
            let _ = self.channel.eof().await;
            self.closed = true;
        }
        self.session
            .disconnect(Disconnect::ByApplication, "", "en")
            .await
            .map_err(TransportError::Ssh)?;
        Ok(())
    }
}
