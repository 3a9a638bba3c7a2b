//! Channel layer: the character stream a session talks through.
//!
//! The [`Channel`] trait is the only thing the session state machine needs
//! from a transport: write text, read what is available, and wait for a
//! pattern with a deadline. The SSH implementation lives in
//! [`crate::transport`]; tests drive the same trait with a simulated device.

mod buffer;
mod clock;
pub mod patterns;

pub use buffer::PatternBuffer;
pub use clock::{Clock, RecordingClock, TokioClock};

use std::future::Future;
use std::time::Duration;

use regex::Regex;

use crate::error::Result;

/// A full-duplex text stream to a device CLI.
pub trait Channel: Send {
    /// Write raw text. No line terminator is added.
    fn write(&mut self, data: &str) -> impl Future<Output = Result<()>> + Send;

    /// Return whatever output is available right now, possibly nothing.
    fn read_nonblocking(&mut self) -> impl Future<Output = Result<String>> + Send;

    /// Read until `pattern` matches or `timeout` expires.
    ///
    /// On success returns the output up to the end of the match; anything
    /// after it stays buffered. On timeout fails with
    /// [`ChannelError::PatternTimeout`](crate::error::ChannelError::PatternTimeout)
    /// carrying everything read so far.
    fn read_until(
        &mut self,
        pattern: &Regex,
        timeout: Duration,
    ) -> impl Future<Output = Result<String>> + Send;

    /// Drop all buffered and pending output, returning what was discarded.
    fn clear_buffer(&mut self) -> impl Future<Output = Result<String>> + Send;

    /// Close the underlying stream.
    fn close(&mut self) -> impl Future<Output = Result<()>> + Send;
}
