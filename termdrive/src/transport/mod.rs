//! SSH transport layer wrapping russh.
//!
//! [`SshChannel::open`] connects, checks the host key, authenticates and
//! starts a PTY shell; the result is the production
//! [`Channel`](crate::channel::Channel).

mod channel;
pub mod config;
mod ssh;

pub use channel::SshChannel;
pub use config::{AuthMethod, HostKeyVerification, SshConfig};
