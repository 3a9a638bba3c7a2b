//! A session handle that can be cloned across tasks.

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

use super::commit::{CommitOptions, CommitResult};
use super::response::Response;
use super::session::Session;
use crate::channel::Channel;
use crate::error::Result;

/// Cloneable handle serializing access to one [`Session`].
///
/// Each call holds the lock for the whole exchange, so commands from
/// different tasks never interleave on the wire. Use [`lock`](Self::lock)
/// to run several operations as one unit.
pub struct SharedSession<C> {
    inner: Arc<Mutex<Session<C>>>,
}

impl<C> Clone for SharedSession<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: Channel> SharedSession<C> {
    pub fn new(session: Session<C>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    /// Exclusive access for a sequence of operations.
    pub async fn lock(&self) -> MutexGuard<'_, Session<C>> {
        self.inner.lock().await
    }

    pub async fn send_command(&self, command: &str) -> Result<Response> {
        self.inner.lock().await.send_command(command, None).await
    }

    pub async fn send_command_timing(&self, command: &str) -> Result<String> {
        self.inner.lock().await.send_command_timing(command).await
    }

    /// See [`Session::send_config_set`].
    pub async fn send_config_set<I, S>(&self, commands: I, exit_config: bool) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.inner
            .lock()
            .await
            .send_config_set(commands, exit_config)
            .await
    }

    pub async fn commit(&self, options: CommitOptions) -> Result<CommitResult> {
        self.inner.lock().await.commit(options).await
    }

    pub async fn close(&self) -> Result<()> {
        self.inner.lock().await.close().await
    }
}

impl<C> From<Session<C>> for SharedSession<C> {
    fn from(session: Session<C>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }
}
