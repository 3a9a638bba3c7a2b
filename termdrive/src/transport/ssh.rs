//! SSH connection setup: connect, check the host key, authenticate and open
//! the PTY shell a session runs in.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use log::{debug, warn};
use russh::client::{self, Handle};
use russh::keys::{PrivateKeyWithHashAlg, PublicKey, load_secret_key};
use secrecy::ExposeSecret;

use super::channel::SshChannel;
use super::config::{AuthMethod, HostKeyVerification, SshConfig};
use crate::error::{Result, TransportError};

impl SshChannel {
    /// Connect, authenticate and open an interactive shell on a PTY.
    pub async fn open(config: SshConfig) -> Result<Self> {
        let rejection = Arc::new(Mutex::new(None));
        let handler = SshHandler {
            host: config.host.clone(),
            port: config.port,
            policy: config.host_key_verification.clone(),
            known_hosts_path: config.known_hosts_path.clone(),
            rejection: rejection.clone(),
        };
        let client_config = Arc::new(client::Config {
            inactivity_timeout: Some(config.timeout),
            ..Default::default()
        });

        debug!("connecting to {}", config.socket_addr());
        let mut session = tokio::time::timeout(
            config.timeout,
            client::connect(client_config, (config.host.as_str(), config.port), handler),
        )
        .await
        .map_err(|_| TransportError::Timeout(config.timeout))?
        .map_err(|e| {
            // russh only reports "unknown key"; the handler kept the reason
            rejection
                .lock()
                .ok()
                .and_then(|mut slot| slot.take())
                .unwrap_or(TransportError::Ssh(e))
        })?;

        authenticate(&mut session, &config).await?;

        let channel = session
            .channel_open_session()
            .await
            .map_err(TransportError::Ssh)?;
        channel
            .request_pty(
                true,
                "xterm",
                config.terminal_width,
                config.terminal_height,
                0,
                0,
                &[],
            )
            .await
            .map_err(TransportError::Ssh)?;
        channel
            .request_shell(true)
            .await
            .map_err(TransportError::Ssh)?;

        debug!("shell open on {}", config.socket_addr());
        Ok(SshChannel::new(session, channel))
    }
}

async fn authenticate(session: &mut Handle<SshHandler>, config: &SshConfig) -> Result<()> {
    let outcome = match &config.auth {
        AuthMethod::None => session.authenticate_none(&config.username).await,
        AuthMethod::Password(password) => {
            session
                .authenticate_password(&config.username, password.expose_secret())
                .await
        }
        AuthMethod::PrivateKey { path, passphrase } => {
            let key = load_secret_key(path, passphrase.as_ref().map(|p| p.expose_secret()))
                .map_err(|e| TransportError::Key(e.to_string()))?;
            let hash_alg = session
                .best_supported_rsa_hash()
                .await
                .map_err(TransportError::Ssh)?
                .flatten();
            session
                .authenticate_publickey(
                    &config.username,
                    PrivateKeyWithHashAlg::new(Arc::new(key), hash_alg),
                )
                .await
        }
    };

    if !outcome.map_err(TransportError::Ssh)?.success() {
        return Err(TransportError::AuthenticationFailed {
            user: config.username.clone(),
        }
        .into());
    }
    Ok(())
}

/// russh client handler; only host key checking is customised.
pub(crate) struct SshHandler {
    host: String,
    port: u16,
    policy: HostKeyVerification,
    known_hosts_path: Option<PathBuf>,
    rejection: Arc<Mutex<Option<TransportError>>>,
}

impl SshHandler {
    fn verify(&self, key: &PublicKey) -> std::result::Result<(), TransportError> {
        if self.policy == HostKeyVerification::Disabled {
            return Ok(());
        }

        let known = match &self.known_hosts_path {
            Some(path) => russh::keys::check_known_hosts_path(&self.host, self.port, key, path),
            None => russh::keys::check_known_hosts(&self.host, self.port, key),
        };

        match known {
            Ok(true) => Ok(()),
            Ok(false) if self.policy == HostKeyVerification::Strict => {
                Err(TransportError::HostKeyUnknown {
                    host: self.host.clone(),
                    port: self.port,
                })
            }
            Ok(false) => {
                let learned = match &self.known_hosts_path {
                    Some(path) => russh::keys::known_hosts::learn_known_hosts_path(
                        &self.host, self.port, key, path,
                    ),
                    None => russh::keys::known_hosts::learn_known_hosts(&self.host, self.port, key),
                };
                if let Err(e) = learned {
                    warn!("failed to save host key for {}: {}", self.host, e);
                }
                Ok(())
            }
            Err(russh::keys::Error::KeyChanged { line }) => Err(TransportError::HostKeyChanged {
                host: self.host.clone(),
                port: self.port,
                line,
            }),
            Err(e) => Err(TransportError::KnownHosts(e.to_string())),
        }
    }
}

impl client::Handler for SshHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &PublicKey,
    ) -> std::result::Result<bool, Self::Error> {
        match self.verify(server_public_key) {
            Ok(()) => Ok(true),
            Err(e) => {
                if let Ok(mut slot) = self.rejection.lock() {
                    *slot = Some(e);
                }
                Ok(false)
            }
        }
    }
}
