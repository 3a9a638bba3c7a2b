//! Builder for connecting and priming sessions.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use log::debug;
use secrecy::SecretString;

use super::session::{Session, SessionOptions};
use crate::channel::{Channel, Clock};
use crate::error::{DriverError, PlatformError, Result};
use crate::platform::{PlatformDefinition, PlatformRegistry};
use crate::transport::{AuthMethod, HostKeyVerification, SshChannel, SshConfig};

/// Builder for device sessions.
///
/// # Example
///
/// ```rust,no_run
/// use termdrive::SessionBuilder;
///
/// # async fn example() -> Result<(), termdrive::Error> {
/// let mut session = SessionBuilder::new("192.168.1.1")
///     .username("admin")
///     .password("secret")
///     .platform("juniper_junos")
///     .connect()
///     .await?;
///
/// let response = session.send_command("show version", None).await?;
/// println!("{}", response);
/// session.close().await?;
/// # Ok(())
/// # }
/// ```
pub struct SessionBuilder {
    host: String,
    port: u16,
    username: Option<String>,
    auth: AuthMethod,
    secret: Option<SecretString>,
    platform_name: Option<String>,
    custom_platform: Option<PlatformDefinition>,
    options: SessionOptions,
    terminal_width: u32,
    terminal_height: u32,
    host_key_verification: HostKeyVerification,
    known_hosts_path: Option<PathBuf>,
    clock: Option<Arc<dyn Clock>>,
}

impl SessionBuilder {
    /// Create a new builder for the specified host.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: 22,
            username: None,
            auth: AuthMethod::None,
            secret: None,
            platform_name: None,
            custom_platform: None,
            options: SessionOptions::default(),
            terminal_width: 511,
            terminal_height: 24,
            host_key_verification: HostKeyVerification::default(),
            known_hosts_path: None,
            clock: None,
        }
    }

    /// Set the SSH port (default: 22).
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Set password authentication.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.auth = AuthMethod::Password(SecretString::from(password.into()));
        self
    }

    /// Set private key authentication.
    pub fn private_key(mut self, key_path: impl Into<PathBuf>) -> Self {
        self.auth = AuthMethod::PrivateKey {
            path: key_path.into(),
            passphrase: None,
        };
        self
    }

    /// Set private key authentication with passphrase.
    pub fn private_key_with_passphrase(
        mut self,
        key_path: impl Into<PathBuf>,
        passphrase: impl Into<String>,
    ) -> Self {
        self.auth = AuthMethod::PrivateKey {
            path: key_path.into(),
            passphrase: Some(SecretString::from(passphrase.into())),
        };
        self
    }

    /// Password for the privileged tier, if the platform has one.
    pub fn secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(SecretString::from(secret.into()));
        self
    }

    /// Use a registered platform (e.g. `"juniper_junos"`).
    pub fn platform(mut self, platform: impl Into<String>) -> Self {
        self.platform_name = Some(platform.into());
        self
    }

    /// Use a platform definition that is not in the registry.
    pub fn custom_platform(mut self, platform: PlatformDefinition) -> Self {
        self.custom_platform = Some(platform);
        self
    }

    /// Replace all session options at once.
    pub fn options(mut self, options: SessionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn delay_factor(mut self, delay_factor: f64) -> Self {
        self.options.delay_factor = delay_factor;
        self
    }

    pub fn fast_cli(mut self, fast_cli: bool) -> Self {
        self.options.fast_cli = Some(fast_cli);
        self
    }

    /// Base timeout for connecting and for pattern waits.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = timeout;
        self
    }

    pub fn terminal_size(mut self, width: u32, height: u32) -> Self {
        self.terminal_width = width;
        self.terminal_height = height;
        self
    }

    pub fn host_key_verification(mut self, mode: HostKeyVerification) -> Self {
        self.host_key_verification = mode;
        self
    }

    pub fn known_hosts_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.known_hosts_path = Some(path.into());
        self
    }

    /// Replace the clock used for paced polling.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    fn resolve_platform(&mut self) -> Result<PlatformDefinition> {
        if let Some(custom) = self.custom_platform.take() {
            return Ok(custom);
        }
        match self.platform_name.take() {
            Some(name) => PlatformRegistry::lookup(&name),
            None => Err(PlatformError::InvalidDefinition {
                message: "Platform must be specified".to_string(),
            }
            .into()),
        }
    }

    /// Build an unprimed session over an already open channel.
    pub fn build_with_channel<C: Channel>(mut self, channel: C) -> Result<Session<C>> {
        let platform = self.resolve_platform()?;
        let mut session = Session::new(channel, platform, self.options)?;
        if let Some(clock) = self.clock {
            session = session.with_clock(clock);
        }
        if let Some(secret) = self.secret {
            session = session.with_secret(secret);
        }
        Ok(session)
    }

    /// Connect over SSH, open a shell and prime the session.
    pub async fn connect(mut self) -> Result<Session<SshChannel>> {
        let username = self.username.take().ok_or_else(|| DriverError::InvalidConfig {
            message: "Username is required".to_string(),
        })?;

        let config = SshConfig {
            host: self.host.clone(),
            port: self.port,
            username,
            auth: std::mem::replace(&mut self.auth, AuthMethod::None),
            timeout: self.options.timeout,
            terminal_width: self.terminal_width,
            terminal_height: self.terminal_height,
            host_key_verification: self.host_key_verification.clone(),
            known_hosts_path: self.known_hosts_path.clone(),
        };

        let channel = SshChannel::open(config).await?;

        let mut session = self.build_with_channel(channel)?;
        debug!("connected to {}", session.platform().name);
        session.prime().await?;
        Ok(session)
    }
}
