//! Service-manager readiness notification (the systemd `NOTIFY_SOCKET`
//! datagram protocol).

use std::env;
use std::ffi::OsString;
use std::io;

use thiserror::Error;
use tracing::{debug, info};

use super::PROCESS_TARGET;

const NOTIFY_SOCKET_ENV_VAR: &str = "NOTIFY_SOCKET";
const READY_MESSAGE: &[u8] = b"READY=1";

/// Tells a supervising service manager that the node is ready.
#[cfg_attr(test, mockall::automock)]
pub trait ReadyNotifier: Send + Sync {
    /// Sends the readiness notification.
    ///
    /// Returns `Ok(false)` when no service manager is listening.
    fn notify_ready(&self) -> Result<bool, NotifyError>;
}

/// Errors raised while notifying the service manager.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The notification socket address is unusable.
    #[error("invalid notification socket '{address}'")]
    InvalidSocket {
        /// Address taken from `NOTIFY_SOCKET`.
        address: String,
    },
    /// Sending the datagram failed.
    #[error("failed to send readiness notification to '{address}': {source}")]
    Send {
        /// Address taken from `NOTIFY_SOCKET`.
        address: String,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

/// Notifier speaking the systemd datagram protocol.
#[derive(Debug, Default, Clone)]
pub struct SystemdNotifier {
    socket: Option<OsString>,
}

impl SystemdNotifier {
    /// Reads the notification socket from `NOTIFY_SOCKET`.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            socket: env::var_os(NOTIFY_SOCKET_ENV_VAR),
        }
    }

    /// Notifier targeting an explicit socket address.
    #[must_use]
    pub fn with_socket(socket: impl Into<OsString>) -> Self {
        Self {
            socket: Some(socket.into()),
        }
    }
}

impl ReadyNotifier for SystemdNotifier {
    fn notify_ready(&self) -> Result<bool, NotifyError> {
        let Some(socket) = self.socket.as_ref().filter(|socket| !socket.is_empty()) else {
            debug!(
                target: PROCESS_TARGET,
                "no service manager socket; skipping readiness notification"
            );
            return Ok(false);
        };
        info!(
            target: PROCESS_TARGET,
            socket = %socket.to_string_lossy(),
            "notifying service manager of readiness"
        );
        send(socket, READY_MESSAGE)?;
        Ok(true)
    }
}

#[cfg(unix)]
fn send(socket: &OsString, message: &[u8]) -> Result<(), NotifyError> {
    use std::os::unix::ffi::OsStrExt;
    use std::os::unix::net::UnixDatagram;

    let address = socket.to_string_lossy().into_owned();
    let datagram = UnixDatagram::unbound().map_err(|source| NotifyError::Send {
        address: address.clone(),
        source,
    })?;
    let bytes = socket.as_bytes();
    let sent = match bytes.split_first() {
        Some((b'@', name)) => send_abstract(&datagram, name, message, &address)?,
        Some((b'/', _)) => datagram.send_to(message, socket),
        _ => return Err(NotifyError::InvalidSocket { address }),
    };
    sent.map(|_| ())
        .map_err(|source| NotifyError::Send { address, source })
}

#[cfg(target_os = "linux")]
fn send_abstract(
    datagram: &std::os::unix::net::UnixDatagram,
    name: &[u8],
    message: &[u8],
    address: &str,
) -> Result<io::Result<usize>, NotifyError> {
    use std::os::linux::net::SocketAddrExt;
    use std::os::unix::net::SocketAddr;

    let target = SocketAddr::from_abstract_name(name).map_err(|_| NotifyError::InvalidSocket {
        address: address.to_owned(),
    })?;
    Ok(datagram.send_to_addr(message, &target))
}

#[cfg(all(unix, not(target_os = "linux")))]
fn send_abstract(
    _datagram: &std::os::unix::net::UnixDatagram,
    _name: &[u8],
    _message: &[u8],
    address: &str,
) -> Result<io::Result<usize>, NotifyError> {
    Err(NotifyError::InvalidSocket {
        address: address.to_owned(),
    })
}

#[cfg(not(unix))]
fn send(socket: &OsString, _message: &[u8]) -> Result<(), NotifyError> {
    Err(NotifyError::InvalidSocket {
        address: socket.to_string_lossy().into_owned(),
    })
}
