//! Loud Sender
//!
//! Turns one optional argument into one control message and delivers it to
//! the daemon on the local machine, launching the daemon first when it is
//! not running.

pub mod error;

pub use error::{Result, SenderError};

use loud_daemon::Command;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::net::UdpSocket;
use tracing::{debug, info};

/// Readiness polls after launching the daemon
pub const READY_ATTEMPTS: usize = 20;

pub const READY_INTERVAL: Duration = Duration::from_millis(250);

/// Daemon executable name on this platform
pub const DAEMON_EXE: &str = if cfg!(windows) { "loud.exe" } else { "loud" };

/// Map the command-line argument to a daemon command
///
/// No argument stops playback, `q` quits the daemon and anything else is
/// enqueued.
pub fn command_for(arg: Option<&str>) -> Command {
    match arg {
        None | Some("") => Command::Stop,
        Some("q") => Command::Quit,
        Some(path) => Command::Enqueue(PathBuf::from(path)),
    }
}

/// Wire message for the command-line argument
pub fn message_for(arg: Option<&str>) -> String {
    command_for(arg).to_message()
}

/// Whether something already owns the control port
///
/// The daemon binds the port exclusively, so a successful probe bind means
/// it is absent.
pub async fn is_daemon_running(port: u16) -> bool {
    let probe = SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, port));
    match UdpSocket::bind(probe).await {
        Ok(socket) => {
            drop(socket);
            false
        }
        Err(e) => {
            debug!("Control port {} is taken: {}", port, e);
            true
        }
    }
}

/// Locate the daemon beside the running executable
pub fn daemon_path() -> Result<PathBuf> {
    let exe = std::env::current_exe().map_err(SenderError::Launch)?;
    let candidate = exe.with_file_name(DAEMON_EXE);
    if candidate.is_file() {
        Ok(candidate)
    } else {
        Err(SenderError::DaemonNotFound(exe))
    }
}

/// Start the daemon detached from this process
pub fn launch_daemon(path: &Path) -> Result<()> {
    let mut command = tokio::process::Command::new(path);
    command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    #[cfg(windows)]
    {
        const CREATE_NO_WINDOW: u32 = 0x0800_0000;
        command.creation_flags(CREATE_NO_WINDOW);
    }

    let child = command.spawn().map_err(SenderError::Launch)?;
    info!("Launched {} (pid {:?})", path.display(), child.id());
    Ok(())
}

/// Poll until the daemon owns the control port
pub async fn wait_until_ready(port: u16, attempts: usize, interval: Duration) -> Result<()> {
    for _ in 0..attempts {
        if is_daemon_running(port).await {
            return Ok(());
        }
        tokio::time::sleep(interval).await;
    }
    Err(SenderError::NotReady { port })
}

/// Send one datagram to the daemon on the loopback interface
pub async fn send(port: u16, message: &str) -> Result<()> {
    let socket = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0))
        .await
        .map_err(SenderError::Send)?;
    socket
        .send_to(message.as_bytes(), (Ipv4Addr::LOCALHOST, port))
        .await
        .map_err(SenderError::Send)?;
    debug!("Sent {:?} to port {}", message, port);
    Ok(())
}

/// Deliver `command`, launching the daemon first if it is absent
///
/// Quitting a daemon that is not running does nothing.
pub async fn deliver(port: u16, command: &Command) -> Result<()> {
    if !is_daemon_running(port).await {
        if *command == Command::Quit {
            info!("Daemon not running; nothing to quit");
            return Ok(());
        }

        launch_daemon(&daemon_path()?)?;
        wait_until_ready(port, READY_ATTEMPTS, READY_INTERVAL).await?;

        // Harmless first message; a fresh daemon has nothing to stop
        send(port, "").await?;
    }

    send(port, &command.to_message()).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_argument_stops() {
        assert_eq!(message_for(None), "");
        assert_eq!(command_for(None), Command::Stop);
    }

    #[test]
    fn q_quits() {
        assert_eq!(message_for(Some("q")), "q");
    }

    #[test]
    fn everything_else_is_enqueued() {
        assert_eq!(message_for(Some("/music/a.mp3")), "q:/music/a.mp3");
        assert_eq!(message_for(Some("n")), "q:n");
        assert_eq!(message_for(Some("play:/x")), "q:play:/x");
        assert_eq!(message_for(Some("Q")), "q:Q");
    }
}
