//! Single-instance guard.
//!
//! The first popcorn process binds a Unix socket and listens on it. Later
//! processes find the socket live, forward their activation URL as one JSON
//! line and exit.

use std::{
    env, fs as std_fs, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tokio::{
    fs,
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::{UnixListener, UnixStream},
    sync::mpsc,
};
use tracing::{debug, trace, warn};

/// Message a secondary instance sends to the primary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activation {
    /// URL passed on the secondary's command line, if any.
    pub url: Option<String>,
}

/// Outcome of [`acquire`].
#[derive(Debug)]
pub enum Acquired {
    /// This process owns the socket.
    Primary(UnixListener),
    /// Another process owns the socket; forward to it and exit.
    Secondary(UnixStream),
}

/// Socket path for the current user.
pub fn socket_path() -> PathBuf {
    let dir = env::var_os("XDG_RUNTIME_DIR")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(env::temp_dir);
    let user = env::var("USER").unwrap_or_else(|_| "default".to_string());
    dir.join(format!("popcorn-{user}.sock"))
}

/// Become the primary instance, or connect to the one already running.
///
/// A socket file nobody listens on is left over from a crashed process; it is
/// removed and rebound.
pub async fn acquire(path: &Path) -> io::Result<Acquired> {
    match UnixStream::connect(path).await {
        Ok(stream) => {
            debug!(socket = %path.display(), "popcorn is already running");
            return Ok(Acquired::Secondary(stream));
        }
        Err(err) => trace!(?err, "no live instance"),
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    if let Err(err) = fs::remove_file(path).await
        && err.kind() != io::ErrorKind::NotFound
    {
        warn!(?err, socket = %path.display(), "failed to remove stale instance socket");
    }
    let listener = UnixListener::bind(path)?;
    debug!(socket = %path.display(), "listening for activations");
    Ok(Acquired::Primary(listener))
}

/// Send `url` to the primary instance.
pub async fn forward(mut stream: UnixStream, url: Option<&str>) -> io::Result<()> {
    let msg = Activation {
        url: url.map(str::to_string),
    };
    let mut line = serde_json::to_string(&msg).map_err(io::Error::other)?;
    line.push('\n');
    stream.write_all(line.as_bytes()).await?;
    stream.shutdown().await
}

/// Accept secondary instances and pass their activations to `tx`.
///
/// Returns when `tx` is closed or the listener fails.
pub async fn serve(listener: UnixListener, tx: mpsc::UnboundedSender<Activation>) -> io::Result<()> {
    loop {
        match listener.accept().await {
            Ok((stream, _addr)) => {
                let tx = tx.clone();
                tokio::spawn(async move {
                    if let Err(err) = handle_client(stream, &tx).await {
                        debug!(?err, "activation client failed");
                    }
                });
            }
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
        if tx.is_closed() {
            return Ok(());
        }
    }
}

/// Read activation lines from one secondary instance.
async fn handle_client(stream: UnixStream, tx: &mpsc::UnboundedSender<Activation>) -> io::Result<()> {
    let mut lines = BufReader::new(stream).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<Activation>(&line) {
            Ok(activation) => {
                if tx.send(activation).is_err() {
                    break;
                }
            }
            Err(err) => warn!(?err, "ignoring malformed activation"),
        }
    }
    Ok(())
}

/// Remove the socket file on shutdown.
pub fn cleanup(path: &Path) {
    if let Err(err) = std_fs::remove_file(path)
        && err.kind() != io::ErrorKind::NotFound
    {
        debug!(?err, "failed to remove instance socket");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn second_instance_forwards_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("popcorn.sock");

        let Acquired::Primary(listener) = acquire(&path).await.unwrap() else {
            panic!("first acquire must be primary");
        };
        let (tx, mut rx) = mpsc::unbounded_channel();
        tokio::spawn(serve(listener, tx));

        let Acquired::Secondary(stream) = acquire(&path).await.unwrap() else {
            panic!("second acquire must be secondary");
        };
        forward(stream, Some("popcorn://chat")).await.unwrap();
        assert_eq!(
            rx.recv().await,
            Some(Activation {
                url: Some("popcorn://chat".into())
            })
        );

        let Acquired::Secondary(stream) = acquire(&path).await.unwrap() else {
            panic!("third acquire must be secondary");
        };
        forward(stream, None).await.unwrap();
        assert_eq!(rx.recv().await, Some(Activation { url: None }));
    }

    #[tokio::test]
    async fn stale_socket_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("popcorn.sock");
        drop(UnixListener::bind(&path).unwrap());
        assert!(path.exists());
        assert!(matches!(
            acquire(&path).await.unwrap(),
            Acquired::Primary(_)
        ));
    }

    #[test]
    fn socket_name_is_per_user() {
        let name = socket_path();
        let file = name.file_name().unwrap().to_string_lossy().into_owned();
        assert!(file.starts_with("popcorn-") && file.ends_with(".sock"));
    }
}
