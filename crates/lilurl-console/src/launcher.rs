use async_trait::async_trait;
use std::io;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Opens a resolved original URL for the user.
#[async_trait]
pub trait Launcher: Send + Sync {
    async fn open(&self, url: &str) -> io::Result<()>;
}

/// Hands URLs to the platform's default browser.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemBrowser;

#[async_trait]
impl Launcher for SystemBrowser {
    async fn open(&self, url: &str) -> io::Result<()> {
        debug!(url = %url, "launching browser");

        let status = browser_command(url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await?;

        if status.success() {
            Ok(())
        } else {
            Err(io::Error::other(format!(
                "browser launcher exited with {}",
                status
            )))
        }
    }
}

#[cfg(target_os = "macos")]
fn browser_command(url: &str) -> Command {
    let mut command = Command::new("open");
    command.arg(url);
    command
}

#[cfg(target_os = "windows")]
fn browser_command(url: &str) -> Command {
    let mut command = Command::new("cmd");
    // the empty argument is the window title `start` expects first
    command.args(["/C", "start", "", url]);
    command
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn browser_command(url: &str) -> Command {
    let mut command = Command::new("xdg-open");
    command.arg(url);
    command
}

/// Leaves opening to the user; the console already prints the URL.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBrowser;

#[async_trait]
impl Launcher for NoBrowser {
    async fn open(&self, url: &str) -> io::Result<()> {
        debug!(url = %url, "browser launching disabled");
        Ok(())
    }
}
