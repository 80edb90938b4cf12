//! Server management - optionally spawning the app under test and waiting
//! until it answers

use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::error::{E2eError, E2eResult};

const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);
const SHUTDOWN_POLL: Duration = Duration::from_millis(25);

/// Handle to the app under test. Owns the process only when it spawned one.
pub struct ServerHandle {
    child: Option<Child>,
    pub base_url: String,
}

impl ServerHandle {
    /// Spawn the app (if a command is configured) and wait for it to be healthy
    pub async fn spawn(config: ServerConfig) -> E2eResult<Self> {
        let base_url = config.base_url.trim_end_matches('/').to_string();

        let child = match &config.command {
            Some(command) => Some(spawn_command(command, &config, &base_url)?),
            None => {
                info!("Using already running app at {}", base_url);
                None
            }
        };

        let handle = ServerHandle { child, base_url };

        // Wait for server to be healthy
        handle
            .wait_for_healthy(&config.health_path, config.startup_timeout)
            .await?;

        info!("App is healthy at {}", handle.base_url);
        Ok(handle)
    }

    /// Wait for the server to respond to health checks
    async fn wait_for_healthy(&self, health_path: &str, timeout_duration: Duration) -> E2eResult<()> {
        let health_url = format!("{}{}", self.base_url, health_path);
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(2))
            .build()?;

        let start = std::time::Instant::now();
        let mut attempts = 0;

        while start.elapsed() < timeout_duration {
            attempts += 1;

            match client.get(&health_url).send().await {
                Ok(resp) if resp.status().is_success() => {
                    return Ok(());
                }
                Ok(resp) => {
                    warn!("Health check returned {}", resp.status());
                }
                Err(e) => {
                    if attempts == 1 {
                        info!("Waiting for app at {} ...", health_url);
                    }
                    // Connection refused is expected while server is starting
                    if !e.is_connect() {
                        warn!("Health check error: {}", e);
                    }
                }
            }

            sleep(Duration::from_millis(100)).await;
        }

        Err(E2eError::ServerHealthCheck(attempts))
    }

    /// Get the base URL for this server
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether this handle started (and will stop) the app process
    pub fn owns_process(&self) -> bool {
        self.child.is_some()
    }

    /// Stop the server: SIGTERM, then kill once the grace period is over
    pub async fn stop(&mut self) -> E2eResult<()> {
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };
        info!("Stopping app (pid: {})", child.id());

        // Try graceful shutdown first
        #[cfg(unix)]
        {
            use nix::sys::signal::{kill, Signal};
            use nix::unistd::Pid;

            let pid = Pid::from_raw(child.id() as i32);
            if kill(pid, Signal::SIGTERM).is_ok() {
                let mut waited = Duration::ZERO;
                while waited < SHUTDOWN_GRACE {
                    if let Ok(Some(_)) = child.try_wait() {
                        return Ok(());
                    }
                    sleep(SHUTDOWN_POLL).await;
                    waited += SHUTDOWN_POLL;
                }
                warn!("App ignored SIGTERM, killing it");
            }
        }

        // Force kill if still running
        let _ = child.kill();
        let _ = child.wait();

        Ok(())
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        // No grace period here: this may run on a runtime worker.
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

fn spawn_command(command: &[String], config: &ServerConfig, base_url: &str) -> E2eResult<Child> {
    let (program, args) = command
        .split_first()
        .ok_or_else(|| E2eError::ServerStartup("empty app command".to_string()))?;

    info!("Spawning app: {}", command.join(" "));

    let mut cmd = Command::new(program);
    cmd.args(args).env("NODE_ENV", "test");

    if let Some(port) = port_of(base_url) {
        cmd.env("PORT", port.to_string());
    }
    if let Some(dir) = &config.working_dir {
        cmd.current_dir(dir);
    }

    cmd.stdout(Stdio::null()).stderr(Stdio::null());

    cmd.spawn().map_err(|e| {
        E2eError::ServerStartup(format!("Failed to spawn {}: {}", program, e))
    })
}

/// Explicit port of an `http://host:port` URL
fn port_of(base_url: &str) -> Option<u16> {
    let authority = base_url.split("://").nth(1)?.split('/').next()?;
    authority.rsplit_once(':')?.1.parse().ok()
}

/// Configuration for reaching (and optionally spawning) the app
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Where the app serves its UI and API
    pub base_url: String,

    /// Program and arguments that start the app; `None` if it is already running
    pub command: Option<Vec<String>>,

    /// Working directory for `command`
    pub working_dir: Option<PathBuf>,

    /// Path polled until it answers 2xx
    pub health_path: String,

    /// Timeout for server startup
    pub startup_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5173".to_string(),
            command: None,
            working_dir: None,
            health_path: "/".to_string(),
            startup_timeout: Duration::from_secs(30),
        }
    }
}
