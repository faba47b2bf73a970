//! HTTP readiness polling against the backend health endpoint.

use crate::error::Result as SupervisorResult;
use crate::{HEALTH_PATH, STEP_READY, StartupStep, StatusReporter};

use std::time::{Duration, Instant};

use rchic_config::ReadinessConfig;
use reqwest::StatusCode;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeSchedule {
    pub max_attempts: u32,
    pub attempt_timeout: Duration,
    pub interval: Duration,
}

impl From<&ReadinessConfig> for ProbeSchedule {
    fn from(config: &ReadinessConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            attempt_timeout: config.attempt_timeout(),
            interval: config.interval(),
        }
    }
}

/// Result of a polling run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessState {
    pub attempts: u32,
    pub elapsed: Duration,
    pub ready: bool,
}

pub struct ReadinessProbe {
    client: reqwest::Client,
    host: String,
}

impl ReadinessProbe {
    pub fn new(host: impl Into<String>) -> SupervisorResult<Self> {
        // Loopback traffic must never go through a configured proxy
        let client = reqwest::Client::builder()
            .no_proxy()
            .pool_max_idle_per_host(1)
            .build()?;

        Ok(Self {
            client,
            host: host.into(),
        })
    }

    pub fn health_url(&self, port: u16) -> String {
        format!("http://{}:{port}{HEALTH_PATH}", self.host)
    }

    /// One request; only a 200 counts.
    pub async fn check(&self, port: u16, timeout: Duration) -> bool {
        let url = self.health_url(port);
        match self.client.get(&url).timeout(timeout).send().await {
            Ok(resp) if resp.status() == StatusCode::OK => true,
            Ok(resp) => {
                debug!("Health check returned HTTP {}", resp.status());
                false
            }
            Err(e) => {
                debug!("Health check failed: {e}");
                false
            }
        }
    }

    /// Poll until the backend answers or the schedule runs out. Never fails:
    /// running out only means the UI may load against a server still warming up.
    pub async fn wait_until_ready(
        &self,
        port: u16,
        schedule: ProbeSchedule,
        reporter: &dyn StatusReporter,
    ) -> ReadinessState {
        let start = Instant::now();
        let max_attempts = schedule.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            reporter.report(
                StartupStep::pending(STEP_READY, "Waiting for the R server to respond")
                    .with_detail(format!("attempt {attempt}/{max_attempts}")),
            );

            if self.check(port, schedule.attempt_timeout).await {
                let elapsed = start.elapsed();
                info!("R server ready after {attempt} attempt(s) in {elapsed:?}");
                reporter.report(
                    StartupStep::success(STEP_READY, "R server is ready")
                        .with_detail(format!("{attempt} attempt(s), {} ms", elapsed.as_millis())),
                );
                return ReadinessState {
                    attempts: attempt,
                    elapsed,
                    ready: true,
                };
            }

            if attempt < max_attempts {
                tokio::time::sleep(schedule.interval).await;
            }
        }

        let elapsed = start.elapsed();
        warn!("R server did not answer {HEALTH_PATH} after {max_attempts} attempts, proceeding anyway");
        reporter.report(
            StartupStep::warning(STEP_READY, "R server may not be fully ready")
                .with_detail(format!("No response after {max_attempts} attempts")),
        );

        ReadinessState {
            attempts: max_attempts,
            elapsed,
            ready: false,
        }
    }
}
