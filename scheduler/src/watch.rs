// Watch loop: follows every schedule and logs it as it becomes due
//
// Nothing is executed; the loop only reports when work would start and
// asks each recurrence for its following instant.

use crate::catalog::Catalog;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use recurrence::Clock;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

pub struct Watcher {
    catalog: Catalog,
    clock: Arc<dyn Clock>,
    max_sleep: Duration,
    /// Next due instant per schedule; absent once a schedule can no longer run.
    pending: BTreeMap<String, DateTime<Utc>>,
}

impl Watcher {
    pub fn new(catalog: Catalog, clock: Arc<dyn Clock>, max_sleep: Duration) -> Self {
        Self {
            catalog,
            clock,
            max_sleep,
            pending: BTreeMap::new(),
        }
    }

    /// Report run-on-startup schedules and compute every first due instant.
    /// Returns the names that run on startup.
    pub fn start(&mut self) -> Vec<String> {
        let now = self.clock.now();
        let mut startup = Vec::new();

        if self.catalog.is_empty() {
            warn!("Schedule catalog is empty; nothing will come due");
        }

        for (name, frequency) in &self.catalog.entries {
            if frequency.run_on_startup() {
                info!(schedule = %name, "Schedule runs on startup");
                startup.push(name.clone());
            }
            match frequency.next_execution(now) {
                Some(next) => {
                    info!(schedule = %name, next = %next, "Schedule armed");
                    self.pending.insert(name.clone(), next);
                }
                None => {
                    info!(schedule = %name, "Schedule will not run");
                }
            }
        }
        startup
    }

    /// Log and re-arm every schedule due at or before the clock's now.
    /// Returns the names that came due.
    #[instrument(skip(self))]
    pub fn poll(&mut self) -> Vec<String> {
        let now = self.clock.now();
        let due: Vec<(String, DateTime<Utc>)> = self
            .pending
            .iter()
            .filter(|(_, at)| **at <= now)
            .map(|(name, at)| (name.clone(), *at))
            .collect();

        for (name, at) in &due {
            info!(schedule = %name, due_at = %at, "Schedule is due");
            let following = at
                .checked_add_signed(ChronoDuration::seconds(1))
                .map(|from| from.max(now))
                .and_then(|from| self.catalog.entries.get(name)?.next_execution(from));
            match following {
                Some(next) => {
                    debug!(schedule = %name, next = %next, "Schedule re-armed");
                    self.pending.insert(name.clone(), next);
                }
                None => {
                    warn!(schedule = %name, "Schedule has no further executions");
                    self.pending.remove(name);
                }
            }
        }

        due.into_iter().map(|(name, _)| name).collect()
    }

    /// Time until the earliest pending instant, capped at the maximum sleep.
    pub fn sleep_duration(&self) -> Duration {
        let now = self.clock.now();
        self.pending
            .values()
            .min()
            .map(|next| (*next - now).to_std().unwrap_or(Duration::ZERO))
            .map_or(self.max_sleep, |wait| wait.min(self.max_sleep))
    }

    pub fn pending(&self) -> &BTreeMap<String, DateTime<Utc>> {
        &self.pending
    }

    /// Run until ctrl-c.
    pub async fn run(mut self) -> anyhow::Result<()> {
        info!(
            schedules = self.catalog.entries.len(),
            max_sleep_seconds = self.max_sleep.as_secs(),
            "Starting watch loop"
        );
        self.start();

        loop {
            let wait = self.sleep_duration();
            debug!(wait_ms = wait.as_millis() as u64, "Waiting for next due schedule");

            tokio::select! {
                _ = sleep(wait) => {
                    self.poll();
                }
                signal = tokio::signal::ctrl_c() => {
                    signal?;
                    info!("Received Ctrl+C signal, stopping watch loop");
                    break;
                }
            }
        }

        info!("Watch loop stopped");
        Ok(())
    }
}
