//! Scanner module - probes and the concurrent range orchestrator.
//!
//! A scan dispatches one probe per port in ascending order onto a bounded
//! pool of tokio tasks, collects results as they finish in whatever order,
//! and sorts them by port before handing back a `ScanReport`.

mod job;
mod rate_limiter;
mod report;
mod resolve;
mod tcp;
mod traits;
mod udp;

pub use job::ScanJob;
pub use rate_limiter::RateLimiter;
pub use report::{ScanReport, Summary, Verdict};
pub use tcp::TcpProber;
pub use traits::{
    ProbeRequest, ProbeResult, Prober, Protocol, Reachability, UDP_SILENCE_NOTE,
};
pub use udp::UdpProber;

use crate::error::{ProbeError, ScanError};
use crate::types::Port;
use futures::FutureExt;
use indicatif::ProgressBar;
use std::any::Any;
use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Create the prober for a protocol.
pub fn prober_for(protocol: Protocol) -> Arc<dyn Prober> {
    match protocol {
        Protocol::Tcp => Arc::new(TcpProber::new()),
        Protocol::Udp => Arc::new(UdpProber::new()),
    }
}

/// Probe a single port with the prober matching its protocol.
pub async fn probe(request: &ProbeRequest) -> ProbeResult {
    prober_for(request.protocol).probe(request).await
}

/// Scan every port of `job` and return the ordered report.
pub async fn scan_range(job: ScanJob) -> Result<ScanReport, ScanError> {
    Scan::new(job).run().await
}

/// A configured scan, ready to run.
///
/// # Example
///
/// ```ignore
/// let job = ScanJob::new(host, Protocol::Tcp, "1-1024".parse()?);
/// let report = Scan::new(job).with_cancel(token).run().await?;
/// ```
pub struct Scan {
    job: ScanJob,
    cancel: CancellationToken,
    progress: Option<ProgressBar>,
}

impl Scan {
    pub fn new(job: ScanJob) -> Self {
        Self {
            job,
            cancel: CancellationToken::new(),
            progress: None,
        }
    }

    /// Stop dispatching and abandon in-flight probes once `token` fires.
    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Advance `progress` once per finished probe.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Run with the prober matching the job's protocol.
    pub async fn run(self) -> Result<ScanReport, ScanError> {
        let prober = prober_for(self.job.protocol);
        self.run_with(prober).await
    }

    /// Run with a caller-supplied prober.
    pub async fn run_with(self, prober: Arc<dyn Prober>) -> Result<ScanReport, ScanError> {
        self.job.validate()?;
        if prober.protocol() != self.job.protocol {
            return Err(ScanError::ProtocolMismatch {
                job: self.job.protocol,
                prober: prober.protocol(),
            });
        }

        let start = Instant::now();
        tracing::info!(
            host = %self.job.host,
            protocol = %self.job.protocol,
            ports = %self.job.ports,
            workers = self.job.workers,
            timeout_ms = self.job.timeout.as_millis() as u64,
            "starting scan"
        );

        let report = if self.job.ports.is_single() {
            self.run_single(prober.as_ref()).await?
        } else {
            self.run_pool(prober).await?
        };

        tracing::info!(
            results = report.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "scan complete"
        );
        Ok(report)
    }

    /// One port: probe inline, no pool.
    async fn run_single(&self, prober: &dyn Prober) -> Result<ScanReport, ScanError> {
        let request = self.job.request_for(self.job.ports.start());
        let result = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                return Err(ScanError::Interrupted { completed: 0, total: 1 });
            }
            result = guarded_probe(prober, &request) => result,
        };

        if let Some(pb) = &self.progress {
            pb.inc(1);
        }
        Ok(ScanReport::from_unordered(vec![result]))
    }

    async fn run_pool(&self, prober: Arc<dyn Prober>) -> Result<ScanReport, ScanError> {
        let total = self.job.port_count();
        let semaphore = Arc::new(Semaphore::new(self.job.workers));
        let limiter = RateLimiter::per_second(self.job.rate_limit);
        let collected: Arc<Mutex<Vec<ProbeResult>>> =
            Arc::new(Mutex::new(Vec::with_capacity(total)));
        let mut tasks = JoinSet::new();
        let mut interrupted = false;

        for port in self.job.ports.iter() {
            // Permits are handed out FIFO, so probes start in port order.
            let permit = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    interrupted = true;
                    break;
                }
                permit = Arc::clone(&semaphore).acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            if let Some(limiter) = &limiter {
                tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => {
                        interrupted = true;
                        break;
                    }
                    _ = limiter.wait() => {}
                }
            }

            let request = self.job.request_for(port);
            let prober = Arc::clone(&prober);
            let collected = Arc::clone(&collected);
            let progress = self.progress.clone();

            tasks.spawn(async move {
                let result = guarded_probe(prober.as_ref(), &request).await;
                tracing::debug!(
                    port = %result.port,
                    reachability = %result.reachability,
                    error = ?result.error,
                    "probe finished"
                );
                if let Some(pb) = progress {
                    pb.inc(1);
                }
                collected.lock().await.push(result);
                drop(permit);
            });
        }

        if !interrupted {
            loop {
                tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => {
                        interrupted = true;
                        break;
                    }
                    joined = tasks.join_next() => match joined {
                        None => break,
                        Some(Ok(())) => {}
                        Some(Err(e)) => tracing::warn!(error = %e, "probe task ended abnormally"),
                    },
                }
            }
        }

        if interrupted {
            tasks.abort_all();
            let completed = collected.lock().await.len();
            tracing::warn!(completed, total, "scan interrupted");
            return Err(ScanError::Interrupted { completed, total });
        }

        let mut results = std::mem::take(&mut *collected.lock().await);
        self.fill_missing(&mut results);
        Ok(ScanReport::from_unordered(results))
    }

    /// Give any port that produced no result a closed entry.
    fn fill_missing(&self, results: &mut Vec<ProbeResult>) {
        if results.len() == self.job.port_count() {
            return;
        }
        let seen: HashSet<Port> = results.iter().map(|r| r.port).collect();
        let missing: Vec<Port> = self.job.ports.iter().filter(|p| !seen.contains(p)).collect();
        for port in missing {
            tracing::warn!(%port, "no result recorded for port");
            let request = self.job.request_for(port);
            let cause = ProbeError::Fault("probe task ended without a result".to_string());
            results.push(ProbeResult::closed(&request, &cause, None));
        }
    }
}

/// Run one probe, turning a panic into a closed result.
async fn guarded_probe(prober: &dyn Prober, request: &ProbeRequest) -> ProbeResult {
    match AssertUnwindSafe(prober.probe(request)).catch_unwind().await {
        Ok(result) => result,
        Err(payload) => {
            let cause = ProbeError::Fault(panic_message(payload.as_ref()));
            tracing::error!(port = %request.port, error = %cause, "probe panicked");
            ProbeResult::closed(request, &cause, None)
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "probe panicked".to_string()
    }
}
