use async_trait::async_trait;
use hostcheck::error::{InputError, ProbeError, ScanError};
use hostcheck::scanner::{
    scan_range, ProbeRequest, ProbeResult, Prober, Protocol, Reachability, Scan, ScanJob, Verdict,
    UDP_SILENCE_NOTE,
};
use hostcheck::types::{Host, PortRange};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, UdpSocket};

fn localhost() -> Host {
    Host::parse("127.0.0.1").unwrap()
}

fn job(ports: &str) -> ScanJob {
    ScanJob::new(localhost(), Protocol::Tcp, ports.parse::<PortRange>().unwrap())
}

/// Even ports open, odd ports closed, with a per-port delay that finishes
/// probes out of order.
struct ParityProber;

#[async_trait]
impl Prober for ParityProber {
    fn protocol(&self) -> Protocol {
        Protocol::Tcp
    }

    async fn probe(&self, request: &ProbeRequest) -> ProbeResult {
        let port = request.port.as_u16();
        tokio::time::sleep(Duration::from_millis(u64::from(7 - port % 7))).await;
        if port % 2 == 0 {
            ProbeResult::open(request, Duration::from_millis(1))
        } else {
            ProbeResult::closed(request, &ProbeError::Refused, Some(Duration::from_millis(1)))
        }
    }
}

/// Tracks the highest number of probes in flight at once.
#[derive(Default)]
struct CountingProber {
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    calls: AtomicUsize,
}

#[async_trait]
impl Prober for CountingProber {
    fn protocol(&self) -> Protocol {
        Protocol::Tcp
    }

    async fn probe(&self, request: &ProbeRequest) -> ProbeResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(5)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        ProbeResult::open(request, Duration::from_millis(5))
    }
}

/// Answers with a fixed reachability.
struct FixedProber(Reachability);

#[async_trait]
impl Prober for FixedProber {
    fn protocol(&self) -> Protocol {
        Protocol::Tcp
    }

    async fn probe(&self, request: &ProbeRequest) -> ProbeResult {
        match self.0 {
            Reachability::Open => ProbeResult::open(request, Duration::ZERO),
            Reachability::Closed => ProbeResult::closed(request, &ProbeError::Timeout, None),
            Reachability::Indeterminate => {
                ProbeResult::indeterminate(request, UDP_SILENCE_NOTE, Duration::ZERO)
            }
        }
    }
}

#[tokio::test]
async fn report_has_one_entry_per_port_in_order() {
    let report = Scan::new(job("100-140").with_workers(8))
        .run_with(Arc::new(ParityProber))
        .await
        .unwrap();

    let ports: Vec<u16> = report.iter().map(|r| r.port.as_u16()).collect();
    assert_eq!(ports, (100..=140).collect::<Vec<_>>());
}

#[tokio::test]
async fn worker_count_does_not_change_report() {
    let serial = Scan::new(job("1-30").with_workers(1))
        .run_with(Arc::new(ParityProber))
        .await
        .unwrap();
    let parallel = Scan::new(job("1-30").with_workers(16))
        .run_with(Arc::new(ParityProber))
        .await
        .unwrap();

    assert_eq!(serial, parallel);
}

#[tokio::test]
async fn in_flight_probes_never_exceed_workers() {
    let prober = Arc::new(CountingProber::default());
    let report = Scan::new(job("1-40").with_workers(3))
        .run_with(prober.clone())
        .await
        .unwrap();

    assert_eq!(report.len(), 40);
    assert_eq!(prober.calls.load(Ordering::SeqCst), 40);
    assert!(prober.peak.load(Ordering::SeqCst) <= 3);
}

#[tokio::test]
async fn rejected_job_dispatches_nothing() {
    let prober = Arc::new(CountingProber::default());
    let result = Scan::new(job("1-5").with_workers(0))
        .run_with(prober.clone())
        .await;

    assert!(matches!(result, Err(ScanError::InvalidJob(InputError::Workers))));
    assert_eq!(prober.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn malformed_port_specs_are_rejected() {
    for spec in ["abc", "80-", "-5", "500-10", "0", "70000", "1-2-3", ""] {
        assert!(spec.parse::<PortRange>().is_err(), "{spec:?} should not parse");
    }
}

#[tokio::test]
async fn verdict_requires_every_port_open() {
    for (reachability, expected) in [
        (Reachability::Open, Verdict::AllOpen),
        (Reachability::Closed, Verdict::NotAllOpen),
        (Reachability::Indeterminate, Verdict::NotAllOpen),
    ] {
        let report = Scan::new(job("10-12"))
            .run_with(Arc::new(FixedProber(reachability)))
            .await
            .unwrap();
        assert_eq!(report.verdict(), expected);
    }
    assert_eq!(Verdict::AllOpen.exit_code(), 0);
    assert_eq!(Verdict::NotAllOpen.exit_code(), 1);
}

#[tokio::test]
async fn tcp_range_against_local_listener() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let open = listener.local_addr().unwrap().port();
    let start = open - 2;

    let job = job(&format!("{start}-{open}")).with_timeout(Duration::from_secs(2));
    let report = tokio_test::assert_ok!(scan_range(job).await);

    assert_eq!(report.len(), 3);
    let last = &report.results()[2];
    assert_eq!(last.port.as_u16(), open);
    assert_eq!(last.reachability, Reachability::Open);
    assert!(last.error.is_none());
    assert!(last.latency_ms.is_some());
}

#[tokio::test]
async fn silent_udp_port_is_indeterminate() {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let port = socket.local_addr().unwrap().port();

    let job = ScanJob::new(localhost(), Protocol::Udp, PortRange::single(port.try_into().unwrap()))
        .with_timeout(Duration::from_millis(200));
    let report = tokio_test::assert_ok!(scan_range(job).await);

    assert_eq!(report.len(), 1);
    let result = &report.results()[0];
    assert_eq!(result.reachability, Reachability::Indeterminate);
    assert_eq!(result.error.as_deref(), Some(UDP_SILENCE_NOTE));
    assert_eq!(report.verdict(), Verdict::NotAllOpen);
}

#[tokio::test]
async fn udp_scan_with_enormous_timeout_finds_responder() {
    let server = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let port = server.local_addr().unwrap().port();
    tokio::spawn(async move {
        let mut buf = [0u8; 64];
        if let Ok((_, peer)) = server.recv_from(&mut buf).await {
            let _ = server.send_to(b"pong", peer).await;
        }
    });

    let job = ScanJob::new(localhost(), Protocol::Udp, PortRange::single(port.try_into().unwrap()))
        .with_timeout(Duration::from_secs(u64::MAX));
    let report = tokio_test::assert_ok!(scan_range(job).await);

    let result = &report.results()[0];
    assert_eq!(result.reachability, Reachability::Open);
    assert!(result.error.is_none());
}

#[tokio::test]
async fn unresolvable_host_closes_every_port() {
    let job = ScanJob::new(
        Host::parse("no-such-host.invalid").unwrap(),
        Protocol::Tcp,
        "80-81".parse().unwrap(),
    )
    .with_timeout(Duration::from_secs(2));
    let report = tokio_test::assert_ok!(scan_range(job).await);

    assert_eq!(report.len(), 2);
    for result in &report {
        assert_eq!(result.reachability, Reachability::Closed);
        assert!(result
            .error
            .as_deref()
            .unwrap()
            .starts_with("DNS resolution failed"));
    }
}
