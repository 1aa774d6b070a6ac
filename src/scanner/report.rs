//! Scan reports and the exit-status policy built on them.

use crate::scanner::traits::{ProbeResult, Reachability};
use serde::Serialize;

/// Ordered results of a scan, one per requested port, ascending by port.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ScanReport {
    results: Vec<ProbeResult>,
}

impl ScanReport {
    /// Build a report from results in any order.
    ///
    /// Pool delivery order is never trusted; this sort is what makes the
    /// report ascending.
    pub fn from_unordered(mut results: Vec<ProbeResult>) -> Self {
        results.sort_by_key(|r| r.port);
        Self { results }
    }

    pub fn results(&self) -> &[ProbeResult] {
        &self.results
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProbeResult> {
        self.results.iter()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Classify the whole report for the exit status.
    ///
    /// Indeterminate counts as not open.
    pub fn verdict(&self) -> Verdict {
        if !self.results.is_empty() && self.results.iter().all(ProbeResult::is_open) {
            Verdict::AllOpen
        } else {
            Verdict::NotAllOpen
        }
    }

    /// Count results by reachability.
    pub fn summary(&self) -> Summary {
        self.results
            .iter()
            .fold(Summary::default(), |mut acc, r| {
                match r.reachability {
                    Reachability::Open => acc.open += 1,
                    Reachability::Closed => acc.closed += 1,
                    Reachability::Indeterminate => acc.indeterminate += 1,
                }
                acc
            })
    }
}

impl<'a> IntoIterator for &'a ScanReport {
    type Item = &'a ProbeResult;
    type IntoIter = std::slice::Iter<'a, ProbeResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}

/// Overall outcome of a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Every requested port is open.
    AllOpen,
    /// At least one port is closed or indeterminate.
    NotAllOpen,
}

impl Verdict {
    /// Process exit code for this verdict.
    pub fn exit_code(self) -> u8 {
        match self {
            Self::AllOpen => 0,
            Self::NotAllOpen => 1,
        }
    }
}

/// Per-reachability counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub open: usize,
    pub closed: usize,
    pub indeterminate: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProbeError;
    use crate::scanner::traits::{ProbeRequest, Protocol, UDP_SILENCE_NOTE};
    use crate::types::{Host, Port};
    use std::time::Duration;

    fn request(port: u16) -> ProbeRequest {
        ProbeRequest::new(
            Host::parse("127.0.0.1").unwrap(),
            Port::new(port).unwrap(),
            Protocol::Udp,
            Duration::from_secs(1),
        )
    }

    fn open(port: u16) -> ProbeResult {
        ProbeResult::open(&request(port), Duration::from_millis(1))
    }

    #[test]
    fn test_sorted_regardless_of_input_order() {
        let report = ScanReport::from_unordered(vec![open(30), open(10), open(20)]);
        let ports: Vec<u16> = report.iter().map(|r| r.port.as_u16()).collect();
        assert_eq!(ports, vec![10, 20, 30]);
    }

    #[test]
    fn test_all_open_verdict() {
        let report = ScanReport::from_unordered(vec![open(1), open(2)]);
        assert_eq!(report.verdict(), Verdict::AllOpen);
        assert_eq!(report.verdict().exit_code(), 0);
    }

    #[test]
    fn test_closed_or_indeterminate_fails() {
        let closed = ProbeResult::closed(&request(2), &ProbeError::Refused, None);
        let report = ScanReport::from_unordered(vec![open(1), closed]);
        assert_eq!(report.verdict(), Verdict::NotAllOpen);

        let unknown =
            ProbeResult::indeterminate(&request(3), UDP_SILENCE_NOTE, Duration::from_secs(1));
        let report = ScanReport::from_unordered(vec![open(1), unknown]);
        assert_eq!(report.verdict(), Verdict::NotAllOpen);
        assert_eq!(report.verdict().exit_code(), 1);
    }

    #[test]
    fn test_empty_report_is_not_success() {
        assert_eq!(ScanReport::default().verdict(), Verdict::NotAllOpen);
    }

    #[test]
    fn test_summary_counts() {
        let closed = ProbeResult::closed(&request(2), &ProbeError::Timeout, None);
        let unknown =
            ProbeResult::indeterminate(&request(3), UDP_SILENCE_NOTE, Duration::from_secs(1));
        let report = ScanReport::from_unordered(vec![open(1), closed, unknown]);
        assert_eq!(
            report.summary(),
            Summary {
                open: 1,
                closed: 1,
                indeterminate: 1
            }
        );
    }
}
