//! CPU introspection.
//!
//! Gathers what the operating system exposes about the processor: counts,
//! model, frequency, cache, feature flags, current usage, temperature and
//! whether it looks virtualized. Anything unavailable is left empty; no
//! step here is allowed to fail the report.
//!
//! On Linux the data comes from `/proc/cpuinfo`, `/proc/stat` and
//! `/sys/class/thermal`. On macOS it comes from `sysctl`.

use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tokio::process::Command;

/// Logical and physical processor counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CpuCount {
    pub logical: usize,
    pub physical: usize,
}

/// Everything known about the host CPU.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CpuInfo {
    pub count: CpuCount,
    pub platform: String,
    pub architecture: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mhz: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_size: Option<String>,
    /// Per-level cache sizes, e.g. `"L2" => "4096 KB"` (macOS).
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub caches: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flag_count: Option<usize>,
    /// Busy percentage over the sampling interval.
    pub usage: Option<f64>,
    /// Degrees Celsius.
    pub temperature: Option<f64>,
    #[serde(rename = "virtual")]
    pub is_virtual: bool,
}

impl CpuInfo {
    /// Drop the flag list but keep its count.
    pub fn without_flags(mut self) -> Self {
        self.flags.clear();
        self
    }
}

/// Fields parsed out of `/proc/cpuinfo`. Only the first processor block is
/// used for descriptive fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CpuinfoFields {
    pub model: Option<String>,
    pub vendor: Option<String>,
    pub mhz: Option<f64>,
    pub cache_size: Option<String>,
    pub flags: Vec<String>,
    /// Distinct `(physical id, core id)` pairs, when the kernel reports them.
    pub physical_cores: Option<usize>,
}

/// Parse the text of `/proc/cpuinfo`.
pub fn parse_cpuinfo(text: &str) -> CpuinfoFields {
    let mut fields = CpuinfoFields::default();
    let mut cores: HashSet<(String, String)> = HashSet::new();
    let mut physical_id: Option<String> = None;

    for line in text.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim();

        match key {
            "processor" => physical_id = None,
            "model name" | "Model" if fields.model.is_none() => {
                fields.model = Some(value.to_string());
            }
            "vendor_id" | "CPU implementer" if fields.vendor.is_none() => {
                fields.vendor = Some(value.to_string());
            }
            "cpu MHz" if fields.mhz.is_none() => fields.mhz = value.parse().ok(),
            "cache size" if fields.cache_size.is_none() => {
                fields.cache_size = Some(value.to_string());
            }
            "flags" | "Features" if fields.flags.is_empty() => {
                fields.flags = value.split_whitespace().map(str::to_string).collect();
            }
            "physical id" => physical_id = Some(value.to_string()),
            "core id" => {
                if let Some(pid) = &physical_id {
                    cores.insert((pid.clone(), value.to_string()));
                }
            }
            _ => {}
        }
    }

    if !cores.is_empty() {
        fields.physical_cores = Some(cores.len());
    }
    fields
}

/// Aggregate jiffies from the first line of `/proc/stat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuTimes {
    pub user: u64,
    pub nice: u64,
    pub system: u64,
    pub idle: u64,
}

impl CpuTimes {
    fn busy(&self) -> u64 {
        self.user + self.nice + self.system
    }

    fn total(&self) -> u64 {
        self.busy() + self.idle
    }
}

/// Parse the aggregate `cpu` line of `/proc/stat`.
pub fn parse_proc_stat(text: &str) -> Option<CpuTimes> {
    let line = text.lines().next()?;
    let mut parts = line.split_whitespace();
    if parts.next()? != "cpu" {
        return None;
    }
    let mut next = || parts.next()?.parse::<u64>().ok();
    Some(CpuTimes {
        user: next()?,
        nice: next()?,
        system: next()?,
        idle: next()?,
    })
}

/// Busy percentage between two samples, or since boot when `before` is
/// `None`.
pub fn usage_between(before: Option<CpuTimes>, after: CpuTimes) -> Option<f64> {
    let (busy, total) = match before {
        Some(b) => (
            after.busy().saturating_sub(b.busy()),
            after.total().saturating_sub(b.total()),
        ),
        None => (after.busy(), after.total()),
    };
    if total == 0 {
        return Some(0.0);
    }
    Some(busy as f64 * 100.0 / total as f64)
}

const VIRTUAL_MARKERS: &[&str] = &["qemu", "kvm", "virtual", "vmware", "xen"];

/// Whether parsed cpuinfo points at a hypervisor.
///
/// Only the `hypervisor` flag and the model and vendor strings count;
/// other lines such as `address sizes` mention "virtual" on bare metal.
pub fn detect_virtual(fields: &CpuinfoFields) -> bool {
    if fields.flags.iter().any(|f| f == "hypervisor") {
        return true;
    }
    [fields.model.as_deref(), fields.vendor.as_deref()]
        .into_iter()
        .flatten()
        .map(str::to_lowercase)
        .any(|text| VIRTUAL_MARKERS.iter().any(|m| text.contains(m)))
}

/// First readable thermal zone under `root`, in degrees Celsius.
pub fn read_temperature(root: &Path) -> Option<f64> {
    let mut zones: Vec<_> = fs::read_dir(root)
        .ok()?
        .filter_map(Result::ok)
        .filter(|entry| entry.file_name().to_string_lossy().starts_with("thermal_zone"))
        .map(|entry| entry.path())
        .collect();
    zones.sort();

    zones.iter().find_map(|zone| {
        let raw = fs::read_to_string(zone.join("temp")).ok()?;
        let millidegrees: f64 = raw.trim().parse().ok()?;
        Some(millidegrees / 1000.0)
    })
}

fn logical_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Gather CPU information. Usage is sampled over `sample`; a zero interval
/// reports the average since boot.
pub async fn gather(sample: Duration) -> CpuInfo {
    let logical = logical_count();
    let mut info = CpuInfo {
        count: CpuCount {
            logical,
            physical: logical,
        },
        platform: std::env::consts::OS.to_string(),
        architecture: std::env::consts::ARCH.to_string(),
        model: None,
        vendor: None,
        mhz: None,
        cache_size: None,
        caches: BTreeMap::new(),
        flags: Vec::new(),
        flag_count: None,
        usage: None,
        temperature: None,
        is_virtual: false,
    };

    if cfg!(target_os = "linux") {
        gather_linux(&mut info, sample).await;
    } else if cfg!(target_os = "macos") {
        gather_macos(&mut info).await;
    }

    if !info.flags.is_empty() {
        info.flag_count = Some(info.flags.len());
    }
    tracing::debug!(?info, "gathered cpu info");
    info
}

async fn gather_linux(info: &mut CpuInfo, sample: Duration) {
    if let Ok(text) = fs::read_to_string("/proc/cpuinfo") {
        let fields = parse_cpuinfo(&text);
        info.is_virtual = detect_virtual(&fields);
        info.model = fields.model;
        info.vendor = fields.vendor;
        info.mhz = fields.mhz;
        info.cache_size = fields.cache_size;
        info.flags = fields.flags;
        if let Some(physical) = fields.physical_cores {
            info.count.physical = physical;
        }
    } else {
        tracing::debug!("/proc/cpuinfo not readable");
    }

    let read_stat = || {
        fs::read_to_string("/proc/stat")
            .ok()
            .and_then(|t| parse_proc_stat(&t))
    };
    let before = if sample.is_zero() {
        None
    } else {
        let first = read_stat();
        tokio::time::sleep(sample).await;
        first
    };
    info.usage = read_stat().and_then(|after| usage_between(before, after));
    info.temperature = read_temperature(Path::new("/sys/class/thermal"));
}

async fn gather_macos(info: &mut CpuInfo) {
    info.model = sysctl("machdep.cpu.brand_string").await;
    info.mhz = sysctl("hw.cpufrequency")
        .await
        .and_then(|hz| hz.parse::<f64>().ok())
        .map(|hz| hz / 1_000_000.0);

    for (key, label) in [
        ("hw.l1icachesize", "L1I"),
        ("hw.l1dcachesize", "L1D"),
        ("hw.l2cachesize", "L2"),
        ("hw.l3cachesize", "L3"),
    ] {
        if let Some(bytes) = sysctl(key).await.and_then(|v| v.parse::<u64>().ok()) {
            info.caches
                .insert(label.to_string(), format!("{:.0} KB", bytes as f64 / 1024.0));
        }
    }

    if let Some(features) = sysctl("machdep.cpu.features").await {
        info.flags = features.split_whitespace().map(str::to_string).collect();
    }
    info.is_virtual = sysctl("kern.hv_vmm_present").await.as_deref() == Some("1");
    if let Some(physical) = sysctl("hw.physicalcpu").await.and_then(|v| v.parse().ok()) {
        info.count.physical = physical;
    }
}

async fn sysctl(key: &str) -> Option<String> {
    let output = Command::new("sysctl")
        .args(["-n", key])
        .output()
        .await
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!value.is_empty()).then_some(value)
}
