use std::{
    io,
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use chrono::{DateTime, Local};
use sysinfo::{CpuRefreshKind, MemoryRefreshKind, RefreshKind, System};

use crate::{ticker::PeriodicTask, util::human_bytes};

/// a point sample of system load.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Usage {
    pub cpu_percent: f32,
    pub memory_percent: f32,
}

/// static facts about the device, as label/value pairs in display order.
#[derive(Clone, Debug, Default)]
pub struct DeviceSpecs {
    pub entries: Vec<(&'static str, String)>,
}

impl DeviceSpecs {
    pub fn lines(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|(label, value)| format!("{label}: {value}"))
            .collect()
    }
}

/// something that can report device metrics on demand.
pub trait MetricsSource {
    fn usage(&mut self) -> Usage;
    fn specs(&self) -> DeviceSpecs;
}

pub struct SysinfoSource {
    system: System,
}

impl SysinfoSource {
    pub fn new() -> Self {
        let system = System::new_with_specifics(
            RefreshKind::new()
                .with_cpu(CpuRefreshKind::everything())
                .with_memory(MemoryRefreshKind::everything()),
        );
        Self { system }
    }
}

impl Default for SysinfoSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsSource for SysinfoSource {
    fn usage(&mut self) -> Usage {
        self.system.refresh_cpu_usage();
        self.system.refresh_memory();

        let total = self.system.total_memory();
        let memory_percent = if total == 0 {
            0.0
        } else {
            self.system.used_memory() as f32 / total as f32 * 100.0
        };

        Usage {
            cpu_percent: self.system.global_cpu_usage(),
            memory_percent,
        }
    }

    fn specs(&self) -> DeviceSpecs {
        let unknown = || "Unknown".to_string();

        let system = format!(
            "{} {} ({})",
            System::name().unwrap_or_else(unknown),
            System::kernel_version().unwrap_or_else(unknown),
            System::long_os_version().unwrap_or_else(unknown),
        );

        let cpus = self.system.cpus();
        let processor = cpus
            .first()
            .map(|cpu| cpu.brand().trim().to_string())
            .filter(|brand| !brand.is_empty())
            .unwrap_or_else(unknown);
        let physical = self
            .system
            .physical_core_count()
            .map(|n| n.to_string())
            .unwrap_or_else(|| "N/A".to_string());
        let freq = cpus
            .iter()
            .map(|cpu| cpu.frequency())
            .max()
            .filter(|mhz| *mhz > 0)
            .map(|mhz| mhz.to_string())
            .unwrap_or_else(|| "N/A".to_string());

        DeviceSpecs {
            entries: vec![
                ("System", system),
                ("Node", System::host_name().unwrap_or_else(unknown)),
                ("Machine", std::env::consts::ARCH.to_string()),
                ("Processor", processor),
                ("CPU Cores (logical/physical)", format!("{}/{}", cpus.len(), physical)),
                ("CPU Freq (MHz)", freq),
                ("Total RAM", human_bytes(self.system.total_memory())),
                ("Boot Time", format_boot_time(System::boot_time())),
                ("Uptime", format_uptime(System::uptime())),
            ],
        }
    }
}

pub fn format_boot_time(epoch_secs: u64) -> String {
    DateTime::from_timestamp(epoch_secs as i64, 0)
        .map(|utc| utc.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

pub fn format_uptime(secs: u64) -> String {
    let days = secs / 86_400;
    let hours = (secs % 86_400) / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    if days > 0 {
        format!("{days}d {hours:02}:{minutes:02}:{seconds:02}")
    } else {
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    }
}

#[derive(Default)]
struct Readings {
    usage: Option<Usage>,
    specs: DeviceSpecs,
}

/// polls a [`MetricsSource`] in the background and keeps the latest readings.
pub struct MetricsSampler {
    latest: Arc<Mutex<Readings>>,
    _task: PeriodicTask,
}

impl MetricsSampler {
    pub fn spawn<S>(mut source: S, interval: Duration) -> io::Result<Self>
    where
        S: MetricsSource + Send + 'static,
    {
        // the first cpu reading has nothing to diff against; prime it, then
        // let a full interval pass before the first published sample.
        source.usage();

        let latest = Arc::new(Mutex::new(Readings {
            usage: None,
            specs: source.specs(),
        }));
        let slot = Arc::clone(&latest);

        let task = PeriodicTask::spawn_after("metrics-sampler", interval, move || {
            let usage = source.usage();
            let specs = source.specs();
            log::trace!("usage sample {usage:?}");

            let mut readings = slot.lock().unwrap_or_else(|e| e.into_inner());
            readings.usage = Some(usage);
            readings.specs = specs;
        })?;

        Ok(Self { latest, _task: task })
    }

    fn readings(&self) -> MutexGuard<'_, Readings> {
        self.latest.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// `None` until the first sample lands.
    pub fn usage(&self) -> Option<Usage> {
        self.readings().usage
    }

    pub fn specs(&self) -> DeviceSpecs {
        self.readings().specs.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{thread, time::Instant};

    struct FixedSource {
        calls: u32,
    }

    impl MetricsSource for FixedSource {
        fn usage(&mut self) -> Usage {
            self.calls += 1;
            Usage {
                cpu_percent: self.calls as f32,
                memory_percent: 50.0,
            }
        }

        fn specs(&self) -> DeviceSpecs {
            DeviceSpecs {
                entries: vec![("Node", "box".to_string())],
            }
        }
    }

    #[test]
    fn uptime_formats() {
        assert_eq!(format_uptime(59), "00:00:59");
        assert_eq!(format_uptime(3661), "01:01:01");
        assert_eq!(format_uptime(90_061), "1d 01:01:01");
    }

    #[test]
    fn boot_time_uses_the_local_format() {
        let formatted = format_boot_time(0);
        assert_eq!(formatted.len(), "1970-01-01 00:00:00".len());
    }

    #[test]
    fn spec_lines_join_label_and_value() {
        let source = FixedSource { calls: 0 };
        assert_eq!(source.specs().lines(), vec!["Node: box".to_string()]);
    }

    #[test]
    fn sampler_publishes_samples() {
        let sampler =
            MetricsSampler::spawn(FixedSource { calls: 0 }, Duration::from_millis(5)).unwrap();
        assert_eq!(sampler.specs().lines(), ["Node: box"]);

        let deadline = Instant::now() + Duration::from_secs(2);
        while sampler.usage().is_none() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }

        let usage = sampler.usage().unwrap();
        assert!(usage.cpu_percent >= 2.0);
        assert_eq!(usage.memory_percent, 50.0);
    }

    #[test]
    fn first_sample_waits_one_interval() {
        let sampler =
            MetricsSampler::spawn(FixedSource { calls: 0 }, Duration::from_secs(3600)).unwrap();
        thread::sleep(Duration::from_millis(30));
        assert_eq!(sampler.usage(), None);
        assert_eq!(sampler.specs().lines(), ["Node: box"]);
    }

    #[test]
    fn sysinfo_specs_cover_every_label() {
        let specs = SysinfoSource::new().specs();
        let labels: Vec<_> = specs.entries.iter().map(|(label, _)| *label).collect();
        assert_eq!(
            labels,
            [
                "System",
                "Node",
                "Machine",
                "Processor",
                "CPU Cores (logical/physical)",
                "CPU Freq (MHz)",
                "Total RAM",
                "Boot Time",
                "Uptime",
            ]
        );
    }
}
