use crate::Collector;
use anyhow::Result;
use nimbus_common::types::{Desc, Label, MetricKind, Sample};
use sysinfo::Disks;

/// Filesystem capacity collector.
///
/// The `device` label carries the raw kernel device node as reported by the
/// platform (e.g. `/dev/vda1`); the relabeling stage rewrites it into the
/// stable volume identifier where one is known.
pub struct FilesystemCollector {
    disks: Disks,
}

impl FilesystemCollector {
    pub fn new() -> Self {
        Self {
            disks: Disks::new_with_refreshed_list(),
        }
    }

    fn size_desc() -> Desc {
        Desc::new(
            "node_filesystem_size_bytes",
            "Filesystem size in bytes.",
            MetricKind::Gauge,
        )
    }

    fn free_desc() -> Desc {
        Desc::new(
            "node_filesystem_free_bytes",
            "Filesystem free space in bytes.",
            MetricKind::Gauge,
        )
    }
}

impl Collector for FilesystemCollector {
    fn name(&self) -> &str {
        "filesystem"
    }

    fn describe(&self) -> Vec<Desc> {
        vec![Self::size_desc(), Self::free_desc()]
    }

    fn collect(&mut self) -> Result<Vec<Sample>> {
        self.disks.refresh();
        let mut samples = Vec::new();

        for disk in self.disks.iter() {
            let labels = vec![
                Label::new("device", disk.name().to_string_lossy()),
                Label::new("mountpoint", disk.mount_point().to_string_lossy()),
                Label::new("fstype", disk.file_system().to_string_lossy()),
            ];

            samples.push(Sample::new(
                Self::size_desc(),
                disk.total_space() as f64,
                labels.clone(),
            ));
            samples.push(Sample::new(
                Self::free_desc(),
                disk.available_space() as f64,
                labels,
            ));
        }

        Ok(samples)
    }
}
