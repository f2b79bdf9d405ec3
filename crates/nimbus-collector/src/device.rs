//! Mapping from kernel block-device names to stable volume identifiers.
//!
//! Kernel names (`/dev/vda`, `/dev/sdb`) are not stable across reboots or
//! hot-plug events; the volume identifier the platform assigns is. On Linux
//! the mapping comes from the persistent-identity symlink directory
//! (`/dev/disk/by-id`); elsewhere it falls back to partition enumeration.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

#[cfg(target_os = "linux")]
const BY_ID_DIR: &str = "/dev/disk/by-id";

/// Prefix the virtualization driver puts on volume identifiers in the
/// by-id directory.
const VIRTIO_PREFIX: &str = "virtio-";

enum MapSource {
    /// A directory of `<id> -> <device node>` symlinks.
    ByIdDir(PathBuf),
    /// Platform partition enumeration, for hosts without a by-id directory.
    #[cfg(not(target_os = "linux"))]
    Platform,
    /// Fixed entries; refresh keeps them as-is.
    Fixed,
}

/// A replaceable lookup table from kernel device node to stable identifier.
///
/// An empty table is a valid state meaning "no rewriting possible"; an
/// unreadable source never produces an error, only an empty table, so
/// metrics still flow with their raw device labels.
pub struct DeviceMap {
    entries: HashMap<String, String>,
    source: MapSource,
}

impl DeviceMap {
    /// Builds the mapping from the platform's device-identity source.
    pub fn system() -> Self {
        #[cfg(target_os = "linux")]
        {
            Self::from_dir(BY_ID_DIR)
        }
        #[cfg(not(target_os = "linux"))]
        {
            let mut map = Self {
                entries: HashMap::new(),
                source: MapSource::Platform,
            };
            map.rebuild();
            map
        }
    }

    /// Builds the mapping from an explicit by-id style directory.
    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        let mut map = Self {
            entries: HashMap::new(),
            source: MapSource::ByIdDir(dir.into()),
        };
        map.rebuild();
        map
    }

    /// A mapping with fixed entries, unaffected by `rebuild`.
    pub fn fixed(entries: HashMap<String, String>) -> Self {
        Self {
            entries,
            source: MapSource::Fixed,
        }
    }

    /// Re-reads the source and replaces the whole table.
    pub fn rebuild(&mut self) {
        match &self.source {
            MapSource::ByIdDir(dir) => self.entries = scan_by_id_dir(dir),
            #[cfg(not(target_os = "linux"))]
            MapSource::Platform => self.entries = scan_partitions(),
            MapSource::Fixed => {}
        }
    }

    /// Looks up the stable identifier for a reported device value.
    ///
    /// Keys are matched as prefixes of the reported value, not exactly:
    /// the engine reports partitions (`/dev/vda1`) while the identity source
    /// names whole devices (`/dev/vda`).
    pub fn resolve(&self, reported: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(node, _)| reported.starts_with(node.as_str()))
            .map(|(_, id)| id.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn scan_by_id_dir(dir: &Path) -> HashMap<String, String> {
    let mut entries = HashMap::new();

    let read_dir = match fs::read_dir(dir) {
        Ok(read_dir) => read_dir,
        Err(e) => {
            tracing::debug!(dir = %dir.display(), error = %e, "device identity directory unavailable");
            return entries;
        }
    };

    for entry in read_dir.flatten() {
        let name = entry.file_name().to_string_lossy().into_owned();
        let stable_id = name.strip_prefix(VIRTIO_PREFIX).unwrap_or(&name).to_string();

        // Resolve the symlink to the kernel device node; entries that no
        // longer resolve belong to detached devices and are skipped.
        let node = match fs::canonicalize(entry.path()) {
            Ok(node) => node,
            Err(_) => continue,
        };

        entries.insert(node.to_string_lossy().into_owned(), stable_id);
    }

    entries
}

#[cfg(not(target_os = "linux"))]
fn scan_partitions() -> HashMap<String, String> {
    let disks = sysinfo::Disks::new_with_refreshed_list();
    disks
        .iter()
        .map(|disk| {
            (
                disk.mount_point().to_string_lossy().into_owned(),
                disk.name().to_string_lossy().into_owned(),
            )
        })
        .collect()
}
