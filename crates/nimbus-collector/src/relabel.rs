//! Device-label rewriting over a metric sample stream.

use crate::device::DeviceMap;
use crate::MetricSource;
use nimbus_common::types::{Desc, Sample};
use std::sync::mpsc::{sync_channel, SyncSender};
use std::thread;

/// Metric families whose `device` label is rewritten to the stable volume
/// identifier.
pub const WATCHED_DEVICE_METRICS: &[&str] =
    &["node_filesystem_size_bytes", "node_filesystem_free_bytes"];

const DEVICE_LABEL: &str = "device";

/// Wraps a [`MetricSource`] and rewrites the `device` label of watched
/// samples as they stream through.
///
/// The mapping is built once at construction. On a lookup miss the raw
/// value passes through unchanged; with `refresh_on_miss` enabled, a miss
/// triggers at most one full mapping rebuild per collection pass before the
/// value is given up on.
pub struct RelabelSource<S> {
    inner: S,
    devices: DeviceMap,
    refresh_on_miss: bool,
}

impl<S: MetricSource> RelabelSource<S> {
    pub fn new(inner: S, devices: DeviceMap) -> Self {
        Self {
            inner,
            devices,
            refresh_on_miss: false,
        }
    }

    /// Enables the stricter rebuild-on-miss mode.
    pub fn refresh_on_miss(mut self, enabled: bool) -> Self {
        self.refresh_on_miss = enabled;
        self
    }

    fn is_watched(desc: &Desc) -> bool {
        let rendered = desc.to_string().to_lowercase();
        WATCHED_DEVICE_METRICS
            .iter()
            .any(|name| rendered.contains(&format!("fq_name: \"{name}\"")))
    }

    /// Rewrites the first `device` label via prefix lookup. Returns false
    /// only when a `device` label exists but no mapping key matched it.
    fn rewrite(devices: &DeviceMap, sample: &mut Sample) -> bool {
        for label in &mut sample.labels {
            if label.name == DEVICE_LABEL {
                return match devices.resolve(&label.value) {
                    Some(stable_id) => {
                        label.value = stable_id.to_string();
                        true
                    }
                    None => false,
                };
            }
        }
        true
    }
}

impl<S: MetricSource> MetricSource for RelabelSource<S> {
    fn describe(&self) -> Vec<Desc> {
        self.inner.describe()
    }

    fn collect(&mut self, out: &SyncSender<Sample>) {
        let Self {
            inner,
            devices,
            refresh_on_miss,
        } = self;

        let (tx, rx) = sync_channel(1);
        thread::scope(|scope| {
            scope.spawn(move || inner.collect(&tx));

            let mut rebuilt = false;
            for mut sample in rx {
                if Self::is_watched(&sample.desc) {
                    let resolved = Self::rewrite(devices, &mut sample);
                    if !resolved && *refresh_on_miss && !rebuilt {
                        // The attached-device set may have changed since the
                        // mapping was built; rebuild once and recheck.
                        rebuilt = true;
                        devices.rebuild();
                        Self::rewrite(devices, &mut sample);
                    }
                }
                if out.send(sample).is_err() {
                    return;
                }
            }
        });
    }
}
