use crate::device::DeviceMap;
use crate::relabel::RelabelSource;
use crate::{gather, MetricSource};
use nimbus_common::types::{Desc, Label, MetricKind, Sample};
use std::collections::HashMap;
use std::sync::mpsc::SyncSender;

fn filesystem_sample(metric: &str, device: &str, value: f64) -> Sample {
    Sample::new(
        Desc::new(metric, "Filesystem capacity.", MetricKind::Gauge),
        value,
        vec![
            Label::new("device", device),
            Label::new("mountpoint", "/"),
            Label::new("fstype", "ext4"),
        ],
    )
}

fn mapping(entries: &[(&str, &str)]) -> DeviceMap {
    DeviceMap::fixed(
        entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect::<HashMap<_, _>>(),
    )
}

/// A source that replays a fixed list of samples.
struct StaticSource(Vec<Sample>);

impl MetricSource for StaticSource {
    fn describe(&self) -> Vec<Desc> {
        self.0.iter().map(|s| s.desc.clone()).collect()
    }

    fn collect(&mut self, out: &SyncSender<Sample>) {
        for sample in self.0.clone() {
            if out.send(sample).is_err() {
                return;
            }
        }
    }
}

fn device_label(sample: &Sample) -> &str {
    sample
        .labels
        .iter()
        .find(|l| l.name == "device")
        .map(|l| l.value.as_str())
        .expect("sample should carry a device label")
}

#[test]
fn rewrites_device_label_on_prefix_match() {
    let source = StaticSource(vec![filesystem_sample(
        "node_filesystem_size_bytes",
        "/dev/sda1",
        100.0,
    )]);
    let mut relabeled = RelabelSource::new(source, mapping(&[("/dev/sda", "vol-123")]));

    let samples = gather(&mut relabeled);
    assert_eq!(samples.len(), 1);
    assert_eq!(device_label(&samples[0]), "vol-123");
}

#[test]
fn passes_value_through_on_lookup_miss() {
    let source = StaticSource(vec![filesystem_sample(
        "node_filesystem_free_bytes",
        "/dev/sdb1",
        50.0,
    )]);
    let mut relabeled = RelabelSource::new(source, mapping(&[("/dev/sda", "vol-123")]));

    let samples = gather(&mut relabeled);
    assert_eq!(device_label(&samples[0]), "/dev/sdb1");
}

#[test]
fn ignores_samples_of_unwatched_metrics() {
    // A network sample also carries a "device" label, but its descriptor is
    // not watched, so the mapped key must not be applied.
    let source = StaticSource(vec![Sample::new(
        Desc::new(
            "node_network_receive_bytes_total",
            "Bytes received per interface.",
            MetricKind::Counter,
        ),
        42.0,
        vec![Label::new("device", "/dev/sda1")],
    )]);
    let mut relabeled = RelabelSource::new(source, mapping(&[("/dev/sda", "vol-123")]));

    let samples = gather(&mut relabeled);
    assert_eq!(device_label(&samples[0]), "/dev/sda1");
}

#[test]
fn forwards_mapped_and_unmapped_samples_in_emission_order() {
    let source = StaticSource(vec![
        filesystem_sample("node_filesystem_size_bytes", "/dev/sda1", 100.0),
        filesystem_sample("node_filesystem_size_bytes", "/dev/sdb1", 200.0),
    ]);
    let mut relabeled = RelabelSource::new(source, mapping(&[("/dev/sda", "vol-123")]));

    let samples = gather(&mut relabeled);
    assert_eq!(samples.len(), 2);
    assert_eq!(device_label(&samples[0]), "vol-123");
    assert_eq!(samples[0].value, 100.0);
    assert_eq!(device_label(&samples[1]), "/dev/sdb1");
    assert_eq!(samples[1].value, 200.0);
}

#[test]
fn empty_mapping_leaves_all_samples_untouched() {
    let source = StaticSource(vec![filesystem_sample(
        "node_filesystem_size_bytes",
        "/dev/sda1",
        100.0,
    )]);
    let mut relabeled = RelabelSource::new(source, mapping(&[]));

    let samples = gather(&mut relabeled);
    assert_eq!(device_label(&samples[0]), "/dev/sda1");
}

#[test]
fn unreadable_identity_directory_yields_empty_mapping() {
    let map = DeviceMap::from_dir("/nonexistent/disk/by-id");
    assert!(map.is_empty());
    assert_eq!(map.resolve("/dev/sda1"), None);
}

#[cfg(unix)]
#[test]
fn by_id_directory_scan_resolves_symlinks_and_strips_prefix() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let node = tmp.path().join("vda");
    std::fs::write(&node, b"").expect("create device node stand-in");

    let by_id = tmp.path().join("by-id");
    std::fs::create_dir(&by_id).expect("create by-id dir");
    std::os::unix::fs::symlink(&node, by_id.join("virtio-vol-9a8b7c")).expect("symlink");
    // A dangling link models a device that detached since the directory
    // entry was created; it must be skipped, not fail the scan.
    std::os::unix::fs::symlink(tmp.path().join("gone"), by_id.join("virtio-vol-dead"))
        .expect("dangling symlink");

    let map = DeviceMap::from_dir(&by_id);
    assert_eq!(map.len(), 1);

    let canonical = std::fs::canonicalize(&node).expect("canonicalize");
    let resolved = map.resolve(&canonical.to_string_lossy());
    assert_eq!(resolved, Some("vol-9a8b7c"));
}

#[test]
fn refresh_on_miss_is_a_noop_for_fixed_mappings() {
    // Rebuild keeps fixed entries, so the miss still passes through; the
    // point is that the pass completes without touching any platform source.
    let source = StaticSource(vec![
        filesystem_sample("node_filesystem_size_bytes", "/dev/sdc1", 10.0),
        filesystem_sample("node_filesystem_free_bytes", "/dev/sdc1", 5.0),
    ]);
    let mut relabeled =
        RelabelSource::new(source, mapping(&[("/dev/sda", "vol-123")])).refresh_on_miss(true);

    let samples = gather(&mut relabeled);
    assert_eq!(samples.len(), 2);
    assert_eq!(device_label(&samples[0]), "/dev/sdc1");
    assert_eq!(device_label(&samples[1]), "/dev/sdc1");
}

#[test]
fn describe_passes_through_the_wrapped_engine() {
    let source = StaticSource(vec![filesystem_sample(
        "node_filesystem_size_bytes",
        "/dev/sda1",
        100.0,
    )]);
    let relabeled = RelabelSource::new(source, mapping(&[]));

    let descs = relabeled.describe();
    assert_eq!(descs.len(), 1);
    assert_eq!(descs[0].fq_name, "node_filesystem_size_bytes");
}
