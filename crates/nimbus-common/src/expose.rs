//! Prometheus text exposition encoding for gathered samples.

use crate::types::Sample;
use std::collections::HashSet;
use std::fmt::Write;

/// Content type of the text exposition format, sent with every push.
pub const TEXT_FORMAT_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Encodes samples in the order they were gathered.
///
/// `# HELP` and `# TYPE` lines are emitted once per metric family, at its
/// first occurrence. Samples of the same family are expected to arrive
/// contiguously, which the collection engine guarantees.
pub fn encode(samples: &[Sample]) -> String {
    let mut out = String::new();
    let mut seen: HashSet<&str> = HashSet::new();

    for sample in samples {
        let desc = &sample.desc;
        if seen.insert(desc.fq_name.as_str()) {
            let _ = writeln!(out, "# HELP {} {}", desc.fq_name, escape_help(&desc.help));
            let _ = writeln!(out, "# TYPE {} {}", desc.fq_name, desc.kind.as_str());
        }

        out.push_str(&desc.fq_name);
        if !sample.labels.is_empty() {
            out.push('{');
            for (i, label) in sample.labels.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                let _ = write!(out, "{}=\"{}\"", label.name, escape_label_value(&label.value));
            }
            out.push('}');
        }
        let _ = writeln!(out, " {}", sample.value);
    }

    out
}

fn escape_help(help: &str) -> String {
    help.replace('\\', "\\\\").replace('\n', "\\n")
}

fn escape_label_value(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Desc, Label, MetricKind};

    fn gauge(name: &str, value: f64, labels: Vec<Label>) -> Sample {
        Sample::new(Desc::new(name, "help text", MetricKind::Gauge), value, labels)
    }

    #[test]
    fn emits_help_and_type_once_per_family() {
        let samples = vec![
            gauge("node_load1", 0.5, vec![]),
            gauge(
                "node_filesystem_size_bytes",
                100.0,
                vec![Label::new("device", "/dev/sda1")],
            ),
            gauge(
                "node_filesystem_size_bytes",
                200.0,
                vec![Label::new("device", "/dev/sdb1")],
            ),
        ];

        let body = encode(&samples);
        assert_eq!(body.matches("# HELP node_filesystem_size_bytes").count(), 1);
        assert_eq!(body.matches("# TYPE node_filesystem_size_bytes gauge").count(), 1);
        assert!(body.contains("node_load1 0.5\n"));
        assert!(body.contains("node_filesystem_size_bytes{device=\"/dev/sda1\"} 100\n"));
        assert!(body.contains("node_filesystem_size_bytes{device=\"/dev/sdb1\"} 200\n"));
    }

    #[test]
    fn preserves_sample_order() {
        let samples = vec![
            gauge("node_a", 1.0, vec![]),
            gauge("node_b", 2.0, vec![]),
            gauge("node_a", 3.0, vec![]),
        ];

        let body = encode(&samples);
        let first = body.find("node_a 1").unwrap();
        let second = body.find("node_b 2").unwrap();
        let third = body.find("node_a 3").unwrap();
        assert!(first < second && second < third);
    }

    #[test]
    fn escapes_label_values() {
        let samples = vec![gauge(
            "node_x",
            1.0,
            vec![Label::new("device", "a\"b\\c\nd")],
        )];

        let body = encode(&samples);
        assert!(body.contains(r#"device="a\"b\\c\nd""#));
    }

    #[test]
    fn counter_family_is_typed_counter() {
        let samples = vec![Sample::new(
            Desc::new("node_network_receive_bytes_total", "rx", MetricKind::Counter),
            42.0,
            vec![Label::new("device", "eth0")],
        )];

        let body = encode(&samples);
        assert!(body.contains("# TYPE node_network_receive_bytes_total counter"));
    }
}
