use std::fmt;

/// A single label key/value pair attached to a sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub name: String,
    pub value: String,
}

impl Label {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Exposition type of a metric family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Gauge,
    Counter,
}

impl MetricKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::Gauge => "gauge",
            MetricKind::Counter => "counter",
        }
    }
}

/// Descriptor of a metric family: fully-qualified name, help text, kind.
///
/// The rendered `Display` form is what the relabeling stage matches watched
/// metric names against, so the `fq_name: "<name>"` fragment is part of the
/// descriptor's contract, not just debug output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Desc {
    pub fq_name: String,
    pub help: String,
    pub kind: MetricKind,
}

impl Desc {
    pub fn new(fq_name: impl Into<String>, help: impl Into<String>, kind: MetricKind) -> Self {
        Self {
            fq_name: fq_name.into(),
            help: help.into(),
            kind,
        }
    }
}

impl fmt::Display for Desc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Desc{{fq_name: \"{}\", help: \"{}\"}}", self.fq_name, self.help)
    }
}

/// One engine-produced measurement: a descriptor, a value, and labels.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub desc: Desc,
    pub value: f64,
    pub labels: Vec<Label>,
}

impl Sample {
    pub fn new(desc: Desc, value: f64, labels: Vec<Label>) -> Self {
        Self { desc, value, labels }
    }
}
