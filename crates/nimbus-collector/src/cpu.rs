use crate::Collector;
use anyhow::Result;
use nimbus_common::types::{Desc, Label, MetricKind, Sample};
use sysinfo::System;

pub struct CpuCollector {
    system: System,
}

impl CpuCollector {
    pub fn new() -> Self {
        let mut system = System::new();
        system.refresh_cpu_all();
        Self { system }
    }

    fn usage_desc() -> Desc {
        Desc::new(
            "node_cpu_usage_percent",
            "Aggregate CPU usage in percent.",
            MetricKind::Gauge,
        )
    }

    fn core_usage_desc() -> Desc {
        Desc::new(
            "node_cpu_core_usage_percent",
            "Per-core CPU usage in percent.",
            MetricKind::Gauge,
        )
    }
}

impl Collector for CpuCollector {
    fn name(&self) -> &str {
        "cpu"
    }

    fn describe(&self) -> Vec<Desc> {
        vec![Self::usage_desc(), Self::core_usage_desc()]
    }

    fn collect(&mut self) -> Result<Vec<Sample>> {
        self.system.refresh_cpu_all();
        let mut samples = Vec::new();

        let global_usage = self.system.global_cpu_usage();
        samples.push(Sample::new(Self::usage_desc(), global_usage as f64, vec![]));

        for (i, cpu) in self.system.cpus().iter().enumerate() {
            samples.push(Sample::new(
                Self::core_usage_desc(),
                cpu.cpu_usage() as f64,
                vec![Label::new("core", i.to_string())],
            ));
        }

        Ok(samples)
    }
}
