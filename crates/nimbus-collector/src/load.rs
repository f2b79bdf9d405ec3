use crate::Collector;
use anyhow::Result;
use nimbus_common::types::{Desc, MetricKind, Sample};
use sysinfo::System;

pub struct LoadCollector;

impl LoadCollector {
    pub fn new() -> Self {
        Self
    }

    fn descs() -> [Desc; 4] {
        [
            Desc::new("node_load1", "1m load average.", MetricKind::Gauge),
            Desc::new("node_load5", "5m load average.", MetricKind::Gauge),
            Desc::new("node_load15", "15m load average.", MetricKind::Gauge),
            Desc::new(
                "node_uptime_seconds",
                "Seconds since boot.",
                MetricKind::Gauge,
            ),
        ]
    }
}

impl Collector for LoadCollector {
    fn name(&self) -> &str {
        "load"
    }

    fn describe(&self) -> Vec<Desc> {
        Self::descs().to_vec()
    }

    fn collect(&mut self) -> Result<Vec<Sample>> {
        let load_avg = System::load_average();
        let uptime = System::uptime();
        let [load1, load5, load15, up] = Self::descs();

        Ok(vec![
            Sample::new(load1, load_avg.one, vec![]),
            Sample::new(load5, load_avg.five, vec![]),
            Sample::new(load15, load_avg.fifteen, vec![]),
            Sample::new(up, uptime as f64, vec![]),
        ])
    }
}
