use crate::Collector;
use anyhow::Result;
use nimbus_common::types::{Desc, MetricKind, Sample};
use sysinfo::System;

pub struct MemoryCollector {
    system: System,
}

impl MemoryCollector {
    pub fn new() -> Self {
        Self {
            system: System::new(),
        }
    }

    fn descs() -> [Desc; 5] {
        [
            Desc::new(
                "node_memory_total_bytes",
                "Total physical memory in bytes.",
                MetricKind::Gauge,
            ),
            Desc::new(
                "node_memory_used_bytes",
                "Memory in use in bytes.",
                MetricKind::Gauge,
            ),
            Desc::new(
                "node_memory_available_bytes",
                "Memory available for new allocations in bytes.",
                MetricKind::Gauge,
            ),
            Desc::new(
                "node_memory_swap_total_bytes",
                "Total swap space in bytes.",
                MetricKind::Gauge,
            ),
            Desc::new(
                "node_memory_swap_used_bytes",
                "Swap space in use in bytes.",
                MetricKind::Gauge,
            ),
        ]
    }
}

impl Collector for MemoryCollector {
    fn name(&self) -> &str {
        "memory"
    }

    fn describe(&self) -> Vec<Desc> {
        Self::descs().to_vec()
    }

    fn collect(&mut self) -> Result<Vec<Sample>> {
        self.system.refresh_memory();
        let [total, used, available, swap_total, swap_used] = Self::descs();

        Ok(vec![
            Sample::new(total, self.system.total_memory() as f64, vec![]),
            Sample::new(used, self.system.used_memory() as f64, vec![]),
            Sample::new(available, self.system.available_memory() as f64, vec![]),
            Sample::new(swap_total, self.system.total_swap() as f64, vec![]),
            Sample::new(swap_used, self.system.used_swap() as f64, vec![]),
        ])
    }
}
