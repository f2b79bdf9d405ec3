//! Metric collection engine for the nimbus agent.
//!
//! Each [`Collector`] implementation gathers one category of system metrics
//! (CPU, memory, filesystem, load, network) and returns them as a vector of
//! [`Sample`]s. [`NodeEngine`] aggregates the collectors behind the
//! [`MetricSource`] streaming interface, and
//! [`relabel::RelabelSource`] wraps an engine to rewrite raw block-device
//! labels into stable volume identifiers.

pub mod cpu;
pub mod device;
pub mod filesystem;
pub mod load;
pub mod memory;
pub mod network;
pub mod relabel;

#[cfg(test)]
mod tests;

use anyhow::Result;
use nimbus_common::types::{Desc, Sample};
use std::sync::mpsc::SyncSender;

/// A system metric collector that runs on the agent host.
///
/// Implementations are registered in the engine and called once per
/// collection pass. The trait requires `Send` so a pass can run on a
/// dedicated worker thread.
pub trait Collector: Send {
    /// Returns the collector name (e.g., `"cpu"`, `"filesystem"`), used for
    /// logging.
    fn name(&self) -> &str;

    /// Returns the descriptors of every metric family this collector emits.
    fn describe(&self) -> Vec<Desc>;

    /// Collects current metric values.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying system API call fails.
    fn collect(&mut self) -> Result<Vec<Sample>>;
}

/// A producer of a metric sample stream.
///
/// `collect` runs one synchronous collection pass, sending each sample
/// through the bounded channel as it is produced. The caller owns the
/// receiving end; the pass is over when the sender side is dropped.
pub trait MetricSource: Send {
    fn describe(&self) -> Vec<Desc>;

    fn collect(&mut self, out: &SyncSender<Sample>);
}

/// The collection engine: a fixed set of collectors run in order.
pub struct NodeEngine {
    collectors: Vec<Box<dyn Collector>>,
}

impl NodeEngine {
    pub fn new(collectors: Vec<Box<dyn Collector>>) -> Self {
        Self { collectors }
    }

    /// Engine with the default collector set.
    pub fn with_default_collectors() -> Self {
        Self::new(vec![
            Box::new(cpu::CpuCollector::new()),
            Box::new(memory::MemoryCollector::new()),
            Box::new(filesystem::FilesystemCollector::new()),
            Box::new(load::LoadCollector::new()),
            Box::new(network::NetworkCollector::new()),
        ])
    }
}

impl MetricSource for NodeEngine {
    fn describe(&self) -> Vec<Desc> {
        self.collectors.iter().flat_map(|c| c.describe()).collect()
    }

    fn collect(&mut self, out: &SyncSender<Sample>) {
        for collector in &mut self.collectors {
            match collector.collect() {
                Ok(samples) => {
                    for sample in samples {
                        if out.send(sample).is_err() {
                            // Receiver hung up; the pass is abandoned.
                            return;
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(collector = collector.name(), error = %e, "collection failed");
                }
            }
        }
    }
}

/// Runs one full collection pass and gathers the stream into a vector.
///
/// The source produces on a dedicated thread through a bounded handoff
/// channel; samples arrive here in emission order.
pub fn gather<S: MetricSource>(source: &mut S) -> Vec<Sample> {
    let (tx, rx) = std::sync::mpsc::sync_channel(1);
    std::thread::scope(|scope| {
        scope.spawn(move || source.collect(&tx));
        rx.iter().collect()
    })
}
