use crate::Collector;
use anyhow::Result;
use nimbus_common::types::{Desc, Label, MetricKind, Sample};
use std::collections::HashMap;
use sysinfo::Networks;

pub struct NetworkCollector {
    networks: Networks,
    prev_received: HashMap<String, u64>,
    prev_transmitted: HashMap<String, u64>,
    prev_packets_received: HashMap<String, u64>,
    prev_packets_transmitted: HashMap<String, u64>,
}

impl NetworkCollector {
    pub fn new() -> Self {
        Self {
            networks: Networks::new_with_refreshed_list(),
            prev_received: HashMap::new(),
            prev_transmitted: HashMap::new(),
            prev_packets_received: HashMap::new(),
            prev_packets_transmitted: HashMap::new(),
        }
    }

    fn descs() -> [Desc; 4] {
        [
            Desc::new(
                "node_network_receive_bytes_total",
                "Bytes received per interface.",
                MetricKind::Counter,
            ),
            Desc::new(
                "node_network_transmit_bytes_total",
                "Bytes transmitted per interface.",
                MetricKind::Counter,
            ),
            Desc::new(
                "node_network_receive_packets_total",
                "Packets received per interface.",
                MetricKind::Counter,
            ),
            Desc::new(
                "node_network_transmit_packets_total",
                "Packets transmitted per interface.",
                MetricKind::Counter,
            ),
        ]
    }
}

impl Collector for NetworkCollector {
    fn name(&self) -> &str {
        "network"
    }

    fn describe(&self) -> Vec<Desc> {
        Self::descs().to_vec()
    }

    fn collect(&mut self) -> Result<Vec<Sample>> {
        self.networks.refresh();
        let mut samples = Vec::new();

        for (name, data) in self.networks.iter() {
            let labels = vec![Label::new("device", name.clone())];

            let received = data.total_received();
            let transmitted = data.total_transmitted();
            let packets_received = data.total_packets_received();
            let packets_transmitted = data.total_packets_transmitted();

            // Delta against the previous pass; first sighting reports zero.
            let rx_delta =
                received.saturating_sub(*self.prev_received.get(name).unwrap_or(&received));
            let tx_delta = transmitted
                .saturating_sub(*self.prev_transmitted.get(name).unwrap_or(&transmitted));
            let prx_delta = packets_received.saturating_sub(
                *self
                    .prev_packets_received
                    .get(name)
                    .unwrap_or(&packets_received),
            );
            let ptx_delta = packets_transmitted.saturating_sub(
                *self
                    .prev_packets_transmitted
                    .get(name)
                    .unwrap_or(&packets_transmitted),
            );

            self.prev_received.insert(name.clone(), received);
            self.prev_transmitted.insert(name.clone(), transmitted);
            self.prev_packets_received
                .insert(name.clone(), packets_received);
            self.prev_packets_transmitted
                .insert(name.clone(), packets_transmitted);

            let [rx, tx, prx, ptx] = Self::descs();
            samples.push(Sample::new(rx, rx_delta as f64, labels.clone()));
            samples.push(Sample::new(tx, tx_delta as f64, labels.clone()));
            samples.push(Sample::new(prx, prx_delta as f64, labels.clone()));
            samples.push(Sample::new(ptx, ptx_delta as f64, labels));
        }

        Ok(samples)
    }
}
