//! Port reconciliation.

use crate::applier::ConfigApplier;
use crate::config::{PortConfig, PortQueueConfig, QueueAqmConfig};
use crate::error::{ReconcileError, ReconcileResult};
use crate::map_diff::NodeMapDiff;
use std::collections::BTreeMap;
use std::sync::Arc;
use switchd_state::{AqmConfig, Port, PortMap, PortQueue};

impl<'a> ConfigApplier<'a> {
    /// Reconciles the port map.
    ///
    /// The port set is fixed by the platform: every configured port must
    /// already exist, and ports the config stops listing are reset to
    /// their default (disabled) state rather than removed.
    pub(crate) fn update_ports(&self) -> ReconcileResult<Option<PortMap>> {
        let prev = self.prev;
        let mut diff = NodeMapDiff::new("port");

        // Process all supplied port configs.
        for port_cfg in &self.cfg.ports {
            let orig = prev
                .ports
                .get(&port_cfg.id)
                .ok_or(ReconcileError::UnknownPort(port_cfg.id))?;
            let updated = self.update_port(orig, port_cfg)?;
            diff.update(port_cfg.id, Some(orig), updated)?;
        }

        // Reset ports that no longer have a config listed to their
        // default state.
        for (id, orig) in prev.ports.iter() {
            if diff.contains(id) {
                continue;
            }
            let default_cfg = PortConfig::default_state(*id);
            let updated = self.update_port(orig, &default_cfg)?;
            diff.update(*id, Some(orig), updated)?;
        }

        Ok(diff.finish(&prev.ports))
    }

    /// Reconciles one port, returning `None` when every field including
    /// the queue list matches the previous node.
    fn update_port(&self, orig: &Arc<Port>, cfg: &PortConfig) -> ReconcileResult<Option<Arc<Port>>> {
        let vlans = self.vlan_ports.vlans_of(orig.id);
        let queues = update_port_queues(orig, cfg)?;

        if cfg.state == orig.admin_state
            && cfg.ingress_vlan == orig.ingress_vlan
            && cfg.speed == orig.speed
            && cfg.pause == orig.pause
            && cfg.sflow_ingress_rate == orig.sflow_ingress_rate
            && cfg.sflow_egress_rate == orig.sflow_egress_rate
            && cfg.name == orig.name
            && cfg.description == orig.description
            && vlans == orig.vlans
            && cfg.fec == orig.fec
            && queues == orig.queues
        {
            return Ok(None);
        }

        Ok(Some(Arc::new(Port {
            id: orig.id,
            name: cfg.name.clone(),
            description: cfg.description.clone(),
            admin_state: cfg.state,
            ingress_vlan: cfg.ingress_vlan,
            speed: cfg.speed,
            pause: cfg.pause,
            sflow_ingress_rate: cfg.sflow_ingress_rate,
            sflow_egress_rate: cfg.sflow_egress_rate,
            fec: cfg.fec,
            vlans,
            queues,
        })))
    }
}

/// Builds the port's full queue list from its sparse queue config.
///
/// The queue count is fixed by the platform (the previous port's count);
/// unconfigured indices reset to the default queue.
fn update_port_queues(orig: &Port, cfg: &PortConfig) -> ReconcileResult<Vec<Arc<PortQueue>>> {
    let mut by_id: BTreeMap<u8, &PortQueueConfig> = BTreeMap::new();
    for queue_cfg in &cfg.queues {
        if by_id.insert(queue_cfg.id, queue_cfg).is_some() {
            return Err(ReconcileError::DuplicateEntry {
                kind: "port queue",
                id: format!("port {} queue {}", orig.id, queue_cfg.id),
            });
        }
    }

    let count = orig.queues.len();
    let mut queues = Vec::with_capacity(count);
    for (i, orig_queue) in orig.queues.iter().enumerate() {
        match by_id.remove(&(i as u8)) {
            Some(queue_cfg) => queues.push(update_port_queue(orig_queue, queue_cfg)?),
            None => queues.push(Arc::new(PortQueue::new(i as u8))),
        }
    }

    if let Some((&index, _)) = by_id.iter().next() {
        return Err(ReconcileError::InvalidQueueIndex {
            port: orig.id,
            index,
            max: count,
        });
    }

    Ok(queues)
}

/// Reconciles one queue against its previous value. Optional config
/// fields left unset keep the previous value; the previous handle is
/// returned when nothing comes out different.
fn update_port_queue(
    orig: &Arc<PortQueue>,
    cfg: &PortQueueConfig,
) -> ReconcileResult<Arc<PortQueue>> {
    let mut queue = (**orig).clone();
    queue.stream_type = cfg.stream_type;
    queue.scheduling = cfg.scheduling;
    if let Some(weight) = cfg.weight {
        queue.weight = Some(weight);
    }
    if let Some(reserved_bytes) = cfg.reserved_bytes {
        queue.reserved_bytes = Some(reserved_bytes);
    }
    if let Some(scaling_factor) = cfg.scaling_factor {
        queue.scaling_factor = Some(scaling_factor);
    }
    if let Some(aqm) = &cfg.aqm {
        queue.aqm = Some(check_aqm(aqm)?);
    }

    if queue == **orig {
        Ok(Arc::clone(orig))
    } else {
        Ok(Arc::new(queue))
    }
}

fn check_aqm(cfg: &QueueAqmConfig) -> ReconcileResult<AqmConfig> {
    let detection = cfg.detection.ok_or(ReconcileError::InvalidAqm)?;
    Ok(AqmConfig {
        detection,
        behavior: cfg.behavior,
    })
}
