//! Aggregate port (LAG) reconciliation.

use crate::applier::ConfigApplier;
use crate::config::{AggregatePortConfig, MinimumCapacity};
use crate::error::{ReconcileError, ReconcileResult};
use crate::map_diff::NodeMapDiff;
use std::sync::Arc;
use switchd_state::{AggregatePort, AggregatePortMap, Subport, DEFAULT_SYSTEM_PRIORITY};
use switchd_types::MacAddress;

impl<'a> ConfigApplier<'a> {
    /// Reconciles the aggregate port map. LAGs absent from the config
    /// are implicitly deleted.
    pub(crate) fn update_aggregate_ports(&self) -> ReconcileResult<Option<AggregatePortMap>> {
        let prev = self.prev;
        let mut diff = NodeMapDiff::new("aggregate port");

        for lag_cfg in &self.cfg.aggregate_ports {
            let subports = subports_sorted(lag_cfg)?;
            let (system_id, system_priority) = self.system_lacp_config();
            let minimum_link_count = minimum_link_count(lag_cfg)?;

            let orig = prev.aggregate_ports.get(&lag_cfg.id);
            let unchanged = orig.is_some_and(|orig| {
                orig.name == lag_cfg.name
                    && orig.description == lag_cfg.description
                    && orig.system_id == system_id
                    && orig.system_priority == system_priority
                    && orig.minimum_link_count == minimum_link_count
                    && orig.subports == subports
            });

            let updated = if unchanged {
                None
            } else {
                Some(Arc::new(AggregatePort {
                    id: lag_cfg.id,
                    name: lag_cfg.name.clone(),
                    description: lag_cfg.description.clone(),
                    system_id,
                    system_priority,
                    minimum_link_count,
                    subports,
                }))
            };
            diff.update(lag_cfg.id, orig, updated)?;
        }

        Ok(diff.finish(&prev.aggregate_ports))
    }

    /// The system LACP id: configured, or `(platform MAC, default
    /// priority)` when the config carries no LACP section.
    fn system_lacp_config(&self) -> (MacAddress, u16) {
        match &self.cfg.lacp {
            Some(lacp) => (lacp.system_id, lacp.system_priority),
            None => (self.platform.local_mac(), DEFAULT_SYSTEM_PRIORITY),
        }
    }
}

/// Validates and sorts the configured member ports into subport order.
fn subports_sorted(cfg: &AggregatePortConfig) -> ReconcileResult<Vec<Subport>> {
    let mut subports = Vec::with_capacity(cfg.member_ports.len());
    for member in &cfg.member_ports {
        if member.priority >= 1 << 16 {
            return Err(ReconcileError::SubportPriorityOutOfRange {
                port: member.id,
                priority: member.priority,
            });
        }
        subports.push(Subport {
            port_id: member.id,
            priority: member.priority as u16,
            rate: member.rate,
            activity: member.activity,
        });
    }
    subports.sort();
    Ok(subports)
}

/// Resolves the minimum link count from the configured capacity.
fn minimum_link_count(cfg: &AggregatePortConfig) -> ReconcileResult<u8> {
    let member_count = cfg.member_ports.len();
    match cfg.minimum_capacity {
        MinimumCapacity::LinkCount(count) => {
            if count < 1 {
                return Err(ReconcileError::InvalidMinCapacity {
                    aggregate_port: cfg.id,
                });
            }
            Ok(count)
        }
        MinimumCapacity::LinkPercentage(fraction) => {
            if !(fraction > 0.0 && fraction <= 1.0) {
                return Err(ReconcileError::InvalidMinCapacity {
                    aggregate_port: cfg.id,
                });
            }
            let count = (fraction * member_count as f32).ceil() as u8;
            if member_count > 0 && count < 1 {
                return Err(ReconcileError::InvalidMinCapacity {
                    aggregate_port: cfg.id,
                });
            }
            Ok(count)
        }
    }
}
