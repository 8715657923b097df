//! sFlow collector reconciliation.

use crate::applier::ConfigApplier;
use crate::error::ReconcileResult;
use crate::map_diff::NodeMapDiff;
use std::sync::Arc;
use switchd_state::{SflowCollector, SflowCollectorMap};

impl<'a> ConfigApplier<'a> {
    /// Reconciles the sFlow collector set. Collectors are identified by
    /// their `"ip:port"` string; ones absent from the config are
    /// implicitly deleted.
    pub(crate) fn update_sflow_collectors(&self) -> ReconcileResult<Option<SflowCollectorMap>> {
        let prev = self.prev;
        let mut diff = NodeMapDiff::new("sFlow collector");

        for collector_cfg in &self.cfg.sflow_collectors {
            let built = SflowCollector::new(collector_cfg.ip, collector_cfg.port);
            let orig = prev.sflow_collectors.get(&built.id);
            let updated = match orig {
                Some(orig) if built == **orig => None,
                _ => Some(Arc::new(built.clone())),
            };
            diff.update(built.id, orig, updated)?;
        }

        Ok(diff.finish(&prev.sflow_collectors))
    }
}

#[cfg(test)]
mod tests {
    use crate::config::{SflowCollectorConfig, SwitchConfig};
    use crate::test_support::{apply_ok, TestPlatform};
    use pretty_assertions::assert_eq;
    use switchd_state::SwitchState;

    #[test]
    fn test_collector_set_diff() {
        let mut cfg = SwitchConfig::default();
        cfg.sflow_collectors = vec![
            SflowCollectorConfig { ip: "10.0.0.1".parse().unwrap(), port: 6343 },
            SflowCollectorConfig { ip: "10.0.0.2".parse().unwrap(), port: 6343 },
        ];

        let state = apply_ok(&SwitchState::new(), &cfg, &TestPlatform::default());
        assert_eq!(state.sflow_collectors.len(), 2);
        assert!(state.sflow_collectors.get(&"10.0.0.1:6343".to_string()).is_some());

        // Dropping one collector is an implicit delete.
        cfg.sflow_collectors.truncate(1);
        let next = apply_ok(&state, &cfg, &TestPlatform::default());
        assert_eq!(next.sflow_collectors.len(), 1);
    }
}
