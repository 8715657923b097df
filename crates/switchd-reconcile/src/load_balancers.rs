//! Load balancer reconciliation.

use crate::applier::ConfigApplier;
use crate::error::ReconcileResult;
use crate::map_diff::NodeMapDiff;
use std::sync::Arc;
use switchd_state::{LoadBalancer, LoadBalancerMap};

impl<'a> ConfigApplier<'a> {
    /// Reconciles the load balancer set by identity diff. Load balancers
    /// absent from the config are implicitly deleted.
    pub(crate) fn update_load_balancers(&self) -> ReconcileResult<Option<LoadBalancerMap>> {
        let prev = self.prev;
        let mut diff = NodeMapDiff::new("load balancer");

        for lb_cfg in &self.cfg.load_balancers {
            let built = LoadBalancer {
                id: lb_cfg.id,
                algorithm: lb_cfg.algorithm,
                seed: lb_cfg.seed.unwrap_or_else(|| self.default_seed()),
            };
            let orig = prev.load_balancers.get(&lb_cfg.id);
            let updated = match orig {
                Some(orig) if built == **orig => None,
                _ => Some(Arc::new(built)),
            };
            diff.update(lb_cfg.id, orig, updated)?;
        }

        Ok(diff.finish(&prev.load_balancers))
    }

    /// Deterministic default hash seed derived from the platform MAC, so
    /// that repeated reconciliations agree and distinct switches in an
    /// ECMP fabric tend not to polarize.
    fn default_seed(&self) -> u32 {
        self.platform
            .local_mac()
            .as_bytes()
            .iter()
            .fold(0u32, |seed, byte| {
                seed.wrapping_mul(31).wrapping_add(u32::from(*byte))
            })
    }
}

#[cfg(test)]
mod tests {
    use crate::config::{LoadBalancerConfig, SwitchConfig};
    use crate::test_support::{apply_ok, TestPlatform};
    use pretty_assertions::assert_eq;
    use switchd_state::{HashingAlgorithm, LoadBalancerId, SwitchState};

    #[test]
    fn test_load_balancer_diff_and_default_seed() {
        let mut cfg = SwitchConfig::default();
        cfg.load_balancers = vec![
            LoadBalancerConfig {
                id: LoadBalancerId::Ecmp,
                algorithm: HashingAlgorithm::Crc,
                seed: Some(42),
            },
            LoadBalancerConfig {
                id: LoadBalancerId::AggregatePort,
                algorithm: HashingAlgorithm::Xor,
                seed: None,
            },
        ];

        let platform = TestPlatform::default();
        let state = apply_ok(&SwitchState::new(), &cfg, &platform);
        assert_eq!(state.load_balancers.len(), 2);
        assert_eq!(state.load_balancers.get(&LoadBalancerId::Ecmp).unwrap().seed, 42);

        // The derived seed is stable across applies.
        let lag_seed = state
            .load_balancers
            .get(&LoadBalancerId::AggregatePort)
            .unwrap()
            .seed;
        let again = crate::apply(&state, &cfg, &platform, None).unwrap();
        assert!(again.is_none());
        assert_eq!(
            state
                .load_balancers
                .get(&LoadBalancerId::AggregatePort)
                .unwrap()
                .seed,
            lag_seed
        );
    }
}
