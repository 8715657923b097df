//! ACL reconciliation.
//!
//! Priorities are assigned in two passes from a fixed base: first every
//! DENY entry in config order, then the entries expanded from traffic
//! policies (global policy first, then per-port policies in port order).
//! PERMIT entries not referenced by any policy do not materialize.

use crate::applier::ConfigApplier;
use crate::config::{AclEntryConfig, TrafficPolicyConfig};
use crate::error::{ReconcileError, ReconcileResult};
use crate::map_diff::NodeMapDiff;
use std::collections::BTreeMap;
use std::sync::Arc;
use switchd_state::{
    AclAction, AclEntry, AclMap, AclTtl, MatchAction, MAX_L4_PORT, PROTO_ICMP, PROTO_ICMPV6,
};
use switchd_types::PortId;

/// Base priority for reconciler-assigned ACLs. Priorities below this are
/// reserved for control-plane policing entries installed elsewhere.
const ACL_START_PRIORITY: u32 = 100_000;

const MAX_ICMP_TYPE: u32 = 255;
const MAX_ICMP_CODE: u32 = 255;
const MAX_TTL: u32 = 255;

impl<'a> ConfigApplier<'a> {
    /// Reconciles the ACL map.
    pub(crate) fn update_acls(&self) -> ReconcileResult<Option<AclMap>> {
        let prev = self.prev;
        let mut diff = NodeMapDiff::new("ACL");
        let mut priority = ACL_START_PRIORITY;

        // First pass: DENY entries take the highest priorities, in
        // config order.
        for acl_cfg in &self.cfg.acls {
            if acl_cfg.action != AclAction::Deny {
                continue;
            }
            self.reconcile_acl(&mut diff, acl_cfg, &acl_cfg.name, priority, None, None)?;
            priority += 1;
        }

        let by_name: BTreeMap<&str, &AclEntryConfig> = self
            .cfg
            .acls
            .iter()
            .map(|acl| (acl.name.as_str(), acl))
            .collect();

        // Second pass: expand traffic policies into system entries.
        if let Some(policy) = &self.cfg.global_egress_traffic_policy {
            self.expand_policy(&mut diff, &by_name, policy, "", None, &mut priority)?;
        }
        for port_cfg in &self.cfg.ports {
            if let Some(policy) = &port_cfg.egress_traffic_policy {
                let tag = format!("port{}:", port_cfg.id);
                self.expand_policy(&mut diff, &by_name, policy, &tag, Some(port_cfg.id), &mut priority)?;
            }
        }

        Ok(diff.finish(&prev.acls))
    }

    /// Clones each policy matcher's ACL under a system name, attaching
    /// the policy's action and (for port policies) forcing the port into
    /// the entry's dstPort.
    fn expand_policy(
        &self,
        diff: &mut NodeMapDiff<String, AclEntry>,
        by_name: &BTreeMap<&str, &AclEntryConfig>,
        policy: &TrafficPolicyConfig,
        tag: &str,
        dst_port: Option<PortId>,
        priority: &mut u32,
    ) -> ReconcileResult<()> {
        for mta in &policy.match_to_actions {
            let acl_cfg = *by_name
                .get(mta.matcher.as_str())
                .ok_or_else(|| ReconcileError::UnknownMatcher(mta.matcher.clone()))?;

            if let (Some(policy_port), Some(acl_port)) = (dst_port, acl_cfg.dst_port) {
                if acl_port != policy_port {
                    return Err(ReconcileError::DstPortConflict {
                        acl: acl_cfg.name.clone(),
                        policy_port,
                        acl_port,
                    });
                }
            }

            // DENY entries already got their priority in the first pass.
            if acl_cfg.action == AclAction::Deny {
                continue;
            }

            let name = format!("system:{}{}", tag, mta.matcher);
            let match_action = MatchAction {
                send_to_queue: mta.action.send_to_queue,
                packet_counter: mta.action.packet_counter.clone(),
            };
            self.reconcile_acl(diff, acl_cfg, &name, *priority, Some(match_action), dst_port)?;
            *priority += 1;
        }
        Ok(())
    }

    /// Builds the entry for one (config, priority) pairing and records it
    /// in the diff, carrying the previous node when nothing differs.
    fn reconcile_acl(
        &self,
        diff: &mut NodeMapDiff<String, AclEntry>,
        cfg: &AclEntryConfig,
        name: &str,
        priority: u32,
        match_action: Option<MatchAction>,
        dst_port: Option<PortId>,
    ) -> ReconcileResult<()> {
        let built = build_acl(cfg, name, priority, match_action, dst_port)?;
        let orig = self.prev.acls.get(&built.name);
        let updated = match orig {
            Some(orig) if built == **orig => None,
            _ => Some(Arc::new(built)),
        };
        diff.update(name.to_string(), orig, updated)
    }
}

/// Validates a configured ACL entry and builds the state entry.
fn build_acl(
    cfg: &AclEntryConfig,
    name: &str,
    priority: u32,
    match_action: Option<MatchAction>,
    dst_port: Option<PortId>,
) -> ReconcileResult<AclEntry> {
    check_acl(cfg)?;

    let mut acl = AclEntry::new(name, priority, cfg.action);
    acl.match_action = match_action;
    acl.src_ip = cfg.src_ip;
    acl.dst_ip = cfg.dst_ip;
    acl.proto = cfg.proto;
    acl.tcp_flags_bit_map = cfg.tcp_flags_bit_map;
    acl.src_port = cfg.src_port;
    acl.dst_port = dst_port.or(cfg.dst_port);
    acl.src_l4_port_range = cfg.src_l4_port_range;
    acl.dst_l4_port_range = cfg.dst_l4_port_range;
    acl.pkt_len_range = cfg.pkt_len_range;
    acl.ip_frag = cfg.ip_frag;
    acl.icmp_type = cfg.icmp_type.map(|v| v as u8);
    acl.icmp_code = cfg.icmp_code.map(|v| v as u8);
    acl.dscp = cfg.dscp;
    acl.dst_mac = cfg.dst_mac;
    acl.ip_type = cfg.ip_type;
    acl.ttl = cfg.ttl.map(|ttl| AclTtl {
        value: ttl.value as u8,
        mask: ttl.mask as u8,
    });
    Ok(acl)
}

/// Field-range validation for a configured ACL entry.
fn check_acl(cfg: &AclEntryConfig) -> ReconcileResult<()> {
    for range in [&cfg.src_l4_port_range, &cfg.dst_l4_port_range].into_iter().flatten() {
        if range.min > MAX_L4_PORT || range.max > MAX_L4_PORT {
            return Err(ReconcileError::AclL4PortRange {
                acl: cfg.name.clone(),
                detail: "port larger than 65535",
            });
        }
        if range.min > range.max {
            return Err(ReconcileError::AclL4PortRange {
                acl: cfg.name.clone(),
                detail: "min value larger than max value",
            });
        }
    }

    if let Some(range) = &cfg.pkt_len_range {
        if range.min > range.max {
            return Err(ReconcileError::AclPktLenRange {
                acl: cfg.name.clone(),
            });
        }
    }

    if cfg.icmp_code.is_some() && cfg.icmp_type.is_none() {
        return Err(ReconcileError::AclIcmpCode {
            acl: cfg.name.clone(),
        });
    }
    if let Some(icmp_type) = cfg.icmp_type {
        if icmp_type > MAX_ICMP_TYPE {
            return Err(ReconcileError::AclIcmpType {
                acl: cfg.name.clone(),
            });
        }
        if !matches!(cfg.proto, Some(PROTO_ICMP) | Some(PROTO_ICMPV6)) {
            return Err(ReconcileError::AclIcmpProto {
                acl: cfg.name.clone(),
            });
        }
    }
    if let Some(icmp_code) = cfg.icmp_code {
        if icmp_code > MAX_ICMP_CODE {
            return Err(ReconcileError::AclIcmpCode {
                acl: cfg.name.clone(),
            });
        }
    }

    if let Some(ttl) = &cfg.ttl {
        if ttl.value > MAX_TTL || ttl.mask > MAX_TTL {
            return Err(ReconcileError::AclTtlRange {
                acl: cfg.name.clone(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AclTtlConfig;
    use pretty_assertions::assert_eq;
    use switchd_state::{AclL4PortRange, AclPktLenRange};

    #[test]
    fn test_check_acl_l4_range() {
        let mut cfg = AclEntryConfig::new("a", AclAction::Permit);
        cfg.src_l4_port_range = Some(AclL4PortRange { min: 10, max: 5 });
        assert!(matches!(
            check_acl(&cfg).unwrap_err(),
            ReconcileError::AclL4PortRange { .. }
        ));

        cfg.src_l4_port_range = Some(AclL4PortRange { min: 0, max: 70_000 });
        assert!(matches!(
            check_acl(&cfg).unwrap_err(),
            ReconcileError::AclL4PortRange { .. }
        ));

        cfg.src_l4_port_range = Some(AclL4PortRange { min: 80, max: 443 });
        assert!(check_acl(&cfg).is_ok());
    }

    #[test]
    fn test_check_acl_pkt_len_range() {
        let mut cfg = AclEntryConfig::new("a", AclAction::Permit);
        cfg.pkt_len_range = Some(AclPktLenRange { min: 1500, max: 64 });
        assert!(matches!(
            check_acl(&cfg).unwrap_err(),
            ReconcileError::AclPktLenRange { .. }
        ));
    }

    #[test]
    fn test_check_acl_icmp_rules() {
        // Code without type.
        let mut cfg = AclEntryConfig::new("a", AclAction::Permit);
        cfg.icmp_code = Some(0);
        assert!(matches!(
            check_acl(&cfg).unwrap_err(),
            ReconcileError::AclIcmpCode { .. }
        ));

        // Type without an ICMP proto.
        let mut cfg = AclEntryConfig::new("a", AclAction::Permit);
        cfg.icmp_type = Some(8);
        cfg.proto = Some(6);
        assert!(matches!(
            check_acl(&cfg).unwrap_err(),
            ReconcileError::AclIcmpProto { .. }
        ));

        // Type out of range.
        let mut cfg = AclEntryConfig::new("a", AclAction::Permit);
        cfg.icmp_type = Some(256);
        cfg.proto = Some(PROTO_ICMP);
        assert!(matches!(
            check_acl(&cfg).unwrap_err(),
            ReconcileError::AclIcmpType { .. }
        ));

        // Valid ICMPv6 match.
        let mut cfg = AclEntryConfig::new("a", AclAction::Permit);
        cfg.icmp_type = Some(135);
        cfg.icmp_code = Some(0);
        cfg.proto = Some(PROTO_ICMPV6);
        assert!(check_acl(&cfg).is_ok());
    }

    #[test]
    fn test_check_acl_ttl_range() {
        let mut cfg = AclEntryConfig::new("a", AclAction::Permit);
        cfg.ttl = Some(AclTtlConfig { value: 300, mask: 255 });
        assert!(matches!(
            check_acl(&cfg).unwrap_err(),
            ReconcileError::AclTtlRange { .. }
        ));

        cfg.ttl = Some(AclTtlConfig { value: 255, mask: 255 });
        assert!(check_acl(&cfg).is_ok());
    }

    #[test]
    fn test_build_acl_applies_overrides() {
        let mut cfg = AclEntryConfig::new("web", AclAction::Permit);
        cfg.proto = Some(6);
        let acl = build_acl(
            &cfg,
            "system:web",
            100_001,
            Some(MatchAction {
                send_to_queue: Some(4),
                packet_counter: None,
            }),
            Some(PortId::new(7)),
        )
        .unwrap();

        assert_eq!(acl.name, "system:web");
        assert_eq!(acl.priority, 100_001);
        assert_eq!(acl.dst_port, Some(PortId::new(7)));
        assert_eq!(acl.match_action.unwrap().send_to_queue, Some(4));
    }
}
