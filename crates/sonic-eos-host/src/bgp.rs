//! BGP operations on EOS neighbors.

use serde_json::{json, Value};
use tracing::{info, instrument};

use sonic_mgmt_common::{Host, ModuleResult};

use crate::error::{EosHostError, EosResult};
use crate::host::EosHost;
use crate::prefix::IpPrefix;

/// Warning EOS prints in place of a summary while the Rib agent is down.
const BGP_INACTIVE: &str = "BGP inactive";

/// Peers of a `show ip[v6] bgp summary | json` output in a given state.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SessionTally {
    /// Expected peer IPs found in the state.
    pub ips_ok: Vec<String>,
    /// Expected descriptions found in the state.
    pub descs_ok: Vec<String>,
    /// True if any peer in the state carried a description.
    pub desc_available: bool,
}

impl SessionTally {
    /// Counts the peers of `summary` whose state matches `state`.
    ///
    /// `ips` must already be lowercase. Summaries without the default VRF
    /// peer table are skipped.
    pub fn add_summary(&mut self, summary: &Value, ips: &[String], descs: &[&str], state: &str) {
        let Some(peers) = summary
            .pointer("/vrfs/default/peers")
            .and_then(Value::as_object)
        else {
            return;
        };

        for (ip, peer) in peers {
            let Some(peer_state) = peer.get("peerState").and_then(Value::as_str) else {
                continue;
            };
            if !peer_state.eq_ignore_ascii_case(state) {
                continue;
            }
            if ips.contains(&ip.to_lowercase()) {
                self.ips_ok.push(ip.clone());
            }
            if let Some(desc) = peer.get("description").and_then(Value::as_str) {
                self.desc_available = true;
                if descs.contains(&desc) {
                    self.descs_ok.push(desc.to_string());
                }
            }
        }
    }

    /// True if every expected IP, and every expected description when
    /// descriptions are present, was seen.
    pub fn complete(&self, ips: usize, descs: usize) -> bool {
        let ips_done = self.ips_ok.len() == ips;
        if self.desc_available {
            ips_done && self.descs_ok.len() == descs
        } else {
            ips_done
        }
    }
}

/// True if the summary carries the `BGP inactive` warning.
pub fn is_bgp_inactive(summary: &Value) -> bool {
    match summary.get("warnings") {
        Some(Value::Array(warnings)) => warnings.iter().any(|w| w.as_str() == Some(BGP_INACTIVE)),
        Some(Value::String(warning)) => warning.contains(BGP_INACTIVE),
        _ => false,
    }
}

impl<H: Host> EosHost<H> {
    /// Shuts the BGP agent down.
    pub async fn kill_bgpd(&self) -> EosResult<ModuleResult> {
        self.eos_config(vec!["agent Rib shutdown".to_string()], Vec::new())
            .await
    }

    /// Starts the BGP agent.
    pub async fn start_bgpd(&self) -> EosResult<ModuleResult> {
        self.eos_config(vec!["no agent Rib shutdown".to_string()], Vec::new())
            .await
    }

    #[instrument(skip(self), fields(host = %self.host.hostname()))]
    pub async fn no_shutdown_bgp(&self, asn: u32) -> EosResult<ModuleResult> {
        let out = self
            .eos_config(vec!["no shut".to_string()], vec![format!("router bgp {}", asn)])
            .await?;
        info!("No shut BGP [{}]", asn);
        Ok(out)
    }

    /// Re-enables BGP neighbors. Nothing is sent for an empty list.
    #[instrument(skip(self), fields(host = %self.host.hostname()))]
    pub async fn no_shutdown_bgp_neighbors(&self, asn: u32, neighbors: &[&str]) -> EosResult<Option<ModuleResult>> {
        if neighbors.is_empty() {
            return Ok(None);
        }

        let lines = neighbors
            .iter()
            .map(|n| format!("no neighbor {} shutdown", n))
            .collect();
        let out = self
            .eos_config(lines, vec![format!("router bgp {}", asn)])
            .await?;
        info!("No shut BGP neighbors: {}", json!(neighbors));
        Ok(Some(out))
    }

    /// Returns true if all `neigh_ips` (and all `neigh_descs`, when the
    /// device reports descriptions) have sessions in `state`.
    #[instrument(skip(self), fields(host = %self.host.hostname()))]
    pub async fn check_bgp_session_state(
        &self,
        neigh_ips: &[&str],
        neigh_descs: &[&str],
        state: &str,
    ) -> EosResult<bool> {
        let ips: Vec<String> = neigh_ips.iter().map(|ip| ip.to_lowercase()).collect();

        let out_v4 = self
            .eos_command(vec![json!("show ip bgp summary | json")])
            .await?;
        info!("ip bgp summary: {:?}", out_v4.stdout);
        let out_v6 = self
            .eos_command(vec![json!("show ipv6 bgp summary | json")])
            .await?;
        info!("ipv6 bgp summary: {:?}", out_v6.stdout);

        let v4 = out_v4.output(0).cloned().unwrap_or(Value::Null);
        let v6 = out_v6.output(0).cloned().unwrap_or(Value::Null);
        if is_bgp_inactive(&v4) && is_bgp_inactive(&v6) {
            return Ok(false);
        }

        let mut tally = SessionTally::default();
        tally.add_summary(&v4, &ips, neigh_descs, state);
        tally.add_summary(&v6, &ips, neigh_descs, state);
        info!(
            "neigh_ips_ok={:?} neigh_desc_available={} neigh_desc_ok={:?}",
            tally.ips_ok, tally.desc_available, tally.descs_ok
        );

        Ok(tally.complete(ips.len(), neigh_descs.len()))
    }

    /// BGP table entry of `prefix`, as JSON.
    pub async fn get_route(&self, prefix: &str) -> EosResult<Value> {
        let network: IpPrefix = prefix.parse()?;
        let cmd = if network.is_ipv4() { "show ip bgp" } else { "show ipv6 bgp" };
        let command = format!("{} {}", cmd, prefix);

        let result = self
            .eos_command(vec![json!({ "command": command, "output": "json" })])
            .await?;
        result
            .output(0)
            .cloned()
            .ok_or_else(|| EosHostError::unexpected_output(self.host.hostname(), &command, "no output"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::EosCredentials;
    use pretty_assertions::assert_eq;
    use sonic_mgmt_test::fixtures::eos_fixtures;
    use sonic_mgmt_test::MockHost;

    fn eos_with_summaries(v4: Value, v6: Value) -> EosHost<MockHost> {
        let host = MockHost::new("ARISTA01T1");
        host.on_args("eos_command", "show ip bgp summary", ModuleResult::from_outputs(vec![v4]))
            .on_args("eos_command", "show ipv6 bgp summary", ModuleResult::from_outputs(vec![v6]));
        EosHost::new(host, EosCredentials::new("admin", "pw"))
    }

    #[test]
    fn test_bgp_inactive() {
        assert!(is_bgp_inactive(&eos_fixtures::bgp_inactive()));
        assert!(!is_bgp_inactive(&eos_fixtures::bgp_summary(&[])));
    }

    #[test]
    fn test_tally_ignores_malformed() {
        let mut tally = SessionTally::default();
        tally.add_summary(&json!({"vrfs": {}}), &[], &[], "established");
        tally.add_summary(&json!("garbage"), &[], &[], "established");
        assert_eq!(tally, SessionTally::default());
        assert!(tally.complete(0, 0));
    }

    #[tokio::test]
    async fn test_sessions_established() {
        let v4 = eos_fixtures::bgp_summary(&[
            ("10.0.0.0", "Established", Some("ARISTA01T0")),
            ("10.0.0.2", "Active", Some("ARISTA02T0")),
        ]);
        let v6 = eos_fixtures::bgp_summary(&[("FC00::1", "Established", Some("ARISTA01T0"))]);
        let eos = eos_with_summaries(v4, v6);

        assert!(eos
            .check_bgp_session_state(&["10.0.0.0", "fc00::1"], &["ARISTA01T0", "ARISTA01T0"], "established")
            .await
            .unwrap());
        // The second peer is not established.
        assert!(!eos
            .check_bgp_session_state(&["10.0.0.0", "10.0.0.2"], &["ARISTA01T0"], "established")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_descriptions_required_when_present() {
        let v4 = eos_fixtures::bgp_summary(&[("10.0.0.0", "Established", Some("ARISTA01T0"))]);
        let eos = eos_with_summaries(v4, eos_fixtures::bgp_summary(&[]));
        assert!(!eos
            .check_bgp_session_state(&["10.0.0.0"], &["ARISTA01T0", "ARISTA02T0"], "established")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_descriptions_ignored_when_absent() {
        let v4 = eos_fixtures::bgp_summary(&[("10.0.0.0", "Idle", None)]);
        let eos = eos_with_summaries(v4, eos_fixtures::bgp_summary(&[]));
        assert!(eos
            .check_bgp_session_state(&["10.0.0.0"], &["ARISTA01T0"], "idle")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_bgp_inactive_on_both() {
        let eos = eos_with_summaries(eos_fixtures::bgp_inactive(), eos_fixtures::bgp_inactive());
        assert!(!eos.check_bgp_session_state(&[], &[], "established").await.unwrap());
    }

    #[tokio::test]
    async fn test_no_shutdown_bgp_neighbors() {
        let eos = EosHost::new(MockHost::new("ARISTA01T1"), EosCredentials::new("admin", "pw"));
        assert!(eos.no_shutdown_bgp_neighbors(65100, &[]).await.unwrap().is_none());
        assert!(eos.inner().calls().is_empty());

        eos.no_shutdown_bgp_neighbors(65100, &["10.0.0.0", "fc00::1"])
            .await
            .unwrap();
        let call = &eos.inner().calls_of("eos_config")[0];
        assert_eq!(
            call.args,
            json!({
                "lines": ["no neighbor 10.0.0.0 shutdown", "no neighbor fc00::1 shutdown"],
                "parents": ["router bgp 65100"]
            })
        );
    }

    #[tokio::test]
    async fn test_get_route() {
        let host = MockHost::new("ARISTA01T1");
        host.on_args(
            "eos_command",
            "show ipv6 bgp fc00::/64",
            ModuleResult::from_outputs(vec![json!({"vrfs": {"default": {"bgpRouteEntries": {}}}})]),
        );
        let eos = EosHost::new(host, EosCredentials::new("admin", "pw"));

        let route = eos.get_route("fc00::/64").await.unwrap();
        assert!(route.pointer("/vrfs/default/bgpRouteEntries").is_some());

        let err = eos.get_route("10.0.0.1/24").await.unwrap_err();
        assert!(matches!(err, EosHostError::InvalidPrefix(_)));
    }

    #[tokio::test]
    async fn test_agent_control() {
        let eos = EosHost::new(MockHost::new("ARISTA01T1"), EosCredentials::new("admin", "pw"));
        eos.kill_bgpd().await.unwrap();
        eos.start_bgpd().await.unwrap();
        let calls = eos.inner().calls_of("eos_config");
        assert_eq!(calls[0].args, json!({"lines": ["agent Rib shutdown"]}));
        assert_eq!(calls[1].args, json!({"lines": ["no agent Rib shutdown"]}));
    }
}
