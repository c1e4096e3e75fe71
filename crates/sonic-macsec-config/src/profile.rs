//! MACsec profiles and their CONFIG_DB records.
//!
//! A profile lives in `MACSEC_PROFILE|<name>`; a port opts in by carrying
//! a `macsec` field naming the profile in its `PORT|<port>` record.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use sonic_mgmt_common::{ConfigDb, ConfigDbKey, Host};

use crate::error::{MacsecError, MacsecResult};

/// CONFIG_DB table holding MACsec profiles.
pub const MACSEC_PROFILE_TABLE: &str = "MACSEC_PROFILE";

/// CONFIG_DB table holding port records.
pub const PORT_TABLE: &str = "PORT";

/// Field of a port record naming its MACsec profile.
pub const PORT_MACSEC_FIELD: &str = "macsec";

/// MACsec cipher suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CipherSuite {
    #[serde(rename = "GCM-AES-128")]
    GcmAes128,
    #[serde(rename = "GCM-AES-256")]
    GcmAes256,
    #[serde(rename = "GCM-AES-XPN-128")]
    GcmAesXpn128,
    #[serde(rename = "GCM-AES-XPN-256")]
    GcmAesXpn256,
}

impl CipherSuite {
    pub fn as_str(self) -> &'static str {
        match self {
            CipherSuite::GcmAes128 => "GCM-AES-128",
            CipherSuite::GcmAes256 => "GCM-AES-256",
            CipherSuite::GcmAesXpn128 => "GCM-AES-XPN-128",
            CipherSuite::GcmAesXpn256 => "GCM-AES-XPN-256",
        }
    }

    /// Hex digits of a CAK for this suite.
    pub fn cak_hex_len(self) -> usize {
        match self {
            CipherSuite::GcmAes128 | CipherSuite::GcmAesXpn128 => 32,
            CipherSuite::GcmAes256 | CipherSuite::GcmAesXpn256 => 64,
        }
    }
}

impl fmt::Display for CipherSuite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What MACsec protects on the link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MacsecPolicy {
    /// Frames are authenticated but sent in clear.
    IntegrityOnly,
    /// Frames are authenticated and encrypted.
    Security,
}

impl MacsecPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            MacsecPolicy::IntegrityOnly => "integrity_only",
            MacsecPolicy::Security => "security",
        }
    }
}

impl fmt::Display for MacsecPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Contents of a `MACSEC_PROFILE` record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacsecProfile {
    /// Key-server priority; the lower value wins the election.
    pub priority: u32,
    pub cipher_suite: CipherSuite,
    /// Primary connectivity association key, hex.
    pub primary_cak: String,
    /// Primary connectivity association key name, hex.
    pub primary_ckn: String,
    pub policy: MacsecPolicy,
    /// Include the SCI tag in transmitted frames.
    pub send_sci: bool,
}

impl MacsecProfile {
    pub fn new(
        priority: u32,
        cipher_suite: CipherSuite,
        primary_cak: impl Into<String>,
        primary_ckn: impl Into<String>,
        policy: MacsecPolicy,
        send_sci: bool,
    ) -> Self {
        Self {
            priority,
            cipher_suite,
            primary_cak: primary_cak.into(),
            primary_ckn: primary_ckn.into(),
            policy,
            send_sci,
        }
    }

    /// Same profile with another key-server priority.
    pub fn with_priority(&self, priority: u32) -> Self {
        Self {
            priority,
            ..self.clone()
        }
    }

    /// Record fields in CONFIG_DB order.
    pub fn fields(&self) -> Vec<(String, String)> {
        vec![
            ("priority".to_string(), self.priority.to_string()),
            ("cipher_suite".to_string(), self.cipher_suite.to_string()),
            ("primary_cak".to_string(), self.primary_cak.clone()),
            ("primary_ckn".to_string(), self.primary_ckn.clone()),
            ("policy".to_string(), self.policy.to_string()),
            ("send_sci".to_string(), self.send_sci.to_string()),
        ]
    }

    /// Checks key material against the cipher suite.
    pub fn validate(&self, name: &str) -> MacsecResult<()> {
        if name.is_empty() {
            return Err(MacsecError::invalid_profile(name, "empty profile name"));
        }
        let expected = self.cipher_suite.cak_hex_len();
        if self.primary_cak.len() != expected || !is_hex(&self.primary_cak) {
            return Err(MacsecError::invalid_profile(
                name,
                format!(
                    "primary_cak must be {} hex digits for {}",
                    expected, self.cipher_suite
                ),
            ));
        }
        if self.primary_ckn.is_empty()
            || self.primary_ckn.len() > 64
            || self.primary_ckn.len() % 2 != 0
            || !is_hex(&self.primary_ckn)
        {
            return Err(MacsecError::invalid_profile(
                name,
                "primary_ckn must be an even number of hex digits, at most 64",
            ));
        }
        Ok(())
    }
}

fn is_hex(text: &str) -> bool {
    text.chars().all(|c| c.is_ascii_hexdigit())
}

/// Writes profile `name` to the CONFIG_DB of `host`.
pub async fn set_macsec_profile<H: Host + ?Sized>(
    host: &H,
    name: &str,
    profile: &MacsecProfile,
) -> MacsecResult<()> {
    profile.validate(name)?;
    debug!(host = host.hostname(), profile = name, priority = profile.priority, "Setting MACsec profile");
    ConfigDb::new(host)
        .set_fields(&ConfigDbKey::new(MACSEC_PROFILE_TABLE, name), &profile.fields())
        .await?;
    Ok(())
}

/// Removes profile `name` from the CONFIG_DB of `host`.
pub async fn delete_macsec_profile<H: Host + ?Sized>(host: &H, name: &str) -> MacsecResult<()> {
    debug!(host = host.hostname(), profile = name, "Deleting MACsec profile");
    ConfigDb::new(host)
        .delete_record(&ConfigDbKey::new(MACSEC_PROFILE_TABLE, name))
        .await?;
    Ok(())
}

/// Attaches profile `profile_name` to `port`.
pub async fn enable_macsec_port<H: Host + ?Sized>(
    host: &H,
    port: &str,
    profile_name: &str,
) -> MacsecResult<()> {
    info!(host = host.hostname(), port, profile = profile_name, "Enabling MACsec");
    ConfigDb::new(host)
        .set_field(&ConfigDbKey::new(PORT_TABLE, port), PORT_MACSEC_FIELD, profile_name)
        .await?;
    Ok(())
}

/// Detaches any MACsec profile from `port`.
pub async fn disable_macsec_port<H: Host + ?Sized>(host: &H, port: &str) -> MacsecResult<()> {
    info!(host = host.hostname(), port, "Disabling MACsec");
    ConfigDb::new(host)
        .delete_field(&ConfigDbKey::new(PORT_TABLE, port), PORT_MACSEC_FIELD)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sonic_mgmt_common::ModuleResult;
    use sonic_mgmt_test::{CallVerifier, MockHost};

    const CAK_128: &str = "0123456789abcdef0123456789abcdef";
    const CKN: &str = "6162636465666768696A6B6C6D6E6F707172737475767778797A303132333435";

    fn profile() -> MacsecProfile {
        MacsecProfile::new(
            64,
            CipherSuite::GcmAes128,
            CAK_128,
            CKN,
            MacsecPolicy::Security,
            true,
        )
    }

    #[test]
    fn test_fields_order() {
        let names: Vec<String> = profile().fields().into_iter().map(|(k, _)| k).collect();
        assert_eq!(
            names,
            vec!["priority", "cipher_suite", "primary_cak", "primary_ckn", "policy", "send_sci"]
        );
    }

    #[test]
    fn test_field_values() {
        let fields = profile().with_priority(63).fields();
        assert_eq!(fields[0].1, "63");
        assert_eq!(fields[1].1, "GCM-AES-128");
        assert_eq!(fields[4].1, "security");
        assert_eq!(fields[5].1, "true");
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_value(profile()).unwrap();
        assert_eq!(json["cipher_suite"], "GCM-AES-128");
        assert_eq!(json["policy"], "security");
        let back: MacsecProfile = serde_json::from_value(json).unwrap();
        assert_eq!(back, profile());
    }

    #[test]
    fn test_validate() {
        assert!(profile().validate("test").is_ok());
        assert!(profile().validate("").is_err());

        let mut p = profile();
        p.cipher_suite = CipherSuite::GcmAesXpn256;
        assert!(matches!(
            p.validate("test"),
            Err(MacsecError::InvalidProfile { .. })
        ));

        let mut p = profile();
        p.primary_ckn = "abc".to_string();
        assert!(p.validate("test").is_err());

        let mut p = profile();
        p.primary_cak = "zz".repeat(16);
        assert!(p.validate("test").is_err());
    }

    #[tokio::test]
    async fn test_set_profile_command() {
        let host = MockHost::new("vlab-01");
        set_macsec_profile(&host, "test", &profile()).await.unwrap();

        let commands = host.commands();
        assert_eq!(commands.len(), 1);
        assert_eq!(
            commands[0],
            format!(
                "sonic-db-cli CONFIG_DB HMSET 'MACSEC_PROFILE|test' 'priority' '64' \
                 'cipher_suite' 'GCM-AES-128' 'primary_cak' '{}' 'primary_ckn' '{}' \
                 'policy' 'security' 'send_sci' 'true'",
                CAK_128, CKN
            )
        );
    }

    #[tokio::test]
    async fn test_invalid_profile_not_written() {
        let host = MockHost::new("vlab-01");
        let mut p = profile();
        p.primary_cak = "short".to_string();
        assert!(set_macsec_profile(&host, "test", &p).await.is_err());
        assert!(host.calls().is_empty());
    }

    #[tokio::test]
    async fn test_port_and_delete_commands() {
        let host = MockHost::new("vlab-01");
        enable_macsec_port(&host, "Ethernet0", "test").await.unwrap();
        disable_macsec_port(&host, "Ethernet0").await.unwrap();
        delete_macsec_profile(&host, "test").await.unwrap();

        assert_eq!(
            host.commands(),
            vec![
                "sonic-db-cli CONFIG_DB HSET 'PORT|Ethernet0' 'macsec' 'test'",
                "sonic-db-cli CONFIG_DB HDEL 'PORT|Ethernet0' 'macsec'",
                "sonic-db-cli CONFIG_DB DEL 'MACSEC_PROFILE|test'",
            ]
        );
        CallVerifier::new(&host).assert_call_count("command", 3).unwrap();
    }

    #[tokio::test]
    async fn test_command_failure_propagates() {
        let host = MockHost::new("vlab-01").with_default(ModuleResult::failure("no db"));
        let err = enable_macsec_port(&host, "Ethernet0", "test").await.unwrap_err();
        assert!(matches!(err, MacsecError::Host(_)));
    }
}
