//! Port speed and auto-negotiation on EOS.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, instrument};

use sonic_mgmt_common::Host;

use crate::error::{EosHostError, EosResult};
use crate::host::EosHost;

static OPERATIONAL_SPEED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Operational Speed: (\S+)").expect("Invalid regex pattern"));

static SPEED_DUPLEX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Speed/Duplex: (.+)").expect("Invalid regex pattern"));

static LEADING_DIGITS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+").expect("Invalid regex pattern"));

/// `Operational Speed: 100G` to `"100000"` (Mb/s).
pub fn parse_operational_speed(output: &str) -> Option<String> {
    let caps = OPERATIONAL_SPEED_RE.captures(output)?;
    let value = caps.get(1)?.as_str();
    let mut chars = value.chars();
    chars.next_back();
    Some(format!("{}000", chars.as_str()))
}

/// `Speed/Duplex: 40G/full,100G/full,auto` to `["40000", "100000"]`.
pub fn parse_supported_speeds(output: &str) -> Option<Vec<String>> {
    let caps = SPEED_DUPLEX_RE.captures(output)?;
    let speeds = caps
        .get(1)?
        .as_str()
        .split(',')
        .map(str::trim)
        .filter(|s| *s != "auto")
        .filter_map(|s| LEADING_DIGITS_RE.find(s))
        .map(|m| format!("{}000", m.as_str()))
        .collect();
    Some(speeds)
}

/// Mb/s speed to the EOS `speed` keyword: `"100000"` to `"100gfull"`.
pub fn eos_speed_keyword(speed: &str) -> String {
    let keep = speed.len().saturating_sub(3);
    format!("{}gfull", speed.get(..keep).unwrap_or(""))
}

impl<H: Host> EosHost<H> {
    /// True if auto-negotiation is active on the interface.
    pub async fn get_auto_negotiation_mode(&self, interface: &str) -> EosResult<bool> {
        let command = format!("show interfaces {} status", interface);
        let output = self.show_json(&command).await?;
        if output.failed {
            return Err(EosHostError::CommandFailed {
                host: self.host.hostname().to_string(),
                command,
                message: format!(
                    "Failed to get auto neg state for {}: {}",
                    interface,
                    output.failure_message()
                ),
            });
        }

        output
            .output(0)
            .and_then(|o| o.get("interfaceStatuses"))
            .and_then(|s| s.get(interface))
            .and_then(|s| s.get("autoNegotiateActive"))
            .and_then(Value::as_bool)
            .ok_or_else(|| {
                EosHostError::unexpected_output(self.host.hostname(), &command, "missing autoNegotiateActive")
            })
    }

    async fn reset_port_speed(&self, interface: &str) -> EosResult<bool> {
        let out = self
            .eos_config_raw(vec!["default speed".to_string()], vec![format!("interface {}", interface)])
            .await?;
        debug!(interface = %interface, failed = out.failed, "Reset port speed");
        Ok(!out.failed)
    }

    /// Turns auto-negotiation on (advertising the highest supported speed)
    /// or off. Returns whether the device accepted the change.
    #[instrument(skip(self), fields(host = %self.host.hostname()))]
    pub async fn set_auto_negotiation_mode(&self, interface: &str, enabled: bool) -> EosResult<bool> {
        if self.get_auto_negotiation_mode(interface).await? == enabled {
            return Ok(true);
        }

        if !enabled {
            return self.reset_port_speed(interface).await;
        }

        let speeds = self.get_supported_speeds(interface).await?;
        let fastest = speeds.last().ok_or_else(|| {
            EosHostError::unexpected_output(self.host.hostname(), "capabilities", "no supported speeds")
        })?;
        let out = self
            .eos_config_raw(
                vec![format!("speed auto {}", eos_speed_keyword(fastest))],
                vec![format!("interface {}", interface)],
            )
            .await?;
        debug!(enabled, failed = out.failed, "Set auto neg");
        Ok(!out.failed)
    }

    /// Operational speed in Mb/s.
    pub async fn get_speed(&self, interface: &str) -> EosResult<String> {
        let command = format!("show interfaces {} transceiver properties", interface);
        let output = self.show_text(&command).await?;
        parse_operational_speed(&output).ok_or_else(|| {
            EosHostError::unexpected_output(
                self.host.hostname(),
                &command,
                format!("Not able to extract interface {} speed from output: {}", interface, output),
            )
        })
    }

    /// Sets the interface speed, keeping the current auto-negotiation mode.
    ///
    /// `None` is a no-op: on EOS advertising speeds and enabling
    /// auto-negotiation is a single command.
    #[instrument(skip(self), fields(host = %self.host.hostname()))]
    pub async fn set_speed(&self, interface: &str, speed: Option<&str>) -> EosResult<bool> {
        let Some(speed) = speed.filter(|s| !s.is_empty()) else {
            return Ok(true);
        };

        let mode = if self.get_auto_negotiation_mode(interface).await? {
            "auto"
        } else {
            "forced"
        };
        let out = self
            .eos_config_raw(
                vec![format!("speed {} {}", mode, eos_speed_keyword(speed))],
                vec![format!("interface {}", interface)],
            )
            .await?;
        debug!(speed, mode, failed = out.failed, "Set port speed");
        Ok(!out.failed)
    }

    /// Supported speeds in Mb/s, lowest first.
    pub async fn get_supported_speeds(&self, interface: &str) -> EosResult<Vec<String>> {
        let commands = [
            format!("show interfaces {} capabilities", interface),
            format!("show interface {} hardware", interface),
        ];

        let mut last_output = String::new();
        for command in &commands {
            let output = self.show_text(command).await?;
            if let Some(speeds) = parse_supported_speeds(&output) {
                return Ok(speeds);
            }
            last_output = output;
        }

        Err(EosHostError::unexpected_output(
            self.host.hostname(),
            &commands[1],
            format!("Failed to find port speeds list in output: {}", last_output),
        ))
    }
}
