//! DUT platform lookup.

use tracing::debug;

use sonic_mgmt_common::Host;

use crate::error::{MockerError, MockerResult};

/// Prints `Platform:`, `HwSKU:` and `ASIC:` lines.
pub const SHOW_PLATFORM_SUMMARY: &str = "show platform summary";

/// Extracts the `Platform:` value from `show platform summary` output.
pub fn parse_platform(summary: &str) -> Option<&str> {
    summary.lines().find_map(|line| {
        let (key, value) = line.split_once(':')?;
        (key.trim() == "Platform")
            .then(|| value.trim())
            .filter(|v| !v.is_empty())
    })
}

/// Platform string of `dut`, e.g. `x86_64-mlnx_msn2700-r0`.
pub async fn platform_of<H: Host + ?Sized>(dut: &H) -> MockerResult<String> {
    let result = dut.command(SHOW_PLATFORM_SUMMARY).await?;
    let platform = parse_platform(result.stdout_text())
        .map(str::to_string)
        .ok_or_else(|| MockerError::UnknownPlatform {
            host: dut.hostname().to_string(),
        })?;
    debug!(host = dut.hostname(), platform = %platform, "Detected platform");
    Ok(platform)
}
