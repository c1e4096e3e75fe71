//! CONFIG_DB access through `sonic-db-cli` on a host.
//!
//! Records are addressed by a composite key `TABLE|name`. The store offers
//! three writes (set fields, delete one field, delete the whole record)
//! plus a read of a whole record.

use std::collections::BTreeMap;
use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

use tracing::debug;

use crate::error::{MgmtError, MgmtResult};
use crate::host::Host;
use crate::shell::{singlequote, SONIC_DB_CLI};

/// Composite key of a CONFIG_DB record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfigDbKey {
    /// Table name, e.g. `PORT`.
    pub table: String,
    /// Record name, e.g. `Ethernet0`.
    pub name: String,
}

impl ConfigDbKey {
    /// Creates a key.
    pub fn new(table: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ConfigDbKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.table, self.name)
    }
}

/// Builds `sonic-db-cli` command lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SonicDbCli {
    db: String,
    namespace: Option<String>,
}

impl Default for SonicDbCli {
    fn default() -> Self {
        Self::config_db()
    }
}

impl SonicDbCli {
    /// Commands against CONFIG_DB in the default namespace.
    pub fn config_db() -> Self {
        Self {
            db: "CONFIG_DB".to_string(),
            namespace: None,
        }
    }

    /// Targets an ASIC namespace (`-n asic0`).
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    fn prefix(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{} -n {} {}", SONIC_DB_CLI, ns, self.db),
            None => format!("{} {}", SONIC_DB_CLI, self.db),
        }
    }

    /// `HMSET 'TABLE|name' 'f1' 'v1' 'f2' 'v2' ...`
    pub fn hmset(&self, key: &ConfigDbKey, fields: &[(String, String)]) -> String {
        let mut cmd = format!("{} HMSET {}", self.prefix(), singlequote(&key.to_string()));
        for (field, value) in fields {
            cmd.push_str(&format!(" {} {}", singlequote(field), singlequote(value)));
        }
        cmd
    }

    /// `HSET 'TABLE|name' 'field' 'value'`
    pub fn hset(&self, key: &ConfigDbKey, field: &str, value: &str) -> String {
        format!(
            "{} HSET {} {} {}",
            self.prefix(),
            singlequote(&key.to_string()),
            singlequote(field),
            singlequote(value)
        )
    }

    /// `HDEL 'TABLE|name' 'field'`
    pub fn hdel(&self, key: &ConfigDbKey, field: &str) -> String {
        format!(
            "{} HDEL {} {}",
            self.prefix(),
            singlequote(&key.to_string()),
            singlequote(field)
        )
    }

    /// `DEL 'TABLE|name'`
    pub fn del(&self, key: &ConfigDbKey) -> String {
        format!("{} DEL {}", self.prefix(), singlequote(&key.to_string()))
    }

    /// `HGETALL 'TABLE|name'`
    pub fn hgetall(&self, key: &ConfigDbKey) -> String {
        format!("{} HGETALL {}", self.prefix(), singlequote(&key.to_string()))
    }
}

/// CONFIG_DB on a particular host.
pub struct ConfigDb<'a, H: Host + ?Sized> {
    host: &'a H,
    cli: SonicDbCli,
}

impl<'a, H: Host + ?Sized> ConfigDb<'a, H> {
    /// CONFIG_DB of `host`, default namespace.
    pub fn new(host: &'a H) -> Self {
        Self {
            host,
            cli: SonicDbCli::config_db(),
        }
    }

    /// CONFIG_DB of `host` in an ASIC namespace.
    pub fn with_namespace(host: &'a H, namespace: impl Into<String>) -> Self {
        Self {
            host,
            cli: SonicDbCli::config_db().with_namespace(namespace),
        }
    }

    /// Sets fields on a record, creating it if needed.
    pub async fn set_fields(&self, key: &ConfigDbKey, fields: &[(String, String)]) -> MgmtResult<()> {
        debug!(host = self.host.hostname(), key = %key, count = fields.len(), "CONFIG_DB set");
        self.host.command(&self.cli.hmset(key, fields)).await?;
        Ok(())
    }

    /// Sets a single field.
    pub async fn set_field(&self, key: &ConfigDbKey, field: &str, value: &str) -> MgmtResult<()> {
        debug!(host = self.host.hostname(), key = %key, field, value, "CONFIG_DB hset");
        self.host.command(&self.cli.hset(key, field, value)).await?;
        Ok(())
    }

    /// Removes a single field.
    pub async fn delete_field(&self, key: &ConfigDbKey, field: &str) -> MgmtResult<()> {
        debug!(host = self.host.hostname(), key = %key, field, "CONFIG_DB hdel");
        self.host.command(&self.cli.hdel(key, field)).await?;
        Ok(())
    }

    /// Removes the whole record.
    pub async fn delete_record(&self, key: &ConfigDbKey) -> MgmtResult<()> {
        debug!(host = self.host.hostname(), key = %key, "CONFIG_DB del");
        self.host.command(&self.cli.del(key)).await?;
        Ok(())
    }

    /// Reads all fields of a record.
    ///
    /// `sonic-db-cli` prints HGETALL as a Python dict literal, see
    /// [`parse_hgetall`]. A missing record yields an empty map.
    pub async fn get_record(&self, key: &ConfigDbKey) -> MgmtResult<BTreeMap<String, String>> {
        let result = self.host.command(&self.cli.hgetall(key)).await?;
        let text = result.stdout_text().trim();
        if text.is_empty() {
            return Ok(BTreeMap::new());
        }
        parse_hgetall(text).map_err(|message| {
            MgmtError::unexpected_output(
                self.host.hostname(),
                "command",
                format!("{}: {}", message, text),
            )
        })
    }
}

/// Parses the Python dict literal printed for HGETALL, e.g.
/// `{'alias': 'etp1', 'description': "Bob's port"}`.
///
/// Keys and values are Python string literals in either quote style.
/// Backslash escapes are decoded; unknown escapes are kept verbatim.
pub fn parse_hgetall(text: &str) -> Result<BTreeMap<String, String>, String> {
    let mut chars = text.trim().chars().peekable();
    let mut record = BTreeMap::new();

    expect_char(&mut chars, '{')?;
    skip_whitespace(&mut chars);
    if chars.peek() == Some(&'}') {
        chars.next();
    } else {
        loop {
            let field = parse_py_string(&mut chars)?;
            skip_whitespace(&mut chars);
            expect_char(&mut chars, ':')?;
            let value = parse_py_string(&mut chars)?;
            record.insert(field, value);

            skip_whitespace(&mut chars);
            match chars.next() {
                Some(',') => {
                    skip_whitespace(&mut chars);
                    if chars.peek() == Some(&'}') {
                        chars.next();
                        break;
                    }
                }
                Some('}') => break,
                Some(c) => return Err(format!("expected ',' or '}}', found '{}'", c)),
                None => return Err("unterminated mapping".to_string()),
            }
        }
    }

    skip_whitespace(&mut chars);
    match chars.next() {
        None => Ok(record),
        Some(c) => Err(format!("trailing input at '{}'", c)),
    }
}

fn skip_whitespace(chars: &mut Peekable<Chars<'_>>) {
    while chars.next_if(|c| c.is_whitespace()).is_some() {}
}

fn expect_char(chars: &mut Peekable<Chars<'_>>, expected: char) -> Result<(), String> {
    match chars.next() {
        Some(c) if c == expected => Ok(()),
        Some(c) => Err(format!("expected '{}', found '{}'", expected, c)),
        None => Err(format!("expected '{}', found end of input", expected)),
    }
}

fn parse_py_string(chars: &mut Peekable<Chars<'_>>) -> Result<String, String> {
    skip_whitespace(chars);
    let quote = match chars.next() {
        Some(q @ ('\'' | '"')) => q,
        Some(c) => return Err(format!("expected string literal, found '{}'", c)),
        None => return Err("expected string literal, found end of input".to_string()),
    };

    let mut out = String::new();
    loop {
        match chars.next() {
            None => return Err("unterminated string literal".to_string()),
            Some(c) if c == quote => return Ok(out),
            Some('\\') => match chars.next() {
                None => return Err("unterminated string literal".to_string()),
                Some('\\') => out.push('\\'),
                Some('\'') => out.push('\''),
                Some('"') => out.push('"'),
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('r') => out.push('\r'),
                Some('0') => out.push('\0'),
                Some('x') => out.push(hex_escape(chars, 2)?),
                Some('u') => out.push(hex_escape(chars, 4)?),
                Some('U') => out.push(hex_escape(chars, 8)?),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
            },
            Some(c) => out.push(c),
        }
    }
}

fn hex_escape(chars: &mut Peekable<Chars<'_>>, digits: usize) -> Result<char, String> {
    let hex: String = chars.by_ref().take(digits).collect();
    if hex.chars().count() != digits || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(format!("invalid escape '\\{}'", hex));
    }
    u32::from_str_radix(&hex, 16)
        .ok()
        .and_then(char::from_u32)
        .ok_or_else(|| format!("invalid escape '\\{}'", hex))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_key_display() {
        let key = ConfigDbKey::new("MACSEC_PROFILE", "MACSEC_PROFILE_0");
        assert_eq!(key.to_string(), "MACSEC_PROFILE|MACSEC_PROFILE_0");
    }

    #[test]
    fn test_hmset_command() {
        let cli = SonicDbCli::config_db();
        let key = ConfigDbKey::new("MACSEC_PROFILE", "p1");
        let cmd = cli.hmset(
            &key,
            &[
                ("priority".to_string(), "64".to_string()),
                ("policy".to_string(), "security".to_string()),
            ],
        );
        assert_eq!(
            cmd,
            "sonic-db-cli CONFIG_DB HMSET 'MACSEC_PROFILE|p1' 'priority' '64' 'policy' 'security'"
        );
    }

    #[test]
    fn test_port_field_commands() {
        let cli = SonicDbCli::config_db();
        let key = ConfigDbKey::new("PORT", "Ethernet0");
        assert_eq!(
            cli.hset(&key, "macsec", "p1"),
            "sonic-db-cli CONFIG_DB HSET 'PORT|Ethernet0' 'macsec' 'p1'"
        );
        assert_eq!(
            cli.hdel(&key, "macsec"),
            "sonic-db-cli CONFIG_DB HDEL 'PORT|Ethernet0' 'macsec'"
        );
        assert_eq!(cli.del(&key), "sonic-db-cli CONFIG_DB DEL 'PORT|Ethernet0'");
    }

    #[test]
    fn test_namespace_prefix() {
        let cli = SonicDbCli::config_db().with_namespace("asic1");
        let key = ConfigDbKey::new("PORT", "Ethernet8");
        assert_eq!(
            cli.hgetall(&key),
            "sonic-db-cli -n asic1 CONFIG_DB HGETALL 'PORT|Ethernet8'"
        );
    }

    #[test]
    fn test_parse_hgetall_quote_styles() {
        let record =
            parse_hgetall(r#"{'alias': 'etp1', 'description': "Bob's port", 'mtu': '9100'}"#)
                .unwrap();
        assert_eq!(record.len(), 3);
        assert_eq!(record["alias"], "etp1");
        assert_eq!(record["description"], "Bob's port");
        assert_eq!(record["mtu"], "9100");
    }

    #[test]
    fn test_parse_hgetall_escapes() {
        let record = parse_hgetall(r#"{'a': 'it\'s', 'b': "say \"hi\"", 'c': 'x\\y', 'd': '\x41\n'}"#)
            .unwrap();
        assert_eq!(record["a"], "it's");
        assert_eq!(record["b"], "say \"hi\"");
        assert_eq!(record["c"], "x\\y");
        assert_eq!(record["d"], "A\n");
    }

    #[test]
    fn test_parse_hgetall_empty_and_malformed() {
        assert!(parse_hgetall("{}").unwrap().is_empty());
        assert!(parse_hgetall("{ }").unwrap().is_empty());
        assert!(parse_hgetall("{'a': 'b'").is_err());
        assert!(parse_hgetall("{'a': 1}").is_err());
        assert!(parse_hgetall("['a', 'b']").is_err());
        assert!(parse_hgetall("{'a': 'b'} extra").is_err());
    }
}
