//! Read-only state inspection for debuggers and status displays.
//!
//! Queries never touch emulation state: no wait states, no latch clears.

use std::fmt;

/// A dynamically-typed value returned by a state query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Bool(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    Text(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{}", if *v { "yes" } else { "no" }),
            Value::U8(v) => write!(f, "{v:02X}h"),
            Value::U16(v) => write!(f, "{v:04X}h"),
            Value::U32(v) => write!(f, "{v}"),
            Value::Text(v) => f.write_str(v),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<u8> for Value {
    fn from(v: u8) -> Self {
        Value::U8(v)
    }
}

impl From<u16> for Value {
    fn from(v: u16) -> Self {
        Value::U16(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::U32(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

/// A component whose state can be inspected by dotted path, e.g.
/// `ula.line` or `memory.0x4000`.
pub trait Observable {
    /// Query one property. `None` if the path is not recognised.
    fn query(&self, path: &str) -> Option<Value>;

    /// Paths accepted by [`query`](Observable::query).
    fn query_paths(&self) -> &'static [&'static str];
}

/// Parse the address part of a `memory.<addr>` query.
///
/// Accepts `0x1234`, `$1234`, `1234h` (hex) and plain decimal.
#[must_use]
pub fn parse_address(text: &str) -> Option<u16> {
    if let Some(hex) = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .or_else(|| text.strip_prefix('$'))
        .or_else(|| text.strip_suffix('h'))
        .or_else(|| text.strip_suffix('H'))
    {
        u16::from_str_radix(hex, 16).ok()
    } else {
        text.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_forms() {
        assert_eq!(parse_address("0x4000"), Some(0x4000));
        assert_eq!(parse_address("$5AFF"), Some(0x5AFF));
        assert_eq!(parse_address("1800h"), Some(0x1800));
        assert_eq!(parse_address("32768"), Some(0x8000));
        assert_eq!(parse_address("0x10000"), None);
        assert_eq!(parse_address("screen"), None);
    }

    #[test]
    fn display_formats() {
        assert_eq!(Value::U8(0x3F).to_string(), "3Fh");
        assert_eq!(Value::U16(0x4000).to_string(), "4000h");
        assert_eq!(Value::Bool(true).to_string(), "yes");
        assert_eq!(Value::U32(312).to_string(), "312");
    }
}
