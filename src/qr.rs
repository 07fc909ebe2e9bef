//! QR payload handling: a device QR encodes a bare `0x`-prefixed contract
//! address, possibly embedded in a longer string (a URL, an `ethereum:` URI).
//! Image decoding is out of scope; this module works on the scanned text.

use alloy::primitives::Address;

use crate::error::InfraLinkError;

const ADDRESS_HEX_LEN: usize = 40;

/// Whether the whole string is a `0x` + 40-hex-digit address.
pub fn is_device_address(text: &str) -> bool {
    let rest = match text.strip_prefix("0x") {
        Some(r) => r,
        None => return false,
    };
    rest.len() == ADDRESS_HEX_LEN && rest.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Extract the first contract address from scanned QR text.
///
/// Matches `0x` followed by exactly 40 hex digits anywhere in the input, so
/// payloads like `ethereum:0x…` or explorer URLs work unchanged.
pub fn extract_device_address(scanned: &str) -> Option<Address> {
    let text = scanned.trim();
    let bytes = text.as_bytes();

    let mut i = 0;
    while i + 2 + ADDRESS_HEX_LEN <= bytes.len() {
        if bytes[i] == b'0'
            && bytes[i + 1] == b'x'
            && bytes[i + 2..i + 2 + ADDRESS_HEX_LEN]
                .iter()
                .all(|b| b.is_ascii_hexdigit())
        {
            return text[i..i + 2 + ADDRESS_HEX_LEN].parse().ok();
        }
        i += 1;
    }
    None
}

/// Validate manual address entry. Unlike [`extract_device_address`] the
/// whole (trimmed) input must be an address; nothing malformed reaches the
/// chain layer.
pub fn parse_device_address(text: &str) -> Result<Address, InfraLinkError> {
    let trimmed = text.trim();
    if !is_device_address(trimmed) {
        return Err(InfraLinkError::InvalidAddress(trimmed.to_string()));
    }
    trimmed
        .parse()
        .map_err(|_| InfraLinkError::InvalidAddress(trimmed.to_string()))
}

/// The string a generated device QR encodes: the bare contract address.
pub fn qr_payload(address: Address) -> String {
    format!("{address:#x}")
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDR: &str = "0xaff84326fc701dfb3c5881b2749dba27e9a98978";

    #[test]
    fn test_bare_address() {
        let a = extract_device_address(ADDR).unwrap();
        assert_eq!(format!("{a:#x}"), ADDR);
    }

    #[test]
    fn test_address_embedded_in_url() {
        let a =
            extract_device_address(&format!("https://etherscan.io/address/{ADDR}")).unwrap();
        assert_eq!(format!("{a:#x}"), ADDR);
    }

    #[test]
    fn test_ethereum_uri() {
        assert!(extract_device_address(&format!("ethereum:{ADDR}")).is_some());
    }

    #[test]
    fn test_whitespace_trimmed() {
        assert!(extract_device_address(&format!("  {ADDR}\n")).is_some());
    }

    #[test]
    fn test_no_address_present() {
        assert!(extract_device_address("hello world").is_none());
        assert!(extract_device_address("0x123").is_none());
        // 39 hex digits is one short
        assert!(extract_device_address("0xaff84326fc701dfb3c5881b2749dba27e9a9897").is_none());
    }

    #[test]
    fn test_overlong_hex_takes_first_forty() {
        // one extra trailing hex digit: the first 40 still match
        let a = extract_device_address(&format!("{ADDR}a")).unwrap();
        assert_eq!(format!("{a:#x}"), ADDR);
    }

    #[test]
    fn test_is_device_address_exact_pattern() {
        assert!(is_device_address(ADDR));
        assert!(!is_device_address(&format!("{ADDR}a")));
        assert!(!is_device_address(&format!(" {ADDR}")));
        assert!(!is_device_address("0xzz..."));
    }

    #[test]
    fn test_parse_device_address_strict() {
        assert!(parse_device_address(&format!("  {ADDR} ")).is_ok());
        assert!(matches!(
            parse_device_address(&format!("https://x.test/{ADDR}")),
            Err(crate::error::InfraLinkError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_qr_payload_round_trips() {
        let a: Address = ADDR.parse().unwrap();
        let payload = qr_payload(a);
        assert!(is_device_address(&payload));
        assert_eq!(extract_device_address(&payload), Some(a));
    }
}
