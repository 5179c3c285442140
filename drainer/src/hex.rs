use anyhow::{Context, bail};

/// Converts a hex string, optionally prefixed with `0x`, to bytes.
pub fn parse_hex_payload(hex_string: &str) -> anyhow::Result<Vec<u8>> {
    let digits = hex_string
        .strip_prefix("0x")
        .or_else(|| hex_string.strip_prefix("0X"))
        .unwrap_or(hex_string);

    if !digits.is_ascii() {
        bail!("hex payload `{hex_string}` contains non ascii characters");
    }

    if digits.len() % 2 != 0 {
        bail!("hex payload `{hex_string}` has an odd number of digits");
    }

    let mut result = Vec::with_capacity(digits.len() / 2);
    for i in (0..digits.len()).step_by(2) {
        let pair = &digits[i..i + 2];
        let byte = u8::from_str_radix(pair, 16)
            .with_context(|| format!("hex payload `{hex_string}` has invalid digits `{pair}`"))?;
        result.push(byte);
    }

    Ok(result)
}

/// Renders bytes as a `0x` prefixed lowercase hex string.
pub fn to_hex(bytes: &[u8]) -> String {
    let mut result = String::with_capacity(2 + bytes.len() * 2);
    result.push_str("0x");
    for byte in bytes {
        result.push_str(&format!("{byte:02x}"));
    }

    result
}
