//! Redirect URL Composition
//!
//! Builds the success and cancel URLs handed to the payment processor.
//! Values wrapped in literal braces are processor-side placeholders,
//! substituted at redirect time, so the braces themselves must survive
//! percent-encoding.

/// Placeholder the processor replaces with the real session id.
pub const SESSION_ID_PLACEHOLDER: &str = "{CHECKOUT_SESSION_ID}";

/// Append `key=value` to `url`, choosing `?` or `&` by whether the URL
/// already carries a query string. An empty `url` passes through unchanged.
pub fn append_param(url: &str, key: &str, value: &str) -> String {
    if url.is_empty() {
        return String::new();
    }
    let sep = if url.contains('?') { '&' } else { '?' };
    format!("{url}{sep}{}={}", encode(key), encode_value(value))
}

/// Percent-encode a value, keeping the outer braces of a placeholder
/// intact while still encoding whatever sits between them.
fn encode_value(value: &str) -> String {
    value
        .strip_prefix('{')
        .and_then(|v| v.strip_suffix('}'))
        .map_or_else(|| encode(value), |inner| format!("{{{}}}", encode(inner)))
}

/// Percent-encode with the same unreserved set browsers use for query
/// values: alphanumerics plus `- _ . ! ~ * ' ( )`.
fn encode(value: &str) -> String {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";

    let mut out = String::with_capacity(value.len());
    for &byte in value.as_bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => out.push(byte as char),
            _ => {
                out.push('%');
                out.push(HEX[(byte >> 4) as usize] as char);
                out.push(HEX[(byte & 0x0F) as usize] as char);
            }
        }
    }
    out
}
