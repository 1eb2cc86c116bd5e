//! Mobile number masking for logs
//!
//! Mobile numbers are personal data; log records only ever carry the
//! masked form (first 3 and last 4 digits visible).

/// Mask a mobile number for logging
///
/// Numbers too short to mask meaningfully are replaced entirely.
pub fn mask_mobile(mobile: &str) -> String {
    if mobile.len() >= 8 && mobile.is_ascii() {
        format!(
            "{}****{}",
            &mobile[..3],
            &mobile[mobile.len() - 4..]
        )
    } else {
        "****".to_string()
    }
}
