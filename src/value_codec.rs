/// Typed literal codec
///
/// On-chain mapping values and execution inputs are serialized as digits
/// followed by a type suffix (e.g. "2500u64"). This module parses and
/// formats those literals. Decode failures stay local: callers get a
/// `DecodeError` and decide what to degrade, nothing panics.

use std::fmt;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Suffix tag for 64-bit unsigned integer literals
pub const U64_SUFFIX: &str = "u64";

// ============================================================================
// ERROR TYPES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Literal does not end with the expected type suffix
    MissingSuffix(String),
    /// Nothing before the type suffix
    EmptyBody,
    /// Body contains non-digit characters
    NonNumeric(String),
    /// Body is numeric but does not fit the target width
    Overflow(String),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::MissingSuffix(lit) => {
                write!(f, "literal '{}' missing expected type suffix", lit)
            }
            DecodeError::EmptyBody => write!(f, "literal has no digits before its suffix"),
            DecodeError::NonNumeric(body) => write!(f, "literal body '{}' is not numeric", body),
            DecodeError::Overflow(body) => write!(f, "literal body '{}' overflows u64", body),
        }
    }
}

impl std::error::Error for DecodeError {}

// ============================================================================
// DECODE / ENCODE
// ============================================================================

/// Decode a typed literal with an explicit suffix tag.
///
/// Strips `type_tag` from the end of `literal` and parses the remaining
/// body as an unsigned 64-bit integer.
pub fn decode(literal: &str, type_tag: &str) -> Result<u64, DecodeError> {
    let body = literal
        .trim()
        .strip_suffix(type_tag)
        .ok_or_else(|| DecodeError::MissingSuffix(literal.to_string()))?;

    if body.is_empty() {
        return Err(DecodeError::EmptyBody);
    }
    // u64::parse accepts a leading '+'; on-chain literals never carry one
    if !body.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DecodeError::NonNumeric(body.to_string()));
    }

    body.parse::<u64>()
        .map_err(|_| DecodeError::Overflow(body.to_string()))
}

/// Decode a `u64`-suffixed literal (mapping values, bet amounts).
pub fn decode_u64(literal: &str) -> Result<u64, DecodeError> {
    decode(literal, U64_SUFFIX)
}

/// Encode an integer as a typed literal with the given suffix tag.
/// No rounding happens here; callers supply an already-integral amount.
pub fn encode(n: u64, type_tag: &str) -> String {
    format!("{}{}", n, type_tag)
}

/// Encode an integer as a `u64`-suffixed literal.
pub fn encode_u64(n: u64) -> String {
    encode(n, U64_SUFFIX)
}

// ============================================================================
// TESTS
// ============================================================================
