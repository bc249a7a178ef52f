//! IEEE 754 80-bit extended precision codec for AIFF sample rates.
//!
//! Layout (big-endian): sign (1 bit) | biased exponent (15 bits) |
//! significand (64 bits, explicit integer bit). For normal numbers the value
//! is `(-1)^sign * significand * 2^(exponent - 16383 - 63)`.

const EXPONENT_BIAS: i32 = 16383;
const EXPONENT_MASK: u16 = 0x7FFF;
const F64_EXPONENT_BIAS: i32 = 1023;

/// Decodes a 10-byte extended float into an `f64`.
///
/// Precision beyond 53 significand bits is rounded away. Infinity and NaN
/// encodings decode to the corresponding `f64` specials.
pub fn decode(bytes: &[u8; 10]) -> f64 {
    let sign_exponent = u16::from_be_bytes([bytes[0], bytes[1]]);
    let mut significand_bytes = [0u8; 8];
    significand_bytes.copy_from_slice(&bytes[2..]);
    let significand = u64::from_be_bytes(significand_bytes);

    let negative = sign_exponent & 0x8000 != 0;
    let exponent = sign_exponent & EXPONENT_MASK;

    let magnitude = if exponent == 0 && significand == 0 {
        0.0
    } else if exponent == EXPONENT_MASK {
        // Integer bit is ignored for specials; any fraction bit marks NaN.
        if significand << 1 == 0 {
            f64::INFINITY
        } else {
            f64::NAN
        }
    } else {
        let shift = exponent as i32 - EXPONENT_BIAS - 63;
        significand as f64 * 2f64.powi(shift)
    };

    if negative {
        -magnitude
    } else {
        magnitude
    }
}

/// Encodes an `f64` as a 10-byte extended float.
///
/// The conversion is exact: every `f64` is representable in the wider format.
pub fn encode(value: f64) -> [u8; 10] {
    let bits = value.to_bits();
    let negative = bits >> 63 != 0;
    let f64_exponent = ((bits >> 52) & 0x7FF) as i32;
    let fraction = bits & ((1u64 << 52) - 1);

    let (exponent, significand): (u16, u64) = if f64_exponent == 0 && fraction == 0 {
        (0, 0)
    } else if f64_exponent == 0x7FF {
        let significand = if fraction == 0 {
            1 << 63
        } else {
            (1 << 63) | (fraction << 11)
        };
        (EXPONENT_MASK, significand)
    } else if f64_exponent == 0 {
        // Subnormal f64: normalize so the explicit integer bit is set.
        let leading = fraction.leading_zeros() as i32;
        let significand = fraction << leading;
        let unbiased = 63 - leading - (F64_EXPONENT_BIAS + 51);
        ((unbiased + EXPONENT_BIAS) as u16, significand)
    } else {
        let unbiased = f64_exponent - F64_EXPONENT_BIAS;
        (
            (unbiased + EXPONENT_BIAS) as u16,
            (1 << 63) | (fraction << 11),
        )
    };

    let sign_exponent = if negative { exponent | 0x8000 } else { exponent };
    let mut out = [0u8; 10];
    out[..2].copy_from_slice(&sign_exponent.to_be_bytes());
    out[2..].copy_from_slice(&significand.to_be_bytes());
    out
}
