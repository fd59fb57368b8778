//! 手写 JSON 编码
//!
//! 只服务于 GeoLocation 这一种形状：字面量片段直接拷贝，数字交给
//! serde_json 的 `CompactFormatter` 直接写入，与 [`super::Codec::Generic`]
//! 的输出逐字节一致（非有限浮点数输出 `null`，与 serde_json 序列化器相同）。

use serde_json::ser::{CompactFormatter, Formatter};

use super::CodecError;
use crate::services::geoip::GeoLocation;

const PREFIX: &[u8] = br#"{"country":{"iso_code":""#;
const LATITUDE: &[u8] = br#""},"location":{"latitude":"#;
const LONGITUDE: &[u8] = br#","longitude":"#;
const ACCURACY: &[u8] = br#","accuracy_radius":"#;
const SUFFIX: &[u8] = b"}}";

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

pub(super) fn encode_into(location: &GeoLocation, out: &mut Vec<u8>) -> Result<(), CodecError> {
    out.reserve(
        PREFIX.len()
            + LATITUDE.len()
            + LONGITUDE.len()
            + ACCURACY.len()
            + SUFFIX.len()
            + location.country_iso_code.len()
            + 2 * 24
            + 10,
    );

    out.extend_from_slice(PREFIX);
    write_escaped_str(out, &location.country_iso_code);
    out.extend_from_slice(LATITUDE);
    write_f64(out, location.latitude)?;
    out.extend_from_slice(LONGITUDE);
    write_f64(out, location.longitude)?;
    out.extend_from_slice(ACCURACY);
    CompactFormatter.write_u32(out, location.accuracy_radius_km)?;
    out.extend_from_slice(SUFFIX);
    Ok(())
}

#[inline]
fn write_f64(out: &mut Vec<u8>, value: f64) -> Result<(), CodecError> {
    if value.is_finite() {
        CompactFormatter.write_f64(out, value)?;
    } else {
        out.extend_from_slice(b"null");
    }
    Ok(())
}

/// 与 serde_json 相同的字符串转义规则
fn write_escaped_str(out: &mut Vec<u8>, value: &str) {
    let bytes = value.as_bytes();
    let mut start = 0;

    for (i, &byte) in bytes.iter().enumerate() {
        let short: &[u8] = match byte {
            b'"' => b"\\\"",
            b'\\' => b"\\\\",
            0x08 => b"\\b",
            0x0c => b"\\f",
            b'\n' => b"\\n",
            b'\r' => b"\\r",
            b'\t' => b"\\t",
            0x00..=0x1f => b"",
            _ => continue,
        };

        out.extend_from_slice(&bytes[start..i]);
        if short.is_empty() {
            out.extend_from_slice(&[
                b'\\',
                b'u',
                b'0',
                b'0',
                HEX_DIGITS[(byte >> 4) as usize],
                HEX_DIGITS[(byte & 0x0f) as usize],
            ]);
        } else {
            out.extend_from_slice(short);
        }
        start = i + 1;
    }

    out.extend_from_slice(&bytes[start..]);
}
