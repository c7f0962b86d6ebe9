//! Converts raw column values into their canonical export text

use chrono::{NaiveDate, TimeDelta};
use uuid::Uuid;

use crate::error::{ExportError, Result};
use crate::schema::{CodePage, ColumnDescriptor, ColumnType};
use crate::store::RawValue;

/// Columns the engine cannot retrieve with any of its typed accessors.
/// They always export as blank.
pub const UNREADABLE_COLUMNS: &[&str] = &["link_data_v2"];

/// Valid OLE Automation date range, exclusive on both ends
const OLE_DATE_MIN: f64 = -657_435.0;
const OLE_DATE_MAX: f64 = 2_958_466.0;
const MILLIS_PER_DAY: i64 = 86_400_000;

pub fn is_unreadable(column: &str) -> bool {
    UNREADABLE_COLUMNS.contains(&column)
}

/// Format one retrieved value according to its column descriptor.
///
/// An unset value formats as the empty string. Unsupported storage types
/// fail even when the value is unset, so an unknown schema never exports
/// as silently blank data.
pub fn format_value(raw: Option<RawValue<'_>>, column: &ColumnDescriptor) -> Result<String> {
    if is_unreadable(&column.name) {
        return Ok(String::new());
    }

    if let ColumnType::Unsupported(tag) = column.column_type {
        return Err(ExportError::UnsupportedColumnType {
            column: column.name.clone(),
            column_id: column.id,
            tag,
        });
    }

    let raw = match raw {
        Some(raw) => raw,
        None => return Ok(String::new()),
    };

    let text = match (column.column_type, raw) {
        (ColumnType::Nil, _) | (_, RawValue::Nil) => String::new(),
        (ColumnType::Bit, RawValue::Bool(v)) => (if v { "True" } else { "False" }).to_string(),
        (ColumnType::UnsignedByte, RawValue::U8(v)) => v.to_string(),
        (ColumnType::Short, RawValue::I16(v)) => v.to_string(),
        (ColumnType::UnsignedShort, RawValue::U16(v)) => v.to_string(),
        (ColumnType::Long, RawValue::I32(v)) => v.to_string(),
        (ColumnType::UnsignedLong, RawValue::U32(v)) => v.to_string(),
        (ColumnType::LongLong | ColumnType::Currency, RawValue::I64(v)) => v.to_string(),
        (ColumnType::UnsignedLongLong, RawValue::U64(v)) => v.to_string(),
        (ColumnType::IeeeSingle, RawValue::F32(v)) => v.to_string(),
        (ColumnType::IeeeDouble, RawValue::F64(v)) => v.to_string(),
        (ColumnType::DateTime, RawValue::DateTime(v)) => format_ole_date(v),
        (ColumnType::Guid, RawValue::Guid(bytes)) => {
            Uuid::from_bytes_le(bytes).hyphenated().to_string()
        }
        (ColumnType::Text | ColumnType::LongText, RawValue::Text(bytes)) => {
            decode_text(bytes, column.code_page)
        }
        (ColumnType::Binary | ColumnType::LongBinary, RawValue::Binary(bytes)) => {
            hex::encode(bytes)
        }
        (expected, found) => {
            return Err(ExportError::ValueMismatch {
                column: column.name.clone(),
                expected: expected.name(),
                found: found.kind(),
            })
        }
    };

    Ok(text)
}

/// Decode text stored in `code_page` and drop NUL padding
pub fn decode_text(bytes: &[u8], code_page: CodePage) -> String {
    let text = match code_page {
        CodePage::Unicode => {
            let pairs = bytes.chunks_exact(2);
            let trailing = !pairs.remainder().is_empty();
            let units: Vec<u16> = pairs
                .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                .collect();
            let mut text = String::from_utf16_lossy(&units);
            // A dangling half code unit is not silently dropped
            if trailing {
                text.push(char::REPLACEMENT_CHARACTER);
            }
            text
        }
        CodePage::Other(CodePage::UTF8_ID) => String::from_utf8_lossy(bytes).into_owned(),
        CodePage::Ascii | CodePage::Other(_) => bytes
            .iter()
            .map(|&b| if b.is_ascii() { b as char } else { '?' })
            .collect(),
    };
    text.replace('\0', "")
}

/// Render an OLE Automation date as ISO-8601, rounded to the millisecond.
///
/// Negative dates keep the time of day as a positive fraction, so -1.25 is
/// 1899-12-29 06:00. Values outside the OLE range print as the raw number.
pub fn format_ole_date(value: f64) -> String {
    if !(value > OLE_DATE_MIN && value < OLE_DATE_MAX) {
        return value.to_string();
    }

    let half = if value >= 0.0 { 0.5 } else { -0.5 };
    let mut millis = (value * MILLIS_PER_DAY as f64 + half) as i64;
    if millis < 0 {
        millis -= (millis % MILLIS_PER_DAY) * 2;
    }

    NaiveDate::from_ymd_opt(1899, 12, 30)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .zip(TimeDelta::try_milliseconds(millis))
        .and_then(|(epoch, delta)| epoch.checked_add_signed(delta))
        .map(|datetime| datetime.format("%Y-%m-%dT%H:%M:%S%.f").to_string())
        .unwrap_or_else(|| value.to_string())
}
