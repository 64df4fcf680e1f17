//! Parsing of gviz query responses.
//!
//! The endpoint answers with something like
//! `/*O_o*/ google.visualization.Query.setResponse({...});`. Only the text
//! between the first `{` and the last `}` is JSON.
//!
//! Cells were authored by hand, so values are read loosely: a number may
//! arrive where text is expected and vice versa, and an empty cell may be
//! `null`, `""` or `0`.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use super::SheetsError;

/// The parsed table.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GvizTable {
    #[serde(default)]
    pub rows: Vec<GvizRow>,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    table: GvizTable,
}

/// One table row. `c` is absent for fully blank rows.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GvizRow {
    #[serde(default)]
    pub c: Option<Vec<Option<GvizCell>>>,
}

/// One cell: the typed value `v` and its formatted rendering `f`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GvizCell {
    #[serde(default)]
    pub v: Value,
    #[serde(default)]
    pub f: Option<String>,
}

/// Strip the callback wrapper and parse the embedded table.
///
/// # Errors
///
/// Returns [`SheetsError::Parse`] when no `{ ... }` span exists or the span
/// is not a gviz envelope.
pub fn parse_response(text: &str) -> Result<GvizTable, SheetsError> {
    let json = extract_json(text)?;
    let envelope: Envelope =
        serde_json::from_str(json).map_err(|e| SheetsError::Parse(e.to_string()))?;
    Ok(envelope.table)
}

/// The span from the first `{` to the last `}` inclusive.
///
/// # Errors
///
/// Returns [`SheetsError::Parse`] if either brace is missing.
pub fn extract_json(text: &str) -> Result<&str, SheetsError> {
    let start = text.find('{');
    let end = text.rfind('}');
    match (start, end) {
        (Some(start), Some(end)) if end > start => text
            .get(start..=end)
            .ok_or_else(|| SheetsError::Parse("response is not valid UTF-8 around braces".into())),
        _ => Err(SheetsError::Parse(
            "no JSON object found in sheet response".into(),
        )),
    }
}

impl GvizRow {
    /// Number of cells, including empty ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.c.as_ref().map_or(0, Vec::len)
    }

    /// Whether the row carries no cells at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The cell at `index`, if present and not null.
    #[must_use]
    pub fn cell(&self, index: usize) -> Option<&GvizCell> {
        self.c.as_ref()?.get(index)?.as_ref()
    }

    /// Trimmed text of `v`, only when `v` is truthy.
    #[must_use]
    pub fn text(&self, index: usize) -> Option<String> {
        let cell = self.cell(index)?;
        is_truthy(&cell.v).then(|| value_to_string(&cell.v).trim().to_string())
    }

    /// Trimmed text of `v` unless it is null, else of `f`; empty when both are missing.
    #[must_use]
    pub fn text_or_formatted(&self, index: usize) -> String {
        let Some(cell) = self.cell(index) else {
            return String::new();
        };
        if cell.v.is_null() {
            cell.f.as_deref().unwrap_or("").trim().to_string()
        } else {
            value_to_string(&cell.v).trim().to_string()
        }
    }

    /// Trimmed text of the first truthy of `v` and `f`.
    #[must_use]
    pub fn truthy_text_or_formatted(&self, index: usize) -> Option<String> {
        let cell = self.cell(index)?;
        if is_truthy(&cell.v) {
            return Some(value_to_string(&cell.v).trim().to_string());
        }
        cell.f
            .as_deref()
            .filter(|f| !f.is_empty())
            .map(|f| f.trim().to_string())
    }
}

/// Script-style truthiness: null, `false`, zero and `""` are falsy.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Render a value the way a script runtime stringifies it, so `1.0` is `"1"`.
#[must_use]
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::String(s) => s.clone(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                n.as_f64().map_or_else(String::new, format_float)
            }
        }
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

#[allow(clippy::float_cmp)] // exact zero / integral checks
fn format_float(f: f64) -> String {
    if f == 0.0 {
        "0".to_string()
    } else if f.fract() == 0.0 && f.abs() < 1e21 {
        format!("{f:.0}")
    } else {
        format!("{f}")
    }
}

/// The leading decimal number of `text`, ignoring leading whitespace and
/// any trailing garbage: `"12.5 HKD"` is 12.5.
#[must_use]
pub fn leading_decimal(text: &str) -> Option<Decimal> {
    let text = text.trim_start();
    let (negative, rest) = match text.as_bytes().first() {
        Some(b'-') => (true, text.get(1..)?),
        Some(b'+') => (false, text.get(1..)?),
        _ => (false, text),
    };

    let int_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    let int_part = rest.get(..int_len)?;
    let mut consumed = int_len;
    let mut frac_part = "";
    if rest.as_bytes().get(consumed) == Some(&b'.') {
        let frac_len = rest
            .get(consumed + 1..)?
            .bytes()
            .take_while(u8::is_ascii_digit)
            .count();
        frac_part = rest.get(consumed + 1..consumed + 1 + frac_len)?;
        consumed += 1 + frac_len;
    }
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }

    let mut number = String::with_capacity(consumed + 2);
    if negative {
        number.push('-');
    }
    number.push_str(if int_part.is_empty() { "0" } else { int_part });
    if !frac_part.is_empty() {
        number.push('.');
        number.push_str(frac_part);
    }

    if let Some(exponent) = leading_exponent(rest.get(consumed..)?) {
        number.push('e');
        number.push_str(exponent);
        return Decimal::from_scientific(&number).ok();
    }
    Decimal::from_str(&number).ok()
}

/// An `e`/`E` exponent suffix with at least one digit, without the marker.
fn leading_exponent(text: &str) -> Option<&str> {
    let body = text.strip_prefix(['e', 'E'])?;
    let sign_len = usize::from(body.starts_with(['+', '-']));
    let digits = body
        .get(sign_len..)?
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    if digits == 0 {
        return None;
    }
    body.get(..sign_len + digits)
}

/// The leading integer of `text`: `"12 pcs"` is 12, `"3.7"` is 3.
#[must_use]
pub fn leading_integer(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let sign_len = usize::from(text.starts_with(['+', '-']));
    let digits = text
        .get(sign_len..)?
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    if digits == 0 {
        return None;
    }
    text.get(..sign_len + digits)?.parse().ok()
}
