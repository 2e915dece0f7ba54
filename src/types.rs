use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A numeric field as it arrived on the wire.
///
/// The report backend sends quantities as strings and costs as numbers, and
/// either may be null or garbage. The raw value is kept so exports can echo
/// it back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LooseNumber(pub Value);

impl LooseNumber {
    /// Finite numeric value, if the raw field holds one.
    pub fn value(&self) -> Option<f64> {
        let v = match &self.0 {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        v.filter(|v| v.is_finite())
    }

    /// Numeric value read from the longest leading number in a string, so
    /// `"12abc"` reads as 12. Used for usage quantities.
    pub fn leading_value(&self) -> Option<f64> {
        let v = match &self.0 {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => leading_float(s),
            _ => None,
        };
        v.filter(|v| v.is_finite())
    }

    /// Value for summing: anything unparsable counts as zero.
    pub fn or_zero(&self) -> f64 {
        self.value().unwrap_or(0.0)
    }

    /// Raw text of the field; null or missing renders as an empty string.
    pub fn raw(&self) -> String {
        match &self.0 {
            Value::Null => String::new(),
            Value::String(s) => s.clone(),
            Value::Number(n) => match n.as_f64() {
                Some(v) => number_text(v),
                None => n.to_string(),
            },
            other => other.to_string(),
        }
    }
}

/// Shortest text for a number, without a trailing `.0` on integral values:
/// `10.0` → `10`, `1e2` → `100`, `0.25` → `0.25`. Very large or very small
/// magnitudes switch to exponent form (`1e+21`, `1e-7`).
pub fn number_text(v: f64) -> String {
    if v == 0.0 {
        return "0".to_string();
    }
    let abs = v.abs();
    if abs >= 1e21 || abs < 1e-6 {
        let exp = format!("{v:e}");
        return match exp.split_once('e') {
            Some((mantissa, e)) if !e.starts_with('-') => format!("{mantissa}e+{e}"),
            _ => exp,
        };
    }
    format!("{v}")
}

/// Parse the longest prefix of `s` (after leading whitespace) that forms a
/// decimal number: optional sign, digits with an optional fraction, optional
/// exponent.
fn leading_float(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let b = s.as_bytes();
    let mut end = 0;
    if matches!(b.first(), Some(b'+' | b'-')) {
        end += 1;
    }

    let int_start = end;
    while end < b.len() && b[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if b.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut j = frac_start;
        while j < b.len() && b[j].is_ascii_digit() {
            j += 1;
        }
        digits += j - frac_start;
        if digits > 0 {
            end = j;
        }
    }
    if digits == 0 {
        return None;
    }

    if matches!(b.get(end), Some(b'e' | b'E')) {
        let mut j = end + 1;
        if matches!(b.get(j), Some(b'+' | b'-')) {
            j += 1;
        }
        let exp_start = j;
        while j < b.len() && b[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            end = j;
        }
    }

    s[..end].parse().ok()
}

impl From<f64> for LooseNumber {
    fn from(v: f64) -> Self {
        Self(serde_json::json!(v))
    }
}

impl From<&str> for LooseNumber {
    fn from(v: &str) -> Self {
        Self(Value::String(v.to_string()))
    }
}

/// One cost line item from the report endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    #[serde(default, deserialize_with = "label")]
    pub date: String,
    #[serde(default, deserialize_with = "label")]
    pub service: String,
    #[serde(default, deserialize_with = "label")]
    pub region: String,
    #[serde(
        default,
        deserialize_with = "optional_label",
        skip_serializing_if = "Option::is_none"
    )]
    pub usage_type: Option<String>,
    #[serde(
        default,
        deserialize_with = "optional_label",
        skip_serializing_if = "Option::is_none"
    )]
    pub operation: Option<String>,
    #[serde(
        default,
        deserialize_with = "optional_label",
        skip_serializing_if = "Option::is_none"
    )]
    pub unit: Option<String>,
    #[serde(default)]
    pub amount: LooseNumber,
    #[serde(default)]
    pub cost: LooseNumber,
}

fn label<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(optional_label(d)?.unwrap_or_default())
}

fn optional_label<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    })
}

/// Filter choice for one categorical field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    AllValues,
    Specific(String),
}

impl Selection {
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Selection::AllValues => true,
            Selection::Specific(want) => want == value,
        }
    }
}

/// `all` or `All` selects every value; anything else, `ALL` included, is
/// taken literally.
pub fn parse_selection(s: &str) -> Result<Selection, String> {
    if s == "all" || s == "All" {
        Ok(Selection::AllValues)
    } else {
        Ok(Selection::Specific(s.to_string()))
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::AllValues => f.write_str("all"),
            Selection::Specific(v) => f.write_str(v),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    pub service: Selection,
    pub region: Selection,
}

impl FilterSelection {
    pub fn matches(&self, record: &UsageRecord) -> bool {
        self.service.matches(&record.service) && self.region.matches(&record.region)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionTotal {
    pub region: String,
    pub cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateTotal {
    pub date: String,
    pub cost: f64,
}

/// Everything derived from one `(records, selection)` pair.
#[derive(Debug, Clone, Serialize)]
pub struct AggregateView<'a> {
    pub filtered: Vec<&'a UsageRecord>,
    pub total: f64,
    pub region_totals: Vec<RegionTotal>,
    pub date_totals: Vec<DateTotal>,
    pub usage_types: usize,
}

/// Distinct values offered for each filter.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterOptions {
    pub services: Vec<String>,
    pub regions: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loose_number_parses_numbers_and_numeric_strings() {
        assert_eq!(LooseNumber(serde_json::json!(10)).value(), Some(10.0));
        assert_eq!(LooseNumber::from(" 2.5 ").value(), Some(2.5));
        assert_eq!(LooseNumber::from("bad").value(), None);
        assert_eq!(LooseNumber::from("NaN").value(), None);
        assert_eq!(LooseNumber::from("inf").value(), None);
        assert_eq!(LooseNumber::default().value(), None);
        assert_eq!(LooseNumber(serde_json::json!(true)).or_zero(), 0.0);
    }

    #[test]
    fn loose_number_raw_echoes_input() {
        assert_eq!(LooseNumber(serde_json::json!(10)).raw(), "10");
        assert_eq!(LooseNumber(serde_json::json!(0.25)).raw(), "0.25");
        assert_eq!(LooseNumber::from("abc").raw(), "abc");
        assert_eq!(LooseNumber::default().raw(), "");
    }

    #[test]
    fn loose_number_raw_drops_float_suffix() {
        let r: UsageRecord =
            serde_json::from_str(r#"{"cost": 10.0, "amount": 1e2}"#).unwrap();
        assert_eq!(r.cost.raw(), "10");
        assert_eq!(r.amount.raw(), "100");
        assert_eq!(LooseNumber(serde_json::json!(-0.0)).raw(), "0");
        assert_eq!(LooseNumber(serde_json::json!(0.1)).raw(), "0.1");
    }

    #[test]
    fn number_text_exponent_ranges() {
        assert_eq!(number_text(1e21), "1e+21");
        assert_eq!(number_text(1.5e-7), "1.5e-7");
        assert_eq!(number_text(123456.789), "123456.789");
        assert_eq!(number_text(-2.0), "-2");
    }

    #[test]
    fn leading_value_reads_numeric_prefix() {
        assert_eq!(LooseNumber::from("12abc").leading_value(), Some(12.0));
        assert_eq!(LooseNumber::from("  -3.5e2 GB").leading_value(), Some(-350.0));
        assert_eq!(LooseNumber::from(".5").leading_value(), Some(0.5));
        assert_eq!(LooseNumber::from("7.").leading_value(), Some(7.0));
        assert_eq!(LooseNumber::from("4e").leading_value(), Some(4.0));
        assert_eq!(LooseNumber::from("abc12").leading_value(), None);
        assert_eq!(LooseNumber::from("-.").leading_value(), None);
        assert_eq!(LooseNumber::from("").leading_value(), None);
        assert_eq!(LooseNumber(serde_json::json!(2)).leading_value(), Some(2.0));
        // Strict parsing still rejects trailing text
        assert_eq!(LooseNumber::from("12abc").value(), None);
    }

    #[test]
    fn record_deserializes_loose_fields() {
        let r: UsageRecord = serde_json::from_str(
            r#"{"date":"2024-01-01","service":"EC2","region":null,"usage_type":42,
                "amount":"1.5","cost":3}"#,
        )
        .unwrap();
        assert_eq!(r.service, "EC2");
        assert_eq!(r.region, "");
        assert_eq!(r.usage_type.as_deref(), Some("42"));
        assert_eq!(r.operation, None);
        assert_eq!(r.amount.value(), Some(1.5));
        assert_eq!(r.cost.value(), Some(3.0));
    }

    #[test]
    fn selection_parsing() {
        assert_eq!(parse_selection("All"), Ok(Selection::AllValues));
        assert_eq!(parse_selection("all"), Ok(Selection::AllValues));
        assert_eq!(
            parse_selection("ALL"),
            Ok(Selection::Specific("ALL".to_string()))
        );
        assert_eq!(
            parse_selection("us-east-1"),
            Ok(Selection::Specific("us-east-1".to_string()))
        );
        assert!(Selection::AllValues.matches("anything"));
        assert!(!Selection::Specific("EC2".into()).matches("ec2"));
        assert_eq!(Selection::AllValues.to_string(), "all");
    }
}
