//! Coupling record parsing
//!
//! Each line of a Jarviz `.jsonl` report is one JSON object describing a
//! single method call from a source class in an analysed artifact to a
//! target class/method.

use serde::{Deserialize, Deserializer};
use thiserror::Error;

/// Errors that can occur while decoding a coupling record
#[derive(Error, Debug)]
pub enum RecordError {
    #[error("Malformed coupling record \"{line}\": {source}")]
    MalformedRecord {
        line: String,
        #[source]
        source: serde_json::Error,
    },
}

/// One observed method coupling, as written by the Jarviz analyser.
///
/// Missing and `null` fields decode to the empty string: the analyser omits
/// empty values, and an absent field only degrades the derived node identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CouplingRecord {
    #[serde(alias = "appSetName", deserialize_with = "null_as_empty")]
    pub application_set_name: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub application_name: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub artifact_file_name: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub artifact_id: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub artifact_group: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub artifact_version: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub source_class: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub source_method: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub target_class: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub target_method: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl CouplingRecord {
    /// `group.id` form used for display on source nodes
    pub fn artifact_full_name(&self) -> String {
        format!("{}.{}", self.artifact_group, self.artifact_id)
    }
}

/// Decode one raw line into a [`CouplingRecord`].
///
/// Anything that is not a JSON object, including an empty line, is rejected.
pub fn parse_record(line: &str) -> Result<CouplingRecord, RecordError> {
    serde_json::from_str(line).map_err(|source| RecordError::MalformedRecord {
        line: line.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINE: &str = r#"{"appSetName":"shop","applicationName":"cart-service","artifactFileName":"cart-service-1.2.0.jar","artifactId":"cart-service","artifactGroup":"com.example","artifactVersion":"1.2.0","sourceClass":"com.example.cart.CartController","sourceMethod":"checkout","targetClass":"com.example.pay.PaymentClient","targetMethod":"charge"}"#;

    #[test]
    fn test_parse_full_record() {
        let record = parse_record(LINE).unwrap();
        assert_eq!(record.application_set_name, "shop");
        assert_eq!(record.application_name, "cart-service");
        assert_eq!(record.artifact_version, "1.2.0");
        assert_eq!(record.target_method, "charge");
        assert_eq!(record.artifact_full_name(), "com.example.cart-service");
    }

    #[test]
    fn test_long_application_set_key() {
        let record = parse_record(r#"{"applicationSetName":"shop"}"#).unwrap();
        assert_eq!(record.application_set_name, "shop");
    }

    #[test]
    fn test_missing_and_unknown_fields() {
        let record =
            parse_record(r#"{"applicationName":"a","extra":42,"sourceClass":"X"}"#).unwrap();
        assert_eq!(record.application_name, "a");
        assert_eq!(record.source_class, "X");
        assert_eq!(record.target_class, "");
    }

    #[test]
    fn test_null_fields_decode_as_empty() {
        let record = parse_record(
            r#"{"applicationName":"a","artifactVersion":null,"appSetName":null,"sourceClass":"X"}"#,
        )
        .unwrap();
        assert_eq!(record.application_name, "a");
        assert_eq!(record.artifact_version, "");
        assert_eq!(record.application_set_name, "");
        assert_eq!(record.source_class, "X");
    }

    #[test]
    fn test_wrong_field_type_is_malformed() {
        assert!(parse_record(r#"{"applicationName":42}"#).is_err());
    }

    #[test]
    fn test_truncated_line_is_malformed() {
        let err = parse_record(r#"{"applicationName":"a","sourceCl"#).unwrap_err();
        let RecordError::MalformedRecord { line, .. } = err;
        assert_eq!(line, r#"{"applicationName":"a","sourceCl"#);
    }

    #[test]
    fn test_non_object_lines_are_malformed() {
        assert!(parse_record("").is_err());
        assert!(parse_record("42").is_err());
        assert!(parse_record("[1, 2]").is_err());
    }
}
