//! Group statistics aggregator.
//!
//! Reduces a list of flat metric records into per-field mean and sample
//! standard deviation. Candidate fields come from the first non-empty record;
//! fields starting with `_` are internal and never aggregated.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::domain::Record;

/// Mean and sample standard deviation of one metric.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct FieldStats {
    pub mean: f64,
    pub sd: f64,
}

/// Aggregated statistics of a group of records.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct GroupStatistics {
    /// Number of records, including ones with missing or invalid values.
    pub count: usize,
    pub fields: BTreeMap<String, FieldStats>,
}

impl GroupStatistics {
    pub fn get(&self, key: &str) -> Option<&FieldStats> {
        self.fields.get(key)
    }

    /// Flat mapping: `count`, then `{key}_mean` / `{key}_sd` per field.
    pub fn to_map(&self) -> Record {
        let mut out = Record::new();
        out.insert("count".into(), Value::from(self.count));
        for (key, stats) in &self.fields {
            out.insert(format!("{key}_mean"), Value::from(stats.mean));
            out.insert(format!("{key}_sd"), Value::from(stats.sd));
        }
        out
    }
}

/// Aggregate a list of records.
///
/// Only finite JSON numbers contribute; `null`, strings and booleans are
/// skipped. A field with no valid values reports explicit zeros.
pub fn group_statistics(records: &[Record]) -> GroupStatistics {
    let Some(template) = records.iter().find(|r| !r.is_empty()) else {
        return GroupStatistics {
            count: records.len(),
            fields: BTreeMap::new(),
        };
    };

    let fields = template
        .keys()
        .filter(|k| !k.starts_with('_'))
        .map(|key| {
            let values: Vec<f64> = records
                .iter()
                .filter_map(|r| r.get(key).and_then(numeric_value))
                .collect();
            (key.clone(), field_stats(&values))
        })
        .collect();

    GroupStatistics {
        count: records.len(),
        fields,
    }
}

fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        _ => None,
    }
}

fn field_stats(values: &[f64]) -> FieldStats {
    if values.is_empty() {
        return FieldStats::default();
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let sd = if values.len() > 1 {
        (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt()
    } else {
        0.0
    };
    FieldStats { mean, sd }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn skips_null_values_but_counts_records() {
        let records = vec![
            record(json!({"a": 1.0})),
            record(json!({"a": null})),
            record(json!({"a": 3.0})),
        ];
        let stats = group_statistics(&records);
        assert_eq!(stats.count, 3);
        let a = stats.get("a").unwrap();
        assert!((a.mean - 2.0).abs() < 1e-12);
        assert!((a.sd - 2.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn single_value_has_zero_sd() {
        let stats = group_statistics(&[record(json!({"a": 5.0}))]);
        assert_eq!(stats.get("a"), Some(&FieldStats { mean: 5.0, sd: 0.0 }));
    }

    #[test]
    fn internal_fields_are_excluded() {
        let stats = group_statistics(&[record(json!({"a": 1.0, "_idx_peak": 10}))]);
        assert!(stats.get("_idx_peak").is_none());
        assert_eq!(stats.fields.len(), 1);
    }

    #[test]
    fn keys_come_from_first_non_empty_record() {
        let records = vec![
            Record::new(),
            record(json!({"a": 2.0})),
            record(json!({"a": 4.0, "b": 1.0})),
        ];
        let stats = group_statistics(&records);
        assert_eq!(stats.count, 3);
        assert!(stats.get("b").is_none());
        assert!((stats.get("a").unwrap().mean - 3.0).abs() < 1e-12);
    }

    #[test]
    fn booleans_and_strings_are_not_numbers() {
        let records = vec![record(json!({"a": true})), record(json!({"a": "7"}))];
        let stats = group_statistics(&records);
        assert_eq!(stats.get("a"), Some(&FieldStats::default()));
    }

    #[test]
    fn empty_input_reports_count_only() {
        let stats = group_statistics(&[]);
        assert_eq!(stats.count, 0);
        assert!(stats.fields.is_empty());

        let stats = group_statistics(&[Record::new(), Record::new()]);
        assert_eq!(stats.count, 2);
        assert!(stats.fields.is_empty());
    }

    #[test]
    fn flat_map_uses_suffixed_keys() {
        let stats = group_statistics(&[record(json!({"E_eff (GPa)": 20.0}))]);
        let map = stats.to_map();
        assert_eq!(map["count"], json!(1));
        assert_eq!(map["E_eff (GPa)_mean"], json!(20.0));
        assert_eq!(map["E_eff (GPa)_sd"], json!(0.0));
    }
}
