//! In-memory tabular data: ordered rows with named, ordered columns.
//!
//! `Table` is the common currency of every connector and transform. Column
//! order is stable across all operations; transforms only ever append
//! derived columns or leave the column set intact. Projection, filtering and
//! truncation are single passes over rows × columns.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single cell value.
///
/// Equality is type-sensitive: `Int(10) != Float(10.0)` and
/// `Str("5") != Int(5)`. Numeric coercion is a separate, explicit operation
/// ([`Scalar::as_f64`]) used only where a transform's contract calls for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Scalar {
    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }

    /// Numeric coercion: integers and floats pass through, booleans map to
    /// 1.0/0.0, numeric-looking strings are parsed. `None` otherwise.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Int(v) => Some(*v as f64),
            Scalar::Float(v) => Some(*v),
            Scalar::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Scalar::Str(s) => s.trim().parse::<f64>().ok(),
            Scalar::Null => None,
        }
    }

    pub fn from_json(value: &serde_json::Value) -> Scalar {
        match value {
            serde_json::Value::Null => Scalar::Null,
            serde_json::Value::Bool(b) => Scalar::Bool(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Scalar::Int(i)
                } else {
                    Scalar::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Scalar::Str(s.clone()),
            // Nested values are outside the tabular model; keep their JSON text.
            other => Scalar::Str(other.to_string()),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Scalar::Null => serde_json::Value::Null,
            Scalar::Bool(b) => serde_json::Value::Bool(*b),
            Scalar::Int(i) => serde_json::Value::from(*i),
            Scalar::Float(f) => serde_json::Value::from(*f),
            Scalar::Str(s) => serde_json::Value::from(s.clone()),
        }
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Int(v)
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Float(v)
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Scalar::Bool(v)
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::Str(v.to_string())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Scalar::Str(v)
    }
}

/// An ordered sequence of rows sharing one column set and column order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Scalar>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<Scalar>>) -> Self {
        let mut table = Self::new(columns);
        for row in rows {
            table.push_row(row);
        }
        table
    }

    /// Build a table from row records (JSON-object shaped). The column set is
    /// the union of record keys in first-appearance order; missing keys
    /// become `Null`.
    pub fn from_records(records: &[serde_json::Map<String, serde_json::Value>]) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for record in records {
            for key in record.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }

        let mut table = Table::new(columns);
        for record in records {
            let row = table
                .columns
                .iter()
                .map(|c| record.get(c).map(Scalar::from_json).unwrap_or(Scalar::Null))
                .collect();
            table.rows.push(row);
        }
        table
    }

    pub fn to_records(&self) -> Vec<serde_json::Map<String, serde_json::Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .zip(row)
                    .map(|(c, v)| (c.clone(), v.to_json()))
                    .collect()
            })
            .collect()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Scalar>] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn push_row(&mut self, row: Vec<Scalar>) {
        debug_assert_eq!(row.len(), self.columns.len(), "row width mismatch");
        self.rows.push(row);
    }

    /// Append a derived column. `values` must hold one entry per row.
    pub fn append_column(&mut self, name: impl Into<String>, values: Vec<Scalar>) {
        assert_eq!(values.len(), self.rows.len(), "column length mismatch");
        self.columns.push(name.into());
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
    }

    /// Replace the values of an existing column in place.
    pub fn replace_column(&mut self, index: usize, values: Vec<Scalar>) {
        assert_eq!(values.len(), self.rows.len(), "column length mismatch");
        for (row, value) in self.rows.iter_mut().zip(values) {
            row[index] = value;
        }
    }

    /// Project to the intersection of `names` and existing columns, in the
    /// order given by `names`. Requested names that do not exist are dropped
    /// silently.
    pub fn project(&self, names: &[String]) -> Table {
        let kept: Vec<(String, usize)> = names
            .iter()
            .filter_map(|n| self.column_index(n).map(|i| (n.clone(), i)))
            .collect();

        let columns = kept.iter().map(|(n, _)| n.clone()).collect();
        let rows = self
            .rows
            .iter()
            .map(|row| kept.iter().map(|(_, i)| row[*i].clone()).collect())
            .collect();

        Table { columns, rows }
    }

    /// Keep rows where every named column equals the given scalar exactly.
    /// Conditions on columns that do not exist are skipped.
    pub fn filter_eq(&self, conditions: &BTreeMap<String, Scalar>) -> Table {
        let bound: Vec<(usize, &Scalar)> = conditions
            .iter()
            .filter_map(|(name, value)| self.column_index(name).map(|i| (i, value)))
            .collect();

        let rows = self
            .rows
            .iter()
            .filter(|row| bound.iter().all(|(i, value)| &row[*i] == *value))
            .cloned()
            .collect();

        Table {
            columns: self.columns.clone(),
            rows,
        }
    }

    /// Keep the first `n` rows, preserving order.
    pub fn limit(&self, n: usize) -> Table {
        Table {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::from_rows(
            vec!["date".into(), "series".into(), "value".into()],
            vec![
                vec!["2024-01".into(), "GDP".into(), Scalar::Int(100)],
                vec!["2024-02".into(), "GDP".into(), Scalar::Int(110)],
                vec!["2024-01".into(), "CPI".into(), Scalar::Float(2.5)],
            ],
        )
    }

    #[test]
    fn test_project_keeps_requested_order_and_intersection() {
        let t = sample();
        let projected = t.project(&["value".into(), "nope".into(), "date".into()]);
        assert_eq!(projected.columns(), &["value".to_string(), "date".to_string()]);
        assert_eq!(projected.len(), 3);
        assert_eq!(projected.rows()[0][0], Scalar::Int(100));
        assert_eq!(projected.rows()[0][1], Scalar::Str("2024-01".into()));
    }

    #[test]
    fn test_filter_eq_is_conjunctive() {
        let t = sample();
        let mut conds = BTreeMap::new();
        conds.insert("series".to_string(), Scalar::from("GDP"));
        conds.insert("date".to_string(), Scalar::from("2024-02"));
        let filtered = t.filter_eq(&conds);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered.rows()[0][2], Scalar::Int(110));
    }

    #[test]
    fn test_filter_eq_is_type_sensitive() {
        let t = sample();
        let mut conds = BTreeMap::new();
        conds.insert("value".to_string(), Scalar::Float(100.0));
        // Int(100) must not match Float(100.0)
        assert_eq!(t.filter_eq(&conds).len(), 0);

        conds.insert("value".to_string(), Scalar::Int(100));
        assert_eq!(t.filter_eq(&conds).len(), 1);
    }

    #[test]
    fn test_filter_eq_skips_missing_columns() {
        let t = sample();
        let mut conds = BTreeMap::new();
        conds.insert("ghost".to_string(), Scalar::Int(1));
        assert_eq!(t.filter_eq(&conds).len(), 3);
    }

    #[test]
    fn test_limit_bounds() {
        let t = sample();
        assert_eq!(t.limit(0).len(), 0);
        assert_eq!(t.limit(2).len(), 2);
        assert_eq!(t.limit(10).len(), 3);
        // order preserved from the front
        assert_eq!(t.limit(2).rows()[1][2], Scalar::Int(110));
    }

    #[test]
    fn test_records_roundtrip_with_key_union() {
        let records: Vec<serde_json::Map<String, serde_json::Value>> = vec![
            serde_json::from_str(r#"{"a": 1, "b": "x"}"#).unwrap(),
            serde_json::from_str(r#"{"a": 2, "c": true}"#).unwrap(),
        ];
        let t = Table::from_records(&records);
        assert_eq!(t.columns(), &["a".to_string(), "b".to_string(), "c".to_string()]);
        assert_eq!(t.rows()[0][2], Scalar::Null);
        assert_eq!(t.rows()[1][1], Scalar::Null);
        assert_eq!(t.rows()[1][2], Scalar::Bool(true));

        let back = t.to_records();
        assert_eq!(back[1]["a"], serde_json::json!(2));
        assert_eq!(back[0]["c"], serde_json::Value::Null);
    }

    #[test]
    fn test_scalar_coercion() {
        assert_eq!(Scalar::Int(3).as_f64(), Some(3.0));
        assert_eq!(Scalar::Float(2.5).as_f64(), Some(2.5));
        assert_eq!(Scalar::Bool(true).as_f64(), Some(1.0));
        assert_eq!(Scalar::from(" 7.5 ").as_f64(), Some(7.5));
        assert_eq!(Scalar::from("abc").as_f64(), None);
        assert_eq!(Scalar::Null.as_f64(), None);
    }

    #[test]
    fn test_scalar_untagged_serde() {
        let row: Vec<Scalar> =
            serde_json::from_str(r#"[null, true, 10, 10.5, "ten"]"#).unwrap();
        assert_eq!(
            row,
            vec![
                Scalar::Null,
                Scalar::Bool(true),
                Scalar::Int(10),
                Scalar::Float(10.5),
                Scalar::Str("ten".into()),
            ]
        );
    }
}
