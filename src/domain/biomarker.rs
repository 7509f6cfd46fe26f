//! Biomarker samples and detected anomalies.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Marker name → value mapping, already unit-normalized by ingestion.
///
/// Preserves insertion order; re-inserting an existing marker overwrites the
/// value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BiomarkerSample {
    entries: Vec<(String, f64)>,
}

impl BiomarkerSample {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a marker value.
    pub fn insert(&mut self, marker: impl Into<String>, value: f64) {
        let marker = marker.into();
        match self.entries.iter_mut().find(|(m, _)| *m == marker) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((marker, value)),
        }
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, marker: impl Into<String>, value: f64) -> Self {
        self.insert(marker, value);
        self
    }

    #[must_use]
    pub fn get(&self, marker: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(m, _)| m == marker)
            .map(|(_, v)| *v)
    }

    /// Iterate markers in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(m, v)| (m.as_str(), *v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for BiomarkerSample {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        let mut sample = Self::new();
        for (marker, value) in iter {
            sample.insert(marker, value);
        }
        sample
    }
}

impl Serialize for BiomarkerSample {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (marker, value) in &self.entries {
            map.serialize_entry(marker, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for BiomarkerSample {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SampleVisitor;

        impl<'de> Visitor<'de> for SampleVisitor {
            type Value = BiomarkerSample;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of marker name to numeric value")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut sample = BiomarkerSample::new();
                while let Some((marker, value)) = access.next_entry::<String, f64>()? {
                    sample.insert(marker, value);
                }
                Ok(sample)
            }
        }

        deserializer.deserialize_map(SampleVisitor)
    }
}

/// Severity of a biomarker anomaly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// 3σ < |z| ≤ 4.5σ
    Warning,
    /// |z| > 4.5σ
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => write!(f, "WARNING"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// A biomarker value outside the population norm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub marker: String,
    pub value: f64,
    /// Standardized deviation, rounded to 2 decimals
    pub z_score: f64,
    pub severity: Severity,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order_and_overwrite() {
        let mut sample = BiomarkerSample::new();
        sample.insert("platelets", 250_000.0);
        sample.insert("hemoglobin", 14.0);
        sample.insert("platelets", 310_000.0);

        let markers: Vec<_> = sample.iter().map(|(m, _)| m).collect();
        assert_eq!(markers, vec!["platelets", "hemoglobin"]);
        assert_eq!(sample.get("platelets"), Some(310_000.0));
        assert_eq!(sample.len(), 2);
    }

    #[test]
    fn test_json_preserves_order() {
        let sample: BiomarkerSample =
            serde_json::from_str(r#"{"zeta": 1.0, "alpha": 2.0, "mid": 3.0}"#)
                .expect("Should parse");
        let markers: Vec<_> = sample.iter().map(|(m, _)| m.to_string()).collect();
        assert_eq!(markers, vec!["zeta", "alpha", "mid"]);

        let json = serde_json::to_string(&sample).expect("Should serialize");
        assert_eq!(json, r#"{"zeta":1.0,"alpha":2.0,"mid":3.0}"#);
    }

    #[test]
    fn test_severity_wire_format() {
        let json = serde_json::to_string(&Severity::Critical).expect("serialize");
        assert_eq!(json, "\"CRITICAL\"");
    }
}
