//! Core data models for ashwam-eval
//!
//! These models describe what an extraction run produces (`Item`) and what
//! the stability pass emits after majority voting (`StableItem`).

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Deserialize an optional field without ever failing the whole item.
///
/// Missing keys, `null`, wrongly-typed values and values outside the
/// vocabulary all come back as `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

/// Observation domain of an extracted item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Symptom,
    Food,
    Emotion,
    Mind,
}

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Symptom => "symptom",
            Domain::Food => "food",
            Domain::Emotion => "emotion",
            Domain::Mind => "mind",
        }
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the observation was asserted, negated or hedged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Present,
    Absent,
    Uncertain,
}

impl std::fmt::Display for Polarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Polarity::Present => write!(f, "present"),
            Polarity::Absent => write!(f, "absent"),
            Polarity::Uncertain => write!(f, "uncertain"),
        }
    }
}

/// Intensity (non-emotion domains) or arousal (emotion) level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    Low,
    Medium,
    High,
    Unknown,
}

impl std::fmt::Display for Bucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Bucket::Low => write!(f, "low"),
            Bucket::Medium => write!(f, "medium"),
            Bucket::High => write!(f, "high"),
            Bucket::Unknown => write!(f, "unknown"),
        }
    }
}

/// When the observation happened, relative to the journal entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeBucket {
    Today,
    LastNight,
    PastWeek,
    Unknown,
}

impl std::fmt::Display for TimeBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeBucket::Today => write!(f, "today"),
            TimeBucket::LastNight => write!(f, "last_night"),
            TimeBucket::PastWeek => write!(f, "past_week"),
            TimeBucket::Unknown => write!(f, "unknown"),
        }
    }
}

/// One observation extracted by a single run.
///
/// Every field is optional: upstream validation is not assumed, and an
/// absent value simply never matches and never votes. Keys this crate does
/// not know about are kept in `extra` and written back out untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub domain: Option<Domain>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub polarity: Option<Polarity>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub evidence_span: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub time_bucket: Option<TimeBucket>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub intensity_bucket: Option<Bucket>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub arousal_bucket: Option<Bucket>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Item {
    pub fn is_emotion(&self) -> bool {
        self.domain == Some(Domain::Emotion)
    }

    /// Name of the bucket field that applies to this item's domain
    pub fn bucket_field(&self) -> &'static str {
        if self.is_emotion() {
            "arousal_bucket"
        } else {
            "intensity_bucket"
        }
    }

    /// The domain-appropriate bucket: arousal for emotions, intensity otherwise
    pub fn bucket(&self) -> Option<Bucket> {
        if self.is_emotion() {
            self.arousal_bucket
        } else {
            self.intensity_bucket
        }
    }
}

/// Outcome of a majority vote over one field.
///
/// Serializes as the agreed value, or as the string `"uncertain"` when no
/// value reached a strict majority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Consensus<T> {
    Agreed(T),
    Uncertain,
}

impl<T> Consensus<T> {
    pub const UNCERTAIN: &'static str = "uncertain";
}

impl<T: Serialize> Serialize for Consensus<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Consensus::Agreed(v) => v.serialize(serializer),
            Consensus::Uncertain => serializer.serialize_str(Self::UNCERTAIN),
        }
    }
}

impl<T: std::fmt::Display> std::fmt::Display for Consensus<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Consensus::Agreed(v) => v.fmt(f),
            Consensus::Uncertain => f.write_str(Self::UNCERTAIN),
        }
    }
}

/// The denoised record emitted for one cluster
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StableItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<Domain>,
    pub polarity: Consensus<Polarity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence_span: Option<String>,
    pub time_bucket: Consensus<TimeBucket>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intensity_bucket: Option<Consensus<Bucket>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arousal_bucket: Option<Consensus<Bucket>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StableItem {
    /// Start from a copy of `template`, with the voted fields supplied by the caller.
    ///
    /// Bucket fields are carried over as-is; the aggregator replaces the
    /// domain-appropriate one with its own vote.
    pub fn from_template(
        template: &Item,
        polarity: Consensus<Polarity>,
        time_bucket: Consensus<TimeBucket>,
    ) -> Self {
        Self {
            domain: template.domain,
            polarity,
            evidence_span: template.evidence_span.clone(),
            time_bucket,
            intensity_bucket: template.intensity_bucket.map(Consensus::Agreed),
            arousal_bucket: template.arousal_bucket.map(Consensus::Agreed),
            extra: template.extra.clone(),
        }
    }

    /// The domain-appropriate bucket after voting
    pub fn bucket(&self) -> Option<&Consensus<Bucket>> {
        if self.domain == Some(Domain::Emotion) {
            self.arousal_bucket.as_ref()
        } else {
            self.intensity_bucket.as_ref()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_item_parses_known_fields() {
        let item: Item = serde_json::from_value(json!({
            "domain": "symptom",
            "polarity": "present",
            "evidence_span": "headache",
            "intensity_bucket": "high",
            "time_bucket": "last_night"
        }))
        .unwrap();

        assert_eq!(item.domain, Some(Domain::Symptom));
        assert_eq!(item.polarity, Some(Polarity::Present));
        assert_eq!(item.evidence_span.as_deref(), Some("headache"));
        assert_eq!(item.intensity_bucket, Some(Bucket::High));
        assert_eq!(item.time_bucket, Some(TimeBucket::LastNight));
        assert!(item.extra.is_empty());
    }

    #[test]
    fn test_malformed_fields_become_none() {
        let item: Item = serde_json::from_value(json!({
            "domain": "sleep",
            "polarity": null,
            "evidence_span": 42,
            "time_bucket": ["today"]
        }))
        .unwrap();

        assert_eq!(item.domain, None);
        assert_eq!(item.polarity, None);
        assert_eq!(item.evidence_span, None);
        assert_eq!(item.time_bucket, None);
    }

    #[test]
    fn test_extra_keys_round_trip() {
        let item: Item = serde_json::from_value(json!({
            "domain": "food",
            "evidence_span": "coffee",
            "confidence": 0.7
        }))
        .unwrap();
        assert_eq!(item.extra.get("confidence"), Some(&json!(0.7)));

        let out = serde_json::to_value(&item).unwrap();
        assert_eq!(out["confidence"], json!(0.7));
        assert!(out.get("polarity").is_none());
    }

    #[test]
    fn test_bucket_follows_domain() {
        let emotion: Item = serde_json::from_value(json!({
            "domain": "emotion",
            "arousal_bucket": "low",
            "intensity_bucket": "high"
        }))
        .unwrap();
        assert_eq!(emotion.bucket(), Some(Bucket::Low));
        assert_eq!(emotion.bucket_field(), "arousal_bucket");

        let missing_domain: Item =
            serde_json::from_value(json!({"intensity_bucket": "medium"})).unwrap();
        assert_eq!(missing_domain.bucket(), Some(Bucket::Medium));
    }

    #[test]
    fn test_consensus_serializes_sentinel() {
        let agreed: Consensus<TimeBucket> = Consensus::Agreed(TimeBucket::PastWeek);
        let uncertain: Consensus<TimeBucket> = Consensus::Uncertain;
        assert_eq!(serde_json::to_value(agreed).unwrap(), json!("past_week"));
        assert_eq!(serde_json::to_value(uncertain).unwrap(), json!("uncertain"));
        assert_eq!(uncertain.to_string(), "uncertain");
    }
}
