use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct TranscriptWord {
    pub text: String,
    pub start_sec: f64,
    pub end_sec: f64,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Highlight {
    pub text: String,
    pub weight: f64,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Entity {
    pub text: String,
    pub category: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Positive,
    Neutral,
    Negative,
}

impl Polarity {
    pub fn parse(raw: &str) -> Polarity {
        match raw.trim().to_ascii_lowercase().as_str() {
            "positive" => Polarity::Positive,
            "negative" => Polarity::Negative,
            _ => Polarity::Neutral,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct SentimentRecord {
    pub text: String,
    pub polarity: Polarity,
    pub confidence: f64,
}

/// Output of any transcription path (provider, platform captions or simulated).
/// `confidence` is a calibration signal only.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct TranscriptionResult {
    pub text: String,
    pub confidence: f64,
    pub words: Vec<TranscriptWord>,
    pub highlights: Vec<Highlight>,
    pub entities: Vec<Entity>,
    pub sentiment: Vec<SentimentRecord>,
}

impl TranscriptionResult {
    pub fn new(text: String, confidence: f64) -> Self {
        Self {
            text,
            confidence: confidence.clamp(0.0, 1.0),
            words: Vec::new(),
            highlights: Vec::new(),
            entities: Vec::new(),
            sentiment: Vec::new(),
        }
    }

    /// Duration covered by the word timings, if any were produced.
    pub fn duration_secs(&self) -> Option<f64> {
        self.words
            .iter()
            .map(|w| w.end_sec)
            .fold(None, |acc: Option<f64>, end| Some(acc.map_or(end, |a| a.max(end))))
            .filter(|d| *d > 0.0)
    }

    /// Shape contract shared by every transcription path.
    pub fn is_well_formed(&self) -> bool {
        !self.text.trim().is_empty()
            && (0.0..=1.0).contains(&self.confidence)
            && self
                .words
                .iter()
                .all(|w| !w.text.is_empty() && w.start_sec >= 0.0 && w.end_sec >= w.start_sec)
            && self.highlights.iter().all(|h| !h.text.trim().is_empty())
            && self
                .entities
                .iter()
                .all(|e| !e.text.trim().is_empty() && !e.category.trim().is_empty())
            && self
                .sentiment
                .iter()
                .all(|s| !s.text.trim().is_empty() && (0.0..=1.0).contains(&s.confidence))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_is_last_word_end() {
        let mut result = TranscriptionResult::new("hello there".to_string(), 0.9);
        result.words = vec![
            TranscriptWord {
                text: "hello".to_string(),
                start_sec: 0.0,
                end_sec: 0.5,
            },
            TranscriptWord {
                text: "there".to_string(),
                start_sec: 0.5,
                end_sec: 125.25,
            },
        ];

        assert_eq!(result.duration_secs(), Some(125.25));
        assert!(result.is_well_formed());
    }

    #[test]
    fn confidence_is_clamped_and_empty_text_is_malformed() {
        let result = TranscriptionResult::new("   ".to_string(), 1.7);
        assert_eq!(result.confidence, 1.0);
        assert!(!result.is_well_formed());
        assert_eq!(result.duration_secs(), None);
    }

    #[test]
    fn polarity_parses_provider_labels() {
        assert_eq!(Polarity::parse("POSITIVE"), Polarity::Positive);
        assert_eq!(Polarity::parse("negative"), Polarity::Negative);
        assert_eq!(Polarity::parse("mixed"), Polarity::Neutral);
    }
}
