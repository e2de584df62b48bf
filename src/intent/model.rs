//! Model tier of the intent classifier and the classifier facade.

use super::keywords::{
    extract_city_setting, extract_person_name, extract_weather_city, KeywordClassifier,
};
use super::{Intent, IntentTag};
use crate::error::{Result, ScoutError};
use std::cmp::Ordering;
use std::path::Path;
use std::str::FromStr;

/// An on-device text classifier producing one probability per label
pub trait IntentModel: Send + Sync {
    fn run(&self, text: &str) -> Result<Vec<f32>>;
}

/// Load a newline-separated labels file, skipping blank lines
pub fn load_labels(path: &Path) -> Result<Vec<String>> {
    let contents = std::fs::read_to_string(path)?;
    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect())
}

/// Remove the label's own words from the utterance to leave the query
fn strip_label_words(label: &str, text: &str) -> String {
    let phrase = label.replace('_', " ");
    text.to_lowercase()
        .replace(&phrase, " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub struct ModelClassifier {
    model: Box<dyn IntentModel>,
    labels: Vec<String>,
    threshold: f32,
}

impl ModelClassifier {
    pub fn new(model: Box<dyn IntentModel>, labels: Vec<String>, threshold: f32) -> Result<Self> {
        if labels.is_empty() {
            return Err(ScoutError::Model("labels list is empty".to_string()));
        }
        Ok(Self {
            model,
            labels,
            threshold,
        })
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn classify(&self, text: &str) -> Intent {
        let probabilities = match self.model.run(text) {
            Ok(probabilities) => probabilities,
            Err(e) => {
                log::warn!("Intent model inference failed: {}", e);
                return Intent::Unknown;
            }
        };

        if probabilities.is_empty() {
            log::error!("Intent model returned empty output");
            return Intent::Unknown;
        }

        // non-finite scores never win, so a NaN output cannot pass the threshold
        let Some((index, max_prob)) = probabilities
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, p)| p.is_finite())
            .fold(None, |best: Option<(usize, f32)>, (i, p)| match best {
                Some((_, best_p)) if best_p >= p => best,
                _ => Some((i, p)),
            })
        else {
            return Intent::Unknown;
        };

        // an unordered comparison (NaN threshold) rejects too
        if matches!(
            max_prob.partial_cmp(&self.threshold),
            None | Some(Ordering::Less)
        ) {
            log::debug!(
                "🏷️ Model confidence {:.3} below threshold {:.3}",
                max_prob,
                self.threshold
            );
            return Intent::Unknown;
        }

        match self.labels.get(index) {
            Some(label) => Self::intent_for_label(label, text),
            None => {
                log::warn!(
                    "Model output index {} has no label ({} labels loaded)",
                    index,
                    self.labels.len()
                );
                Intent::Unknown
            }
        }
    }

    fn intent_for_label(label: &str, text: &str) -> Intent {
        let tag = match IntentTag::from_str(label) {
            Ok(tag) => tag,
            Err(_) => {
                log::warn!("Unrecognised intent label '{}'", label);
                return Intent::Unknown;
            }
        };

        let original = text.trim();
        match tag {
            IntentTag::DescribeScene => Intent::DescribeScene,
            IntentTag::ReadText => Intent::ReadText,
            IntentTag::FaceDetect => Intent::FaceDetect,
            IntentTag::Time => Intent::Time,
            IntentTag::Help => Intent::Help,
            IntentTag::FindObject => Intent::FindObject {
                query_text: strip_label_words(label, original),
            },
            IntentTag::AnswerQuestion => Intent::AnswerQuestion {
                query_text: strip_label_words(label, original),
            },
            IntentTag::GeneralConversation => Intent::GeneralConversation {
                query_text: strip_label_words(label, original),
            },
            IntentTag::SaveFace => extract_person_name(original)
                .map(|person_name| Intent::SaveFace { person_name })
                .unwrap_or(Intent::Unknown),
            IntentTag::SetCity => extract_city_setting(original)
                .map(|city| Intent::SetCity { city })
                .unwrap_or(Intent::Unknown),
            IntentTag::Weather => Intent::Weather {
                city: extract_weather_city(original),
            },
            IntentTag::Unknown => Intent::Unknown,
        }
    }
}

/// Classifies utterances with the model tier when available, otherwise the
/// keyword tier. Once built, the tier never changes.
pub struct IntentClassifier {
    keywords: KeywordClassifier,
    model: Option<ModelClassifier>,
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::keyword_only()
    }
}

impl IntentClassifier {
    pub fn keyword_only() -> Self {
        Self {
            keywords: KeywordClassifier::new(),
            model: None,
        }
    }

    pub fn with_model(model: ModelClassifier) -> Self {
        Self {
            keywords: KeywordClassifier::new(),
            model: Some(model),
        }
    }

    /// Load labels and model. Any failure is logged and the keyword tier is
    /// used for the lifetime of this classifier.
    pub fn load<F>(labels_path: &Path, threshold: f32, load_model: F) -> Self
    where
        F: FnOnce() -> Result<Box<dyn IntentModel>>,
    {
        log::info!(
            "Loading intent model and labels from {}",
            labels_path.display()
        );

        let loaded = load_labels(labels_path)
            .and_then(|labels| ModelClassifier::new(load_model()?, labels, threshold));

        match loaded {
            Ok(model) => {
                log::info!(
                    "🧠 Intent model loaded with {} labels",
                    model.labels().len()
                );
                Self::with_model(model)
            }
            Err(e) => {
                log::error!("Failed to load intent model or labels: {}", e);
                log::warn!("Falling back to keyword intent matching");
                Self::keyword_only()
            }
        }
    }

    pub fn uses_model(&self) -> bool {
        self.model.is_some()
    }

    pub fn classify(&self, text: &str) -> Intent {
        let intent = match &self.model {
            Some(model) => model.classify(text),
            None => self.keywords.classify(text),
        };
        log::info!("🏷️ Classified '{}' as {}", text.trim(), intent.tag());
        intent
    }
}
