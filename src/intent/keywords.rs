//! Keyword/pattern tier of the intent classifier.
//!
//! Categories are tested in a fixed priority order and the first one whose
//! keywords appear in the utterance wins. There is no scoring across
//! categories: keyword sets overlap (a bare "who" or "read" is enough) and
//! the order alone decides.

use super::Intent;
use once_cell::sync::Lazy;
use regex::Regex;

const SCENE_KEYWORDS: &[&str] = &[
    "describe",
    "what is this",
    "what's this",
    "what do you see",
    "what can you see",
    "what's around",
    "what is around",
    "look around",
    "what's in front",
    "what is in front",
];

const READ_TEXT_KEYWORDS: &[&str] = &[
    "read",
    "what does this say",
    "what does it say",
    "what's written",
    "what is written",
];

const OBJECT_SEARCH_KEYWORDS: &[&str] = &[
    "where is my",
    "where's my",
    "where are my",
    "look for",
    "locate",
    "find",
];

const FACE_RECOGNITION_KEYWORDS: &[&str] =
    &["who", "recognize", "recognise", "identify this person"];

const FACE_SAVING_KEYWORDS: &[&str] = &[
    "save this person",
    "save that person",
    "remember this person",
    "remember that person",
    "save this face",
    "remember this face",
];

const TIME_KEYWORDS: &[&str] = &["what time", "the time", "time is it", "current time"];

const WEATHER_KEYWORDS: &[&str] = &["weather", "forecast", "temperature outside"];

const SET_CITY_KEYWORDS: &[&str] = &[
    "set my location",
    "set my city",
    "set location",
    "set city",
    "change my city",
    "my city is",
    "i live in",
];

const HELP_KEYWORDS: &[&str] = &["help", "what can you do", "commands"];

const VISUAL_QUESTION_KEYWORDS: &[&str] = &[
    "what", "how many", "is there", "are there", "which", "can you", "does", "is it", "is this",
    "are these",
];

const CONVERSATION_KEYWORDS: &[&str] = &[
    "hello",
    "hey",
    "thank",
    "how are you",
    "good morning",
    "good afternoon",
    "good evening",
    "good night",
    "tell me",
    "joke",
    "your name",
];

static PERSON_NAME_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile_patterns(&[
        r"(?i)\b(?:save|remember)\s+(?:this|that)\s+(?:person|face)\s+as\s+(?P<value>\p{L}[\p{L}'\- ]*?)\s*(?:[?.!,]|\bplease\b|\bthanks\b|\bthank you\b|\bnow\b|$)",
        r"(?i)\b(?:save|remember)\s+(?:this|that)\s+(?:person|face)\s+named\s+(?P<value>\p{L}[\p{L}'\- ]*?)\s*(?:[?.!,]|\bplease\b|\bthanks\b|\bthank you\b|\bnow\b|$)",
        r"(?i)\b(?:save|remember)\s+(?:this|that)\s+(?:person|face),?\s+(?:his|her|their)\s+name\s+is\s+(?P<value>\p{L}[\p{L}'\- ]*?)\s*(?:[?.!,]|\bplease\b|\bthanks\b|\bthank you\b|\bnow\b|$)",
    ])
});

// '.' may appear inside a city name ("St. Louis"), so only a final '.' ends it
static SET_CITY_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile_patterns(&[
        r"(?i)\bset\s+(?:my\s+)?(?:location|city)\s+to\s+(?P<value>\p{L}[\p{L}.'\- ]*?)\s*(?:[?!,]|\.\s*$|\bplease\b|\bthanks\b|\bthank you\b|\bnow\b|$)",
        r"(?i)\bchange\s+my\s+city\s+to\s+(?P<value>\p{L}[\p{L}.'\- ]*?)\s*(?:[?!,]|\.\s*$|\bplease\b|\bthanks\b|\bthank you\b|\bnow\b|$)",
        r"(?i)\bmy\s+city\s+is\s+(?P<value>\p{L}[\p{L}.'\- ]*?)\s*(?:[?!,]|\.\s*$|\bplease\b|\bthanks\b|\bthank you\b|\bnow\b|$)",
        r"(?i)\bi\s+live\s+in\s+(?P<value>\p{L}[\p{L}.'\- ]*?)\s*(?:[?!,]|\.\s*$|\bplease\b|\bthanks\b|\bthank you\b|\bnow\b|$)",
    ])
});

/// Where a weather request may name a place
static WEATHER_PLACE_MARKER: Lazy<Option<Regex>> =
    Lazy::new(|| compile_pattern(r"(?i)\b(?:in|for|at)\s+"));

/// Place name directly after a marker, ending before the next marker or a time word
static WEATHER_CITY_PATTERN: Lazy<Option<Regex>> = Lazy::new(|| {
    compile_pattern(
        r"(?i)^(?P<value>\p{L}[\p{L}'\- ]*?)\s*(?:[?.!,]|\btoday\b|\btomorrow\b|\btonight\b|\bright now\b|\bnow\b|\bplease\b|\b(?:in|for|at)\b|$)",
    )
});

/// Leading words that mean the "city" is really a time expression
const NOT_A_CITY: &[&str] = &["today", "tomorrow", "tonight", "now", "the", "this", "a", "my"];

fn compile_pattern(pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(regex) => Some(regex),
        Err(e) => {
            log::error!("Invalid extraction pattern {}: {}", pattern, e);
            None
        }
    }
}

fn compile_patterns(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .filter_map(|pattern| compile_pattern(pattern))
        .collect()
}

/// Intent categories in evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Category {
    SceneDescription,
    TextReading,
    ObjectSearch,
    FaceRecognition,
    FaceSaving,
    Time,
    Weather,
    SetCity,
    Help,
    VisualQuestion,
    GeneralConversation,
}

const PRIORITY: [Category; 11] = [
    Category::SceneDescription,
    Category::TextReading,
    Category::ObjectSearch,
    Category::FaceRecognition,
    Category::FaceSaving,
    Category::Time,
    Category::Weather,
    Category::SetCity,
    Category::Help,
    Category::VisualQuestion,
    Category::GeneralConversation,
];

impl Category {
    fn keywords(self) -> &'static [&'static str] {
        match self {
            Category::SceneDescription => SCENE_KEYWORDS,
            Category::TextReading => READ_TEXT_KEYWORDS,
            Category::ObjectSearch => OBJECT_SEARCH_KEYWORDS,
            Category::FaceRecognition => FACE_RECOGNITION_KEYWORDS,
            Category::FaceSaving => FACE_SAVING_KEYWORDS,
            Category::Time => TIME_KEYWORDS,
            Category::Weather => WEATHER_KEYWORDS,
            Category::SetCity => SET_CITY_KEYWORDS,
            Category::Help => HELP_KEYWORDS,
            Category::VisualQuestion => VISUAL_QUESTION_KEYWORDS,
            Category::GeneralConversation => CONVERSATION_KEYWORDS,
        }
    }
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| text.contains(keyword))
}

/// Trim whitespace and trailing sentence punctuation from a captured value
fn clean_capture(value: &str) -> Option<String> {
    let cleaned = value
        .trim()
        .trim_end_matches(|c: char| matches!(c, '.' | ',' | '!' | '?'))
        .trim();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

fn first_capture(patterns: &[Regex], text: &str) -> Option<String> {
    patterns.iter().find_map(|pattern| {
        pattern
            .captures(text)
            .and_then(|caps| caps.name("value"))
            .and_then(|value| clean_capture(value.as_str()))
    })
}

/// Extract the person name from a face-saving request, keeping its case
pub fn extract_person_name(text: &str) -> Option<String> {
    first_capture(&PERSON_NAME_PATTERNS, text)
}

/// Extract the city from a set-city request, keeping its case
pub fn extract_city_setting(text: &str) -> Option<String> {
    first_capture(&SET_CITY_PATTERNS, text)
}

/// Extract the city a weather request asks about, if it names one
///
/// Every "in", "for" or "at" is tried in turn, so a time expression such as
/// "for today" does not hide a city named later in the sentence.
pub fn extract_weather_city(text: &str) -> Option<String> {
    let marker = WEATHER_PLACE_MARKER.as_ref()?;
    let city_pattern = WEATHER_CITY_PATTERN.as_ref()?;

    marker.find_iter(text).find_map(|place| {
        let city = city_pattern
            .captures(&text[place.end()..])
            .and_then(|caps| caps.name("value"))
            .and_then(|value| clean_capture(value.as_str()))?;
        let first_word = city.split_whitespace().next()?.to_lowercase();
        (!NOT_A_CITY.contains(&first_word.as_str())).then_some(city)
    })
}

/// Strip the object-search phrases out of the request, leaving what to look for
fn extract_object_query(normalized: &str) -> String {
    let mut query = normalized.to_string();
    for keyword in OBJECT_SEARCH_KEYWORDS {
        query = query.replace(keyword, " ");
    }
    let query = query
        .trim()
        .trim_end_matches(|c: char| matches!(c, '.' | '!' | '?'))
        .to_string();
    query.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Keyword tier of the classifier. Stateless; safe to share.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Classify free text into an intent. Never fails.
    pub fn classify(&self, text: &str) -> Intent {
        let original = text.trim();
        let normalized = original.to_lowercase();

        if normalized.is_empty() {
            return Intent::Unknown;
        }

        for category in PRIORITY {
            if !contains_any(&normalized, category.keywords()) {
                continue;
            }

            match Self::resolve(category, &normalized, original) {
                Some(intent) => {
                    log::debug!("🏷️ '{}' matched {:?}", original, category);
                    return intent;
                }
                None => {
                    log::debug!(
                        "🏷️ '{}' matched {:?} keywords but not its pattern, falling through",
                        original,
                        category
                    );
                }
            }
        }

        Intent::Unknown
    }

    fn resolve(category: Category, normalized: &str, original: &str) -> Option<Intent> {
        match category {
            Category::SceneDescription => Some(Intent::DescribeScene),
            Category::TextReading => Some(Intent::ReadText),
            Category::ObjectSearch => Some(Intent::FindObject {
                query_text: extract_object_query(normalized),
            }),
            Category::FaceRecognition => Some(Intent::FaceDetect),
            Category::FaceSaving => {
                extract_person_name(original).map(|person_name| Intent::SaveFace { person_name })
            }
            Category::Time => Some(Intent::Time),
            Category::Weather => Some(Intent::Weather {
                city: extract_weather_city(original),
            }),
            Category::SetCity => extract_city_setting(original).map(|city| Intent::SetCity { city }),
            Category::Help => Some(Intent::Help),
            Category::VisualQuestion => normalized.contains('?').then(|| Intent::AnswerQuestion {
                query_text: original.to_string(),
            }),
            Category::GeneralConversation => Some(Intent::GeneralConversation {
                query_text: original.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(text: &str) -> Intent {
        KeywordClassifier::new().classify(text)
    }

    #[test]
    fn test_all_patterns_compile() {
        assert_eq!(PERSON_NAME_PATTERNS.len(), 3);
        assert_eq!(SET_CITY_PATTERNS.len(), 4);
        assert!(WEATHER_PLACE_MARKER.is_some());
        assert!(WEATHER_CITY_PATTERN.is_some());
    }

    #[test]
    fn test_single_category_matches() {
        assert_eq!(classify("what time is it"), Intent::Time);
        assert_eq!(classify("describe the scene"), Intent::DescribeScene);
        assert_eq!(classify("Read this for me"), Intent::ReadText);
        assert_eq!(classify("who is in front of me"), Intent::FaceDetect);
        assert_eq!(classify("help"), Intent::Help);
        assert_eq!(classify("What can you do"), Intent::Help);
    }

    #[test]
    fn test_priority_order() {
        // read_text beats find_object
        assert_eq!(classify("find and read the label"), Intent::ReadText);
        // scene beats everything
        assert_eq!(classify("describe who is reading"), Intent::DescribeScene);
        // face recognition beats time
        assert_eq!(classify("who knows what time it is"), Intent::FaceDetect);
    }

    #[test]
    fn test_object_query_extraction() {
        assert_eq!(
            classify("find my keys"),
            Intent::FindObject {
                query_text: "my keys".to_string()
            }
        );
        assert_eq!(
            classify("Where is my wallet?"),
            Intent::FindObject {
                query_text: "wallet".to_string()
            }
        );
    }

    #[test]
    fn test_save_face_requires_name() {
        assert_eq!(
            classify("save this person as John"),
            Intent::SaveFace {
                person_name: "John".to_string()
            }
        );
        assert_eq!(
            classify("Remember this face, her name is Mary Jane."),
            Intent::SaveFace {
                person_name: "Mary Jane".to_string()
            }
        );
        assert_ne!(classify("save this person").tag(), crate::intent::IntentTag::SaveFace);
        assert_eq!(classify("save this person"), Intent::Unknown);
    }

    #[test]
    fn test_weather_city() {
        assert_eq!(
            classify("weather in London"),
            Intent::Weather {
                city: Some("London".to_string())
            }
        );
        assert_eq!(classify("what's the weather"), Intent::Weather { city: None });
        assert_eq!(
            classify("What's the weather like in New York today?"),
            Intent::Weather {
                city: Some("New York".to_string())
            }
        );
        assert_eq!(
            classify("weather forecast for tomorrow"),
            Intent::Weather { city: None }
        );
    }

    #[test]
    fn test_weather_city_after_time_phrase() {
        assert_eq!(
            classify("What is the weather for today in Boston?"),
            Intent::Weather {
                city: Some("Boston".to_string())
            }
        );
        assert_eq!(
            classify("weather at the moment in Paris"),
            Intent::Weather {
                city: Some("Paris".to_string())
            }
        );
        assert_eq!(
            extract_weather_city("forecast for tomorrow in St Ives please"),
            Some("St Ives".to_string())
        );
    }

    #[test]
    fn test_trailing_fillers_not_captured() {
        assert_eq!(
            classify("save this person as John please"),
            Intent::SaveFace {
                person_name: "John".to_string()
            }
        );
        assert_eq!(
            extract_person_name("remember this face named Ada Lovelace, thanks"),
            Some("Ada Lovelace".to_string())
        );
        assert_eq!(
            classify("set my city to Porto please"),
            Intent::SetCity {
                city: "Porto".to_string()
            }
        );
        assert_eq!(
            extract_city_setting("my city is St. Louis."),
            Some("St. Louis".to_string())
        );
    }

    #[test]
    fn test_set_city_requires_city() {
        assert_eq!(
            classify("set my location to San Francisco"),
            Intent::SetCity {
                city: "San Francisco".to_string()
            }
        );
        assert_eq!(
            classify("I live in Paris."),
            Intent::SetCity {
                city: "Paris".to_string()
            }
        );
        // keywords without an extractable city fall through
        assert_eq!(classify("set my location"), Intent::Unknown);
    }

    #[test]
    fn test_visual_question_needs_question_mark() {
        assert_eq!(
            classify("How many people are here?"),
            Intent::AnswerQuestion {
                query_text: "How many people are here?".to_string()
            }
        );
        assert_eq!(classify("how many people are here"), Intent::Unknown);
    }

    #[test]
    fn test_general_conversation() {
        assert_eq!(
            classify("Hello there"),
            Intent::GeneralConversation {
                query_text: "Hello there".to_string()
            }
        );
        assert_eq!(
            classify("thanks a lot"),
            Intent::GeneralConversation {
                query_text: "thanks a lot".to_string()
            }
        );
    }

    #[test]
    fn test_empty_and_nonsense() {
        assert_eq!(classify(""), Intent::Unknown);
        assert_eq!(classify("   "), Intent::Unknown);
        assert_eq!(classify("xyzzy"), Intent::Unknown);
    }
}
