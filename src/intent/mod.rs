//! Intent classification for transcribed utterances.
//!
//! Classification always produces an [`Intent`]; failure is expressed as
//! [`Intent::Unknown`] rather than an error. A model tier can be layered on
//! top of the keyword tier, see [`IntentClassifier`].

pub mod keywords;
pub mod model;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

pub use keywords::KeywordClassifier;
pub use model::{IntentClassifier, IntentModel, ModelClassifier};

/// The classified user goal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    DescribeScene,
    ReadText,
    FindObject { query_text: String },
    FaceDetect,
    SaveFace { person_name: String },
    Time,
    Weather { city: Option<String> },
    SetCity { city: String },
    Help,
    AnswerQuestion { query_text: String },
    GeneralConversation { query_text: String },
    Unknown,
}

/// Payload-free discriminant of an [`Intent`], named as on the wire
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    AsRefStr,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum IntentTag {
    DescribeScene,
    ReadText,
    FindObject,
    FaceDetect,
    SaveFace,
    Time,
    Weather,
    SetCity,
    Help,
    AnswerQuestion,
    GeneralConversation,
    Unknown,
}

impl IntentTag {
    /// Visual tasks need a fresh camera image and the Professor server
    pub fn is_visual(&self) -> bool {
        matches!(
            self,
            IntentTag::DescribeScene
                | IntentTag::ReadText
                | IntentTag::FindObject
                | IntentTag::AnswerQuestion
                | IntentTag::FaceDetect
                | IntentTag::SaveFace
        )
    }
}

impl Intent {
    pub fn tag(&self) -> IntentTag {
        match self {
            Intent::DescribeScene => IntentTag::DescribeScene,
            Intent::ReadText => IntentTag::ReadText,
            Intent::FindObject { .. } => IntentTag::FindObject,
            Intent::FaceDetect => IntentTag::FaceDetect,
            Intent::SaveFace { .. } => IntentTag::SaveFace,
            Intent::Time => IntentTag::Time,
            Intent::Weather { .. } => IntentTag::Weather,
            Intent::SetCity { .. } => IntentTag::SetCity,
            Intent::Help => IntentTag::Help,
            Intent::AnswerQuestion { .. } => IntentTag::AnswerQuestion,
            Intent::GeneralConversation { .. } => IntentTag::GeneralConversation,
            Intent::Unknown => IntentTag::Unknown,
        }
    }

    pub fn is_visual(&self) -> bool {
        self.tag().is_visual()
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Intent::Unknown)
    }

    /// Text forwarded to the server as `query_text`, if this intent carries any.
    ///
    /// Face saving sends the person's name so the server can label the face.
    pub fn query_text(&self) -> Option<&str> {
        match self {
            Intent::FindObject { query_text }
            | Intent::AnswerQuestion { query_text }
            | Intent::GeneralConversation { query_text } => Some(query_text),
            Intent::SaveFace { person_name } => Some(person_name),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_tag_names_are_snake_case() {
        assert_eq!(IntentTag::DescribeScene.to_string(), "describe_scene");
        assert_eq!(IntentTag::GeneralConversation.as_ref(), "general_conversation");
        assert_eq!(IntentTag::from_str("face_detect").unwrap(), IntentTag::FaceDetect);
        assert!(IntentTag::from_str("dance").is_err());
    }

    #[test]
    fn test_visual_set() {
        let visual: Vec<IntentTag> = IntentTag::iter().filter(|t| t.is_visual()).collect();
        assert_eq!(
            visual,
            vec![
                IntentTag::DescribeScene,
                IntentTag::ReadText,
                IntentTag::FindObject,
                IntentTag::FaceDetect,
                IntentTag::SaveFace,
                IntentTag::AnswerQuestion,
            ]
        );
        assert!(!Intent::Weather { city: None }.is_visual());
    }

    #[test]
    fn test_query_text_payloads() {
        let find = Intent::FindObject {
            query_text: "keys".to_string(),
        };
        assert_eq!(find.query_text(), Some("keys"));

        let save = Intent::SaveFace {
            person_name: "John".to_string(),
        };
        assert_eq!(save.query_text(), Some("John"));

        assert_eq!(Intent::DescribeScene.query_text(), None);
        assert_eq!(Intent::Unknown.tag(), IntentTag::Unknown);
    }
}
