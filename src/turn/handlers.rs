//! Answers for intents that need no camera or server

use crate::intent::Intent;
use chrono::{Local, NaiveTime, Timelike};

pub const HELP_TEXT: &str = "You can ask me to describe the scene, read text, find an object, \
recognize or save a face, answer a question about what I see, tell the time, \
check the weather, or set your city.";

/// Speak a clock time the way people say it, e.g. "3:04 PM"
pub fn spoken_time(time: NaiveTime) -> String {
    let (is_pm, hour) = time.hour12();
    format!(
        "{}:{:02} {}",
        hour,
        time.minute(),
        if is_pm { "PM" } else { "AM" }
    )
}

/// Computes responses for non-visual intents and remembers the user's city
#[derive(Debug, Default)]
pub struct Responder {
    home_city: Option<String>,
}

impl Responder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn home_city(&self) -> Option<&str> {
        self.home_city.as_deref()
    }

    /// Respond to a non-visual intent; `None` for visual or unknown intents
    pub fn respond(&mut self, intent: &Intent) -> Option<String> {
        self.respond_at(intent, Local::now().time())
    }

    pub fn respond_at(&mut self, intent: &Intent, now: NaiveTime) -> Option<String> {
        let response = match intent {
            Intent::Time => format!("It's {}", spoken_time(now)),
            Intent::Weather { city } => self.weather(city.as_deref()),
            Intent::SetCity { city } => {
                log::info!("🏙️ Home city set to {}", city);
                self.home_city = Some(city.clone());
                format!("Okay, I'll use {} as your city.", city)
            }
            Intent::Help => HELP_TEXT.to_string(),
            Intent::GeneralConversation { query_text } => conversation_reply(query_text),
            _ => return None,
        };
        Some(response)
    }

    fn weather(&self, city: Option<&str>) -> String {
        match city.or(self.home_city.as_deref()) {
            Some(city) => format!(
                "I can't get live weather for {} from this device yet.",
                city
            ),
            None => "I don't know your city yet. Say \"set my city to\" followed by the city name."
                .to_string(),
        }
    }
}

fn conversation_reply(text: &str) -> String {
    let lower = text.to_lowercase();
    let reply = if lower.contains("thank") {
        "You're welcome!"
    } else if lower.contains("how are you") {
        "I'm doing well, thanks for asking."
    } else if lower.contains("joke") {
        "Why did the camera break up with the phone? It felt the relationship was too focused on selfies."
    } else if lower.contains("your name") {
        "I'm Scout, your visual assistant."
    } else if lower.contains("good night") {
        "Good night!"
    } else if ["hello", "hey", "good morning", "good afternoon", "good evening"]
        .iter()
        .any(|greeting| lower.contains(greeting))
    {
        "Hello! Say help to hear what I can do."
    } else {
        "I'm here to help. Ask me to describe what's around you."
    };
    reply.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_time_response() {
        let mut responder = Responder::new();
        assert_eq!(
            responder.respond_at(&Intent::Time, at(15, 4)),
            Some("It's 3:04 PM".to_string())
        );
        assert_eq!(spoken_time(at(0, 30)), "12:30 AM");
        assert_eq!(spoken_time(at(12, 0)), "12:00 PM");
    }

    #[test]
    fn test_weather_uses_home_city() {
        let mut responder = Responder::new();
        let ask = Intent::Weather { city: None };

        let reply = responder.respond_at(&ask, at(9, 0)).unwrap();
        assert!(reply.contains("don't know your city"));

        responder.respond_at(
            &Intent::SetCity {
                city: "Lisbon".to_string(),
            },
            at(9, 0),
        );
        assert_eq!(responder.home_city(), Some("Lisbon"));
        assert!(responder.respond_at(&ask, at(9, 0)).unwrap().contains("Lisbon"));

        // an explicit city wins over the remembered one
        let explicit = Intent::Weather {
            city: Some("Oslo".to_string()),
        };
        assert!(responder
            .respond_at(&explicit, at(9, 0))
            .unwrap()
            .contains("Oslo"));
    }

    #[test]
    fn test_visual_and_unknown_have_no_local_answer() {
        let mut responder = Responder::new();
        assert!(responder.respond_at(&Intent::DescribeScene, at(9, 0)).is_none());
        assert!(responder.respond_at(&Intent::Unknown, at(9, 0)).is_none());
    }

    #[test]
    fn test_conversation_replies() {
        assert_eq!(conversation_reply("Thanks a lot"), "You're welcome!");
        assert!(conversation_reply("hello there").starts_with("Hello"));
        assert!(conversation_reply("tell me something").starts_with("I'm here"));
    }
}
