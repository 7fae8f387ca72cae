//! Backend data models. JSON field names are camelCase.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Workshop {
    pub id: u64,
    pub name: String,
    pub category: String,
    /// May contain HTML markup.
    pub description: String,
    pub start_date: String,
    pub end_date: String,
    pub time: String,
    pub location: WorkshopLocation,
    pub modes: Modes,
    pub image_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkshopLocation {
    pub address: String,
    pub city: String,
    pub state: String,
}

impl fmt::Display for WorkshopLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {}", self.address, self.city, self.state)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Modes {
    pub in_person: bool,
    pub online: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Session {
    pub id: u64,
    pub workshop_id: u64,
    pub sequence_id: u64,
    pub name: String,
    pub speaker: String,
    pub level: String,
    pub duration: f64,
    #[serde(rename = "abstract")]
    pub summary: String,
    pub upvote_count: i64,
}

/// Body of `POST /sessions`. The server assigns the id.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSession {
    pub workshop_id: u64,
    pub sequence_id: u64,
    pub name: String,
    pub speaker: String,
    pub level: String,
    pub duration: f64,
    #[serde(rename = "abstract")]
    pub summary: String,
    pub upvote_count: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VoteType {
    Upvote,
    Downvote,
}

impl VoteType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteType::Upvote => "upvote",
            VoteType::Downvote => "downvote",
        }
    }
}

impl fmt::Display for VoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A workshop the user starred. Kept in memory only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Favorite {
    pub id: u64,
    pub name: String,
}

impl From<&Workshop> for Favorite {
    fn from(workshop: &Workshop) -> Self {
        Self {
            id: workshop.id,
            name: workshop.name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_workshop_from_server_json() {
        let raw = json!({
            "id": 1,
            "name": "Angular JS Bootcamp",
            "category": "frontend",
            "description": "<p>AngularJS is a <b>framework</b></p>",
            "startDate": "2019-01-01T04:00:00.000Z",
            "endDate": "2019-01-03T04:00:00.000Z",
            "time": "9:30 am - 1:30 pm",
            "location": { "address": "Tata Elxsi, Prestige Shantiniketan", "city": "Bangalore", "state": "Karnataka" },
            "modes": { "inPerson": true, "online": false },
            "imageUrl": "https://example.com/angularjs.png"
        });

        let workshop: Workshop = serde_json::from_value(raw).unwrap();
        assert_eq!(workshop.id, 1);
        assert_eq!(workshop.start_date, "2019-01-01T04:00:00.000Z");
        assert!(workshop.modes.in_person);
        assert!(!workshop.modes.online);
        assert_eq!(
            workshop.location.to_string(),
            "Tata Elxsi, Prestige Shantiniketan, Bangalore, Karnataka"
        );
    }

    #[test]
    fn test_session_abstract_field() {
        let raw = json!({
            "id": 7, "workshopId": 1, "sequenceId": 2, "name": "Closures",
            "speaker": "John Doe", "level": "Basic", "duration": 1.5,
            "abstract": "All about closures", "upvoteCount": 4
        });
        let session: Session = serde_json::from_value(raw).unwrap();
        assert_eq!(session.summary, "All about closures");
        assert_eq!(session.upvote_count, 4);
    }

    #[test]
    fn test_new_session_serialises_camel_case() {
        let session = NewSession {
            workshop_id: 3,
            sequence_id: 1,
            name: "Intro".into(),
            speaker: "Jane".into(),
            level: "Basic".into(),
            duration: 1.0,
            summary: "An introduction to the topic".into(),
            upvote_count: 0,
        };
        let value = serde_json::to_value(&session).unwrap();
        assert_eq!(value["workshopId"], 3);
        assert_eq!(value["abstract"], "An introduction to the topic");
        assert_eq!(value["upvoteCount"], 0);
        assert!(value.get("id").is_none());
    }
}
