use serde_json::Value;
use tracing::{debug, info};

use crate::error::BotError;

/// Review outcome reported by the Practicum API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomeworkStatus {
    Approved,
    Reviewing,
    Rejected,
}

impl HomeworkStatus {
    /// Parse the raw `status` key; `None` for anything undocumented
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "approved" => Some(HomeworkStatus::Approved),
            "reviewing" => Some(HomeworkStatus::Reviewing),
            "rejected" => Some(HomeworkStatus::Rejected),
            _ => None,
        }
    }

    pub fn as_key(&self) -> &'static str {
        match self {
            HomeworkStatus::Approved => "approved",
            HomeworkStatus::Reviewing => "reviewing",
            HomeworkStatus::Rejected => "rejected",
        }
    }

    pub fn verdict(&self) -> &'static str {
        match self {
            HomeworkStatus::Approved => "Работа проверена: ревьюеру всё понравилось. Ура!",
            HomeworkStatus::Reviewing => "Работа взята на проверку ревьюером.",
            HomeworkStatus::Rejected => "Работа проверена: у ревьюера есть замечания.",
        }
    }
}

impl std::fmt::Display for HomeworkStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_key())
    }
}

/// The fields of a homework entry the bot cares about
#[derive(Debug, Clone, PartialEq)]
pub struct HomeworkRecord {
    pub homework_name: String,
    pub status: HomeworkStatus,
}

impl HomeworkRecord {
    /// Validate a raw homework object from the API
    pub fn from_value(record: &Value) -> Result<Self, BotError> {
        let name = required_field(record, "homework_name")?;
        let status = required_field(record, "status")?;

        let homework_name = match name {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        let status = status
            .as_str()
            .and_then(HomeworkStatus::from_key)
            .ok_or_else(|| {
                BotError::UnknownStatus(
                    status
                        .as_str()
                        .map(str::to_string)
                        .unwrap_or_else(|| status.to_string()),
                )
            })?;

        info!("Homework {} has status {}", homework_name, status);
        Ok(Self {
            homework_name,
            status,
        })
    }

    /// Notification text for this record
    pub fn status_message(&self) -> String {
        format!(
            "Изменился статус проверки работы \"{}\". {}",
            self.homework_name,
            self.status.verdict()
        )
    }
}

fn required_field<'a>(record: &'a Value, field: &'static str) -> Result<&'a Value, BotError> {
    record.get(field).ok_or_else(|| BotError::MissingField {
        field,
        record: record.to_string(),
    })
}

/// Check the API envelope and return its `homeworks` list (possibly empty)
pub fn extract_homeworks(response: &Value) -> Result<&Vec<Value>, BotError> {
    debug!("Validating API response");

    let envelope = response
        .as_object()
        .ok_or_else(|| BotError::NotAMapping(response.to_string()))?;

    if !envelope.contains_key("homeworks") || !envelope.contains_key("current_date") {
        return Err(BotError::MissingKeys);
    }

    let homeworks = envelope["homeworks"]
        .as_array()
        .ok_or(BotError::HomeworksNotAList)?;

    debug!("API response is valid: {} homework(s)", homeworks.len());
    Ok(homeworks)
}

/// Format the notification text for a single homework record
pub fn parse_status(record: &Value) -> Result<String, BotError> {
    debug!("Parsing homework status");
    HomeworkRecord::from_value(record).map(|r| r.status_message())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_approved_message() {
        let record = json!({"homework_name": "hw1", "status": "approved"});
        assert_eq!(
            parse_status(&record).unwrap(),
            "Изменился статус проверки работы \"hw1\". Работа проверена: ревьюеру всё понравилось. Ура!"
        );
    }

    #[test]
    fn test_each_documented_status_has_verdict() {
        for (key, verdict) in [
            ("reviewing", "Работа взята на проверку ревьюером."),
            ("rejected", "Работа проверена: у ревьюера есть замечания."),
        ] {
            let record = json!({"homework_name": "hw2", "status": key});
            let message = parse_status(&record).unwrap();
            assert!(message.ends_with(verdict), "{}", message);
        }
    }

    #[test]
    fn test_unknown_status_rejected() {
        let record = json!({"homework_name": "hw1", "status": "lost"});
        match parse_status(&record) {
            Err(BotError::UnknownStatus(s)) => assert_eq!(s, "lost"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_non_string_status_is_unknown() {
        let record = json!({"homework_name": "hw1", "status": 7});
        assert!(matches!(
            parse_status(&record),
            Err(BotError::UnknownStatus(_))
        ));
    }

    #[test]
    fn test_missing_fields() {
        let no_name = json!({"status": "approved"});
        assert!(matches!(
            parse_status(&no_name),
            Err(BotError::MissingField {
                field: "homework_name",
                ..
            })
        ));

        let no_status = json!({"homework_name": "hw1"});
        assert!(matches!(
            parse_status(&no_status),
            Err(BotError::MissingField { field: "status", .. })
        ));
    }

    #[test]
    fn test_record_not_an_object() {
        assert!(matches!(
            parse_status(&json!("hw1")),
            Err(BotError::MissingField { .. })
        ));
    }

    #[test]
    fn test_extract_returns_list_unchanged() {
        let response = json!({
            "homeworks": [
                {"homework_name": "hw2", "status": "reviewing"},
                {"homework_name": "hw1", "status": "approved"}
            ],
            "current_date": 1000
        });
        let homeworks = extract_homeworks(&response).unwrap();
        assert_eq!(homeworks.len(), 2);
        assert_eq!(homeworks[0]["homework_name"], "hw2");
    }

    #[test]
    fn test_extract_empty_list() {
        let response = json!({"homeworks": [], "current_date": 1000});
        assert!(extract_homeworks(&response).unwrap().is_empty());
    }

    #[test]
    fn test_extract_missing_keys() {
        for response in [
            json!({"current_date": 1000}),
            json!({"homeworks": []}),
            json!({}),
        ] {
            assert!(matches!(
                extract_homeworks(&response),
                Err(BotError::MissingKeys)
            ));
        }
    }

    #[test]
    fn test_extract_not_a_mapping() {
        assert!(matches!(
            extract_homeworks(&json!([1, 2, 3])),
            Err(BotError::NotAMapping(_))
        ));
    }

    #[test]
    fn test_extract_homeworks_not_a_list() {
        let response = json!({"homeworks": {"homework_name": "hw1"}, "current_date": 1000});
        assert!(matches!(
            extract_homeworks(&response),
            Err(BotError::HomeworksNotAList)
        ));
    }

    #[test]
    fn test_status_keys_round_trip() {
        for status in [
            HomeworkStatus::Approved,
            HomeworkStatus::Reviewing,
            HomeworkStatus::Rejected,
        ] {
            assert_eq!(HomeworkStatus::from_key(status.as_key()), Some(status));
        }
        assert_eq!(HomeworkStatus::from_key("Approved"), None);
    }
}
