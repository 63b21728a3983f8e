use serde::de::Error;
use serde::{Deserialize, Deserializer, Serializer};

use crate::ActionKind;

pub const UNKNOWN_ACTION: &str = "unknown";

pub fn serialize<S>(value: &Option<ActionKind>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(value.map_or(UNKNOWN_ACTION, ActionKind::as_str))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<ActionKind>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if raw == UNKNOWN_ACTION {
        return Ok(None);
    }
    ActionKind::from_key(&raw)
        .map(Some)
        .ok_or_else(|| D::Error::custom(format!("invalid action: {raw}")))
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    use crate::ActionKind;

    #[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
    struct Wrapper {
        #[serde(with = "super")]
        action: Option<ActionKind>,
    }

    #[test]
    fn missing_action_serializes_as_unknown() {
        let encoded = serde_json::to_string(&Wrapper { action: None }).expect("serialize");
        assert_eq!(encoded, r#"{"action":"unknown"}"#);
    }

    #[test]
    fn deserialize_accepts_unknown_and_actions() {
        let parsed: Wrapper = serde_json::from_str(r#"{"action":"unknown"}"#).expect("unknown");
        assert_eq!(parsed.action, None);
        let parsed: Wrapper = serde_json::from_str(r#"{"action":"housing"}"#).expect("housing");
        assert_eq!(parsed.action, Some(ActionKind::Housing));
    }

    #[test]
    fn deserialize_rejects_foreign_actions() {
        assert!(serde_json::from_str::<Wrapper>(r#"{"action":"mining"}"#).is_err());
    }
}
