use serde::{Deserialize, Serialize};

/// Device and publish choices made before joining a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantChoices {
    pub display_name: String,
    pub video_enabled: bool,
    pub audio_enabled: bool,
    #[serde(default)]
    pub video_device_id: Option<String>,
    #[serde(default)]
    pub audio_device_id: Option<String>,
}

impl ParticipantChoices {
    /// Audio and video on, system default devices.
    pub fn with_defaults(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            video_enabled: true,
            audio_enabled: true,
            video_device_id: Some(String::new()),
            audio_device_id: Some(String::new()),
        }
    }

    /// Absent device ids become `""`, meaning the system default.
    pub fn normalized(mut self) -> Self {
        self.video_device_id.get_or_insert_with(String::new);
        self.audio_device_id.get_or_insert_with(String::new);
        self
    }

    pub fn video_device(&self) -> &str {
        self.video_device_id.as_deref().unwrap_or("")
    }

    pub fn audio_device(&self) -> &str {
        self.audio_device_id.as_deref().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_enable_everything() {
        let choices = ParticipantChoices::with_defaults("Ada");
        assert!(choices.video_enabled);
        assert!(choices.audio_enabled);
        assert_eq!(choices.video_device(), "");
        assert_eq!(choices.audio_device(), "");
    }

    #[test]
    fn test_normalized_fills_missing_devices() {
        let choices = ParticipantChoices {
            display_name: "Ada".to_string(),
            video_enabled: false,
            audio_enabled: true,
            video_device_id: None,
            audio_device_id: Some("mic-1".to_string()),
        }
        .normalized();

        assert_eq!(choices.video_device_id.as_deref(), Some(""));
        assert_eq!(choices.audio_device_id.as_deref(), Some("mic-1"));
    }

    #[test]
    fn test_deserialize_camel_case() {
        let choices: ParticipantChoices = serde_json::from_str(
            r#"{"displayName":"Ada","videoEnabled":true,"audioEnabled":false}"#,
        )
        .unwrap();
        assert_eq!(choices.display_name, "Ada");
        assert!(!choices.audio_enabled);
        assert_eq!(choices.video_device_id, None);
    }
}
