use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

pub type TaskId = i64;

/// Processing stage reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Downloading,
    Transcribing,
    Summarizing,
    Completed,
    Failed,
    #[serde(other)]
    Unknown,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Downloading => "downloading",
            TaskStatus::Transcribing => "transcribing",
            TaskStatus::Summarizing => "summarizing",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
            TaskStatus::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Url,
    File,
}

/// One task as returned by `GET /api/tasks/`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Task {
    pub id: TaskId,
    #[serde(default)]
    pub title: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub task_type: Option<TaskKind>,
    pub status: TaskStatus,
    #[serde(default)]
    pub progress: Option<u32>,
    #[serde(default, deserialize_with = "timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "timestamp")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub original_text: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub error_message: Option<String>,
    /// Rank among pending tasks, derived on every poll. Never sent by the server.
    #[serde(skip)]
    pub queue_position: Option<usize>,
}

impl Task {
    /// Progress clamped to 0..=100; missing counts as 0.
    pub fn percent(&self) -> u32 {
        self.progress.unwrap_or(0).min(100)
    }

    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }
}

/// `GET /api/queue/status/`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct QueueStatus {
    #[serde(default)]
    pub queue_size: u32,
    #[serde(default)]
    pub is_processing: bool,
    #[serde(default)]
    pub current_task: Option<CurrentTask>,
}

/// Queue entry the worker is processing right now.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CurrentTask {
    pub task_id: TaskId,
    #[serde(default, rename = "type")]
    pub kind: Option<TaskKind>,
}

/// Reply of the two create endpoints.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreatedTask {
    pub id: TaskId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub queue_position: Option<u32>,
    #[serde(default)]
    pub is_processing: bool,
}

/// Backend settings as edited in the settings dialog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settings {
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub openai_model: String,
    pub whisper_model: String,
    pub whisper_device: String,
    pub auto_load_model: bool,
    pub summary_prompt: String,
    pub url_summary_prompt: String,
}

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_WHISPER_MODEL: &str = "base";
pub const DEFAULT_WHISPER_DEVICE: &str = "auto";
pub const DEFAULT_SUMMARY_PROMPT: &str = "总结录音，简体中文回答";
pub const DEFAULT_URL_SUMMARY_PROMPT: &str =
    "本次录音的标题是{title}，简要回答标题的问题，并且总结录音，简体中文回答";

/// Choices offered for `whisper_device`.
pub const WHISPER_DEVICES: [(&str, &str); 3] =
    [("auto", "自动选择"), ("cuda", "GPU (CUDA)"), ("cpu", "CPU")];

impl Default for Settings {
    fn default() -> Self {
        Self {
            openai_api_key: String::new(),
            openai_base_url: DEFAULT_OPENAI_BASE_URL.into(),
            openai_model: DEFAULT_OPENAI_MODEL.into(),
            whisper_model: DEFAULT_WHISPER_MODEL.into(),
            whisper_device: DEFAULT_WHISPER_DEVICE.into(),
            auto_load_model: false,
            summary_prompt: DEFAULT_SUMMARY_PROMPT.into(),
            url_summary_prompt: DEFAULT_URL_SUMMARY_PROMPT.into(),
        }
    }
}

impl Settings {
    /// Whether switching from `self` to `other` touches the whisper model
    /// selection, i.e. whether a model reload should be suggested.
    pub fn model_selection_differs(&self, other: &Settings) -> bool {
        self.whisper_model != other.whisper_model || self.whisper_device != other.whisper_device
    }
}

/// Settings as the server sends them: every field may be missing or blank.
#[derive(Debug, Default, Deserialize)]
struct WireSettings {
    openai_api_key: Option<String>,
    openai_base_url: Option<String>,
    openai_model: Option<String>,
    whisper_model: Option<String>,
    whisper_device: Option<String>,
    auto_load_model: Option<bool>,
    summary_prompt: Option<String>,
    url_summary_prompt: Option<String>,
}

impl<'de> Deserialize<'de> for Settings {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = WireSettings::deserialize(deserializer)?;
        let defaults = Settings::default();
        let pick = |value: Option<String>, default: String| {
            value.filter(|s| !s.is_empty()).unwrap_or(default)
        };
        Ok(Settings {
            openai_api_key: wire.openai_api_key.unwrap_or_default(),
            openai_base_url: pick(wire.openai_base_url, defaults.openai_base_url),
            openai_model: pick(wire.openai_model, defaults.openai_model),
            whisper_model: pick(wire.whisper_model, defaults.whisper_model),
            whisper_device: pick(wire.whisper_device, defaults.whisper_device),
            auto_load_model: wire.auto_load_model.unwrap_or(false),
            summary_prompt: pick(wire.summary_prompt, defaults.summary_prompt),
            url_summary_prompt: pick(wire.url_summary_prompt, defaults.url_summary_prompt),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelAction {
    Load,
    Unload,
}

impl ModelAction {
    pub fn success_message(&self) -> &'static str {
        match self {
            ModelAction::Load => "模型加载成功",
            ModelAction::Unload => "模型卸载成功",
        }
    }

    pub fn failure_message(&self) -> &'static str {
        match self {
            ModelAction::Load => "模型加载失败",
            ModelAction::Unload => "模型卸载失败",
        }
    }
}

/// `GET /api/model/status/`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ModelStatus {
    #[serde(default)]
    pub loaded: bool,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub cuda_available: bool,
    #[serde(default)]
    pub device: Option<String>,
    #[serde(default)]
    pub auto_load_enabled: Option<bool>,
    #[serde(default)]
    pub queue_size: Option<u32>,
    #[serde(default)]
    pub is_processing: Option<bool>,
}

/// `{"error": "..."}` / `{"message": "..."}` bodies.
#[derive(Debug, Default, Deserialize)]
pub struct ServerMessage {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

fn blank_as_none<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

/// Accepts RFC 3339 timestamps and naive ones (taken as local time).
/// Anything unparseable becomes `None` instead of failing the whole list.
fn timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.as_deref().and_then(parse_timestamp))
}

pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_blank_strings_become_none() {
        let task: Task = serde_json::from_value(serde_json::json!({
            "id": 7,
            "title": "https://example.com/v=1",
            "url": "https://example.com/v=1",
            "task_type": "url",
            "status": "transcribing",
            "progress": 40,
            "original_text": "",
            "summary": "",
            "error_message": "",
            "created_at": "2024-05-01T12:00:00.123456Z",
            "completed_at": null
        }))
        .unwrap();
        assert_eq!(task.status, TaskStatus::Transcribing);
        assert_eq!(task.task_type, Some(TaskKind::Url));
        assert_eq!(task.summary, None);
        assert_eq!(task.original_text, None);
        assert_eq!(task.error_message, None);
        assert_eq!(task.completed_at, None);
        assert_eq!(task.queue_position, None);
        assert_eq!(
            task.created_at.map(|t| t.timestamp()),
            Some(1_714_564_800)
        );
    }

    #[test]
    fn unknown_status_does_not_fail() {
        let task: Task =
            serde_json::from_value(serde_json::json!({"id": 1, "status": "paused"})).unwrap();
        assert_eq!(task.status, TaskStatus::Unknown);
        assert_eq!(task.percent(), 0);
    }

    #[test]
    fn percent_is_clamped() {
        let task: Task = serde_json::from_value(
            serde_json::json!({"id": 1, "status": "summarizing", "progress": 140}),
        )
        .unwrap();
        assert_eq!(task.percent(), 100);
    }

    #[test]
    fn timestamps_with_offset_and_naive() {
        let with_offset = parse_timestamp("2024-05-01T20:00:00+08:00").unwrap();
        assert_eq!(with_offset.timestamp(), 1_714_564_800);
        assert!(parse_timestamp("2024-05-01T20:00:00.5").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn queue_status_with_running_task() {
        let status: QueueStatus = serde_json::from_value(serde_json::json!({
            "queue_size": 2,
            "is_processing": true,
            "current_task": {"task_id": 5, "type": "url", "added_at": 1401.5}
        }))
        .unwrap();
        assert_eq!(status.queue_size, 2);
        assert!(status.is_processing);
        assert_eq!(
            status.current_task,
            Some(CurrentTask {
                task_id: 5,
                kind: Some(TaskKind::Url),
            })
        );

        let idle: QueueStatus = serde_json::from_value(serde_json::json!({
            "queue_size": 0,
            "is_processing": false,
            "current_task": null
        }))
        .unwrap();
        assert_eq!(idle.current_task, None);
    }

    #[test]
    fn settings_defaults_fill_missing_and_blank_fields() {
        let settings: Settings = serde_json::from_value(serde_json::json!({
            "openai_api_key": "sk-test",
            "openai_base_url": "",
            "whisper_model": "medium",
            "auto_load_model": true
        }))
        .unwrap();
        assert_eq!(settings.openai_api_key, "sk-test");
        assert_eq!(settings.openai_base_url, DEFAULT_OPENAI_BASE_URL);
        assert_eq!(settings.openai_model, DEFAULT_OPENAI_MODEL);
        assert_eq!(settings.whisper_model, "medium");
        assert_eq!(settings.whisper_device, DEFAULT_WHISPER_DEVICE);
        assert!(settings.auto_load_model);
        assert_eq!(settings.summary_prompt, DEFAULT_SUMMARY_PROMPT);
        assert_eq!(settings.url_summary_prompt, DEFAULT_URL_SUMMARY_PROMPT);
    }

    #[test]
    fn settings_serialize_every_field() {
        let value = serde_json::to_value(Settings::default()).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 8);
        assert_eq!(object["auto_load_model"], serde_json::json!(false));
        assert_eq!(object["whisper_device"], serde_json::json!("auto"));
    }

    #[test]
    fn model_selection_change_detection() {
        let before = Settings::default();
        let mut after = before.clone();
        after.openai_model = "gpt-4o".into();
        assert!(!before.model_selection_differs(&after));
        after.whisper_device = "cuda".into();
        assert!(before.model_selection_differs(&after));
    }

    #[test]
    fn model_action_wire_format() {
        assert_eq!(
            serde_json::to_value(ModelAction::Unload).unwrap(),
            serde_json::json!("unload")
        );
    }
}
