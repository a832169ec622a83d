use crate::api::{
    CreatedTask, ModelAction, ModelStatus, QueueStatus, Settings, Task, TaskId, TaskSnapshot,
};
use crate::clipboard::ClipboardError;
use crate::error::ClientError;

/// Which presentation adapter an action came from or is aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ViewKind {
    #[default]
    Desktop,
    Mobile,
}

/// Layout currently on screen. Follows the window width.
pub type Layout = ViewKind;

/// Tab of the detail pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentTab {
    #[default]
    Summary,
    Original,
}

/// Page of the compact layout's bottom navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MobilePage {
    #[default]
    Add,
    Tasks,
    Summary,
}

impl MobilePage {
    pub fn name(&self) -> &'static str {
        match self {
            MobilePage::Add => "add",
            MobilePage::Tasks => "tasks",
            MobilePage::Summary => "summary",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "add" => Some(MobilePage::Add),
            "tasks" => Some(MobilePage::Tasks),
            "summary" => Some(MobilePage::Summary),
            _ => None,
        }
    }
}

/// UI context that survives polls. Only user actions change it, except
/// that a selection pointing at a task that no longer exists is dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub current_task: Option<TaskId>,
    pub tab: ContentTab,
    pub mobile_page: MobilePage,
    pub mobile_tab: ContentTab,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
    Info,
}

/// A transient, auto-dismissing notification.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            message: message.into(),
        }
    }
}

/// How a new task was submitted; decides messages and follow-up navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    Url(ViewKind),
    File(ViewKind),
    Clipboard,
}

impl Submission {
    pub fn view(&self) -> ViewKind {
        match self {
            Submission::Url(view) | Submission::File(view) => *view,
            Submission::Clipboard => ViewKind::Mobile,
        }
    }

    pub fn success_message(&self) -> &'static str {
        match self {
            Submission::Url(_) => "任务创建成功",
            Submission::File(_) => "文件上传成功",
            Submission::Clipboard => "从剪切板导入成功，任务已开始执行",
        }
    }

    pub fn failure_message(&self) -> &'static str {
        match self {
            Submission::Url(_) | Submission::Clipboard => "创建任务失败",
            Submission::File(_) => "文件上传失败",
        }
    }
}

/// Events delivered from the tokio runtime to the UI thread.
#[derive(Debug, Clone)]
pub enum BackendEvent {
    TasksLoaded(Result<TaskSnapshot, ClientError>),
    TaskCreated {
        submission: Submission,
        result: Result<CreatedTask, ClientError>,
    },
    TaskDeleted {
        id: TaskId,
        result: Result<(), ClientError>,
    },
    SettingsLoaded(Result<Settings, ClientError>),
    SettingsSaved {
        settings: Settings,
        result: Result<(), ClientError>,
    },
    ModelManaged {
        action: ModelAction,
        result: Result<(), ClientError>,
    },
    ModelStatusLoaded(Result<ModelStatus, ClientError>),
    ClipboardRead(Result<String, ClipboardError>),
    /// Delayed navigation on the compact layout.
    ShowMobilePage(MobilePage),
}

/// Everything the controller knows. Plain data; no widgets.
#[derive(Debug, Clone, Default)]
pub struct ClientState {
    pub tasks: Vec<Task>,
    pub queue: Option<QueueStatus>,
    pub settings: Option<Settings>,
    pub selection: Selection,
    pub layout: Layout,
    pub model_status_text: Option<String>,
    /// Mutating requests in flight; the loading indicator shows while > 0.
    pub pending_requests: usize,
}

impl ClientState {
    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.selection.current_task.and_then(|id| self.task(id))
    }

    pub fn auto_load_model(&self) -> bool {
        self.settings.as_ref().is_some_and(|s| s.auto_load_model)
    }
}
