use chrono::{DateTime, Utc};

use crate::api::{Settings, Task, TaskId, TaskStatus};
use crate::markdown::{self, MarkdownRenderer};

use super::display::{queue_label, relative_time, status_text};
use super::state::{ContentTab, MobilePage, Notice};

/// One row of the task list, ready to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskRow {
    pub id: TaskId,
    pub title: String,
    pub status: TaskStatus,
    pub status_text: &'static str,
    pub time_text: Option<String>,
    pub queue_text: Option<String>,
    /// Present for tasks that are not completed yet.
    pub progress: Option<u32>,
    pub selected: bool,
}

impl TaskRow {
    pub fn new(task: &Task, selected: Option<TaskId>, now: DateTime<Utc>) -> Self {
        Self {
            id: task.id,
            title: task.title.clone(),
            status: task.status,
            status_text: status_text(task.status),
            time_text: task.created_at.map(|t| relative_time(t, now)),
            queue_text: queue_label(task.queue_position),
            progress: (!task.is_completed()).then(|| task.percent()),
            selected: selected == Some(task.id),
        }
    }
}

pub fn task_rows(tasks: &[Task], selected: Option<TaskId>, now: DateTime<Utc>) -> Vec<TaskRow> {
    tasks.iter().map(|t| TaskRow::new(t, selected, now)).collect()
}

/// Contents of the detail pane.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskDetail {
    /// Nothing selected.
    Welcome,
    /// Task still running or failed.
    Progress {
        title: String,
        status: TaskStatus,
        status_text: &'static str,
        percent: u32,
        error: Option<String>,
    },
    /// Completed task. `summary_markup` is Pango markup.
    Content {
        title: String,
        summary_markup: String,
        original_text: String,
    },
}

pub const WELCOME_TITLE: &str = "欢迎使用智能视频内容分析工具";
pub const WELCOME_BODY: &str = "选择左侧的视频链接或上传音频文件开始分析";
pub const ORIGINAL_PLACEHOLDER_TITLE: &str = "原始转录文本";
pub const ORIGINAL_PLACEHOLDER_BODY: &str = "完成任务后，这里将显示原始的转录文本";
const NO_SUMMARY: &str = "暂无总结内容";
const NO_ORIGINAL: &str = "暂无原始文本";

impl TaskDetail {
    pub fn for_task(task: &Task, renderer: Option<&dyn MarkdownRenderer>) -> Self {
        if task.is_completed() {
            TaskDetail::Content {
                title: task.title.clone(),
                summary_markup: markdown::render(
                    task.summary.as_deref().unwrap_or(NO_SUMMARY),
                    renderer,
                ),
                original_text: task
                    .original_text
                    .clone()
                    .unwrap_or_else(|| NO_ORIGINAL.to_string()),
            }
        } else {
            TaskDetail::Progress {
                title: task.title.clone(),
                status: task.status,
                status_text: status_text(task.status),
                percent: task.percent(),
                error: task.error_message.clone(),
            }
        }
    }
}

/// One presentation of the task list and detail pane. The wide and the
/// compact layout each implement this; all validation and requests live in
/// the controller.
pub trait TaskView {
    /// Current text of the URL entry.
    fn input_text(&self) -> String;
    fn set_input_text(&self, text: &str);
    fn render_list(&self, rows: &[TaskRow]);
    fn render_detail(&self, detail: &TaskDetail);
    /// Label next to the file picker; `None` shows "未选择文件".
    fn set_file_label(&self, name: Option<&str>);
    fn show_tab(&self, tab: ContentTab);
    /// Only the compact layout has pages.
    fn show_page(&self, _page: MobilePage) {}
}

/// Window-level feedback shared by both layouts.
pub trait Shell {
    fn notify(&self, notice: &Notice);
    fn set_loading(&self, loading: bool);
}

/// The settings dialog.
pub trait SettingsForm {
    fn fill(&self, settings: &Settings);
    fn read(&self) -> Settings;
    fn close(&self);
    fn show_model_status(&self, text: &str);
}
