use chrono::{DateTime, Utc};

use crate::api::{ModelStatus, TaskStatus};

pub const EMPTY_LIST_TEXT: &str = "暂无任务";
pub const NO_FILE_TEXT: &str = "未选择文件";

pub fn status_text(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Pending => "排队中",
        TaskStatus::Downloading => "下载中",
        TaskStatus::Transcribing => "转录中",
        TaskStatus::Summarizing => "总结中",
        TaskStatus::Completed => "已完成",
        TaskStatus::Failed => "失败",
        TaskStatus::Unknown => "未知",
    }
}

/// "刚刚", "5分钟前", "3小时前", "2天前".
pub fn relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - then).num_seconds();
    if secs < 60 {
        "刚刚".to_string()
    } else if secs < 3_600 {
        format!("{}分钟前", secs / 60)
    } else if secs < 86_400 {
        format!("{}小时前", secs / 3_600)
    } else {
        format!("{}天前", secs / 86_400)
    }
}

/// Only shown from the second place on; the head of the queue needs no label.
pub fn queue_label(position: Option<usize>) -> Option<String> {
    position
        .filter(|&p| p > 1)
        .map(|p| format!("队列位置: {p}"))
}

/// Text of the model status line in the settings dialog.
pub fn model_status_text(status: &ModelStatus, auto_load: bool) -> String {
    if status.loaded {
        return status.status.clone();
    }
    let cuda = if status.cuda_available {
        " (CUDA可用)"
    } else {
        " (CUDA不可用)"
    };
    let auto = if auto_load { " - 动态加载已启用" } else { "" };
    format!("未加载{cuda}{auto}")
}
