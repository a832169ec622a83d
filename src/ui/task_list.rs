use gtk4::prelude::*;
use libadwaita::prelude::*;

use crate::api::TaskStatus;
use crate::app::{TaskRow, EMPTY_LIST_TEXT};

/// Window action that deletes the task whose id is the i64 target.
pub const DELETE_ACTION: &str = "win.delete-task";

/// The task list shared by both layouts.
#[derive(Clone)]
pub struct TaskList {
    pub list_box: gtk4::ListBox,
    /// Window action activated with the row's task id.
    select_action: &'static str,
}

impl TaskList {
    pub fn new(select_action: &'static str) -> Self {
        let list_box = gtk4::ListBox::builder()
            .selection_mode(gtk4::SelectionMode::None)
            .build();
        list_box.add_css_class("boxed-list");

        let placeholder = gtk4::Label::new(Some(EMPTY_LIST_TEXT));
        placeholder.add_css_class("dim-label");
        placeholder.set_margin_top(24);
        placeholder.set_margin_bottom(24);
        list_box.set_placeholder(Some(&placeholder));

        Self {
            list_box,
            select_action,
        }
    }

    /// Rebuild every row.
    pub fn render(&self, rows: &[TaskRow]) {
        self.list_box.remove_all();
        for row in rows {
            self.list_box.append(&build_task_row(row, self.select_action));
        }
    }
}

fn status_css_class(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Completed => "success",
        TaskStatus::Failed => "error",
        TaskStatus::Pending | TaskStatus::Unknown => "dim-label",
        _ => "accent",
    }
}

/// Build an ActionRow for a single task.
fn build_task_row(row: &TaskRow, select_action: &str) -> libadwaita::ActionRow {
    let action_row = libadwaita::ActionRow::builder()
        .title(&row.title)
        .activatable(true)
        .build();
    action_row.set_use_markup(false);
    action_row.set_title_lines(2);
    action_row.set_action_name(Some(select_action));
    action_row.set_action_target_value(Some(&row.id.to_variant()));
    if row.selected {
        action_row.add_css_class("selected-task");
    }

    let subtitle = [row.time_text.as_deref(), row.queue_text.as_deref()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" · ");
    action_row.set_subtitle(&subtitle);

    let status_label = gtk4::Label::new(Some(row.status_text));
    status_label.add_css_class("caption");
    status_label.add_css_class(status_css_class(row.status));
    action_row.add_suffix(&status_label);

    if let Some(percent) = row.progress {
        let progress = gtk4::ProgressBar::new();
        progress.set_fraction(f64::from(percent) / 100.0);
        progress.set_valign(gtk4::Align::Center);
        progress.set_width_request(64);
        action_row.add_suffix(&progress);
    }

    let delete_btn = gtk4::Button::from_icon_name("user-trash-symbolic");
    delete_btn.set_valign(gtk4::Align::Center);
    delete_btn.set_tooltip_text(Some("删除任务"));
    delete_btn.add_css_class("flat");
    delete_btn.set_action_name(Some(DELETE_ACTION));
    delete_btn.set_action_target_value(Some(&row.id.to_variant()));
    action_row.add_suffix(&delete_btn);

    action_row
}
