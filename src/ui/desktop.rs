use gtk4::prelude::*;

use crate::app::{ContentTab, TaskDetail, TaskRow, TaskView, NO_FILE_TEXT};

use super::detail::DetailPane;
use super::task_list::TaskList;

pub const SELECT_ACTION: &str = "win.select-desktop";

/// Wide layout: input and task list on the left, detail pane on the right.
#[derive(Clone)]
pub struct DesktopView {
    pub root: gtk4::Paned,
    pub url_entry: gtk4::Entry,
    pub submit_button: gtk4::Button,
    pub file_button: gtk4::Button,
    file_label: gtk4::Label,
    list: TaskList,
    pub detail: DetailPane,
}

impl DesktopView {
    pub fn new() -> Self {
        let sidebar = gtk4::Box::new(gtk4::Orientation::Vertical, 8);
        sidebar.set_margin_start(12);
        sidebar.set_margin_end(12);
        sidebar.set_margin_top(12);
        sidebar.set_margin_bottom(12);

        // --- URL input ---
        let url_row = gtk4::Box::new(gtk4::Orientation::Horizontal, 6);
        let url_entry = gtk4::Entry::builder()
            .placeholder_text("输入视频链接")
            .hexpand(true)
            .build();
        let submit_button = gtk4::Button::builder().label("开始分析").build();
        submit_button.add_css_class("suggested-action");
        url_row.append(&url_entry);
        url_row.append(&submit_button);
        sidebar.append(&url_row);

        // --- File upload ---
        let file_row = gtk4::Box::new(gtk4::Orientation::Horizontal, 6);
        let file_button = gtk4::Button::builder()
            .child(
                &libadwaita::ButtonContent::builder()
                    .label("上传文件")
                    .icon_name("document-send-symbolic")
                    .build(),
            )
            .build();
        let file_label = gtk4::Label::new(Some(NO_FILE_TEXT));
        file_label.add_css_class("dim-label");
        file_label.set_ellipsize(gtk4::pango::EllipsizeMode::Middle);
        file_label.set_xalign(0.0);
        file_label.set_hexpand(true);
        file_row.append(&file_button);
        file_row.append(&file_label);
        sidebar.append(&file_row);

        // --- Task list ---
        let heading = gtk4::Label::new(Some("任务列表"));
        heading.add_css_class("heading");
        heading.set_xalign(0.0);
        heading.set_margin_top(8);
        sidebar.append(&heading);

        let list = TaskList::new(SELECT_ACTION);
        let scrolled = gtk4::ScrolledWindow::builder()
            .hscrollbar_policy(gtk4::PolicyType::Never)
            .vexpand(true)
            .child(&list.list_box)
            .build();
        sidebar.append(&scrolled);

        let detail = DetailPane::new();

        let root = gtk4::Paned::builder()
            .orientation(gtk4::Orientation::Horizontal)
            .start_child(&sidebar)
            .end_child(&detail.root)
            .resize_start_child(false)
            .shrink_start_child(false)
            .position(380)
            .build();

        Self {
            root,
            url_entry,
            submit_button,
            file_button,
            file_label,
            list,
            detail,
        }
    }
}

impl TaskView for DesktopView {
    fn input_text(&self) -> String {
        self.url_entry.text().to_string()
    }

    fn set_input_text(&self, text: &str) {
        self.url_entry.set_text(text);
    }

    fn render_list(&self, rows: &[TaskRow]) {
        self.list.render(rows);
    }

    fn render_detail(&self, detail: &TaskDetail) {
        self.detail.render(detail);
    }

    fn set_file_label(&self, name: Option<&str>) {
        self.file_label.set_text(name.unwrap_or(NO_FILE_TEXT));
    }

    fn show_tab(&self, tab: ContentTab) {
        self.detail.show_tab(tab);
    }
}
