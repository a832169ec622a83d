use gtk4::prelude::*;

use crate::app::{ContentTab, MobilePage, TaskDetail, TaskRow, TaskView, NO_FILE_TEXT};

use super::detail::DetailPane;
use super::task_list::TaskList;

pub const SELECT_ACTION: &str = "win.select-mobile";

/// Compact layout: add / tasks / summary pages behind a bottom switcher.
#[derive(Clone)]
pub struct MobileView {
    pub root: gtk4::Box,
    pub pages: libadwaita::ViewStack,
    pub url_entry: gtk4::Entry,
    pub submit_button: gtk4::Button,
    pub clipboard_button: gtk4::Button,
    pub file_button: gtk4::Button,
    file_label: gtk4::Label,
    list: TaskList,
    pub detail: DetailPane,
}

impl MobileView {
    pub fn new() -> Self {
        let pages = libadwaita::ViewStack::new();
        pages.set_vexpand(true);

        // --- Add page ---
        let add_page = gtk4::Box::new(gtk4::Orientation::Vertical, 10);
        add_page.set_margin_start(16);
        add_page.set_margin_end(16);
        add_page.set_margin_top(16);
        add_page.set_margin_bottom(16);

        let url_entry = gtk4::Entry::builder()
            .placeholder_text("输入视频链接")
            .build();
        add_page.append(&url_entry);

        let submit_button = gtk4::Button::builder().label("开始分析").build();
        submit_button.add_css_class("suggested-action");
        submit_button.add_css_class("pill");
        add_page.append(&submit_button);

        let clipboard_button = gtk4::Button::builder()
            .child(
                &libadwaita::ButtonContent::builder()
                    .label("从剪切板导入")
                    .icon_name("edit-paste-symbolic")
                    .build(),
            )
            .build();
        clipboard_button.add_css_class("pill");
        add_page.append(&clipboard_button);

        add_page.append(&gtk4::Separator::new(gtk4::Orientation::Horizontal));

        let file_button = gtk4::Button::builder().label("上传文件").build();
        file_button.add_css_class("pill");
        add_page.append(&file_button);
        let file_label = gtk4::Label::new(Some(NO_FILE_TEXT));
        file_label.add_css_class("dim-label");
        file_label.set_ellipsize(gtk4::pango::EllipsizeMode::Middle);
        add_page.append(&file_label);

        pages.add_titled_with_icon(
            &add_page,
            Some(MobilePage::Add.name()),
            "添加",
            "list-add-symbolic",
        );

        // --- Tasks page ---
        let list = TaskList::new(SELECT_ACTION);
        list.list_box.set_margin_start(12);
        list.list_box.set_margin_end(12);
        list.list_box.set_margin_top(12);
        list.list_box.set_margin_bottom(12);
        let scrolled = gtk4::ScrolledWindow::builder()
            .hscrollbar_policy(gtk4::PolicyType::Never)
            .child(&list.list_box)
            .build();
        pages.add_titled_with_icon(
            &scrolled,
            Some(MobilePage::Tasks.name()),
            "任务",
            "view-list-symbolic",
        );

        // --- Summary page ---
        let detail = DetailPane::new();
        pages.add_titled_with_icon(
            &detail.root,
            Some(MobilePage::Summary.name()),
            "总结",
            "document-properties-symbolic",
        );

        let switcher_bar = libadwaita::ViewSwitcherBar::builder()
            .stack(&pages)
            .reveal(true)
            .build();

        let root = gtk4::Box::new(gtk4::Orientation::Vertical, 0);
        root.append(&pages);
        root.append(&switcher_bar);

        Self {
            root,
            pages,
            url_entry,
            submit_button,
            clipboard_button,
            file_button,
            file_label,
            list,
            detail,
        }
    }
}

impl TaskView for MobileView {
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

    fn show_page(&self, page: MobilePage) {
        self.pages.set_visible_child_name(page.name());
    }
}
