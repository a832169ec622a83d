use gtk4::prelude::*;

use crate::app::{
    ContentTab, TaskDetail, ORIGINAL_PLACEHOLDER_BODY, ORIGINAL_PLACEHOLDER_TITLE, WELCOME_BODY,
    WELCOME_TITLE,
};

pub fn tab_name(tab: ContentTab) -> &'static str {
    match tab {
        ContentTab::Summary => "summary",
        ContentTab::Original => "original",
    }
}

pub fn tab_from_name(name: &str) -> Option<ContentTab> {
    match name {
        "summary" => Some(ContentTab::Summary),
        "original" => Some(ContentTab::Original),
        _ => None,
    }
}

/// Detail pane: welcome placeholder, or the selected task with a
/// summary tab and an original-text tab.
#[derive(Clone)]
pub struct DetailPane {
    pub root: gtk4::Stack,
    pub tabs: libadwaita::ViewStack,
    title_label: gtk4::Label,
    summary_stack: gtk4::Stack,
    status_label: gtk4::Label,
    progress_bar: gtk4::ProgressBar,
    error_label: gtk4::Label,
    summary_label: gtk4::Label,
    original_stack: gtk4::Stack,
    original_label: gtk4::Label,
}

impl DetailPane {
    pub fn new() -> Self {
        let root = gtk4::Stack::new();
        root.set_hexpand(true);
        root.set_vexpand(true);

        let welcome = libadwaita::StatusPage::builder()
            .icon_name("video-x-generic-symbolic")
            .title(WELCOME_TITLE)
            .description(WELCOME_BODY)
            .build();
        root.add_named(&welcome, Some("welcome"));

        // --- Task page ---
        let task_page = gtk4::Box::new(gtk4::Orientation::Vertical, 6);
        task_page.set_margin_start(16);
        task_page.set_margin_end(16);
        task_page.set_margin_top(12);
        task_page.set_margin_bottom(12);

        let title_label = gtk4::Label::new(None);
        title_label.add_css_class("title-3");
        title_label.set_wrap(true);
        title_label.set_xalign(0.0);
        task_page.append(&title_label);

        let tabs = libadwaita::ViewStack::new();
        tabs.set_vexpand(true);
        let switcher = libadwaita::ViewSwitcher::builder()
            .stack(&tabs)
            .policy(libadwaita::ViewSwitcherPolicy::Wide)
            .halign(gtk4::Align::Start)
            .build();
        task_page.append(&switcher);
        task_page.append(&tabs);

        // Summary tab: progress while running, rendered summary once done.
        let summary_stack = gtk4::Stack::new();

        let progress_box = gtk4::Box::new(gtk4::Orientation::Vertical, 8);
        progress_box.set_valign(gtk4::Align::Center);
        progress_box.set_margin_start(24);
        progress_box.set_margin_end(24);
        let status_label = gtk4::Label::new(None);
        status_label.add_css_class("heading");
        progress_box.append(&status_label);
        let progress_bar = gtk4::ProgressBar::new();
        progress_bar.set_show_text(true);
        progress_box.append(&progress_bar);
        let error_label = gtk4::Label::new(None);
        error_label.add_css_class("error");
        error_label.set_wrap(true);
        error_label.set_selectable(true);
        error_label.set_visible(false);
        progress_box.append(&error_label);
        summary_stack.add_named(&progress_box, Some("progress"));

        let summary_label = text_label();
        summary_stack.add_named(&scrolled(&summary_label), Some("content"));
        tabs.add_titled_with_icon(
            &summary_stack,
            Some(tab_name(ContentTab::Summary)),
            "总结",
            "view-list-bullet-symbolic",
        );

        // Original tab: placeholder until the transcript exists.
        let original_stack = gtk4::Stack::new();
        let placeholder = libadwaita::StatusPage::builder()
            .icon_name("text-x-generic-symbolic")
            .title(ORIGINAL_PLACEHOLDER_TITLE)
            .description(ORIGINAL_PLACEHOLDER_BODY)
            .build();
        original_stack.add_named(&placeholder, Some("placeholder"));
        let original_label = text_label();
        original_stack.add_named(&scrolled(&original_label), Some("text"));
        tabs.add_titled_with_icon(
            &original_stack,
            Some(tab_name(ContentTab::Original)),
            "原文",
            "document-open-symbolic",
        );

        root.add_named(&task_page, Some("task"));
        root.set_visible_child_name("welcome");

        Self {
            root,
            tabs,
            title_label,
            summary_stack,
            status_label,
            progress_bar,
            error_label,
            summary_label,
            original_stack,
            original_label,
        }
    }

    pub fn render(&self, detail: &TaskDetail) {
        match detail {
            TaskDetail::Welcome => self.root.set_visible_child_name("welcome"),
            TaskDetail::Progress {
                title,
                status_text,
                percent,
                error,
                ..
            } => {
                self.title_label.set_text(title);
                self.status_label.set_text(status_text);
                self.progress_bar.set_fraction(f64::from(*percent) / 100.0);
                self.progress_bar.set_text(Some(&format!("{percent}%")));
                match error {
                    Some(message) => {
                        self.error_label.set_text(message);
                        self.error_label.set_visible(true);
                    }
                    None => self.error_label.set_visible(false),
                }
                self.summary_stack.set_visible_child_name("progress");
                self.original_stack.set_visible_child_name("placeholder");
                self.root.set_visible_child_name("task");
            }
            TaskDetail::Content {
                title,
                summary_markup,
                original_text,
            } => {
                self.title_label.set_text(title);
                self.summary_label.set_markup(summary_markup);
                self.original_label.set_text(original_text);
                self.summary_stack.set_visible_child_name("content");
                self.original_stack.set_visible_child_name("text");
                self.root.set_visible_child_name("task");
            }
        }
    }

    pub fn show_tab(&self, tab: ContentTab) {
        self.tabs.set_visible_child_name(tab_name(tab));
    }
}

fn text_label() -> gtk4::Label {
    let label = gtk4::Label::new(None);
    label.set_wrap(true);
    label.set_wrap_mode(gtk4::pango::WrapMode::WordChar);
    label.set_xalign(0.0);
    label.set_yalign(0.0);
    label.set_selectable(true);
    label.set_margin_top(8);
    label.set_margin_bottom(8);
    label.set_margin_start(4);
    label.set_margin_end(4);
    label
}

fn scrolled(child: &impl IsA<gtk4::Widget>) -> gtk4::ScrolledWindow {
    gtk4::ScrolledWindow::builder()
        .hscrollbar_policy(gtk4::PolicyType::Never)
        .vexpand(true)
        .child(child)
        .build()
}
