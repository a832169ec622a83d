use gtk4::prelude::*;
use libadwaita::prelude::*;

use crate::api::{Settings, DEFAULT_WHISPER_DEVICE, WHISPER_DEVICES};
use crate::app::SettingsForm;

/// Handles for the settings dialog. The dialog is built once and presented
/// again on every open; Escape closes it.
#[derive(Clone)]
pub struct SettingsDialog {
    pub dialog: libadwaita::PreferencesDialog,
    parent: libadwaita::ApplicationWindow,
    api_key_row: libadwaita::PasswordEntryRow,
    base_url_row: libadwaita::EntryRow,
    model_row: libadwaita::EntryRow,
    whisper_model_row: libadwaita::EntryRow,
    device_row: libadwaita::ComboRow,
    auto_load_row: libadwaita::SwitchRow,
    summary_prompt: gtk4::TextView,
    url_summary_prompt: gtk4::TextView,
    model_status_row: libadwaita::ActionRow,
    pub load_model_button: gtk4::Button,
    pub unload_model_button: gtk4::Button,
    pub save_button: gtk4::Button,
}

impl SettingsDialog {
    pub fn new(parent: &libadwaita::ApplicationWindow) -> Self {
        let dialog = libadwaita::PreferencesDialog::builder()
            .title("设置")
            .search_enabled(false)
            .build();
        let page = libadwaita::PreferencesPage::new();

        // --- OpenAI group ---
        let openai_group = libadwaita::PreferencesGroup::new();
        openai_group.set_title("OpenAI");

        let api_key_row = libadwaita::PasswordEntryRow::builder()
            .title("API Key")
            .build();
        openai_group.add(&api_key_row);

        let base_url_row = libadwaita::EntryRow::builder().title("Base URL").build();
        openai_group.add(&base_url_row);

        let model_row = libadwaita::EntryRow::builder().title("模型").build();
        openai_group.add(&model_row);
        page.add(&openai_group);

        // --- Whisper group ---
        let whisper_group = libadwaita::PreferencesGroup::new();
        whisper_group.set_title("Whisper");

        let whisper_model_row = libadwaita::EntryRow::builder().title("模型").build();
        whisper_group.add(&whisper_model_row);

        let device_labels: Vec<&str> = WHISPER_DEVICES.iter().map(|(_, label)| *label).collect();
        let device_row = libadwaita::ComboRow::builder()
            .title("运行设备")
            .model(&gtk4::StringList::new(&device_labels))
            .build();
        whisper_group.add(&device_row);

        let auto_load_row = libadwaita::SwitchRow::builder()
            .title("动态加载模型")
            .subtitle("有任务时自动加载，空闲时卸载")
            .build();
        whisper_group.add(&auto_load_row);

        let model_status_row = libadwaita::ActionRow::builder()
            .title("模型状态")
            .subtitle("…")
            .build();
        let load_model_button = gtk4::Button::builder()
            .label("加载")
            .valign(gtk4::Align::Center)
            .build();
        let unload_model_button = gtk4::Button::builder()
            .label("卸载")
            .valign(gtk4::Align::Center)
            .build();
        unload_model_button.add_css_class("destructive-action");
        model_status_row.add_suffix(&load_model_button);
        model_status_row.add_suffix(&unload_model_button);
        whisper_group.add(&model_status_row);
        page.add(&whisper_group);

        // --- Prompt group ---
        let prompt_group = libadwaita::PreferencesGroup::new();
        prompt_group.set_title("总结提示词");
        let summary_prompt = prompt_view();
        prompt_group.add(&prompt_frame("文件任务", &summary_prompt));
        let url_summary_prompt = prompt_view();
        prompt_group.add(&prompt_frame("链接任务（{title} 为视频标题）", &url_summary_prompt));
        page.add(&prompt_group);

        // --- Save ---
        let save_group = libadwaita::PreferencesGroup::new();
        let save_button = gtk4::Button::builder()
            .label("保存设置")
            .halign(gtk4::Align::Center)
            .build();
        save_button.add_css_class("suggested-action");
        save_button.add_css_class("pill");
        save_group.add(&save_button);
        page.add(&save_group);

        dialog.add(&page);

        Self {
            dialog,
            parent: parent.clone(),
            api_key_row,
            base_url_row,
            model_row,
            whisper_model_row,
            device_row,
            auto_load_row,
            summary_prompt,
            url_summary_prompt,
            model_status_row,
            load_model_button,
            unload_model_button,
            save_button,
        }
    }

    pub fn present(&self) {
        self.dialog.present(Some(&self.parent));
    }
}

impl SettingsForm for SettingsDialog {
    fn fill(&self, settings: &Settings) {
        self.api_key_row.set_text(&settings.openai_api_key);
        self.base_url_row.set_text(&settings.openai_base_url);
        self.model_row.set_text(&settings.openai_model);
        self.whisper_model_row.set_text(&settings.whisper_model);
        let device = WHISPER_DEVICES
            .iter()
            .position(|(value, _)| *value == settings.whisper_device)
            .unwrap_or(0);
        self.device_row.set_selected(device as u32);
        self.auto_load_row.set_active(settings.auto_load_model);
        self.summary_prompt.buffer().set_text(&settings.summary_prompt);
        self.url_summary_prompt
            .buffer()
            .set_text(&settings.url_summary_prompt);
    }

    fn read(&self) -> Settings {
        let whisper_device = WHISPER_DEVICES
            .get(self.device_row.selected() as usize)
            .map(|(value, _)| *value)
            .unwrap_or(DEFAULT_WHISPER_DEVICE);
        Settings {
            openai_api_key: self.api_key_row.text().to_string(),
            openai_base_url: self.base_url_row.text().trim().to_string(),
            openai_model: self.model_row.text().trim().to_string(),
            whisper_model: self.whisper_model_row.text().trim().to_string(),
            whisper_device: whisper_device.to_string(),
            auto_load_model: self.auto_load_row.is_active(),
            summary_prompt: buffer_text(&self.summary_prompt),
            url_summary_prompt: buffer_text(&self.url_summary_prompt),
        }
    }

    fn close(&self) {
        self.dialog.close();
    }

    fn show_model_status(&self, text: &str) {
        self.model_status_row.set_subtitle(text);
    }
}

fn prompt_view() -> gtk4::TextView {
    let view = gtk4::TextView::builder()
        .wrap_mode(gtk4::WrapMode::WordChar)
        .top_margin(8)
        .bottom_margin(8)
        .left_margin(8)
        .right_margin(8)
        .build();
    view.set_size_request(-1, 80);
    view
}

fn prompt_frame(title: &str, view: &gtk4::TextView) -> gtk4::Box {
    let container = gtk4::Box::new(gtk4::Orientation::Vertical, 4);
    container.set_margin_top(6);
    let label = gtk4::Label::new(Some(title));
    label.add_css_class("caption");
    label.add_css_class("dim-label");
    label.set_xalign(0.0);
    container.append(&label);
    let frame = gtk4::Frame::new(None);
    frame.set_child(Some(view));
    container.append(&frame);
    container
}

fn buffer_text(view: &gtk4::TextView) -> String {
    let buffer = view.buffer();
    let (start, end) = buffer.bounds();
    buffer.text(&start, &end, false).to_string()
}
