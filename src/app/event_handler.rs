use crate::api::{Backend, Settings, TaskId, TaskSnapshot};
use crate::error::ClientError;

use super::controller::{Controller, AFTER_SUBMIT_PAGE_DELAY};
use super::display::model_status_text;
use super::reconcile::apply_snapshot;
use super::state::{BackendEvent, MobilePage, Notice, Submission, ViewKind};
use super::validate::is_valid_url;

const DELETED: &str = "任务删除成功";
const DELETE_FAILED: &str = "删除任务失败";
const SETTINGS_SAVED: &str = "设置保存成功";
const SETTINGS_SAVE_FAILED: &str = "设置保存失败";
const RELOAD_MODEL_HINT: &str = "Whisper设置已更改，建议重新加载模型以应用新设置";
const CLIPBOARD_EMPTY: &str = "剪切板为空或无有效内容";
const CLIPBOARD_NOT_URL: &str = "剪切板内容不是有效的视频链接";

impl<B: Backend> Controller<B> {
    /// Apply a backend event. This is the core state machine; it only ever
    /// runs on the UI thread.
    pub fn handle_backend_event(&mut self, event: BackendEvent) {
        match event {
            BackendEvent::TasksLoaded(Ok(snapshot)) => self.on_tasks_loaded(snapshot),
            BackendEvent::TasksLoaded(Err(e)) => {
                log::warn!("Failed to load tasks, keeping cached list: {e}");
            }
            BackendEvent::TaskCreated { submission, result } => {
                self.end_request();
                match result {
                    Ok(created) => {
                        log::info!("Task {} queued ({})", created.id, created.title);
                        self.on_task_created(submission);
                    }
                    Err(e) => {
                        self.notify(Notice::error(e.user_message(submission.failure_message())))
                    }
                }
            }
            BackendEvent::TaskDeleted { id, result } => match result {
                Ok(()) => self.on_task_deleted(id),
                Err(e) => self.notify(Notice::error(e.fixed_message(DELETE_FAILED))),
            },
            BackendEvent::SettingsLoaded(result) => self.on_settings_loaded(result),
            BackendEvent::SettingsSaved { settings, result } => {
                self.end_request();
                match result {
                    Ok(()) => {
                        let model_changed = self
                            .state
                            .settings
                            .as_ref()
                            .is_some_and(|old| old.model_selection_differs(&settings));
                        self.state.settings = Some(settings);
                        self.notify(Notice::success(SETTINGS_SAVED));
                        if model_changed {
                            self.notify(Notice::info(RELOAD_MODEL_HINT));
                        }
                        self.views.settings.close();
                    }
                    Err(e) => self.notify(Notice::error(e.fixed_message(SETTINGS_SAVE_FAILED))),
                }
            }
            BackendEvent::ModelManaged { action, result } => {
                self.end_request();
                match result {
                    Ok(()) => {
                        self.notify(Notice::success(action.success_message()));
                        self.update_model_status();
                    }
                    Err(e) => self.notify(Notice::error(e.user_message(action.failure_message()))),
                }
            }
            BackendEvent::ModelStatusLoaded(Ok(status)) => {
                let text = model_status_text(&status, self.state.auto_load_model());
                self.views.settings.show_model_status(&text);
                self.state.model_status_text = Some(text);
            }
            BackendEvent::ModelStatusLoaded(Err(e)) => {
                log::warn!("Failed to get model status: {e}");
            }
            BackendEvent::ClipboardRead(Ok(text)) => self.on_clipboard_text(&text),
            BackendEvent::ClipboardRead(Err(e)) => {
                log::warn!("{e}");
                self.notify(Notice::error(e.user_message()));
            }
            BackendEvent::ShowMobilePage(page) => self.switch_mobile_page(page),
        }
    }

    fn on_tasks_loaded(&mut self, snapshot: TaskSnapshot) {
        let outcome = apply_snapshot(&mut self.state, snapshot);
        let layout = self.state.layout;

        if layout == ViewKind::Desktop || self.state.selection.mobile_page == MobilePage::Tasks {
            self.render_list(layout);
        }
        if outcome.selection_cleared || outcome.selected_changed {
            self.render_detail(layout);
        }
    }

    fn on_task_created(&mut self, submission: Submission) {
        match submission {
            Submission::Url(kind) => self.view(kind).set_input_text(""),
            Submission::File(kind) => self.view(kind).set_file_label(None),
            Submission::Clipboard => self.view(ViewKind::Mobile).set_input_text(""),
        }
        self.notify(Notice::success(submission.success_message()));
        self.refresh();

        if submission.view() == ViewKind::Mobile {
            self.schedule_mobile_page(MobilePage::Tasks, AFTER_SUBMIT_PAGE_DELAY);
        }
    }

    fn on_task_deleted(&mut self, id: TaskId) {
        self.notify(Notice::success(DELETED));
        if self.state.selection.current_task == Some(id) {
            self.state.selection.current_task = None;
            self.render_detail(ViewKind::Desktop);
            self.render_detail(ViewKind::Mobile);
        }
        self.refresh();
    }

    fn on_settings_loaded(&mut self, result: Result<Settings, ClientError>) {
        match result {
            Ok(settings) => {
                self.views.settings.fill(&settings);
                self.state.settings = Some(settings);
            }
            Err(e) => {
                log::warn!("Failed to load settings: {e}");
                self.views.settings.fill(&Settings::default());
            }
        }
    }

    fn on_clipboard_text(&mut self, text: &str) {
        let url = text.trim();
        if url.is_empty() {
            self.notify(Notice::error(CLIPBOARD_EMPTY));
            return;
        }
        if !is_valid_url(url) {
            self.notify(Notice::error(CLIPBOARD_NOT_URL));
            return;
        }
        self.view(ViewKind::Mobile).set_input_text(url);
        self.create_url_task(Submission::Clipboard, url.to_string());
    }
}
