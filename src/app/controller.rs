use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::runtime::Handle;

use crate::api::{self, Backend, FileUpload, ModelAction, Settings, TaskId};
use crate::markdown::{MarkdownRenderer, PangoMarkdown};

use super::poller::{PollState, Poller};
use super::state::{
    BackendEvent, ClientState, ContentTab, Layout, MobilePage, Notice, NoticeKind, Submission,
    ViewKind,
};
use super::validate::validate_url_input;
use super::view::{task_rows, SettingsForm, Shell, TaskDetail, TaskView};

/// Delay before the compact layout jumps to the task list after a submit.
pub const AFTER_SUBMIT_PAGE_DELAY: Duration = Duration::from_millis(1000);
/// Delay before the compact layout jumps to the detail page after a select.
pub const AFTER_SELECT_PAGE_DELAY: Duration = Duration::from_millis(500);

/// The presentation adapters the controller drives.
pub struct Views {
    pub desktop: Box<dyn TaskView>,
    pub mobile: Box<dyn TaskView>,
    pub shell: Box<dyn Shell>,
    pub settings: Box<dyn SettingsForm>,
}

/// Owns client state and turns user actions into backend requests.
///
/// Lives on the UI thread. Requests run on the tokio runtime and report
/// back through `sender` as `BackendEvent`s, which `handle_backend_event`
/// applies.
pub struct Controller<B: Backend> {
    pub state: ClientState,
    pub(super) backend: Arc<B>,
    pub(super) runtime: Handle,
    pub(super) sender: async_channel::Sender<BackendEvent>,
    pub(super) views: Views,
    pub(super) markdown: Option<Box<dyn MarkdownRenderer>>,
    poller: Option<Poller>,
    poll_interval: Duration,
}

impl<B: Backend> Controller<B> {
    pub fn new(
        backend: Arc<B>,
        runtime: Handle,
        sender: async_channel::Sender<BackendEvent>,
        views: Views,
        poll_interval: Duration,
    ) -> Self {
        Self {
            state: ClientState::default(),
            backend,
            runtime,
            sender,
            views,
            markdown: Some(Box::new(PangoMarkdown)),
            poller: None,
            poll_interval,
        }
    }

    /// Replace the markdown renderer; `None` shows summaries as plain text.
    pub fn with_markdown(mut self, renderer: Option<Box<dyn MarkdownRenderer>>) -> Self {
        self.markdown = renderer;
        self
    }

    /// Startup: settings once, tasks now, then the periodic poll.
    pub fn start(&mut self) {
        log::info!("Starting client controller");
        self.load_settings();
        self.refresh();
        self.start_polling();
    }

    // ---- requests -------------------------------------------------------

    /// Run `request` on the tokio runtime and deliver its event to the UI thread.
    pub(super) fn dispatch<Fut>(&self, request: Fut)
    where
        Fut: Future<Output = BackendEvent> + Send + 'static,
    {
        let sender = self.sender.clone();
        self.runtime.spawn(async move {
            let event = request.await;
            if sender.send(event).await.is_err() {
                log::debug!("UI event channel closed; dropping backend event");
            }
        });
    }

    /// Mutating requests show the loading indicator until their event lands.
    pub(super) fn begin_request(&mut self) {
        self.state.pending_requests += 1;
        if self.state.pending_requests == 1 {
            self.views.shell.set_loading(true);
        }
    }

    pub(super) fn end_request(&mut self) {
        self.state.pending_requests = self.state.pending_requests.saturating_sub(1);
        if self.state.pending_requests == 0 {
            self.views.shell.set_loading(false);
        }
    }

    pub(super) fn notify(&self, notice: Notice) {
        match notice.kind {
            NoticeKind::Error => log::warn!("{}", notice.message),
            _ => log::info!("{}", notice.message),
        }
        self.views.shell.notify(&notice);
    }

    /// Fetch the task list and queue snapshot. Used by the poll and after
    /// every create/delete; the cache is replaced by whichever lands last.
    pub fn refresh(&self) {
        let backend = self.backend.clone();
        self.dispatch(async move {
            BackendEvent::TasksLoaded(api::fetch_snapshot(backend.as_ref()).await)
        });
    }

    // ---- polling --------------------------------------------------------

    pub fn start_polling(&mut self) {
        if self.poller.is_none() {
            let backend = self.backend.clone();
            let sender = self.sender.clone();
            let poller = Poller::spawn(&self.runtime, self.poll_interval, move || {
                let backend = backend.clone();
                let sender = sender.clone();
                async move {
                    let result = api::fetch_snapshot(backend.as_ref()).await;
                    if sender.send(BackendEvent::TasksLoaded(result)).await.is_err() {
                        log::debug!("UI event channel closed; dropping poll result");
                    }
                }
            });
            self.poller = Some(poller);
        }
        if let Some(poller) = self.poller.as_mut() {
            poller.start();
        }
    }

    pub fn stop_polling(&mut self) {
        if let Some(poller) = self.poller.as_mut() {
            poller.stop();
        }
    }

    /// Window shown/hidden.
    pub fn set_visible(&mut self, visible: bool) {
        if let Some(poller) = self.poller.as_mut() {
            poller.set_visible(visible);
        }
    }

    /// Window closing. Polling ends for good.
    pub fn shutdown(&mut self) {
        if let Some(poller) = self.poller.as_mut() {
            poller.shutdown();
        }
    }

    pub fn poll_state(&self) -> PollState {
        self.poller
            .as_ref()
            .map(Poller::state)
            .unwrap_or(PollState::Stopped)
    }

    // ---- task creation --------------------------------------------------

    /// Submit the URL typed into `kind`'s entry.
    pub fn submit_url(&mut self, kind: ViewKind) {
        let raw = self.view(kind).input_text();
        match validate_url_input(&raw) {
            Ok(url) => self.create_url_task(Submission::Url(kind), url),
            Err(e) => self.notify(Notice::error(e.user_message())),
        }
    }

    pub(super) fn create_url_task(&mut self, submission: Submission, url: String) {
        self.begin_request();
        let backend = self.backend.clone();
        self.dispatch(async move {
            let result = backend.create_url_task(&url).await;
            BackendEvent::TaskCreated { submission, result }
        });
    }

    /// Upload a picked file. `None` means the picker was dismissed.
    pub fn submit_file(&mut self, kind: ViewKind, path: Option<PathBuf>) {
        let Some(path) = path else {
            return;
        };
        let upload = FileUpload::new(path);
        self.view(kind).set_file_label(Some(&upload.file_name()));

        self.begin_request();
        let backend = self.backend.clone();
        self.dispatch(async move {
            let result = backend.create_file_task(&upload).await;
            BackendEvent::TaskCreated {
                submission: Submission::File(kind),
                result,
            }
        });
    }

    /// Read the clipboard; a valid URL there is submitted directly.
    pub fn import_from_clipboard(&self) {
        self.dispatch(async {
            BackendEvent::ClipboardRead(crate::clipboard::read_from_clipboard().await)
        });
    }

    // ---- selection and navigation ---------------------------------------

    /// Select a task. Ids that are no longer cached are ignored.
    pub fn select_task(&mut self, kind: ViewKind, id: TaskId) {
        if self.state.task(id).is_none() {
            log::debug!("Ignoring selection of vanished task {id}");
            return;
        }
        self.state.selection.current_task = Some(id);
        self.render_list(kind);
        self.render_detail(kind);

        if kind == ViewKind::Mobile {
            self.schedule_mobile_page(MobilePage::Summary, AFTER_SELECT_PAGE_DELAY);
        }
    }

    pub fn switch_tab(&mut self, kind: ViewKind, tab: ContentTab) {
        match kind {
            ViewKind::Desktop => self.state.selection.tab = tab,
            ViewKind::Mobile => self.state.selection.mobile_tab = tab,
        }
        self.view(kind).show_tab(tab);
    }

    /// Bottom navigation of the compact layout. No-op on the wide layout.
    pub fn switch_mobile_page(&mut self, page: MobilePage) {
        if self.state.layout != ViewKind::Mobile {
            return;
        }
        self.state.selection.mobile_page = page;
        self.views.mobile.show_page(page);
        match page {
            MobilePage::Tasks => self.render_list(ViewKind::Mobile),
            MobilePage::Summary if self.state.selection.current_task.is_some() => {
                self.render_detail(ViewKind::Mobile)
            }
            _ => {}
        }
    }

    pub(super) fn schedule_mobile_page(&self, page: MobilePage, delay: Duration) {
        self.dispatch(async move {
            tokio::time::sleep(delay).await;
            BackendEvent::ShowMobilePage(page)
        });
    }

    /// The window crossed the compact breakpoint.
    pub fn set_layout(&mut self, layout: Layout) {
        if self.state.layout == layout {
            return;
        }
        log::debug!("Layout -> {layout:?}");
        self.state.layout = layout;
        self.render_list(layout);
        self.render_detail(layout);
        match layout {
            ViewKind::Desktop => self.views.desktop.show_tab(self.state.selection.tab),
            ViewKind::Mobile => {
                self.views.mobile.show_tab(self.state.selection.mobile_tab);
                self.views.mobile.show_page(self.state.selection.mobile_page);
            }
        }
    }

    // ---- deletion -------------------------------------------------------

    pub fn delete_task(&self, id: TaskId) {
        let backend = self.backend.clone();
        self.dispatch(async move {
            let result = backend.delete_task(id).await;
            BackendEvent::TaskDeleted { id, result }
        });
    }

    // ---- settings and model ---------------------------------------------

    pub fn load_settings(&self) {
        let backend = self.backend.clone();
        self.dispatch(async move { BackendEvent::SettingsLoaded(backend.fetch_settings().await) });
    }

    /// The settings dialog was opened.
    pub fn open_settings(&self) {
        let settings = self.state.settings.clone().unwrap_or_default();
        self.views.settings.fill(&settings);
        self.update_model_status();
    }

    pub fn close_settings(&self) {
        self.views.settings.close();
    }

    /// Push the whole form to the backend. Never reloads the model itself.
    pub fn save_settings(&mut self) {
        let settings: Settings = self.views.settings.read();
        self.begin_request();
        let backend = self.backend.clone();
        self.dispatch(async move {
            let result = backend.update_settings(&settings).await;
            BackendEvent::SettingsSaved { settings, result }
        });
    }

    pub fn manage_model(&mut self, action: ModelAction) {
        self.begin_request();
        let backend = self.backend.clone();
        self.dispatch(async move {
            let result = backend.manage_model(action).await;
            BackendEvent::ModelManaged { action, result }
        });
    }

    pub fn update_model_status(&self) {
        let backend = self.backend.clone();
        self.dispatch(async move { BackendEvent::ModelStatusLoaded(backend.model_status().await) });
    }

    // ---- rendering ------------------------------------------------------

    pub(super) fn view(&self, kind: ViewKind) -> &dyn TaskView {
        match kind {
            ViewKind::Desktop => self.views.desktop.as_ref(),
            ViewKind::Mobile => self.views.mobile.as_ref(),
        }
    }

    pub(super) fn render_list(&self, kind: ViewKind) {
        let rows = task_rows(
            &self.state.tasks,
            self.state.selection.current_task,
            Utc::now(),
        );
        self.view(kind).render_list(&rows);
    }

    pub(super) fn render_detail(&self, kind: ViewKind) {
        let detail = match self.state.selected_task() {
            Some(task) => TaskDetail::for_task(task, self.markdown.as_deref()),
            None => TaskDetail::Welcome,
        };
        self.view(kind).render_detail(&detail);
    }
}
