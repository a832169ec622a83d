//! In-memory backend and recording adapters for controller tests.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::api::{
    Backend, CreatedTask, FileUpload, ModelAction, ModelStatus, QueueStatus, Settings, Task,
    TaskId,
};
use crate::error::ClientError;

use super::controller::{Controller, Views};
use super::state::{BackendEvent, ContentTab, MobilePage, Notice};
use super::view::{SettingsForm, Shell, TaskDetail, TaskRow, TaskView};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ListTasks,
    QueueStatus,
    CreateUrl(String),
    CreateFile(String),
    Delete(TaskId),
    FetchSettings,
    UpdateSettings(Settings),
    ManageModel(ModelAction),
    ModelStatus,
}

#[derive(Default)]
pub struct FakeBackend {
    pub calls: Mutex<Vec<Call>>,
    pub tasks: Mutex<Vec<Task>>,
    pub list_error: Mutex<Option<ClientError>>,
    pub create_error: Mutex<Option<ClientError>>,
    pub delete_error: Mutex<Option<ClientError>>,
    pub update_error: Mutex<Option<ClientError>>,
    pub settings: Mutex<Settings>,
    pub model_status: Mutex<ModelStatus>,
}

impl FakeBackend {
    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn set_tasks(&self, tasks: Vec<Task>) {
        *self.tasks.lock().unwrap() = tasks;
    }

    fn created(&self, title: &str) -> Result<CreatedTask, ClientError> {
        let error = self.create_error.lock().unwrap().clone();
        match error {
            Some(e) => Err(e),
            None => Ok(CreatedTask {
                id: 99,
                title: title.to_string(),
                queue_position: Some(1),
                is_processing: false,
            }),
        }
    }
}

impl Backend for FakeBackend {
    async fn list_tasks(&self) -> Result<Vec<Task>, ClientError> {
        self.record(Call::ListTasks);
        let error = self.list_error.lock().unwrap().clone();
        match error {
            Some(e) => Err(e),
            None => Ok(self.tasks.lock().unwrap().clone()),
        }
    }

    async fn queue_status(&self) -> Result<QueueStatus, ClientError> {
        self.record(Call::QueueStatus);
        Ok(QueueStatus::default())
    }

    async fn create_url_task(&self, url: &str) -> Result<CreatedTask, ClientError> {
        self.record(Call::CreateUrl(url.to_string()));
        self.created(url)
    }

    async fn create_file_task(&self, upload: &FileUpload) -> Result<CreatedTask, ClientError> {
        let name = upload.file_name();
        self.record(Call::CreateFile(name.clone()));
        self.created(&name)
    }

    async fn delete_task(&self, id: TaskId) -> Result<(), ClientError> {
        self.record(Call::Delete(id));
        let error = self.delete_error.lock().unwrap().clone();
        match error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    async fn fetch_settings(&self) -> Result<Settings, ClientError> {
        self.record(Call::FetchSettings);
        Ok(self.settings.lock().unwrap().clone())
    }

    async fn update_settings(&self, settings: &Settings) -> Result<(), ClientError> {
        self.record(Call::UpdateSettings(settings.clone()));
        let error = self.update_error.lock().unwrap().clone();
        match error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    async fn manage_model(&self, action: ModelAction) -> Result<(), ClientError> {
        self.record(Call::ManageModel(action));
        Ok(())
    }

    async fn model_status(&self) -> Result<ModelStatus, ClientError> {
        self.record(Call::ModelStatus);
        Ok(self.model_status.lock().unwrap().clone())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewCall {
    SetInput(String),
    List(Vec<TaskRow>),
    Detail(TaskDetail),
    FileLabel(Option<String>),
    Tab(ContentTab),
    Page(MobilePage),
}

#[derive(Clone, Default)]
pub struct RecordingView {
    pub input: Rc<RefCell<String>>,
    pub calls: Rc<RefCell<Vec<ViewCall>>>,
}

impl RecordingView {
    pub fn type_text(&self, text: &str) {
        *self.input.borrow_mut() = text.to_string();
    }

    pub fn entry(&self) -> String {
        self.input.borrow().clone()
    }

    pub fn calls(&self) -> Vec<ViewCall> {
        self.calls.borrow().clone()
    }

    pub fn last_detail(&self) -> Option<TaskDetail> {
        self.calls.borrow().iter().rev().find_map(|c| match c {
            ViewCall::Detail(d) => Some(d.clone()),
            _ => None,
        })
    }

    pub fn last_list(&self) -> Option<Vec<TaskRow>> {
        self.calls.borrow().iter().rev().find_map(|c| match c {
            ViewCall::List(rows) => Some(rows.clone()),
            _ => None,
        })
    }
}

impl TaskView for RecordingView {
    fn input_text(&self) -> String {
        self.input.borrow().clone()
    }

    fn set_input_text(&self, text: &str) {
        *self.input.borrow_mut() = text.to_string();
        self.calls.borrow_mut().push(ViewCall::SetInput(text.to_string()));
    }

    fn render_list(&self, rows: &[TaskRow]) {
        self.calls.borrow_mut().push(ViewCall::List(rows.to_vec()));
    }

    fn render_detail(&self, detail: &TaskDetail) {
        self.calls.borrow_mut().push(ViewCall::Detail(detail.clone()));
    }

    fn set_file_label(&self, name: Option<&str>) {
        self.calls
            .borrow_mut()
            .push(ViewCall::FileLabel(name.map(str::to_string)));
    }

    fn show_tab(&self, tab: ContentTab) {
        self.calls.borrow_mut().push(ViewCall::Tab(tab));
    }

    fn show_page(&self, page: MobilePage) {
        self.calls.borrow_mut().push(ViewCall::Page(page));
    }
}

#[derive(Clone, Default)]
pub struct RecordingShell {
    pub notices: Rc<RefCell<Vec<Notice>>>,
    pub loading: Rc<RefCell<Vec<bool>>>,
}

impl RecordingShell {
    pub fn messages(&self) -> Vec<String> {
        self.notices.borrow().iter().map(|n| n.message.clone()).collect()
    }
}

impl Shell for RecordingShell {
    fn notify(&self, notice: &Notice) {
        self.notices.borrow_mut().push(notice.clone());
    }

    fn set_loading(&self, loading: bool) {
        self.loading.borrow_mut().push(loading);
    }
}

#[derive(Clone, Default)]
pub struct RecordingForm {
    pub filled: Rc<RefCell<Vec<Settings>>>,
    pub contents: Rc<RefCell<Settings>>,
    pub closed: Rc<Cell<usize>>,
    pub model_status: Rc<RefCell<Vec<String>>>,
}

impl SettingsForm for RecordingForm {
    fn fill(&self, settings: &Settings) {
        *self.contents.borrow_mut() = settings.clone();
        self.filled.borrow_mut().push(settings.clone());
    }

    fn read(&self) -> Settings {
        self.contents.borrow().clone()
    }

    fn close(&self) {
        self.closed.set(self.closed.get() + 1);
    }

    fn show_model_status(&self, text: &str) {
        self.model_status.borrow_mut().push(text.to_string());
    }
}

/// A controller wired to fakes, with handles to inspect every side.
pub struct Harness {
    pub controller: Controller<FakeBackend>,
    pub backend: Arc<FakeBackend>,
    pub events: async_channel::Receiver<BackendEvent>,
    pub desktop: RecordingView,
    pub mobile: RecordingView,
    pub shell: RecordingShell,
    pub form: RecordingForm,
}

impl Harness {
    /// Must be called inside a tokio runtime.
    pub fn new() -> Self {
        let backend = Arc::new(FakeBackend::default());
        let (tx, rx) = async_channel::unbounded();
        let desktop = RecordingView::default();
        let mobile = RecordingView::default();
        let shell = RecordingShell::default();
        let form = RecordingForm::default();

        let views = Views {
            desktop: Box::new(desktop.clone()),
            mobile: Box::new(mobile.clone()),
            shell: Box::new(shell.clone()),
            settings: Box::new(form.clone()),
        };
        let controller = Controller::new(
            backend.clone(),
            tokio::runtime::Handle::current(),
            tx,
            views,
            Duration::from_millis(2000),
        );

        Self {
            controller,
            backend,
            events: rx,
            desktop,
            mobile,
            shell,
            form,
        }
    }

    /// Wait for the next backend event and apply it.
    pub async fn pump(&mut self) -> BackendEvent {
        let event = tokio::time::timeout(Duration::from_secs(30), self.events.recv())
            .await
            .expect("timed out waiting for a backend event")
            .expect("event channel closed");
        self.controller.handle_backend_event(event.clone());
        event
    }

    /// Let spawned requests run, then report whether any event is queued.
    pub async fn settle(&self) -> bool {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        !self.events.is_empty()
    }

    /// Load `tasks` into the fake and pull them into the controller.
    pub async fn load_tasks(&mut self, tasks: Vec<Task>) {
        self.backend.set_tasks(tasks);
        self.controller.refresh();
        self.pump().await;
    }
}

pub fn task(id: TaskId, status: &str) -> Task {
    let done = status == "completed";
    let progress = if done { 100 } else { 10 };
    let summary = done.then_some("# 总结");
    let original = done.then_some("原文");
    serde_json::from_value(serde_json::json!({
        "id": id,
        "title": format!("task {id}"),
        "status": status,
        "progress": progress,
        "summary": summary,
        "original_text": original,
    }))
    .unwrap()
}
