mod controller;
mod display;
mod event_handler;
mod poller;
mod reconcile;
mod state;
mod validate;
mod view;

#[cfg(test)]
mod testing;

pub use controller::{Controller, Views};
pub use display::{model_status_text, status_text, EMPTY_LIST_TEXT, NO_FILE_TEXT};
pub use poller::{PollState, Poller};
pub use reconcile::{annotate_queue_positions, apply_snapshot};
pub use state::{
    BackendEvent, ClientState, ContentTab, Layout, MobilePage, Notice, NoticeKind, Selection,
    Submission, ViewKind,
};
pub use validate::{is_valid_url, validate_url_input};
pub use view::{
    SettingsForm, Shell, TaskDetail, TaskRow, TaskView, ORIGINAL_PLACEHOLDER_BODY,
    ORIGINAL_PLACEHOLDER_TITLE, WELCOME_BODY, WELCOME_TITLE,
};
