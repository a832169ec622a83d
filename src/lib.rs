//! Desktop client for a video/audio summarization backend.
//!
//! The backend does all the work (download, transcription, summarization);
//! this crate keeps a polled copy of its task list, submits new work and
//! shows the results. `app` holds the toolkit-independent core, `ui` the
//! GTK front end.

pub mod api;
pub mod app;
pub mod clipboard;
pub mod config;
pub mod error;
pub mod markdown;

#[cfg(feature = "gui")]
pub mod ui;
