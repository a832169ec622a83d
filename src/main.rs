use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use gtk4::glib;
use gtk4::prelude::*;
use tokio::runtime::Handle;

use video_summarizer::api::HttpBackend;
use video_summarizer::app::{BackendEvent, Controller, Views};
use video_summarizer::config::ClientConfig;
use video_summarizer::ui;

fn main() -> glib::ExitCode {
    env_logger::init();
    log::info!("Video summarizer starting");

    let config = ClientConfig::load();

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("summarizer-io")
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            log::error!("Failed to start tokio runtime: {e}");
            return glib::ExitCode::FAILURE;
        }
    };
    let handle = runtime.handle().clone();

    let application = libadwaita::Application::builder()
        .application_id("io.github.video_summarizer.Client")
        .build();

    application.connect_activate(move |app| on_activate(app, &config, &handle));
    application.run()
}

fn on_activate(app: &libadwaita::Application, config: &ClientConfig, runtime: &Handle) {
    if let Some(window) = app.active_window() {
        window.present();
        return;
    }

    let backend = match HttpBackend::new(config) {
        Ok(backend) => Arc::new(backend),
        Err(e) => {
            log::error!("Failed to create HTTP client: {e}");
            app.quit();
            return;
        }
    };
    log::info!("Using backend at {}", backend.base_url());

    // Mutating requests need the CSRF cookie; fetch it before the user acts.
    if config.csrf_token.is_none() {
        let backend = backend.clone();
        runtime.spawn(async move {
            if let Err(e) = backend.prime_csrf().await {
                log::warn!("Failed to obtain CSRF token: {e}");
            }
        });
    }

    // Backend -> UI channel
    let (backend_tx, backend_rx) = async_channel::unbounded::<BackendEvent>();

    // Build UI
    let desktop = ui::DesktopView::new();
    let mobile = ui::MobileView::new();
    let main_window = ui::build_window(app, &desktop, &mobile);
    let settings = ui::SettingsDialog::new(&main_window.window);

    let views = Views {
        desktop: Box::new(desktop.clone()),
        mobile: Box::new(mobile.clone()),
        shell: Box::new(main_window.shell()),
        settings: Box::new(settings.clone()),
    };
    let controller = Rc::new(RefCell::new(Controller::new(
        backend,
        runtime.clone(),
        backend_tx,
        views,
        config.poll_interval(),
    )));

    ui::connect(&controller, &main_window, &desktop, &mobile, &settings);
    main_window.window.present();

    // Attach backend event handler
    {
        let controller = controller.clone();
        glib::spawn_future_local(async move {
            while let Ok(event) = backend_rx.recv().await {
                controller.borrow_mut().handle_backend_event(event);
            }
        });
    }

    controller.borrow_mut().start();
}
