//! GTK4/libadwaita front end. Widgets implement the `app` view traits; the
//! signal handlers here forward user input to the shared controller.

mod desktop;
mod detail;
mod mobile;
mod settings;
mod task_list;
mod window;

use std::cell::RefCell;
use std::rc::Rc;

use gtk4::prelude::*;
use gtk4::{gio, glib};
use libadwaita::prelude::*;

use crate::api::{Backend, ModelAction, TaskId};
use crate::app::{Controller, MobilePage, ViewKind};

pub use desktop::DesktopView;
pub use mobile::MobileView;
pub use settings::SettingsDialog;
pub use window::{build_window, MainWindow, WindowShell};

pub type SharedController<B> = Rc<RefCell<Controller<B>>>;

/// Run `f` against the controller unless it is already borrowed. Widgets
/// the controller updates emit notify signals while it holds the borrow;
/// those echoes are dropped here.
fn with_controller<B: Backend>(
    controller: &SharedController<B>,
    f: impl FnOnce(&mut Controller<B>),
) {
    match controller.try_borrow_mut() {
        Ok(mut c) => f(&mut c),
        Err(_) => log::trace!("Controller busy; ignoring re-entrant signal"),
    }
}

/// Wire every widget signal to the controller.
pub fn connect<B: Backend>(
    controller: &SharedController<B>,
    main: &MainWindow,
    desktop: &DesktopView,
    mobile: &MobileView,
    settings: &SettingsDialog,
) {
    connect_actions(controller, main, settings);
    connect_desktop(controller, main, desktop);
    connect_mobile(controller, main, mobile);
    connect_settings(controller, settings);
    connect_window(controller, main);
}

fn task_id_action<B: Backend>(
    name: &str,
    controller: &SharedController<B>,
    f: fn(&mut Controller<B>, TaskId),
) -> gio::SimpleAction {
    let action = gio::SimpleAction::new(name, Some(glib::VariantTy::INT64));
    let controller = controller.clone();
    action.connect_activate(move |_, param| {
        let Some(id) = param.and_then(|p| p.get::<i64>()) else {
            log::warn!("Task action activated without an id");
            return;
        };
        with_controller(&controller, |c| f(c, id));
    });
    action
}

fn connect_actions<B: Backend>(
    controller: &SharedController<B>,
    main: &MainWindow,
    settings: &SettingsDialog,
) {
    main.window.add_action(&task_id_action(
        "delete-task",
        controller,
        |c, id| c.delete_task(id),
    ));
    main.window.add_action(&task_id_action(
        "select-desktop",
        controller,
        |c, id| c.select_task(ViewKind::Desktop, id),
    ));
    main.window.add_action(&task_id_action(
        "select-mobile",
        controller,
        |c, id| c.select_task(ViewKind::Mobile, id),
    ));

    let open_settings = gio::SimpleAction::new("settings", None);
    let controller = controller.clone();
    let dialog = settings.clone();
    open_settings.connect_activate(move |_, _| {
        with_controller(&controller, |c| c.open_settings());
        dialog.present();
    });
    main.window.add_action(&open_settings);
}

/// Show a file chooser for audio/video and hand the picked path to `on_pick`.
fn pick_file<F>(parent: &libadwaita::ApplicationWindow, on_pick: F)
where
    F: FnOnce(Option<std::path::PathBuf>) + 'static,
{
    let filter = gtk4::FileFilter::new();
    filter.set_name(Some("音视频文件"));
    filter.add_mime_type("audio/*");
    filter.add_mime_type("video/*");
    let filters = gio::ListStore::new::<gtk4::FileFilter>();
    filters.append(&filter);

    let dialog = gtk4::FileDialog::builder()
        .title("选择文件")
        .modal(true)
        .filters(&filters)
        .default_filter(&filter)
        .build();
    dialog.open(Some(parent), None::<&gio::Cancellable>, move |result| {
        match result {
            Ok(file) => on_pick(file.path()),
            Err(e) => {
                log::debug!("File chooser closed: {e}");
                on_pick(None);
            }
        }
    });
}

fn connect_desktop<B: Backend>(
    controller: &SharedController<B>,
    main: &MainWindow,
    desktop: &DesktopView,
) {
    let submit = {
        let controller = controller.clone();
        move || with_controller(&controller, |c| c.submit_url(ViewKind::Desktop))
    };
    let submit_on_enter = submit.clone();
    desktop.submit_button.connect_clicked(move |_| submit());
    desktop
        .url_entry
        .connect_activate(move |_| submit_on_enter());

    {
        let controller = controller.clone();
        let window = main.window.clone();
        desktop.file_button.connect_clicked(move |_| {
            let controller = controller.clone();
            pick_file(&window, move |path| {
                with_controller(&controller, |c| c.submit_file(ViewKind::Desktop, path));
            });
        });
    }

    connect_tabs(controller, &desktop.detail.tabs, ViewKind::Desktop);
}

fn connect_mobile<B: Backend>(
    controller: &SharedController<B>,
    main: &MainWindow,
    mobile: &MobileView,
) {
    let submit = {
        let controller = controller.clone();
        move || with_controller(&controller, |c| c.submit_url(ViewKind::Mobile))
    };
    let submit_on_enter = submit.clone();
    mobile.submit_button.connect_clicked(move |_| submit());
    mobile.url_entry.connect_activate(move |_| submit_on_enter());

    {
        let controller = controller.clone();
        mobile.clipboard_button.connect_clicked(move |_| {
            with_controller(&controller, |c| c.import_from_clipboard());
        });
    }

    {
        let controller = controller.clone();
        let window = main.window.clone();
        mobile.file_button.connect_clicked(move |_| {
            let controller = controller.clone();
            pick_file(&window, move |path| {
                with_controller(&controller, |c| c.submit_file(ViewKind::Mobile, path));
            });
        });
    }

    {
        let controller = controller.clone();
        mobile.pages.connect_visible_child_name_notify(move |pages| {
            let page = pages
                .visible_child_name()
                .and_then(|name| MobilePage::from_name(&name));
            if let Some(page) = page {
                with_controller(&controller, |c| c.switch_mobile_page(page));
            }
        });
    }

    connect_tabs(controller, &mobile.detail.tabs, ViewKind::Mobile);
}

fn connect_tabs<B: Backend>(
    controller: &SharedController<B>,
    tabs: &libadwaita::ViewStack,
    kind: ViewKind,
) {
    let controller = controller.clone();
    tabs.connect_visible_child_name_notify(move |tabs| {
        let tab = tabs
            .visible_child_name()
            .and_then(|name| detail::tab_from_name(&name));
        if let Some(tab) = tab {
            with_controller(&controller, |c| c.switch_tab(kind, tab));
        }
    });
}

fn connect_settings<B: Backend>(controller: &SharedController<B>, settings: &SettingsDialog) {
    {
        let controller = controller.clone();
        settings.save_button.connect_clicked(move |_| {
            with_controller(&controller, |c| c.save_settings());
        });
    }
    {
        let controller = controller.clone();
        settings.load_model_button.connect_clicked(move |_| {
            with_controller(&controller, |c| c.manage_model(ModelAction::Load));
        });
    }
    {
        let controller = controller.clone();
        settings.unload_model_button.connect_clicked(move |_| {
            with_controller(&controller, |c| c.manage_model(ModelAction::Unload));
        });
    }
}

fn connect_window<B: Backend>(controller: &SharedController<B>, main: &MainWindow) {
    // Breakpoint callbacks run during size allocation; defer the re-render.
    for (compact, layout) in [(true, ViewKind::Mobile), (false, ViewKind::Desktop)] {
        let controller = controller.clone();
        let apply = move |_: &libadwaita::Breakpoint| {
            let controller = controller.clone();
            glib::idle_add_local_once(move || {
                with_controller(&controller, |c| c.set_layout(layout));
            });
        };
        if compact {
            main.breakpoint.connect_apply(apply);
        } else {
            main.breakpoint.connect_unapply(apply);
        }
    }

    {
        let controller = controller.clone();
        main.window.connect_suspended_notify(move |window| {
            let visible = !window.is_suspended();
            log::debug!("Window visible: {visible}");
            with_controller(&controller, |c| c.set_visible(visible));
        });
    }

    {
        let controller = controller.clone();
        main.window.connect_close_request(move |_| {
            with_controller(&controller, |c| c.shutdown());
            glib::Propagation::Proceed
        });
    }
}
