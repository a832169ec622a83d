use gtk4::prelude::*;
use libadwaita::prelude::*;

use crate::app::{Notice, NoticeKind, Shell};

use super::desktop::DesktopView;
use super::mobile::MobileView;

/// Compact layout below this width, in sp.
const COMPACT_WIDTH: f64 = 768.0;
const NOTICE_TIMEOUT_SECS: u32 = 5;

/// Handles returned from building the main window.
pub struct MainWindow {
    pub window: libadwaita::ApplicationWindow,
    pub toasts: libadwaita::ToastOverlay,
    pub spinner: gtk4::Spinner,
    pub settings_button: gtk4::Button,
    pub breakpoint: libadwaita::Breakpoint,
}

impl MainWindow {
    pub fn shell(&self) -> WindowShell {
        WindowShell {
            toasts: self.toasts.clone(),
            spinner: self.spinner.clone(),
        }
    }
}

/// Build the main window holding both layouts; the breakpoint picks one.
pub fn build_window(
    app: &libadwaita::Application,
    desktop: &DesktopView,
    mobile: &MobileView,
) -> MainWindow {
    load_css();

    let window = libadwaita::ApplicationWindow::builder()
        .application(app)
        .title("视频总结")
        .default_width(1100)
        .default_height(720)
        .width_request(360)
        .height_request(480)
        .build();

    let toolbar_view = libadwaita::ToolbarView::new();
    let header = libadwaita::HeaderBar::new();

    let settings_button = gtk4::Button::from_icon_name("emblem-system-symbolic");
    settings_button.set_tooltip_text(Some("设置"));
    settings_button.set_action_name(Some("win.settings"));
    header.pack_end(&settings_button);

    let spinner = gtk4::Spinner::new();
    spinner.set_visible(false);
    header.pack_end(&spinner);

    toolbar_view.add_top_bar(&header);

    let layouts = gtk4::Stack::new();
    layouts.set_transition_type(gtk4::StackTransitionType::Crossfade);
    layouts.add_named(&desktop.root, Some("desktop"));
    layouts.add_named(&mobile.root, Some("mobile"));
    layouts.set_visible_child_name("desktop");

    let toasts = libadwaita::ToastOverlay::new();
    toasts.set_child(Some(&layouts));
    toolbar_view.set_content(Some(&toasts));
    window.set_content(Some(&toolbar_view));

    let breakpoint = libadwaita::Breakpoint::new(libadwaita::BreakpointCondition::new_length(
        libadwaita::BreakpointConditionLengthType::MaxWidth,
        COMPACT_WIDTH,
        libadwaita::LengthUnit::Sp,
    ));
    breakpoint.add_setter(&layouts, "visible-child-name", Some(&"mobile".to_value()));
    window.add_breakpoint(breakpoint.clone());

    MainWindow {
        window,
        toasts,
        spinner,
        settings_button,
        breakpoint,
    }
}

fn load_css() {
    let Some(display) = gtk4::gdk::Display::default() else {
        log::warn!("No display; skipping stylesheet");
        return;
    };
    let css_provider = gtk4::CssProvider::new();
    css_provider.load_from_string(
        r#"
        row.selected-task {
            background-color: alpha(@accent_bg_color, 0.15);
        }
        .notice-success {
            color: @success_color;
        }
        .notice-error {
            color: @error_color;
        }
        "#,
    );
    gtk4::style_context_add_provider_for_display(
        &display,
        &css_provider,
        gtk4::STYLE_PROVIDER_PRIORITY_APPLICATION,
    );
}

/// Toasts and the header spinner.
#[derive(Clone)]
pub struct WindowShell {
    toasts: libadwaita::ToastOverlay,
    spinner: gtk4::Spinner,
}

impl Shell for WindowShell {
    fn notify(&self, notice: &Notice) {
        let label = gtk4::Label::new(Some(&notice.message));
        label.set_wrap(true);
        match notice.kind {
            NoticeKind::Success => label.add_css_class("notice-success"),
            NoticeKind::Error => label.add_css_class("notice-error"),
            NoticeKind::Info => {}
        }
        let toast = libadwaita::Toast::builder()
            .custom_title(&label)
            .timeout(NOTICE_TIMEOUT_SECS)
            .build();
        self.toasts.add_toast(toast);
    }

    fn set_loading(&self, loading: bool) {
        self.spinner.set_visible(loading);
        self.spinner.set_spinning(loading);
    }
}
