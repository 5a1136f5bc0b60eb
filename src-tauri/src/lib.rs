//! Wavebox - Tauri Application
//!
//! The shell hosts one UI webview per window plus a child webview per
//! account (guest). Guests reach native code only through `wbrpc`.

mod commands;
mod guests;
mod shell;
mod state;

use state::AppState;
use tauri::webview::WebviewBuilder;
use tauri::window::WindowBuilder;
use tauri::{LogicalPosition, LogicalSize, Manager, WebviewUrl, WindowEvent};

const MAIN_WINDOW: &str = "main";

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    // Initialize logging
    wavebox_core::init_logging();

    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .setup(|app| {
            let state = AppState::new(app.handle())?;
            app.manage(state);

            let window = WindowBuilder::new(app, MAIN_WINDOW)
                .title("Wavebox")
                .inner_size(1280.0, 800.0)
                .min_inner_size(800.0, 600.0)
                .center()
                .build()?;

            let ui_webview = WebviewBuilder::new(
                commands::ui_webview_label(MAIN_WINDOW),
                WebviewUrl::App("index.html".into()),
            )
            .auto_resize()
            .enable_clipboard_access();

            let ui_webview = window.add_child(
                ui_webview,
                LogicalPosition::new(0.0, 0.0),
                LogicalSize::new(1280.0, 800.0),
            )?;
            let _ = ui_webview.show();

            tracing::info!("Wavebox started");

            Ok(())
        })
        .on_window_event(|window, event| {
            if let WindowEvent::Destroyed = event {
                if let Some(state) = window.try_state::<AppState>() {
                    let closed = state.close_window(window.label());
                    if closed > 0 {
                        tracing::info!(window = %window.label(), guests = closed, "Disconnected guests of closed window");
                    }
                }
            }
        })
        .invoke_handler(tauri::generate_handler![
            // Diagnostics
            commands::diagnostics::frontend_ready,
            // Request router
            commands::rpc::wbrpc,
            // Guest commands
            commands::guests::create_guest,
            commands::guests::close_guest,
            commands::guests::list_guests,
            // Extension commands
            commands::extensions::list_extensions,
            commands::extensions::create_extension_background,
            commands::extensions::uninstall_extension,
            // Autofill commands
            commands::autofill::autofill_status,
            commands::autofill::find_credentials,
            commands::autofill::add_credentials,
            commands::autofill::delete_credentials,
            commands::autofill::open_autofill_manager,
            commands::autofill::add_autofill_password,
            // Settings commands
            commands::settings::get_settings,
            commands::settings::set_enable_autofill_service,
            commands::settings::set_enable_autoupdate,
            commands::settings::get_user_settings,
            commands::settings::set_analytics_enabled,
            commands::settings::list_notification_permissions,
            commands::settings::set_notification_permission,
            commands::settings::clear_notification_permission,
        ])
        .run(tauri::generate_context!())
        .expect("error while running Wavebox");
}
