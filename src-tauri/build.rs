const COMMANDS: &[&str] = &[
    "frontend_ready",
    "wbrpc",
    "create_guest",
    "close_guest",
    "list_guests",
    "list_extensions",
    "create_extension_background",
    "uninstall_extension",
    "autofill_status",
    "find_credentials",
    "add_credentials",
    "delete_credentials",
    "open_autofill_manager",
    "add_autofill_password",
    "get_settings",
    "set_enable_autofill_service",
    "set_enable_autoupdate",
    "get_user_settings",
    "set_analytics_enabled",
    "list_notification_permissions",
    "set_notification_permission",
    "clear_notification_permission",
];

fn main() {
    // Guest pages are remote origins; listing the commands generates the
    // `allow-*` permissions the capabilities grant per origin.
    tauri_build::try_build(
        tauri_build::Attributes::new()
            .app_manifest(tauri_build::AppManifest::new().commands(COMMANDS)),
    )
    .expect("failed to run tauri-build");
}
