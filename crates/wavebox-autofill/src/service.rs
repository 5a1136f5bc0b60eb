//! Autofill service
//!
//! Every credential operation is keyed by a service name derived from the
//! page URL (`scheme://host`) and refused while the service is unavailable.

use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::Arc;
use url::Url;

use wavebox_settings::SettingsStore;

use crate::credentials::{Credential, CredentialStore};
use crate::error::AutofillError;
use crate::hints;
use crate::keychain::{KeychainWindows, ManagerMode};
use crate::Result;

pub struct AutofillService {
    credentials: Option<Arc<dyn CredentialStore>>,
    windows: Arc<dyn KeychainWindows>,
    settings: SettingsStore,
    snap_install: bool,
    attached: Arc<RwLock<HashSet<u32>>>,
}

impl AutofillService {
    pub fn new(
        credentials: Option<Arc<dyn CredentialStore>>,
        windows: Arc<dyn KeychainWindows>,
        settings: SettingsStore,
        snap_install: bool,
    ) -> Self {
        if credentials.is_none() {
            tracing::info!("No credential backend, autofill disabled");
        }

        Self {
            credentials,
            windows,
            settings,
            snap_install,
            attached: Arc::new(RwLock::new(HashSet::new())),
        }
    }

    /// `scheme://host` for the given page URL
    pub fn service_name_from_url(target_url: &str) -> Result<String> {
        let url = Url::parse(target_url)?;
        let host = url
            .host_str()
            .ok_or_else(|| AutofillError::MissingHost(target_url.to_string()))?;
        Ok(format!("{}://{}", url.scheme(), host))
    }

    pub fn is_library_loaded(&self) -> bool {
        self.credentials.is_some()
    }

    pub fn is_enabled(&self) -> bool {
        self.settings.app().enable_autofill_service
    }

    /// Snap confinement blocks the keychain
    pub fn is_available(&self) -> bool {
        self.is_library_loaded() && self.is_enabled() && !self.snap_install
    }

    fn backend(&self) -> Result<&dyn CredentialStore> {
        if !self.is_available() {
            return Err(AutofillError::Unavailable);
        }
        self.credentials
            .as_deref()
            .ok_or(AutofillError::Unavailable)
    }

    // === Credentials ===

    pub fn find_credentials(&self, target_url: &str) -> Result<Vec<Credential>> {
        let backend = self.backend()?;
        let service = Self::service_name_from_url(target_url)?;
        backend.find_credentials(&service)
    }

    pub fn add_credentials(&self, target_url: &str, account: &str, password: &str) -> Result<()> {
        let backend = self.backend()?;
        let service = Self::service_name_from_url(target_url)?;
        backend.set_password(&service, account, password)?;

        tracing::info!(service = %service, "Saved credentials");
        Ok(())
    }

    pub fn delete_credentials(&self, target_url: &str, account: &str) -> Result<bool> {
        let backend = self.backend()?;
        let service = Self::service_name_from_url(target_url)?;
        let removed = backend.delete_password(&service, account)?;

        if removed {
            tracing::info!(service = %service, "Deleted credentials");
        }
        Ok(removed)
    }

    // === Manager window ===

    pub fn open_autofill_manager(&self, target_url: &str, mode: Option<ManagerMode>) -> Result<()> {
        if !self.is_available() {
            return Err(AutofillError::Unavailable);
        }

        let service = Self::service_name_from_url(target_url)?;
        if self.windows.focus_existing(&service, mode)? {
            tracing::debug!(service = %service, "Focused credential manager");
            return Ok(());
        }

        tracing::debug!(service = %service, "Opening credential manager");
        self.windows.open(&service, mode)
    }

    pub fn add_autofill_password(&self, target_url: &str) -> Result<()> {
        self.open_autofill_manager(target_url, Some(ManagerMode::Add))
    }

    // === Content tracking ===

    /// Start hinting a content context. Returns false if it was already
    /// attached.
    pub fn attach_contents(&self, contents_id: u32) -> bool {
        self.attached.write().insert(contents_id)
    }

    pub fn detach_contents(&self, contents_id: u32) {
        self.attached.write().remove(&contents_id);
    }

    pub fn is_attached(&self, contents_id: u32) -> bool {
        self.attached.read().contains(&contents_id)
    }

    /// Hint script for an attached context after its DOM is ready, while
    /// the service is available
    pub fn password_hint_script(&self, contents_id: u32) -> Option<String> {
        if !self.is_available() || !self.is_attached(contents_id) {
            return None;
        }
        Some(hints::password_hint_script())
    }
}

impl Clone for AutofillService {
    fn clone(&self) -> Self {
        Self {
            credentials: self.credentials.clone(),
            windows: Arc::clone(&self.windows),
            settings: self.settings.clone(),
            snap_install: self.snap_install,
            attached: Arc::clone(&self.attached),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::BTreeMap;
    use wavebox_storage::Database;

    #[derive(Default)]
    struct MemoryKeychain {
        entries: Mutex<BTreeMap<(String, String), String>>,
    }

    impl CredentialStore for MemoryKeychain {
        fn find_credentials(&self, service: &str) -> Result<Vec<Credential>> {
            Ok(self
                .entries
                .lock()
                .iter()
                .filter(|((s, _), _)| s == service)
                .map(|((_, account), password)| Credential {
                    account: account.clone(),
                    password: password.clone(),
                })
                .collect())
        }

        fn set_password(&self, service: &str, account: &str, password: &str) -> Result<()> {
            self.entries
                .lock()
                .insert((service.to_string(), account.to_string()), password.to_string());
            Ok(())
        }

        fn delete_password(&self, service: &str, account: &str) -> Result<bool> {
            Ok(self
                .entries
                .lock()
                .remove(&(service.to_string(), account.to_string()))
                .is_some())
        }
    }

    #[derive(Default)]
    struct FakeWindows {
        open: Mutex<Option<(String, Option<ManagerMode>)>>,
        created: Mutex<usize>,
    }

    impl KeychainWindows for FakeWindows {
        fn focus_existing(&self, service_name: &str, mode: Option<ManagerMode>) -> Result<bool> {
            let mut open = self.open.lock();
            match open.as_mut() {
                Some(window) => {
                    *window = (service_name.to_string(), mode);
                    Ok(true)
                }
                None => Ok(false),
            }
        }

        fn open(&self, service_name: &str, mode: Option<ManagerMode>) -> Result<()> {
            *self.open.lock() = Some((service_name.to_string(), mode));
            *self.created.lock() += 1;
            Ok(())
        }
    }

    fn service(backend: bool, snap: bool) -> (AutofillService, Arc<FakeWindows>) {
        let settings = SettingsStore::load(Database::open_in_memory().unwrap()).unwrap();
        let windows = Arc::new(FakeWindows::default());
        let credentials: Option<Arc<dyn CredentialStore>> = if backend {
            Some(Arc::new(MemoryKeychain::default()))
        } else {
            None
        };
        (
            AutofillService::new(credentials, windows.clone(), settings, snap),
            windows,
        )
    }

    #[test]
    fn test_service_name_from_url() {
        assert_eq!(
            AutofillService::service_name_from_url("https://mail.google.com/mail/u/0?x=1").unwrap(),
            "https://mail.google.com"
        );
        assert_eq!(
            AutofillService::service_name_from_url("http://localhost:8080/login").unwrap(),
            "http://localhost"
        );
        assert!(AutofillService::service_name_from_url("about:blank").is_err());
        assert!(AutofillService::service_name_from_url("not a url").is_err());
    }

    #[test]
    fn test_availability() {
        assert!(service(true, false).0.is_available());
        assert!(!service(false, false).0.is_available());
        assert!(!service(true, true).0.is_available());

        let (autofill, _) = service(true, false);
        autofill.settings.set_enable_autofill_service(false).unwrap();
        assert!(!autofill.is_available());
    }

    #[test]
    fn test_credentials_are_scoped_by_service() {
        let (autofill, _) = service(true, false);
        autofill
            .add_credentials("https://mail.google.com/a", "me@example.com", "hunter2")
            .unwrap();

        let found = autofill.find_credentials("https://mail.google.com/b").unwrap();
        assert_eq!(
            found,
            vec![Credential {
                account: "me@example.com".to_string(),
                password: "hunter2".to_string(),
            }]
        );
        assert!(autofill.find_credentials("https://slack.com/").unwrap().is_empty());

        assert!(autofill
            .delete_credentials("https://mail.google.com/", "me@example.com")
            .unwrap());
        assert!(!autofill
            .delete_credentials("https://mail.google.com/", "me@example.com")
            .unwrap());
    }

    #[test]
    fn test_unavailable_refuses_operations() {
        let (autofill, windows) = service(true, true);
        assert!(matches!(
            autofill.find_credentials("https://mail.google.com/"),
            Err(AutofillError::Unavailable)
        ));
        assert!(matches!(
            autofill.add_credentials("https://mail.google.com/", "a", "b"),
            Err(AutofillError::Unavailable)
        ));
        assert!(matches!(
            autofill.open_autofill_manager("https://mail.google.com/", None),
            Err(AutofillError::Unavailable)
        ));
        assert_eq!(*windows.created.lock(), 0);
    }

    #[test]
    fn test_manager_window_is_reused() {
        let (autofill, windows) = service(true, false);

        autofill
            .open_autofill_manager("https://mail.google.com/inbox", None)
            .unwrap();
        autofill.add_autofill_password("https://slack.com/signin").unwrap();

        assert_eq!(*windows.created.lock(), 1);
        assert_eq!(
            *windows.open.lock(),
            Some(("https://slack.com".to_string(), Some(ManagerMode::Add)))
        );
    }

    #[test]
    fn test_hints_only_for_attached_contents() {
        let (autofill, _) = service(true, false);
        assert!(autofill.password_hint_script(3).is_none());

        assert!(autofill.attach_contents(3));
        assert!(!autofill.attach_contents(3));
        assert!(autofill.password_hint_script(3).is_some());

        autofill.detach_contents(3);
        assert!(autofill.password_hint_script(3).is_none());
    }

    #[test]
    fn test_no_hints_while_unavailable() {
        let (autofill, _) = service(false, false);
        autofill.attach_contents(1);
        assert!(autofill.password_hint_script(1).is_none());
    }
}
