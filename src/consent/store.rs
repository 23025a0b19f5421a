use crate::config::ConsentConfig;
use crate::consent::defaults::default_tree;
use crate::consent::event::{ConsentBus, ConsentEvent, Subscription};
use crate::consent::model::{ConsentStatus, ConsentTree};
use crate::consent::reconcile::{DocumentHost, HeadlessDocument, Reconciler};
use crate::consent::snapshot::{encode_snapshot, merge_snapshot, read_snapshot, SnapshotRead};
use crate::storage::StorageHandles;

/// Owns the consent tree and status for one application session.
///
/// A store is constructed once and handed to whatever needs it; nothing in
/// the crate keeps a global instance. All operations are synchronous and
/// never fail towards the caller: storage problems are logged (and published
/// as [`ConsentEvent::StorageFailed`]) while the in-memory state stays
/// authoritative.
pub struct ConsentStore<D: DocumentHost = HeadlessDocument> {
    config: ConsentConfig,
    /// Definition `initialize` and `reset_to_default` start from.
    defaults: ConsentTree,
    tree: ConsentTree,
    status: ConsentStatus,
    storage: StorageHandles,
    document: D,
    reconciler: Reconciler,
    local_storage_enabled: bool,
    bus: ConsentBus,
}

enum Target {
    Category(usize),
    Leaf(usize, usize),
}

impl<D: DocumentHost> ConsentStore<D> {
    /// Creates a store over the built-in default tree.
    pub fn new(config: ConsentConfig, storage: StorageHandles, document: D) -> Self {
        Self::with_tree(config, default_tree(), storage, document)
    }

    /// Creates a store over a custom default tree.
    pub fn with_tree(config: ConsentConfig, defaults: ConsentTree, storage: StorageHandles, document: D) -> Self {
        let reconciler = Reconciler::new(&config);
        Self {
            config,
            tree: defaults.clone(),
            defaults,
            status: ConsentStatus::Waiting,
            storage,
            document,
            reconciler,
            local_storage_enabled: true,
            bus: ConsentBus::default(),
        }
    }

    /// Loads persisted state over the defaults, then reconciles side effects.
    ///
    /// Missing or malformed data falls back to defaults and a `Waiting` status.
    pub fn initialize(&mut self) {
        self.tree = self.defaults.clone();

        let raw = self.storage.snapshot.get_item(&self.config.snapshot_key);
        let restored = match read_snapshot(raw.as_deref()) {
            SnapshotRead::Loaded(saved) => {
                let applied = merge_snapshot(&mut self.tree, &saved);
                log::debug!("restored {} consent values from storage", applied);
                true
            }
            SnapshotRead::Missing => false,
            SnapshotRead::Malformed(err) => {
                log::warn!("Ignoring malformed consent snapshot '{}': {}", self.config.snapshot_key, err);
                false
            }
        };

        self.status = match self.storage.flag.get_item(&self.config.status_key) {
            None => ConsentStatus::Waiting,
            Some(raw) => raw.parse().unwrap_or_else(|err| {
                log::warn!("Ignoring consent status flag '{}': {}", self.config.status_key, err);
                ConsentStatus::Waiting
            }),
        };

        self.reconcile();
        log::info!("consent store initialized (status: {}, restored: {})", self.status, restored);
        self.bus.publish(ConsentEvent::Loaded { status: self.status, restored });
    }

    /// Category first, then options across all categories; `false` when nothing matches.
    pub fn is_active(&self, identifier: &str) -> bool {
        self.tree.is_active(identifier)
    }

    /// Flips a category or option. Protected entries and unknown identifiers are left alone.
    pub fn toggle(&mut self, identifier: &str) {
        let Some(target) = self.locate(identifier) else {
            log::debug!("toggle: no category or option named '{}'", identifier);
            return;
        };

        let categories = self.tree.categories_mut();
        let value = match target {
            Target::Category(ci) => {
                let category = &mut categories[ci];
                if category.protected {
                    log::debug!("toggle: '{}' is protected", identifier);
                    return;
                }
                category.value = !category.value;
                let value = category.value;
                for option in category.options.iter_mut().filter(|o| !o.protected) {
                    option.value = value;
                }
                value
            }
            Target::Leaf(ci, oi) => {
                let category = &mut categories[ci];
                let option = &mut category.options[oi];
                if option.protected {
                    log::debug!("toggle: '{}' is protected", identifier);
                    return;
                }
                option.value = !option.value;
                let value = option.value;

                if !category.protected {
                    if value {
                        category.value = true;
                    } else if category.all_unprotected_off() {
                        category.value = false;
                    }
                }
                value
            }
        };

        if identifier == self.config.local_storage_option {
            if value {
                self.local_storage_enabled = true;
            } else {
                self.withdraw_local_storage();
            }
        }

        self.persist_tree();
        self.reconcile();
        self.bus.publish(ConsentEvent::Toggled { identifier: identifier.to_string(), value });
    }

    /// Turns on every non-protected entry and records `Accepted`.
    pub fn accept_all(&mut self) {
        self.tree.set_all_unprotected(true);
        self.set_status(ConsentStatus::Accepted);
        self.persist_tree();
        self.reconcile();
        self.bus.publish(ConsentEvent::AllSet { value: true });
    }

    /// Turns off every non-protected entry and records `Rejected`.
    pub fn reject_all(&mut self) {
        self.tree.set_all_unprotected(false);
        self.set_status(ConsentStatus::Rejected);
        self.persist_tree();
        self.reconcile();
        self.bus.publish(ConsentEvent::AllSet { value: false });
    }

    /// Turns off every non-protected entry, clears storage and re-persists the
    /// cleared tree. The status returns to `Waiting`, so the prompt shows again.
    pub fn reset_to_default(&mut self) {
        self.tree.set_all_unprotected(false);

        self.clear_area(true);
        if !self.storage.is_shared() {
            self.clear_area(false);
        }
        self.persist_tree();

        let old = self.status;
        self.status = ConsentStatus::Waiting;
        if old != self.status {
            self.bus.publish(ConsentEvent::StatusChanged { old, new: self.status });
        }

        self.reconcile();
        self.bus.publish(ConsentEvent::Reset);
    }

    /// Confirms the current custom selection as is.
    pub fn save_preferences(&mut self) {
        self.set_status(ConsentStatus::Accepted);
        self.persist_tree();
        self.reconcile();
    }

    /// Enables or disables use of the snapshot storage area.
    ///
    /// Disabling clears the area (keeping the status flag) so data stored by
    /// other features is removed along with the consent.
    pub fn set_local_storage_enabled(&mut self, enabled: bool) {
        self.local_storage_enabled = enabled;
        if enabled {
            self.persist_tree();
        } else {
            self.withdraw_local_storage();
        }
    }

    pub fn local_storage_enabled(&self) -> bool {
        self.local_storage_enabled
    }

    pub fn status(&self) -> ConsentStatus {
        self.status
    }

    /// `true` until the user accepts, rejects or saves a selection.
    pub fn needs_prompt(&self) -> bool {
        !self.status.is_decided()
    }

    pub fn tree(&self) -> &ConsentTree {
        &self.tree
    }

    pub fn config(&self) -> &ConsentConfig {
        &self.config
    }

    pub fn storage(&self) -> &StorageHandles {
        &self.storage
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut D {
        &mut self.document
    }

    pub fn subscribe(&self) -> Subscription {
        self.bus.subscribe()
    }

    /// Re-applies side effects for the current tree.
    pub fn reconcile(&mut self) {
        self.reconciler.reconcile(&self.tree, &mut self.document);
    }

    fn locate(&self, identifier: &str) -> Option<Target> {
        let categories = self.tree.categories();
        if let Some(ci) = categories.iter().position(|c| c.identifier == identifier) {
            return Some(Target::Category(ci));
        }
        categories.iter().enumerate().find_map(|(ci, c)| {
            c.options
                .iter()
                .position(|o| o.identifier == identifier)
                .map(|oi| Target::Leaf(ci, oi))
        })
    }

    fn set_status(&mut self, new: ConsentStatus) {
        let old = self.status;
        self.status = new;

        let key = self.config.status_key.clone();
        if let Err(e) = self.storage.flag.set_item(&key, new.as_str()) {
            self.storage_failed(Some(key), e);
        }
        if old != new {
            self.bus.publish(ConsentEvent::StatusChanged { old, new });
        }
    }

    fn persist_tree(&self) {
        let key = self.config.snapshot_key.clone();
        let raw = match encode_snapshot(&self.tree) {
            Ok(raw) => raw,
            Err(e) => return self.storage_failed(Some(key), e.into()),
        };
        if let Err(e) = self.storage.snapshot.set_item(&key, &raw) {
            self.storage_failed(Some(key), e);
        }
    }

    fn clear_area(&self, flag: bool) {
        let area = if flag { &self.storage.flag } else { &self.storage.snapshot };
        if let Err(e) = area.clear() {
            self.storage_failed(None, e);
        }
    }

    fn withdraw_local_storage(&mut self) {
        log::info!("local storage withdrawn, clearing snapshot area");
        self.local_storage_enabled = false;
        self.clear_area(false);

        if self.storage.is_shared() && self.status.is_decided() {
            let key = self.config.status_key.clone();
            if let Err(e) = self.storage.flag.set_item(&key, self.status.as_str()) {
                self.storage_failed(Some(key), e);
            }
        }
    }

    fn storage_failed(&self, key: Option<String>, err: anyhow::Error) {
        log::warn!("Consent storage write failed ({}): {:#}", key.as_deref().unwrap_or("*"), err);
        self.bus.publish(ConsentEvent::StorageFailed { key, reason: err.to_string() });
    }
}
