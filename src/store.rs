// Browser persistence: progress record, settings flags and config overrides
// in localStorage. Everything here degrades to defaults when storage is
// missing (private mode, embedded webviews).
use crate::config::MapConfig;
use crate::error::CampaignError;
use crate::model::ProgressRecord;
use crate::progression::{MemoryStore, ProgressStore};

pub const PROGRESS_KEY: &str = "cm_progress";
pub const CONFIG_KEY: &str = "cm_config";
pub const UNLOCK_ALL_KEY: &str = "cm_setting_unlock_all";
pub const LOG_LEVEL_KEY: &str = "cm_log_level";

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

pub fn parse_flag(raw: &str) -> bool {
    raw == "1" || raw == "true"
}

pub fn parse_record(raw: &str) -> Result<ProgressRecord, CampaignError> {
    serde_json::from_str(raw).map_err(|e| CampaignError::StoreUnavailable(format!("corrupt progress: {}", e)))
}

/// Progress saved as JSON under a single localStorage key.
pub struct LocalStorageStore {
    storage: web_sys::Storage,
    key: String,
}

impl LocalStorageStore {
    pub fn open() -> Result<Self, CampaignError> {
        let storage =
            local_storage().ok_or_else(|| CampaignError::StoreUnavailable("localStorage not available".into()))?;
        Ok(Self {
            storage,
            key: PROGRESS_KEY.to_string(),
        })
    }
}

impl ProgressStore for LocalStorageStore {
    fn load(&self) -> Result<Option<ProgressRecord>, CampaignError> {
        let raw = self
            .storage
            .get_item(&self.key)
            .map_err(|e| CampaignError::StoreUnavailable(format!("{:?}", e)))?;
        raw.as_deref().map(parse_record).transpose()
    }

    fn save(&mut self, record: &ProgressRecord) -> Result<(), CampaignError> {
        let s = serde_json::to_string(record).map_err(|e| CampaignError::StoreUnavailable(e.to_string()))?;
        self.storage
            .set_item(&self.key, &s)
            .map_err(|e| CampaignError::StoreUnavailable(format!("{:?}", e)))
    }
}

/// localStorage when it works, otherwise progress lives only for this session.
pub fn open_progress_store() -> Box<dyn ProgressStore> {
    match LocalStorageStore::open() {
        Ok(s) => Box::new(s),
        Err(e) => {
            tracing::warn!("{}; progress will not survive a reload", e);
            Box::new(MemoryStore::default())
        }
    }
}

pub fn read_flag(key: &str, default: bool) -> bool {
    if let Some(store) = local_storage() {
        if let Ok(Some(v)) = store.get_item(key) {
            return parse_flag(&v);
        }
    }
    default
}

fn report_write(key: &str, result: Result<(), String>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("could not save {}: {}; it will reset on reload", key, e);
            false
        }
    }
}

/// Persists a settings flag. Returns whether the write stuck; failures are
/// logged and the in-memory setting stays as the player chose.
pub fn write_flag(key: &str, on: bool) -> bool {
    let result = match local_storage() {
        Some(store) => store
            .set_item(key, if on { "1" } else { "0" })
            .map_err(|e| format!("{:?}", e)),
        None => Err("localStorage not available".to_string()),
    };
    report_write(key, result)
}

/// Console verbosity from the `cm_log_level` key.
pub fn log_level_setting() -> tracing::Level {
    let raw = local_storage().and_then(|s| s.get_item(LOG_LEVEL_KEY).ok().flatten());
    crate::util::log_level(raw.as_deref())
}

/// Defaults, then JSON overrides, then the unlock-all setting toggle.
pub fn load_config() -> MapConfig {
    let mut cfg = MapConfig::default();
    if let Some(store) = local_storage() {
        if let Ok(Some(raw)) = store.get_item(CONFIG_KEY) {
            match MapConfig::from_json(&raw) {
                Ok(c) => cfg = c,
                Err(e) => tracing::warn!("ignoring bad {}: {}", CONFIG_KEY, e),
            }
        }
    }
    cfg.unlock_all = read_flag(UNLOCK_ALL_KEY, cfg.unlock_all);
    cfg
}
