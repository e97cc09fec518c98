//! In-process [`RemoteStore`] with the same key layout as the service. Used for
//! `--offline` runs and in tests, where reads and writes can be made to fail.
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::journey::types::{Item, Narratives, Quest};
use crate::session::Session;

use super::records::{GlobalConfigRecord, NarrativesRecord, ProgressSave, UserDataRecord};
use super::store::RemoteStore;
use super::RemoteError;

pub const NARRATIVES_KEY: &str = "global:narratives";
pub const QUEST_TEMPLATES_KEY: &str = "global:quest_templates";
pub const INVENTORY_TEMPLATES_KEY: &str = "global:inventory_templates";

const USER_SECTIONS: [&str; 5] = ["quests", "inventory", "currencies", "messages", "flags"];

pub fn user_key(user_id: &str, section: &str) -> String {
    format!("user:{}:{}", user_id, section)
}

/// One successful write, in completion order.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteRecord {
    pub path: &'static str,
    pub body: Value,
}

#[derive(Default)]
pub struct MemoryRemoteStore {
    kv: Mutex<HashMap<String, Value>>,
    writes: Mutex<Vec<WriteRecord>>,
    fail_global: AtomicBool,
    fail_user: AtomicBool,
    fail_writes: AtomicBool,
    write_delay: Mutex<Option<Duration>>,
}

impl MemoryRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from a key-value dump written by [`MemoryRemoteStore::dump`].
    pub fn restore(raw: &str) -> Result<Self, RemoteError> {
        let kv: HashMap<String, Value> = serde_json::from_str(raw)?;
        Ok(Self {
            kv: Mutex::new(kv),
            ..Self::default()
        })
    }

    /// Key-value contents as pretty JSON, for the offline state file.
    pub fn dump(&self) -> Result<String, RemoteError> {
        let kv = self.kv_lock()?;
        Ok(serde_json::to_string_pretty(&*kv)?)
    }

    pub fn fail_global_reads(&self, fail: bool) {
        self.fail_global.store(fail, Ordering::SeqCst);
    }

    pub fn fail_user_reads(&self, fail: bool) {
        self.fail_user.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make every write take `delay` before it lands.
    pub fn set_write_delay(&self, delay: Option<Duration>) {
        if let Ok(mut guard) = self.write_delay.lock() {
            *guard = delay;
        }
    }

    pub fn put<T: Serialize>(&self, key: &str, value: &T) -> Result<(), RemoteError> {
        let value = serde_json::to_value(value)?;
        self.kv_lock()?.insert(key.to_string(), value);
        Ok(())
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, RemoteError> {
        match self.kv_lock()?.get(key) {
            Some(Value::Null) | None => Ok(None),
            Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.kv_lock().map(|kv| kv.contains_key(key)).unwrap_or(false)
    }

    pub fn writes(&self) -> Vec<WriteRecord> {
        self.writes.lock().map(|w| w.clone()).unwrap_or_default()
    }

    pub fn writes_to(&self, path: &str) -> Vec<WriteRecord> {
        self.writes().into_iter().filter(|w| w.path == path).collect()
    }

    fn kv_lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Value>>, RemoteError> {
        self.kv
            .lock()
            .map_err(|_| RemoteError::Unavailable("store lock poisoned".to_string()))
    }

    fn check_read(&self, flag: &AtomicBool, what: &str) -> Result<(), RemoteError> {
        if flag.load(Ordering::SeqCst) {
            return Err(RemoteError::Status {
                status: 500,
                body: format!("{{\"error\":\"{} unavailable\"}}", what),
            });
        }
        Ok(())
    }

    async fn begin_write(&self) -> Result<(), RemoteError> {
        let delay = self.write_delay.lock().ok().and_then(|d| *d);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(RemoteError::Unavailable("write rejected".to_string()));
        }
        Ok(())
    }

    fn log_write<B: Serialize>(&self, path: &'static str, body: &B) -> Result<(), RemoteError> {
        let body = serde_json::to_value(body)?;
        if let Ok(mut writes) = self.writes.lock() {
            writes.push(WriteRecord { path, body });
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for MemoryRemoteStore {
    async fn health(&self) -> Result<(), RemoteError> {
        Ok(())
    }

    async fn fetch_global_config(
        &self,
        _session: Option<&Session>,
    ) -> Result<GlobalConfigRecord, RemoteError> {
        self.check_read(&self.fail_global, "global config")?;
        Ok(GlobalConfigRecord {
            narratives: self.get(NARRATIVES_KEY)?,
            quest_templates: self.get(QUEST_TEMPLATES_KEY)?,
            inventory_templates: self.get(INVENTORY_TEMPLATES_KEY)?,
        })
    }

    async fn save_narratives(
        &self,
        _session: &Session,
        narratives: &Narratives,
    ) -> Result<(), RemoteError> {
        self.begin_write().await?;
        let record = NarrativesRecord::from(narratives);
        self.put(NARRATIVES_KEY, &record)?;
        self.log_write("global/narratives", &record)
    }

    async fn save_global_quests(
        &self,
        _session: &Session,
        quests: &[Quest],
    ) -> Result<(), RemoteError> {
        self.begin_write().await?;
        self.put(QUEST_TEMPLATES_KEY, &quests)?;
        self.log_write("global/quests", &quests)
    }

    async fn save_global_inventory(
        &self,
        _session: &Session,
        inventory: &[Item],
    ) -> Result<(), RemoteError> {
        self.begin_write().await?;
        self.put(INVENTORY_TEMPLATES_KEY, &inventory)?;
        self.log_write("global/inventory", &inventory)
    }

    async fn fetch_user_data(&self, session: &Session) -> Result<UserDataRecord, RemoteError> {
        self.check_read(&self.fail_user, "user data")?;
        let id = &session.user_id;
        Ok(UserDataRecord {
            quests: self.get(&user_key(id, "quests"))?,
            inventory: self.get(&user_key(id, "inventory"))?,
            currencies: self.get(&user_key(id, "currencies"))?,
            messages: self.get(&user_key(id, "messages"))?,
            flags: self.get(&user_key(id, "flags"))?,
        })
    }

    async fn save_user_progress(
        &self,
        _session: &Session,
        save: &ProgressSave,
    ) -> Result<(), RemoteError> {
        self.begin_write().await?;
        let id = &save.user_id;
        if let Some(quests) = &save.quests {
            self.put(&user_key(id, "quests"), quests)?;
        }
        if let Some(inventory) = &save.inventory {
            self.put(&user_key(id, "inventory"), inventory)?;
        }
        if let Some(currencies) = &save.currencies {
            self.put(&user_key(id, "currencies"), currencies)?;
        }
        if let Some(messages) = &save.messages {
            self.put(&user_key(id, "messages"), messages)?;
        }
        if let Some(flags) = &save.flags {
            self.put(&user_key(id, "flags"), flags)?;
        }
        self.log_write("user/save", save)
    }

    async fn reset_user(&self, session: &Session) -> Result<(), RemoteError> {
        self.begin_write().await?;
        {
            let mut kv = self.kv_lock()?;
            for section in USER_SECTIONS {
                kv.remove(&user_key(&session.user_id, section));
            }
        }
        self.log_write("user/reset", &serde_json::json!({ "userId": session.user_id }))
    }
}
