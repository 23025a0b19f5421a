use std::collections::HashMap;
use std::sync::Mutex;
use anyhow::{anyhow, Result};
use crate::storage::area::StorageArea;

/// In‑memory storage area (no persistence). Used as a default when the host provides no storage.
#[derive(Default)]
pub struct InMemoryArea {
    map: Mutex<HashMap<String, String>>,
}

impl InMemoryArea {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageArea for InMemoryArea {
    fn get_item(&self, key: &str) -> Option<String> {
        self.map.lock().ok()?.get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.map
            .lock()
            .map_err(|_| anyhow!("in-memory area lock poisoned"))?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.map
            .lock()
            .map_err(|_| anyhow!("in-memory area lock poisoned"))?
            .remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.map
            .lock()
            .map_err(|_| anyhow!("in-memory area lock poisoned"))?
            .clear();
        Ok(())
    }

    fn len(&self) -> usize {
        self.map.lock().map(|m| m.len()).unwrap_or(0)
    }

    fn keys(&self) -> Vec<String> {
        let mut v: Vec<String> = match self.map.lock() {
            Ok(m) => m.keys().cloned().collect(),
            Err(_) => return vec![],
        };
        v.sort_unstable(); // stable order for deterministic tests
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::area::contract::assert_basic_contract;

    #[test]
    fn area_contract() {
        assert_basic_contract(&InMemoryArea::new());
    }

    #[test]
    fn separate_instances_do_not_share() {
        let a = InMemoryArea::new();
        let b = InMemoryArea::new();
        a.set_item("k", "v").unwrap();
        assert!(b.get_item("k").is_none());
    }
}
