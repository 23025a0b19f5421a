use anyhow::{bail, Result};
use crate::storage::area::StorageArea;

/// Storage area for hosts where persistence is blocked (privacy mode, quota
/// exhausted, storage disabled by policy).
///
/// Reads return nothing and every write fails, so callers exercise their
/// recovery path while keeping state in memory.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledArea;

impl DisabledArea {
    pub fn new() -> Self {
        Self
    }
}

impl StorageArea for DisabledArea {
    fn get_item(&self, _key: &str) -> Option<String> {
        None
    }

    fn set_item(&self, key: &str, _value: &str) -> Result<()> {
        bail!("storage is disabled, cannot write '{key}'")
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        bail!("storage is disabled, cannot remove '{key}'")
    }

    fn clear(&self) -> Result<()> {
        bail!("storage is disabled, cannot clear")
    }

    fn len(&self) -> usize {
        0
    }

    fn keys(&self) -> Vec<String> {
        vec![]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_write_fails() {
        let area = DisabledArea::new();
        assert!(area.set_item("k", "v").is_err());
        assert!(area.remove_item("k").is_err());
        assert!(area.clear().is_err());
        assert!(area.get_item("k").is_none());
        assert!(area.is_empty());
    }
}
