//! In-memory device registry.

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use crate::error::PushError;

use super::DeviceRepository;

/// Device identifiers mapped to row ids, held in process.
#[derive(Debug, Default)]
pub struct MemoryDeviceRepository {
    devices: DashMap<String, Uuid>,
}

impl MemoryDeviceRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, identifier: impl Into<String>, id: Uuid) {
        self.devices.insert(identifier.into(), id);
    }

    pub fn remove(&self, identifier: &str) -> Option<Uuid> {
        self.devices.remove(identifier).map(|(_, id)| id)
    }
}

#[async_trait]
impl DeviceRepository for MemoryDeviceRepository {
    async fn get_id_by_identifier(&self, identifier: &str) -> Result<Option<Uuid>, PushError> {
        Ok(self.devices.get(identifier).map(|entry| *entry.value()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lookup_hit_and_miss() {
        let repo = MemoryDeviceRepository::new();
        let id = Uuid::new_v4();
        repo.insert("device-abc", id);

        assert_eq!(repo.get_id_by_identifier("device-abc").await.unwrap(), Some(id));
        assert_eq!(repo.get_id_by_identifier("unknown").await.unwrap(), None);

        assert_eq!(repo.remove("device-abc"), Some(id));
        assert_eq!(repo.get_id_by_identifier("device-abc").await.unwrap(), None);
    }
}
