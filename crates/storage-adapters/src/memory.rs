use async_trait::async_trait;
use dashmap::DashMap;
use domains::KeyValueStore;

/// Process-local key-value store. Share it behind an `Arc`.
#[derive(Debug, Default)]
pub struct MemoryKv {
    entries: DashMap<String, String>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKv {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.entries.get(key).map(|v| v.value().clone()))
    }

    async fn put(&self, key: &str, value: String) -> anyhow::Result<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    async fn put_many(&self, entries: Vec<(String, String)>) -> anyhow::Result<()> {
        for (key, value) in entries {
            self.entries.insert(key, value);
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> anyhow::Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}
