use std::path::{Path, PathBuf};

use async_trait::async_trait;
use funnel_board::store::{LeadStore, StoreError};
use funnel_core::types::{Lead, LeadId, StageKey};
use tokio::sync::RwLock;

/// Lead store backed by a JSON array on disk. Every persisted status change
/// rewrites the whole file.
pub struct JsonFileLeadStore {
    path: PathBuf,
    leads: RwLock<Vec<Lead>>,
}

impl JsonFileLeadStore {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let text = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| StoreError::Unavailable(format!("{}: {e}", path.display())))?;
        let leads: Vec<Lead> = serde_json::from_str(&text)
            .map_err(|e| StoreError::Unavailable(format!("{}: {e}", path.display())))?;
        tracing::debug!(path = %path.display(), leads = leads.len(), "lead file opened");
        Ok(Self {
            path,
            leads: RwLock::new(leads),
        })
    }
}

#[async_trait]
impl LeadStore for JsonFileLeadStore {
    async fn list(&self) -> Result<Vec<Lead>, StoreError> {
        Ok(self.leads.read().await.clone())
    }

    async fn persist_status(&self, id: &LeadId, target: &StageKey) -> Result<(), StoreError> {
        let mut leads = self.leads.write().await;
        let lead = leads
            .iter_mut()
            .find(|l| &l.id == id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        let previous = std::mem::replace(&mut lead.status, target.clone());

        let written = match serde_json::to_string_pretty(&*leads) {
            Ok(text) => tokio::fs::write(&self.path, text)
                .await
                .map_err(|e| StoreError::Unavailable(e.to_string())),
            Err(e) => Err(StoreError::Rejected(e.to_string())),
        };
        if written.is_err() {
            if let Some(lead) = leads.iter_mut().find(|l| &l.id == id) {
                lead.status = previous;
            }
        }
        written
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_leads(dir: &Path) -> PathBuf {
        let path = dir.join("leads.json");
        let leads = vec![
            Lead::new("1", "Ada", "ada@example.com", "new").with_value(1000.0),
            Lead::new("2", "Grace", "grace@example.com", "customer"),
        ];
        std::fs::write(&path, serde_json::to_string(&leads).unwrap()).unwrap();
        path
    }

    #[tokio::test]
    async fn test_open_and_list() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileLeadStore::open(write_leads(dir.path())).await.unwrap();
        let leads = store.list().await.unwrap();
        assert_eq!(leads.len(), 2);
        assert_eq!(leads[0].value, Some(1000.0));
    }

    #[tokio::test]
    async fn test_persist_rewrites_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_leads(dir.path());
        let store = JsonFileLeadStore::open(&path).await.unwrap();
        store
            .persist_status(&LeadId::from("1"), &StageKey::from("qualified"))
            .await
            .unwrap();

        let reopened = JsonFileLeadStore::open(&path).await.unwrap();
        let leads = reopened.list().await.unwrap();
        assert_eq!(leads[0].status, "qualified");
        assert_eq!(leads[1].status, "customer");
    }

    #[tokio::test]
    async fn test_unknown_lead() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileLeadStore::open(write_leads(dir.path())).await.unwrap();
        let err = store
            .persist_status(&LeadId::from("9"), &StageKey::from("lost"))
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::NotFound(LeadId::from("9")));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = JsonFileLeadStore::open(dir.path().join("none.json"))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_malformed_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leads.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = JsonFileLeadStore::open(&path).await.err().unwrap();
        assert!(matches!(err, StoreError::Unavailable(_)));
        assert!(err.reason().contains("leads.json"));
    }
}
