//! In-memory store mirrored to a JSON snapshot

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::records::{BillingAccount, BillingPlan, Company, Entry, HistoryPreset, StoreData, Title};
use crate::AccountFlowStore;

/// Records addressable by id
trait Record: Clone {
    const KIND: &'static str;
    fn id(&self) -> &str;
}

macro_rules! record {
    ($ty:ty, $kind:literal) => {
        impl Record for $ty {
            const KIND: &'static str = $kind;
            fn id(&self) -> &str {
                &self.id
            }
        }
    };
}

record!(BillingPlan, "Billing plan");
record!(BillingAccount, "Billing account");
record!(HistoryPreset, "History preset");
record!(Title, "Title");
record!(Entry, "Entry");
record!(Company, "Company");

fn find<T: Record>(items: &[T], id: &str) -> StoreResult<T> {
    items
        .iter()
        .find(|item| item.id() == id)
        .cloned()
        .ok_or_else(|| StoreError::not_found(T::KIND, id))
}

fn insert<T: Record>(items: &mut Vec<T>, record: T) -> T {
    items.push(record.clone());
    record
}

fn replace<T: Record>(items: &mut [T], record: T) -> StoreResult<T> {
    let slot = items
        .iter_mut()
        .find(|item| item.id() == record.id())
        .ok_or_else(|| StoreError::not_found(T::KIND, record.id()))?;
    *slot = record.clone();
    Ok(record)
}

fn remove<T: Record>(items: &mut Vec<T>, id: &str) -> StoreResult<()> {
    let before = items.len();
    items.retain(|item| item.id() != id);
    if items.len() == before {
        return Err(StoreError::not_found(T::KIND, id));
    }
    Ok(())
}

/// Store keeping every record in memory
pub struct MemoryStore {
    data: RwLock<StoreData>,
    snapshot: Option<PathBuf>,
    autosave: bool,
    // Held across copy, write and rename of the snapshot file
    save_lock: tokio::sync::Mutex<()>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Empty store without a snapshot file
    pub fn new() -> Self {
        Self::with_data(StoreData::default())
    }

    /// Store pre-filled with records, without a snapshot file
    pub fn with_data(data: StoreData) -> Self {
        Self {
            data: RwLock::new(data),
            snapshot: None,
            autosave: false,
            save_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Open a snapshot file. A missing file yields an empty store that will
    /// create the file on the first save.
    pub async fn open(path: PathBuf, autosave: bool) -> StoreResult<Self> {
        let data = if tokio::fs::try_exists(&path).await? {
            let content = tokio::fs::read_to_string(&path).await?;
            let data: StoreData = serde_json::from_str(&content)?;
            log::info!(
                target: "accountflow::store",
                "Loaded snapshot {}: {} plans, {} accounts, {} titles, {} entries",
                path.display(),
                data.billing_plans.len(),
                data.billing_accounts.len(),
                data.titles.len(),
                data.entries.len()
            );
            data
        } else {
            log::warn!(target: "accountflow::store", "Snapshot {} not found, starting empty", path.display());
            StoreData::default()
        };

        Ok(Self {
            data: RwLock::new(data),
            snapshot: Some(path),
            autosave,
            save_lock: tokio::sync::Mutex::new(()),
        })
    }

    /// Whether the store holds no plans, accounts or companies
    pub fn is_empty(&self) -> StoreResult<bool> {
        self.read(|data| {
            data.billing_plans.is_empty() && data.billing_accounts.is_empty() && data.companies.is_empty()
        })
    }

    /// Copy of every record
    pub fn snapshot(&self) -> StoreResult<StoreData> {
        self.read(|data| data.clone())
    }

    /// Replace every record
    pub async fn replace_all(&self, data: StoreData) -> StoreResult<()> {
        self.write(|current| *current = data)?;
        self.persist().await
    }

    /// Write the snapshot file
    pub async fn save(&self) -> StoreResult<()> {
        let Some(path) = self.snapshot.as_ref() else {
            return Ok(());
        };
        let _guard = self.save_lock.lock().await;
        let content = serde_json::to_string_pretty(&self.snapshot()?)?;
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                tokio::fs::create_dir_all(dir).await?;
            }
        }
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, content).await?;
        tokio::fs::rename(&tmp, path).await?;
        log::debug!(target: "accountflow::store", "Snapshot written to {}", path.display());
        Ok(())
    }

    async fn persist(&self) -> StoreResult<()> {
        if self.autosave {
            self.save().await?;
        }
        Ok(())
    }

    fn read<R>(&self, f: impl FnOnce(&StoreData) -> R) -> StoreResult<R> {
        let data = self.data.read().map_err(|_| StoreError::Poisoned)?;
        Ok(f(&data))
    }

    fn write<R>(&self, f: impl FnOnce(&mut StoreData) -> R) -> StoreResult<R> {
        let mut data = self.data.write().map_err(|_| StoreError::Poisoned)?;
        Ok(f(&mut data))
    }
}

#[async_trait]
impl AccountFlowStore for MemoryStore {
    async fn billing_plans(&self) -> StoreResult<Vec<BillingPlan>> {
        self.read(|data| data.billing_plans.clone())
    }

    async fn billing_plan(&self, id: &str) -> StoreResult<BillingPlan> {
        self.read(|data| find(&data.billing_plans, id))?
    }

    async fn create_billing_plan(&self, plan: BillingPlan) -> StoreResult<BillingPlan> {
        let plan = self.write(|data| insert(&mut data.billing_plans, plan))?;
        self.persist().await?;
        Ok(plan)
    }

    async fn update_billing_plan(&self, plan: BillingPlan) -> StoreResult<BillingPlan> {
        let plan = self.write(|data| replace(&mut data.billing_plans, plan))??;
        self.persist().await?;
        Ok(plan)
    }

    async fn delete_billing_plan(&self, id: &str) -> StoreResult<()> {
        self.write(|data| {
            remove(&mut data.billing_plans, id)?;
            data.billing_accounts.retain(|a| a.billing_plan != id);
            data.presets.retain(|p| p.billing_plan != id);
            Ok::<(), StoreError>(())
        })??;
        self.persist().await
    }

    async fn billing_accounts(&self, plan_id: &str) -> StoreResult<Vec<BillingAccount>> {
        self.read(|data| {
            data.billing_accounts
                .iter()
                .filter(|a| a.billing_plan == plan_id)
                .cloned()
                .collect()
        })
    }

    async fn billing_account(&self, id: &str) -> StoreResult<BillingAccount> {
        self.read(|data| find(&data.billing_accounts, id))?
    }

    async fn create_billing_account(&self, account: BillingAccount) -> StoreResult<BillingAccount> {
        let account = self.write(|data| insert(&mut data.billing_accounts, account))?;
        self.persist().await?;
        Ok(account)
    }

    async fn update_billing_account(&self, account: BillingAccount) -> StoreResult<BillingAccount> {
        let account = self.write(|data| replace(&mut data.billing_accounts, account))??;
        self.persist().await?;
        Ok(account)
    }

    async fn delete_billing_account(&self, id: &str) -> StoreResult<()> {
        self.write(|data| remove(&mut data.billing_accounts, id))??;
        self.persist().await
    }

    async fn presets(&self) -> StoreResult<Vec<HistoryPreset>> {
        self.read(|data| data.presets.clone())
    }

    async fn preset(&self, id: &str) -> StoreResult<HistoryPreset> {
        self.read(|data| find(&data.presets, id))?
    }

    async fn create_preset(&self, preset: HistoryPreset) -> StoreResult<HistoryPreset> {
        let preset = self.write(|data| insert(&mut data.presets, preset))?;
        self.persist().await?;
        Ok(preset)
    }

    async fn update_preset(&self, preset: HistoryPreset) -> StoreResult<HistoryPreset> {
        let preset = self.write(|data| replace(&mut data.presets, preset))??;
        self.persist().await?;
        Ok(preset)
    }

    async fn delete_preset(&self, id: &str) -> StoreResult<()> {
        self.write(|data| remove(&mut data.presets, id))??;
        self.persist().await
    }

    async fn titles(&self) -> StoreResult<Vec<Title>> {
        self.read(|data| data.titles.clone())
    }

    async fn title(&self, id: &str) -> StoreResult<Title> {
        self.read(|data| find(&data.titles, id))?
    }

    async fn create_title(&self, title: Title) -> StoreResult<Title> {
        let title = self.write(|data| insert(&mut data.titles, title))?;
        self.persist().await?;
        Ok(title)
    }

    async fn update_title(&self, title: Title) -> StoreResult<Title> {
        let title = self.write(|data| replace(&mut data.titles, title))??;
        self.persist().await?;
        Ok(title)
    }

    async fn delete_title(&self, id: &str) -> StoreResult<()> {
        self.write(|data| {
            remove(&mut data.titles, id)?;
            data.entries.retain(|e| e.title != id);
            Ok::<(), StoreError>(())
        })??;
        self.persist().await
    }

    async fn entries_by_title(&self, title_id: &str) -> StoreResult<Vec<Entry>> {
        let mut entries: Vec<Entry> = self.read(|data| {
            data.entries
                .iter()
                .filter(|e| e.title == title_id)
                .cloned()
                .collect()
        })?;
        entries.sort_by(|a, b| b.paid_at.cmp(&a.paid_at));
        Ok(entries)
    }

    async fn entries(&self) -> StoreResult<Vec<Entry>> {
        self.read(|data| data.entries.clone())
    }

    async fn entry(&self, id: &str) -> StoreResult<Entry> {
        self.read(|data| find(&data.entries, id))?
    }

    async fn create_entry(&self, entry: Entry) -> StoreResult<Entry> {
        let entry = self.write(|data| insert(&mut data.entries, entry))?;
        self.persist().await?;
        Ok(entry)
    }

    async fn update_entry(&self, entry: Entry) -> StoreResult<Entry> {
        let entry = self.write(|data| replace(&mut data.entries, entry))??;
        self.persist().await?;
        Ok(entry)
    }

    async fn delete_entry(&self, id: &str) -> StoreResult<()> {
        self.write(|data| remove(&mut data.entries, id))??;
        self.persist().await
    }

    async fn companies(&self) -> StoreResult<Vec<Company>> {
        self.read(|data| data.companies.clone())
    }

    async fn company(&self, id: &str) -> StoreResult<Company> {
        self.read(|data| find(&data.companies, id))?
    }

    async fn create_company(&self, company: Company) -> StoreResult<Company> {
        let company = self.write(|data| insert(&mut data.companies, company))?;
        self.persist().await?;
        Ok(company)
    }

    async fn update_company(&self, company: Company) -> StoreResult<Company> {
        let company = self.write(|data| replace(&mut data.companies, company))??;
        self.persist().await?;
        Ok(company)
    }

    async fn delete_company(&self, id: &str) -> StoreResult<()> {
        self.write(|data| {
            remove(&mut data.companies, id)?;
            let titles: Vec<String> = data
                .titles
                .iter()
                .filter(|t| t.company == id)
                .map(|t| t.id.clone())
                .collect();
            data.titles.retain(|t| t.company != id);
            data.entries.retain(|e| !titles.contains(&e.title));
            Ok::<(), StoreError>(())
        })??;
        self.persist().await
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AccountType, FlowKind, PaymentMethod};
    use chrono::{NaiveDate, Utc};
    use rust_decimal::Decimal;

    fn plan(id: &str) -> BillingPlan {
        BillingPlan {
            id: id.to_string(),
            name: "PLANO".to_string(),
            description: String::new(),
        }
    }

    fn account(id: &str, plan: &str, parent: Option<&str>) -> BillingAccount {
        BillingAccount {
            id: id.to_string(),
            name: id.to_uppercase(),
            code: "1".to_string(),
            degree: 1,
            account_type: AccountType::Analytic,
            parent_id: parent.map(str::to_string),
            billing_plan: plan.to_string(),
        }
    }

    fn entry(id: &str, title: &str, paid_at: Option<NaiveDate>) -> Entry {
        Entry {
            id: id.to_string(),
            title: title.to_string(),
            description: String::new(),
            kind: FlowKind::Income,
            amount: Decimal::new(1000, 2),
            paid_at,
            payment_method: PaymentMethod::Pix,
            billing_account: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_plan_crud() {
        let store = MemoryStore::new();
        store.create_billing_plan(plan("p1")).await.unwrap();
        let mut p = store.billing_plan("p1").await.unwrap();
        p.name = "OUTRO".to_string();
        store.update_billing_plan(p).await.unwrap();
        assert_eq!(store.billing_plans().await.unwrap()[0].name, "OUTRO");

        store.delete_billing_plan("p1").await.unwrap();
        assert!(store.billing_plans().await.unwrap().is_empty());
        assert!(matches!(
            store.delete_billing_plan("p1").await,
            Err(StoreError::NotFound { kind: "Billing plan", .. })
        ));
    }

    #[tokio::test]
    async fn test_accounts_filtered_by_plan_in_insertion_order() {
        let store = MemoryStore::new();
        for (id, plan_id) in [("a", "p1"), ("b", "p2"), ("c", "p1")] {
            store.create_billing_account(account(id, plan_id, None)).await.unwrap();
        }
        let ids: Vec<String> = store
            .billing_accounts("p1")
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[tokio::test]
    async fn test_delete_plan_cascades_accounts() {
        let store = MemoryStore::new();
        store.create_billing_plan(plan("p1")).await.unwrap();
        store.create_billing_account(account("a", "p1", None)).await.unwrap();
        store.delete_billing_plan("p1").await.unwrap();
        assert!(store.billing_accounts("p1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_unknown_account_fails() {
        let store = MemoryStore::new();
        let err = store.update_billing_account(account("x", "p1", None)).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_entries_newest_first() {
        let store = MemoryStore::new();
        let d = |day| NaiveDate::from_ymd_opt(2024, 3, day);
        store.create_entry(entry("e1", "t1", d(1))).await.unwrap();
        store.create_entry(entry("e2", "t1", None)).await.unwrap();
        store.create_entry(entry("e3", "t1", d(20))).await.unwrap();
        store.create_entry(entry("e4", "t2", d(5))).await.unwrap();

        let ids: Vec<String> = store
            .entries_by_title("t1")
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec!["e3", "e1", "e2"]);
    }

    #[tokio::test]
    async fn test_snapshot_round_trip() {
        let dir = std::env::temp_dir().join(format!("accountflow-store-{}", accountflow_utils::generate_id()));
        let path = dir.join("snapshot.json");

        let store = MemoryStore::open(path.clone(), true).await.unwrap();
        assert!(store.is_empty().unwrap());
        store.create_billing_plan(plan("p1")).await.unwrap();
        store.create_billing_account(account("a", "p1", None)).await.unwrap();

        let reopened = MemoryStore::open(path, false).await.unwrap();
        assert_eq!(reopened.snapshot().unwrap(), store.snapshot().unwrap());

        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_autosaves_all_succeed() {
        let dir = std::env::temp_dir().join(format!("accountflow-store-{}", accountflow_utils::generate_id()));
        let path = dir.join("snapshot.json");
        let store = std::sync::Arc::new(MemoryStore::open(path.clone(), true).await.unwrap());

        let handles: Vec<_> = (0..100)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move { store.create_billing_plan(plan(&format!("p{}", i))).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let reopened = MemoryStore::open(path, false).await.unwrap();
        assert_eq!(reopened.billing_plans().await.unwrap().len(), 100);

        let _ = std::fs::remove_dir_all(dir);
    }
}
