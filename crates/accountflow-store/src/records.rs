//! Persisted records

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{AccountType, CompanyKind, FlowKind, PaymentMethod, RecurrencePeriod};

/// Named container for a chart of accounts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingPlan {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// One node of a chart of accounts, stored flat with a parent pointer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingAccount {
    pub id: String,
    pub name: String,
    /// Dotted classification code, e.g. "1.2.3"
    pub code: String,
    /// Depth level, 1 for roots
    pub degree: u8,
    #[serde(default)]
    pub account_type: AccountType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub billing_plan: String,
}

impl BillingAccount {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Saved set of accounts used to prefill titles and entries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPreset {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub billing_plan: String,
    #[serde(default)]
    pub payable_account: Option<String>,
    #[serde(default)]
    pub receivable_account: Option<String>,
    #[serde(default)]
    pub revenue_account: Option<String>,
    #[serde(default)]
    pub expense_account: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// Receivable or payable obligation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Title {
    pub id: String,
    pub description: String,
    pub kind: FlowKind,
    pub amount: Decimal,
    pub expiration_date: NaiveDate,
    #[serde(default)]
    pub fees_percentage_monthly: Option<Decimal>,
    #[serde(default)]
    pub installments: Option<u32>,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub recurrence: bool,
    #[serde(default)]
    pub recurrence_period: Option<RecurrencePeriod>,
    pub company: String,
    #[serde(default)]
    pub preset: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payment or receipt recorded against a title
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub kind: FlowKind,
    pub amount: Decimal,
    #[serde(default)]
    pub paid_at: Option<NaiveDate>,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub billing_account: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Postal address of a company
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Address {
    pub zip_code: String,
    pub street: String,
    pub number: String,
    #[serde(default)]
    pub complement: Option<String>,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - ({}/{})", self.zip_code, self.city, self.state)
    }
}

/// Registered company (client and/or supplier)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: String,
    pub cnpj: String,
    pub fantasy_name: String,
    pub social_reason: String,
    pub opening_date: NaiveDate,
    #[serde(default)]
    pub cnae: String,
    pub address: Address,
    pub kind: CompanyKind,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

/// Every record the store holds
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreData {
    #[serde(default)]
    pub billing_plans: Vec<BillingPlan>,
    #[serde(default)]
    pub billing_accounts: Vec<BillingAccount>,
    #[serde(default)]
    pub presets: Vec<HistoryPreset>,
    #[serde(default)]
    pub titles: Vec<Title>,
    #[serde(default)]
    pub entries: Vec<Entry>,
    #[serde(default)]
    pub companies: Vec<Company>,
}
