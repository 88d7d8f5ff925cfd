//! Enumerations shared by the records

use serde::{Deserialize, Serialize};

/// Billing account type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Branch account, aggregates its children
    Synthetic,
    /// Leaf account, target of postings
    Analytic,
}

impl Default for AccountType {
    fn default() -> Self {
        AccountType::Analytic
    }
}

impl AccountType {
    /// Label shown in the tables
    pub fn label(&self) -> &'static str {
        match self {
            AccountType::Synthetic => "Sintética",
            AccountType::Analytic => "Analítica",
        }
    }
}

impl std::str::FromStr for AccountType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "synthetic" | "sintética" | "sintetica" => Ok(AccountType::Synthetic),
            "analytic" | "analítica" | "analitica" => Ok(AccountType::Analytic),
            _ => Err(format!("Invalid account type: {}", s)),
        }
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccountType::Synthetic => write!(f, "synthetic"),
            AccountType::Analytic => write!(f, "analytic"),
        }
    }
}

/// Direction of a title or entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowKind {
    /// Receivable / receipt
    Income,
    /// Payable / payment
    Expense,
}

impl FlowKind {
    pub fn label(&self) -> &'static str {
        match self {
            FlowKind::Income => "Receita",
            FlowKind::Expense => "Despesa",
        }
    }
}

impl std::str::FromStr for FlowKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" | "receivable" => Ok(FlowKind::Income),
            "expense" | "payable" => Ok(FlowKind::Expense),
            _ => Err(format!("Invalid type: {}", s)),
        }
    }
}

impl std::fmt::Display for FlowKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FlowKind::Income => write!(f, "income"),
            FlowKind::Expense => write!(f, "expense"),
        }
    }
}

/// How an entry was paid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Debit,
    Credit,
    Pix,
}

impl Default for PaymentMethod {
    fn default() -> Self {
        PaymentMethod::Pix
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cash" => Ok(PaymentMethod::Cash),
            "debit" => Ok(PaymentMethod::Debit),
            "credit" => Ok(PaymentMethod::Credit),
            "pix" => Ok(PaymentMethod::Pix),
            _ => Err(format!("Invalid payment method: {}", s)),
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::Cash => write!(f, "cash"),
            PaymentMethod::Debit => write!(f, "debit"),
            PaymentMethod::Credit => write!(f, "credit"),
            PaymentMethod::Pix => write!(f, "pix"),
        }
    }
}

/// Recurrence period of a title
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrencePeriod {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl std::str::FromStr for RecurrencePeriod {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(RecurrencePeriod::Daily),
            "weekly" => Ok(RecurrencePeriod::Weekly),
            "monthly" => Ok(RecurrencePeriod::Monthly),
            "yearly" => Ok(RecurrencePeriod::Yearly),
            _ => Err(format!("Invalid recurrence period: {}", s)),
        }
    }
}

impl std::fmt::Display for RecurrencePeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecurrencePeriod::Daily => write!(f, "daily"),
            RecurrencePeriod::Weekly => write!(f, "weekly"),
            RecurrencePeriod::Monthly => write!(f, "monthly"),
            RecurrencePeriod::Yearly => write!(f, "yearly"),
        }
    }
}

/// Relationship of a company with the business
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompanyKind {
    Client,
    Supplier,
    Both,
}

impl Default for CompanyKind {
    fn default() -> Self {
        CompanyKind::Client
    }
}

impl std::str::FromStr for CompanyKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "client" => Ok(CompanyKind::Client),
            "supplier" => Ok(CompanyKind::Supplier),
            "both" => Ok(CompanyKind::Both),
            _ => Err(format!("Invalid company type: {}", s)),
        }
    }
}

impl std::fmt::Display for CompanyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompanyKind::Client => write!(f, "Client"),
            CompanyKind::Supplier => write!(f, "Supplier"),
            CompanyKind::Both => write!(f, "Both"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_type_from_str() {
        assert_eq!("synthetic".parse::<AccountType>().unwrap(), AccountType::Synthetic);
        assert_eq!("Analítica".parse::<AccountType>().unwrap(), AccountType::Analytic);
        assert!("branch".parse::<AccountType>().is_err());
    }

    #[test]
    fn test_account_type_serde() {
        let json = serde_json::to_string(&AccountType::Synthetic).unwrap();
        assert_eq!(json, "\"synthetic\"");
    }

    #[test]
    fn test_flow_kind_round_trip_display() {
        for kind in [FlowKind::Income, FlowKind::Expense] {
            assert_eq!(kind.to_string().parse::<FlowKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_payment_method_from_str() {
        assert_eq!("PIX".parse::<PaymentMethod>().unwrap(), PaymentMethod::Pix);
        assert!("cheque".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn test_company_kind_serde_keeps_case() {
        let json = serde_json::to_string(&CompanyKind::Supplier).unwrap();
        assert_eq!(json, "\"Supplier\"");
    }
}
