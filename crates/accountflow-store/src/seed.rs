//! Demo records for a fresh installation

use accountflow_utils::generate_id;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::records::{
    Address, BillingAccount, BillingPlan, Company, Entry, HistoryPreset, StoreData, Title,
};
use crate::types::{AccountType, CompanyKind, FlowKind, PaymentMethod};

struct ChartBuilder {
    plan: String,
    accounts: Vec<BillingAccount>,
}

impl ChartBuilder {
    fn add(&mut self, parent: Option<&str>, code: &str, name: &str, account_type: AccountType) -> String {
        let id = generate_id();
        self.accounts.push(BillingAccount {
            id: id.clone(),
            name: name.to_string(),
            code: code.to_string(),
            degree: code.split('.').count() as u8,
            account_type,
            parent_id: parent.map(str::to_string),
            billing_plan: self.plan.clone(),
        });
        id
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

/// Demo plan with a two-level chart, a preset, one company and a few
/// titles with entries spread over two months.
pub fn demo_data() -> StoreData {
    let plan = BillingPlan {
        id: generate_id(),
        name: "PLANO DEMO".to_string(),
        description: "Plano de contas de demonstração".to_string(),
    };

    let mut chart = ChartBuilder {
        plan: plan.id.clone(),
        accounts: Vec::new(),
    };
    use AccountType::{Analytic, Synthetic};

    let receitas = chart.add(None, "1", "RECEITAS", Synthetic);
    let operacionais = chart.add(Some(&receitas), "1.1", "RECEITAS OPERACIONAIS", Synthetic);
    let servicos = chart.add(Some(&operacionais), "1.1.1", "SERVIÇOS", Analytic);
    let produtos = chart.add(Some(&operacionais), "1.1.2", "PRODUTOS", Analytic);
    let financeiras = chart.add(Some(&receitas), "1.2", "RECEITAS FINANCEIRAS", Synthetic);
    let juros = chart.add(Some(&financeiras), "1.2.1", "JUROS", Analytic);
    let recebimentos = chart.add(Some(&receitas), "1.3", "RECEBIMENTOS", Analytic);

    let despesas = chart.add(None, "2", "DESPESAS", Synthetic);
    let desp_operacionais = chart.add(Some(&despesas), "2.1", "DESPESAS OPERACIONAIS", Synthetic);
    let custos = chart.add(Some(&desp_operacionais), "2.1.1", "CUSTOS VARIÁVEIS", Analytic);
    let operacional = chart.add(Some(&desp_operacionais), "2.1.2", "OPERACIONAIS", Analytic);
    let administrativas = chart.add(Some(&despesas), "2.2", "DESPESAS ADMINISTRATIVAS", Synthetic);
    let administrativos = chart.add(Some(&administrativas), "2.2.1", "ADMINISTRATIVOS", Analytic);
    let pagamentos = chart.add(Some(&despesas), "2.3", "PAGAMENTOS", Analytic);

    let preset = HistoryPreset {
        id: generate_id(),
        name: "PADRÃO".to_string(),
        description: "Contas padrão para títulos".to_string(),
        billing_plan: plan.id.clone(),
        payable_account: Some(pagamentos.clone()),
        receivable_account: Some(recebimentos.clone()),
        revenue_account: Some(servicos.clone()),
        expense_account: Some(operacional.clone()),
        active: true,
    };

    let company = Company {
        id: generate_id(),
        cnpj: "12.345.678/0001-90".to_string(),
        fantasy_name: "DEMO".to_string(),
        social_reason: "Demo LTDA".to_string(),
        opening_date: date(2020, 1, 15),
        cnae: "6201-5/01".to_string(),
        address: Address {
            zip_code: "85883-000".to_string(),
            street: "Rua Principal".to_string(),
            number: "100".to_string(),
            complement: None,
            neighborhood: "Centro".to_string(),
            city: "Ibema".to_string(),
            state: "PR".to_string(),
        },
        kind: CompanyKind::Both,
        email: "contato@demo.com.br".to_string(),
        phone: "(45) 3000-0000".to_string(),
    };

    let now = Utc::now();
    let mut titles = Vec::new();
    let mut entries = Vec::new();
    let postings: [(&str, FlowKind, i64, NaiveDate, &String, PaymentMethod); 7] = [
        ("Consultoria janeiro", FlowKind::Income, 5_000_00, date(2024, 1, 10), &servicos, PaymentMethod::Pix),
        ("Venda de produtos", FlowKind::Income, 2_500_00, date(2024, 1, 22), &produtos, PaymentMethod::Credit),
        ("Rendimento aplicação", FlowKind::Income, 120_50, date(2024, 2, 5), &juros, PaymentMethod::Pix),
        ("Consultoria fevereiro", FlowKind::Income, 5_000_00, date(2024, 2, 10), &servicos, PaymentMethod::Pix),
        ("Matéria-prima", FlowKind::Expense, 1_800_00, date(2024, 1, 15), &custos, PaymentMethod::Debit),
        ("Aluguel", FlowKind::Expense, 2_000_00, date(2024, 2, 1), &administrativos, PaymentMethod::Cash),
        ("Energia elétrica", FlowKind::Expense, 450_75, date(2024, 2, 12), &operacional, PaymentMethod::Debit),
    ];
    for (description, kind, cents, paid_at, account, method) in postings {
        let amount = Decimal::new(cents, 2);
        let title = Title {
            id: generate_id(),
            description: description.to_string(),
            kind,
            amount,
            expiration_date: paid_at,
            fees_percentage_monthly: None,
            installments: Some(1),
            active: true,
            recurrence: false,
            recurrence_period: None,
            company: company.id.clone(),
            preset: Some(preset.id.clone()),
            created_at: now,
            updated_at: now,
        };
        entries.push(Entry {
            id: generate_id(),
            title: title.id.clone(),
            description: description.to_string(),
            kind,
            amount,
            paid_at: Some(paid_at),
            payment_method: method,
            billing_account: Some(account.clone()),
            created_at: now,
        });
        titles.push(title);
    }

    StoreData {
        billing_plans: vec![plan],
        billing_accounts: chart.accounts,
        presets: vec![preset],
        titles,
        entries,
        companies: vec![company],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_chart_is_consistent() {
        let data = demo_data();
        let accounts = &data.billing_accounts;
        for account in accounts {
            match &account.parent_id {
                None => assert_eq!(account.degree, 1),
                Some(parent_id) => {
                    let parent = accounts.iter().find(|a| &a.id == parent_id).unwrap();
                    assert_eq!(account.degree, parent.degree + 1);
                    assert!(account.code.starts_with(&format!("{}.", parent.code)));
                    assert_eq!(parent.account_type, AccountType::Synthetic);
                }
            }
        }
    }

    #[test]
    fn test_demo_entries_reference_titles() {
        let data = demo_data();
        assert_eq!(data.titles.len(), data.entries.len());
        for entry in &data.entries {
            assert!(data.titles.iter().any(|t| t.id == entry.title));
        }
    }
}
