//! Entries section of the title page

use crate::{esc, ApiError, AppState};
use accountflow_core::TitleBalance;
use accountflow_store::{BillingAccount, Entry, PaymentMethod, Title};

const METHODS: [(PaymentMethod, &str); 4] = [
    (PaymentMethod::Pix, "Pix"),
    (PaymentMethod::Cash, "Dinheiro"),
    (PaymentMethod::Debit, "Débito"),
    (PaymentMethod::Credit, "Crédito"),
];

fn method_label(method: PaymentMethod) -> &'static str {
    METHODS
        .iter()
        .find(|(m, _)| *m == method)
        .map(|(_, label)| *label)
        .unwrap_or("-")
}

pub fn render_entries_section(
    state: &AppState,
    title: &Title,
    entries: &[Entry],
    balance: &TitleBalance,
    accounts: &[BillingAccount],
) -> String {
    let rows: Vec<String> = entries
        .iter()
        .map(|entry| {
            let account = entry
                .billing_account
                .as_ref()
                .and_then(|id| accounts.iter().find(|a| &a.id == id))
                .map(|a| format!("{} - {}", esc(&a.code), esc(&a.name)))
                .unwrap_or_else(|| "-".to_string());
            format!(
                r#"<tr class='border-b hover:bg-gray-50'>
                    <td class='px-4 py-2'>{paid_at}</td>
                    <td class='px-4 py-2'>{description}</td>
                    <td class='px-4 py-2'>{kind}</td>
                    <td class='px-4 py-2'>{method}</td>
                    <td class='px-4 py-2'>{account}</td>
                    <td class='px-4 py-2 text-right font-mono'>{amount}</td>
                    <td class='px-4 py-2 text-right'>
                        <button class='text-red-600 text-sm hover:underline' hx-delete='/entries/{id}' hx-target='#entries-section' hx-swap='outerHTML' hx-confirm='Remover o lançamento?'>Remover</button>
                    </td>
                </tr>"#,
                paid_at = entry.paid_at.map(|d| d.format("%d/%m/%Y").to_string()).unwrap_or_else(|| "Pendente".to_string()),
                description = esc(&entry.description),
                kind = entry.kind.label(),
                method = method_label(entry.payment_method),
                account = account,
                amount = state.money(entry.amount),
                id = esc(&entry.id),
            )
        })
        .collect();

    let body = if rows.is_empty() {
        "<tr><td colspan='7' class='px-4 py-6 text-center text-gray-500'>Nenhum lançamento</td></tr>".to_string()
    } else {
        rows.join("")
    };

    let account_options: String = accounts
        .iter()
        .map(|a| format!("<option value='{}'>{} - {}</option>", esc(&a.id), esc(&a.code), esc(&a.name)))
        .collect();
    let method_options: String = METHODS
        .iter()
        .map(|(m, label)| format!("<option value='{}'>{}</option>", m, label))
        .collect();

    format!(
        r#"<div id='entries-section'>
            <div class='grid grid-cols-3 gap-4 mb-6'>
                <div class='bg-blue-50 p-4 rounded-lg border border-blue-200'><p class='text-sm text-blue-600'>Valor</p><p class='text-xl font-bold text-blue-700'>{amount}</p></div>
                <div class='bg-green-50 p-4 rounded-lg border border-green-200'><p class='text-sm text-green-600'>Pago</p><p class='text-xl font-bold text-green-700'>{paid}</p></div>
                <div class='bg-yellow-50 p-4 rounded-lg border border-yellow-200'><p class='text-sm text-yellow-600'>Em aberto</p><p class='text-xl font-bold text-yellow-700'>{open}</p></div>
            </div>
            <div class='bg-white rounded-xl shadow-sm p-6 mb-6'>
                <h3 class='text-lg font-semibold mb-4'>Novo lançamento</h3>
                <form hx-post='/titles/{id}/entries' hx-target='#entries-section' hx-swap='outerHTML' class='grid grid-cols-1 md:grid-cols-4 gap-4'>
                    <input name='amount' type='number' step='0.01' min='0' placeholder='Valor' required class='px-3 py-2 border rounded-lg'>
                    <input name='paid_at' type='date' class='px-3 py-2 border rounded-lg'>
                    <select name='payment_method' class='px-3 py-2 border rounded-lg bg-white'>{methods}</select>
                    <select name='billing_account' class='px-3 py-2 border rounded-lg bg-white'><option value=''>Sem conta</option>{accounts}</select>
                    <input name='description' placeholder='Descrição' class='px-3 py-2 border rounded-lg md:col-span-3'>
                    <button class='px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>Registrar</button>
                </form>
            </div>
            <div class='bg-white rounded-xl shadow-sm p-6'>
                <table class='w-full text-sm'>
                    <thead><tr class='text-left text-gray-500 border-b'><th class='px-4 py-2'>Pagamento</th><th class='px-4 py-2'>Descrição</th><th class='px-4 py-2'>Tipo</th><th class='px-4 py-2'>Forma</th><th class='px-4 py-2'>Conta</th><th class='px-4 py-2 text-right'>Valor</th><th></th></tr></thead>
                    <tbody>{rows}</tbody>
                </table>
            </div>
        </div>"#,
        amount = state.money(balance.amount),
        paid = state.money(balance.paid),
        open = state.money(balance.open),
        id = esc(&title.id),
        methods = method_options,
        accounts = account_options,
        rows = body,
    )
}

/// Accounts offered to the entries of a title: the preset's plan when the
/// title has one, every plan otherwise
async fn entry_accounts(state: &AppState, title: &Title) -> Result<Vec<BillingAccount>, ApiError> {
    if let Some(preset) = &title.preset {
        if let Ok(preset) = state.flow.preset(preset).await {
            return Ok(state.flow.billing_accounts(&preset.billing_plan).await?);
        }
    }
    let mut accounts = Vec::new();
    for plan in state.flow.billing_plans().await? {
        accounts.extend(state.flow.billing_accounts(&plan.id).await?);
    }
    Ok(accounts)
}

/// Balance, entry form and entries of a title
pub async fn entries_section(state: &AppState, title: &Title) -> Result<String, ApiError> {
    let entries = state.flow.entries_by_title(&title.id).await?;
    let balance = state.flow.title_balance(&title.id).await?;
    let accounts = entry_accounts(state, title).await?;
    Ok(render_entries_section(state, title, &entries, &balance, &accounts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;

    #[tokio::test]
    async fn test_section_for_paid_title() {
        let state = demo_state();
        let title = state.flow.titles().await.unwrap().remove(0);
        let html = entries_section(&state, &title).await.unwrap();
        assert!(html.contains("1.1.1 - SERVIÇOS"));
        assert!(html.contains("R$ 5.000,00"));
        assert!(html.contains("R$ 0,00"));
        assert!(html.contains("<option value='pix'>Pix</option>"));
    }

    #[test]
    fn test_method_labels() {
        assert_eq!(method_label(PaymentMethod::Cash), "Dinheiro");
        assert_eq!(method_label(PaymentMethod::Credit), "Crédito");
    }
}
