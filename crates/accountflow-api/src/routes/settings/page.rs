//! Settings page rendering - Full page endpoints

use crate::{esc, AppState};

fn on_off(flag: bool) -> &'static str {
    if flag {
        "Ativado"
    } else {
        "Desativado"
    }
}

pub async fn page_settings(
    state: axum::extract::State<AppState>,
    headers: axum::http::HeaderMap,
) -> axum::response::Html<String> {
    let config = &state.config;

    let cors = if config.server.cors_origins.is_empty() {
        "Nenhuma".to_string()
    } else {
        config.server.cors_origins.join(", ")
    };

    let inner_content = format!(
        r#"<div class='mb-6'><h2 class='text-2xl font-bold'>Configurações</h2></div>
        <div class='bg-white rounded-xl shadow-sm p-6 mb-6'>
            <h3 class='text-lg font-semibold mb-4'>Servidor</h3>
            <div class='grid grid-cols-3 gap-4'>
                <div><p class='text-sm text-gray-500'>Endereço</p><p class='font-medium'>{host}</p></div>
                <div><p class='text-sm text-gray-500'>Porta</p><p class='font-medium'>{port}</p></div>
                <div><p class='text-sm text-gray-500'>Origens CORS</p><p class='font-medium'>{cors}</p></div>
            </div>
        </div>
        <div class='bg-white rounded-xl shadow-sm p-6 mb-6'>
            <h3 class='text-lg font-semibold mb-4'>Dados</h3>
            <div class='grid grid-cols-2 gap-4'>
                <div><p class='text-sm text-gray-500'>Arquivo</p><p class='font-medium font-mono'>{store}</p></div>
                <div><p class='text-sm text-gray-500'>Salvamento automático</p><p class='font-medium'>{autosave}</p></div>
                <div><p class='text-sm text-gray-500'>Dados de demonstração</p><p class='font-medium'>{seed}</p></div>
            </div>
        </div>
        <div class='bg-white rounded-xl shadow-sm p-6 mb-6'>
            <h3 class='text-lg font-semibold mb-4'>Plano de contas</h3>
            <div class='grid grid-cols-3 gap-4'>
                <div><p class='text-sm text-gray-500'>Grau máximo</p><p class='font-medium'>{max_degree}</p></div>
                <div><p class='text-sm text-gray-500'>Recuo por nível</p><p class='font-medium'>{indent}px</p></div>
                <div><p class='text-sm text-gray-500'>Marcador das opções</p><p class='font-medium font-mono'>"{marker}"</p></div>
            </div>
        </div>
        <div class='bg-white rounded-xl shadow-sm p-6 mb-6'>
            <h3 class='text-lg font-semibold mb-4'>Moeda</h3>
            <div class='grid grid-cols-3 gap-4'>
                <div><p class='text-sm text-gray-500'>Código</p><p class='font-medium'>{code}</p></div>
                <div><p class='text-sm text-gray-500'>Casas decimais</p><p class='font-medium'>{places}</p></div>
                <div><p class='text-sm text-gray-500'>Exemplo</p><p class='font-medium'>{sample}</p></div>
            </div>
        </div>
        <div class='bg-white rounded-xl shadow-sm p-6'>
            <h3 class='text-lg font-semibold mb-4'>Geral</h3>
            <div class='grid grid-cols-2 gap-4'>
                <div><p class='text-sm text-gray-500'>Registros por página</p><p class='font-medium'>{per_page}</p></div>
                <div><p class='text-sm text-gray-500'>Nível de log</p><p class='font-medium'>{log_level}</p></div>
            </div>
        </div>"#,
        host = esc(&config.server.host),
        port = config.server.port,
        cors = esc(&cors),
        store = esc(&config.store_path().display().to_string()),
        autosave = on_off(config.data.autosave),
        seed = on_off(config.data.seed_demo),
        max_degree = config.hierarchy.max_degree,
        indent = config.hierarchy.indent_unit,
        marker = esc(&config.hierarchy.option_marker),
        code = esc(&config.currency.code),
        places = config.currency.decimal_places,
        sample = state.money(rust_decimal::Decimal::new(123456789, 2)),
        per_page = config.pagination.records_per_page,
        log_level = esc(&config.logging.level),
    );

    axum::response::Html(crate::page_response(&headers, "Configurações", "/settings", &inner_content))
}
