//! Server-rendered module pages. These are the internal `/mods/...` targets
//! the gate rewrites public aliases onto; they render a minimal shell per
//! module rather than a full UI.

use axum::{
    extract::Path,
    response::{Html, IntoResponse, Redirect},
    Form,
};
use serde::Deserialize;

/// Top navigation, public aliases only. Internal paths never appear in
/// markup sent to the browser.
const NAV: &[(&str, &str)] = &[
    ("/home", "Painel"),
    ("/visitas", "Visitas"),
    ("/agenda", "Agenda"),
    ("/lista-de-visitas", "Lista de visitas"),
    ("/locais-de-visitas", "Locais de visitas"),
    ("/prescritores", "Prescritores"),
    ("/veiculos", "Veículos"),
    ("/relatorios", "Relatórios"),
    ("/configuracoes", "Configurações"),
];

fn render(module: &str, title: &str, body: &str) -> Html<String> {
    let nav = NAV
        .iter()
        .map(|(href, label)| format!("<a href=\"{}\">{}</a>", href, label))
        .collect::<Vec<_>>()
        .join(" | ");

    Html(format!(
        "<!doctype html>\n<html lang=\"pt-BR\">\n<head><meta charset=\"utf-8\"><title>{title} — Roteiro ERP</title></head>\n<body data-module=\"{module}\">\n<nav>{nav}</nav>\n<main>\n<h1>{title}</h1>\n{body}\n</main>\n</body>\n</html>\n"
    ))
}

fn record_page(module: &str, entity: &str, action: &str, id: &str) -> Html<String> {
    let id = escape(id);
    render(
        module,
        &format!("{} {} {}", action, entity, id),
        &format!("<p>Registro <code>{}</code></p>", id),
    )
}

/// Identifiers come straight from the URL; escape before echoing into markup.
fn escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

pub async fn root() -> Redirect {
    Redirect::temporary("/home")
}

pub async fn dashboard() -> Html<String> {
    render("home", "Painel", "<p>Resumo do dia: visitas, rotas e pendências.</p>")
}

pub async fn visits_home() -> Html<String> {
    render("visits", "Visitas", "<p>Planejamento e acompanhamento de visitas.</p>")
}

pub async fn agenda() -> Html<String> {
    render(
        "agenda",
        "Agenda de visitas",
        concat!(
            "<form method=\"post\" action=\"/agenda\">",
            "<input name=\"prescriber\" placeholder=\"Prescritor\">",
            "<input name=\"scheduled_on\" type=\"date\">",
            "<input name=\"notes\" placeholder=\"Observações\">",
            "<button type=\"submit\">Agendar</button>",
            "</form>"
        ),
    )
}

#[derive(Debug, Deserialize)]
pub struct AgendaEntryForm {
    pub prescriber: String,
    pub scheduled_on: String,
    pub notes: Option<String>,
}

/// Form target for the agenda page. The CSRF gate has already vetted the
/// request by the time it lands here; redirect-after-post back to the agenda.
pub async fn agenda_submit(Form(entry): Form<AgendaEntryForm>) -> impl IntoResponse {
    tracing::info!(
        prescriber = %entry.prescriber,
        scheduled_on = %entry.scheduled_on,
        notes = entry.notes.as_deref().unwrap_or(""),
        "agenda entry submitted"
    );
    Redirect::to("/agenda")
}

pub async fn visits_list() -> Html<String> {
    render("visits-list", "Lista de visitas", "<p>Relação completa de visitas registradas.</p>")
}

pub async fn locations_home() -> Html<String> {
    render("locations", "Locais de visitas", "<p>Endereços e pontos de atendimento.</p>")
}

pub async fn prescribers_home() -> Html<String> {
    render("prescribers", "Prescritores", "<p>Cadastro de prescritores.</p>")
}

pub async fn vehicles_home() -> Html<String> {
    render("vehicles", "Veículos", "<p>Frota disponível para rotas.</p>")
}

pub async fn config_home() -> Html<String> {
    render("config", "Configurações", "<p>Parâmetros do sistema.</p>")
}

pub async fn reports_home() -> Html<String> {
    render("reports", "Relatórios", "<p>Indicadores e exportações.</p>")
}

pub async fn access_denied() -> Html<String> {
    render("access-denied", "Acesso negado", "<p>Você não tem permissão para esta área.</p>")
}

// Record pages. The identifier segment is opaque here; validation belongs to
// the API layer that owns the records.

pub async fn visit_edit(Path(id): Path<String>) -> Html<String> {
    record_page("visits", "visita", "Editar", &id)
}

pub async fn visit_details(Path(id): Path<String>) -> Html<String> {
    record_page("visits", "visita", "Detalhes de", &id)
}

pub async fn location_edit(Path(id): Path<String>) -> Html<String> {
    record_page("locations", "local", "Editar", &id)
}

pub async fn location_details(Path(id): Path<String>) -> Html<String> {
    record_page("locations", "local", "Detalhes de", &id)
}

pub async fn prescriber_edit(Path(id): Path<String>) -> Html<String> {
    record_page("prescribers", "prescritor", "Editar", &id)
}

pub async fn prescriber_details(Path(id): Path<String>) -> Html<String> {
    record_page("prescribers", "prescritor", "Detalhes de", &id)
}

pub async fn vehicle_edit(Path(id): Path<String>) -> Html<String> {
    record_page("vehicles", "veículo", "Editar", &id)
}

pub async fn vehicle_details(Path(id): Path<String>) -> Html<String> {
    record_page("vehicles", "veículo", "Detalhes de", &id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_page_escapes_identifier() {
        let Html(body) = record_page("visits", "visita", "Editar", "<script>");
        assert!(body.contains("&lt;script&gt;"));
        assert!(!body.contains("<script>"));
    }

    #[test]
    fn nav_only_links_public_aliases() {
        let Html(body) = render("home", "Painel", "");
        assert!(!body.contains("/mods/"));
    }
}
