//! Text rendering of the view state.

use std::fmt::Write as _;

use client_core::{Phase, ViewState};
use shared::protocol::EnrichedResult;

pub const TITLE: &str = "Lead Enrichment Preview Tool";

pub fn render(state: &ViewState) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{TITLE}");
    let _ = writeln!(out, "{}", "=".repeat(TITLE.len()));

    match &state.identity {
        None => {
            let _ = writeln!(out, "Type `login` to log in.");
        }
        Some(identity) => {
            let _ = writeln!(out, "Signed in as {}", identity.label());
            let _ = writeln!(out, "  Company Name: {}", field_or_dash(&state.form.company_name));
            let _ = writeln!(out, "  Website URL:  {}", field_or_dash(&state.form.website_url));
            if matches!(state.phase(), Phase::Loading) {
                let _ = writeln!(out, "  Enriching...");
            } else {
                let _ = writeln!(out, "  Type `submit` to enrich this lead.");
            }
            let _ = writeln!(out, "Type `logout` to log out.");
        }
    }

    for message in state.errors() {
        let _ = writeln!(out, "! {message}");
    }

    if let Some(result) = &state.result {
        out.push('\n');
        render_result(&mut out, result);
    }

    out
}

fn render_result(out: &mut String, result: &EnrichedResult) {
    let _ = writeln!(out, "Enriched Data");
    let _ = writeln!(out, "-------------");
    let rows = [
        ("Company Name", result.company_name.clone()),
        ("Website", result.website.clone()),
        ("Description", result.description.clone()),
        ("Industry", result.industry.clone()),
        ("Estimated Size", result.estimated_size.clone()),
        ("Products/Services", result.products_services.join(", ")),
        ("Headquarters", result.headquarters.clone()),
        ("Year Founded", result.year_founded.clone()),
        ("Key Features", result.key_features.join(", ")),
    ];
    for (label, value) in rows {
        let _ = writeln!(out, "{label}: {value}");
    }
}

fn field_or_dash(value: &str) -> &str {
    if value.trim().is_empty() {
        "-"
    } else {
        value
    }
}
