//! Server-rendered portal page.

use crate::models::{format_amount, TaxpayerRecord, ViewState};
use std::fmt::Write;

const STYLE: &str = r#"
        body { font-family: sans-serif; max-width: 40rem; margin: 2rem auto; }
        .input-section { display: flex; gap: 0.5rem; }
        .error-message { color: #b00020; }
        .taxpayer-info { border: 1px solid #ccc; padding: 1rem; margin-top: 1rem; }
        .pay-button { margin-top: 1rem; }
        .notice { color: #8a6d00; }
"#;

/// Escapes text for use in HTML element content and quoted attributes.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn disabled(loading: bool) -> &'static str {
    if loading {
        " disabled"
    } else {
        ""
    }
}

fn render_taxpayer(out: &mut String, record: &TaxpayerRecord, loading: bool) {
    let _ = write!(
        out,
        r#"
    <div class="taxpayer-info">
        <h2>Taxpayer Information</h2>
        <p><strong>Name:</strong> {name}</p>
        <p><strong>National ID:</strong> {dni}</p>"#,
        name = escape_html(&record.name),
        dni = escape_html(&record.national_id),
    );
    if let Some(tax_type) = &record.tax_type {
        let _ = write!(
            out,
            r#"
        <p><strong>Tax:</strong> {}</p>"#,
            escape_html(tax_type)
        );
    }
    let _ = write!(
        out,
        r#"
        <p><strong>Monthly Amount:</strong> ${monthly}</p>
        <p><strong>Current Debt:</strong> ${debt}</p>
        <p><strong>Subscription Status:</strong> {status}</p>
        <form method="post" action="/pagar">
            <button type="submit" class="pay-button"{disabled}>{label}</button>
        </form>
    </div>"#,
        monthly = format_amount(record.monthly_tax_amount),
        debt = format_amount(record.current_debt),
        status = escape_html(&record.subscription_status),
        disabled = disabled(loading),
        label = if loading {
            "Redirecting to MercadoPago..."
        } else {
            "Pay with MercadoPago"
        },
    );
}

/// Renders the whole portal page for a view snapshot.
pub fn render(view: &ViewState) -> String {
    render_with_notice(view, None)
}

/// Like [`render`], with a transient notice above the state panels.
pub fn render_with_notice(view: &ViewState, notice: Option<&str>) -> String {
    let mut out = String::with_capacity(2048);
    let _ = write!(
        out,
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Municipal Payments Portal</title>
    <style>{STYLE}</style>
</head>
<body>
    <h1>Municipal Payments Portal</h1>
    <form class="input-section" method="post" action="/buscar">
        <input type="text" name="dni" placeholder="Enter your national ID" value="{dni}">
        <button type="submit"{disabled}>{label}</button>
    </form>"#,
        dni = escape_html(&view.input_national_id),
        disabled = disabled(view.loading),
        label = if view.loading { "Searching..." } else { "Search" },
    );

    if let Some(notice) = notice {
        let _ = write!(
            out,
            r#"
    <p class="notice">{}</p>"#,
            escape_html(notice)
        );
    }
    if let Some(message) = &view.error_message {
        let _ = write!(
            out,
            r#"
    <p class="error-message">{}</p>"#,
            escape_html(message)
        );
    }
    if view.loading {
        out.push_str(
            r#"
    <p>Loading information...</p>"#,
        );
    }
    if let Some(record) = &view.taxpayer {
        render_taxpayer(&mut out, record, view.loading);
    }

    out.push_str(
        r#"
</body>
</html>
"#,
    );
    out
}
