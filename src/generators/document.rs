//! HTML rendering of a deal bundle.
//!
//! The output is a single self-contained page (inline CSS, no external
//! resources). Every interpolated value goes through [`escape_html`].

use chrono::{DateTime, Utc};

use super::common::{escape_html, format_timestamp, now};
use crate::bundle::{resolve, DealBundle, FieldValue, LineItem};

/// Paragraph shown instead of the products table when there are no items.
pub const EMPTY_ITEMS_TEXT: &str = "Aucune ligne de produit associée.";

const STYLE: &str = r#"
    @page { size: A4; margin: 18mm; }
    html { -webkit-print-color-adjust: exact; print-color-adjust: exact; }
    body { font-family: Arial, sans-serif; color:#111; }
    h1 { margin: 0 0 6px 0; font-size: 22px; }
    h2 { margin: 18px 0 8px 0; font-size: 16px; }
    .muted { color:#666; font-size: 12px; }
    .card { border:1px solid #ddd; border-radius:10px; padding:14px; }
    .grid { display:flex; gap:14px; }
    .col { flex:1; }
    .kv p { margin: 4px 0; }
    .hr { height:1px; background:#eee; margin:14px 0; }
    table.items { width:100%; border-collapse:collapse; margin-top:8px; }
    table.items th, table.items td { border:1px solid #ddd; padding:8px; }
    table.items th { text-align:left; }
    table.items .num { text-align:right; }
    .empty { color:#666; margin:0; }
"#;

/// Render the deal document stamped with the current time.
pub fn render_deal_document(bundle: &DealBundle) -> String {
    render_deal_document_at(bundle, now())
}

/// Render the deal document stamped with `generated_at`.
///
/// Identical inputs always produce byte-identical output.
pub fn render_deal_document_at(bundle: &DealBundle, generated_at: DateTime<Utc>) -> String {
    let deal = &bundle.deal;
    let contact = &bundle.contact;
    let company = &bundle.company;

    format!(
        r#"<!doctype html>
<html lang="fr">
<head>
  <meta charset="utf-8" />
  <title>Document PDF</title>
  <style>{style}</style>
</head>
<body>
  <h1>Document – Transaction</h1>
  <p class="muted">Généré automatiquement depuis HubSpot</p>

  <div class="card">
    <h2>Transaction</h2>
    <div class="kv">
      <p><strong>Nom :</strong> {deal_name}</p>
      <p><strong>Montant :</strong> {amount}</p>
      <p><strong>Date de clôture :</strong> {closedate}</p>
      <p><strong>Pipeline / Stage :</strong> {pipeline} / {dealstage}</p>
    </div>

    <div class="hr"></div>

    <div class="grid">
      <div class="col">
        <h2>Contact</h2>
        <div class="kv">
          <p><strong>Nom :</strong> {firstname} {lastname}</p>
          <p><strong>Email :</strong> {email}</p>
          <p><strong>Téléphone :</strong> {phone}</p>
        </div>
      </div>
      <div class="col">
        <h2>Entreprise</h2>
        <div class="kv">
          <p><strong>Nom :</strong> {company_name}</p>
          <p><strong>Domaine :</strong> {domain}</p>
          <p><strong>Ville :</strong> {city}</p>
        </div>
      </div>
    </div>

    <div class="hr"></div>

    <h2>Produits</h2>
    {items}
  </div>

  <p class="muted" style="margin-top:12px;">
    Horodatage: {timestamp}
  </p>
</body>
</html>
"#,
        style = STYLE,
        deal_name = cell(&deal.dealname),
        amount = cell(&deal.amount),
        closedate = cell(&deal.closedate),
        pipeline = cell(&deal.pipeline),
        dealstage = cell(&deal.dealstage),
        firstname = cell(&contact.firstname),
        lastname = cell(&contact.lastname),
        email = cell(&contact.email),
        phone = cell(&contact.phone),
        company_name = cell(&company.name),
        domain = cell(&company.domain),
        city = cell(&company.city),
        items = render_items(&bundle.line_items),
        timestamp = format_timestamp(generated_at),
    )
}

fn cell(field: &Option<FieldValue>) -> String {
    escape_html(&resolve(field))
}

fn render_items(items: &[LineItem]) -> String {
    if items.is_empty() {
        return format!(r#"<p class="empty">{EMPTY_ITEMS_TEXT}</p>"#);
    }

    let mut rows = String::new();
    for item in items {
        rows.push_str(&format!(
            r#"
        <tr>
          <td>{}</td>
          <td class="num">{}</td>
          <td class="num">{}</td>
          <td class="num">{}</td>
        </tr>"#,
            cell(&item.name),
            cell(&item.quantity),
            cell(&item.price),
            cell(&item.amount),
        ));
    }

    format!(
        r#"<table class="items">
      <thead>
        <tr>
          <th>Produit</th>
          <th class="num">Qté</th>
          <th class="num">Prix</th>
          <th class="num">Montant</th>
        </tr>
      </thead>
      <tbody>{rows}
      </tbody>
    </table>"#
    )
}
