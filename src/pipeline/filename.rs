use crate::bundle::DealBundle;
use crate::generators::common::{sanitize_filename_within, MAX_FILENAME_CHARS};

/// Contact part used when the bundle has no contact name.
pub const UNKNOWN_CONTACT: &str = "unknown contact";

const PDF_EXTENSION: &str = ".pdf";

/// Storage filename for a deal's document: `<deal> - <contact>.pdf`.
///
/// The whole name, extension included, fits in [`MAX_FILENAME_CHARS`].
pub fn derive_pdf_filename(deal_id: &str, bundle: &DealBundle) -> String {
    let max_stem = MAX_FILENAME_CHARS - PDF_EXTENSION.len();
    let fallback = format!("deal_{}", deal_id.trim());
    let deal_part = bundle.deal_name().unwrap_or_else(|| fallback.clone());
    let contact_part = bundle
        .contact_name()
        .unwrap_or_else(|| UNKNOWN_CONTACT.to_string());

    let mut stem = sanitize_filename_within(&format!("{deal_part} - {contact_part}"), max_stem);
    if stem.is_empty() {
        stem = sanitize_filename_within(&fallback, max_stem);
    }
    if stem.is_empty() {
        stem = "document".to_string();
    }

    format!("{stem}{PDF_EXTENSION}")
}
