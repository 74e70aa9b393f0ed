//! Recibo — payment receipt rendering engine
//!
//! Turns a structured receipt record into two artifacts:
//!
//! - a deterministic pt-BR textual narrative (an ordered list of
//!   paragraphs, suitable for a text preview surface), and
//! - a fully laid-out single-page A4 PDF with a normalized letterhead
//!   background, bordered sections, a tax/net breakdown and a
//!   bottom-anchored signature block, offered under the fixed file name
//!   `recibo.pdf`.
//!
//! Rendering is a pure read of the record: no entry point mutates the
//! `Receipt`, and each render call owns its page exclusively.
//!
//! # Example
//!
//! ```no_run
//! use recibo::{Receipt, RenderConfig};
//!
//! # async fn run() -> recibo::Result<()> {
//! let receipt: Receipt = serde_json::from_str(r#"{
//!     "payeeName": "Maria Souza",
//!     "eventName": "Festival de Inverno",
//!     "value": "1.500,00",
//!     "eventDate": "2026-09-12",
//!     "city": "Campinas"
//! }"#).unwrap();
//!
//! let paragraphs = recibo::narrative::build_paragraphs(&receipt);
//! let doc = recibo::rendering::render_receipt_pdf(&receipt, None, &RenderConfig::default()).await?;
//! std::fs::write(&doc.file_name, &doc.bytes).unwrap();
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};

pub mod error;
pub use error::{Error, Result};

pub mod currency;
pub mod letterhead;
pub mod narrative;
pub mod taxes;

pub mod rendering;

pub use letterhead::FitMode;
pub use rendering::RenderedDocument;

/// The central receipt record.
///
/// Constructed transiently from form/API input (camelCase JSON) and used
/// once to drive rendering. Every field except the financial `value` is
/// optional on the wire; the engine substitutes placeholders for whatever
/// is missing rather than failing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Receipt {
    /// Display-only receipt number, typically `REC-<year>-<seq>`
    pub receipt_number: Option<String>,
    /// Issue date/time (ISO 8601); defaults to "today" in the narrative
    pub issue_date: Option<String>,

    /// Legacy field mirroring the payee name; kept for old stored records
    pub client: Option<String>,
    pub payee_name: Option<String>,
    pub payee_cpf_cnpj: Option<String>,
    pub payee_address: Option<String>,
    pub payee_city: Option<String>,
    pub payee_state: Option<String>,

    pub payer_name: Option<String>,
    pub payer_cnpj: Option<String>,
    pub payer_address: Option<String>,
    pub payer_city: Option<String>,
    pub payer_state: Option<String>,

    pub event_name: Option<String>,
    /// Calendar date of the event, `YYYY-MM-DD`
    pub event_date: Option<String>,
    /// `HH:MM`
    pub start_time: Option<String>,
    /// `HH:MM`
    pub end_time: Option<String>,
    pub event_location: Option<String>,
    pub city: Option<String>,
    pub job_description: Option<String>,

    /// Gross amount in locale format (e.g. `"1.500,00"`). Preserved
    /// verbatim for display; unparsable input is treated as zero for
    /// arithmetic.
    pub value: String,
    /// Spelled-out amount, shown in parentheses after the gross
    pub value_in_words: Option<String>,
    /// When false, all stored deduction amounts are treated as zero
    pub enable_taxes: bool,
    pub taxes: Option<Deductions>,

    pub payment_method: Option<String>,
    pub payment_date: Option<String>,

    pub purchase_order: Option<String>,
    pub cost_center: Option<String>,
    pub internal_ref: Option<String>,

    /// Whether to append the fixed Nota Fiscal observation. Unset means true.
    pub show_nf_note: Option<bool>,
}

impl Receipt {
    /// Payee display name: the dedicated field, falling back to the
    /// legacy `client` field written by older forms.
    pub fn payee(&self) -> Option<&str> {
        self.payee_name.as_deref().or(self.client.as_deref())
    }

    /// Compliance-note toggle with its unset-means-true default.
    pub fn nf_note_enabled(&self) -> bool {
        self.show_nf_note.unwrap_or(true)
    }
}

/// The four standard withholding categories, each a locale-formatted
/// amount or absent. Only meaningful when the parent receipt has
/// `enable_taxes` set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Deductions {
    pub iss: Option<String>,
    pub inss: Option<String>,
    pub irrf: Option<String>,
    pub other: Option<String>,
}

/// Safe content area: fractional offsets from each page edge reserving
/// the letterhead's decorative zones. Fractions of page height for
/// top/bottom, of page width for left/right.
#[derive(Debug, Clone, Copy)]
pub struct SafeArea {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Default for SafeArea {
    fn default() -> Self {
        // Derived from the 66/18/36/18 mm margins of the stock letterhead.
        Self {
            top: 66.0 / 297.0,
            right: 18.0 / 210.0,
            bottom: 36.0 / 297.0,
            left: 18.0 / 210.0,
        }
    }
}

/// Configuration for the page renderer
///
/// The defaults reproduce the stock letterhead layout: full-bleed
/// background and a safe area clear of the preprinted header and footer.
#[derive(Debug, Clone, Default)]
pub struct RenderConfig {
    /// How the letterhead source is projected onto the A4 canvas
    pub fit: FitMode,
    /// Body content offsets as fractions of the page
    pub safe_area: SafeArea,
}

impl RenderConfig {
    /// Reject fractions that leave no printable area.
    pub fn validate(&self) -> Result<()> {
        let s = &self.safe_area;
        let all = [s.top, s.right, s.bottom, s.left];
        if all.iter().any(|f| !(0.0..0.5).contains(f)) {
            return Err(Error::Config(
                "safe area fractions must be in [0, 0.5)".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn receipt_deserializes_from_partial_json() {
        let r: Receipt = serde_json::from_str(
            r#"{"payeeName":"Ana","value":"100,00","enableTaxes":true,"taxes":{"iss":"5,00"}}"#,
        )
        .unwrap();
        assert_eq!(r.payee(), Some("Ana"));
        assert!(r.enable_taxes);
        assert_eq!(r.taxes.as_ref().unwrap().iss.as_deref(), Some("5,00"));
        assert!(r.nf_note_enabled());
    }

    #[test]
    fn payee_falls_back_to_legacy_client_field() {
        let r: Receipt = serde_json::from_str(r#"{"client":"João","value":"1,00"}"#).unwrap();
        assert_eq!(r.payee(), Some("João"));
    }

    #[test]
    fn default_config_is_valid() {
        assert!(RenderConfig::default().validate().is_ok());
    }

    #[test]
    fn config_rejects_degenerate_safe_area() {
        let cfg = RenderConfig {
            safe_area: SafeArea {
                top: 0.6,
                ..SafeArea::default()
            },
            ..RenderConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
