//! Tax/net calculator
//!
//! Derives the net payable amount from a gross amount and the four
//! standard withholding categories. There are no error conditions here:
//! absent or unparsable amounts degrade to zero, and the net is floored
//! at zero.

use crate::currency::parse_brl;
use crate::Deductions;

/// Fully expanded deduction breakdown so callers can omit zero-valued
/// lines individually.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaxSummary {
    pub iss: f64,
    pub inss: f64,
    pub irrf: f64,
    pub other: f64,
    pub total_deducted: f64,
    pub net: f64,
}

impl TaxSummary {
    /// Label/amount pairs for the non-zero deduction lines, in the fixed
    /// display order.
    pub fn nonzero_lines(&self) -> Vec<(&'static str, f64)> {
        [
            ("ISS", self.iss),
            ("INSS", self.inss),
            ("IRRF", self.irrf),
            ("Outras", self.other),
        ]
        .into_iter()
        .filter(|(_, v)| *v > 0.0)
        .collect()
    }
}

/// Compute the deduction breakdown and net amount.
///
/// When `enabled` is false every stored amount is forced to zero, so
/// `net == gross` regardless of what the record carries.
pub fn compute_taxes(gross: f64, enabled: bool, deductions: Option<&Deductions>) -> TaxSummary {
    let amount = |v: Option<&String>| -> f64 {
        if !enabled {
            return 0.0;
        }
        v.and_then(|s| parse_brl(s)).unwrap_or(0.0)
    };

    let iss = amount(deductions.and_then(|d| d.iss.as_ref()));
    let inss = amount(deductions.and_then(|d| d.inss.as_ref()));
    let irrf = amount(deductions.and_then(|d| d.irrf.as_ref()));
    let other = amount(deductions.and_then(|d| d.other.as_ref()));

    let total_deducted = iss + inss + irrf + other;
    TaxSummary {
        iss,
        inss,
        irrf,
        other,
        total_deducted,
        net: (gross - total_deducted).max(0.0),
    }
}
