//! Narrative builder
//!
//! Assembles the ordered pt-BR paragraphs describing the transaction.
//! Each paragraph comes from its own producer so every conditional rule
//! (optional clauses, tense switching, deduction filtering) can be tested
//! in isolation; the assembler simply filters out the producers that have
//! nothing to say. The whole sequence is regenerated on every call — this
//! is a pure function of the receipt and the current date.

use chrono::{DateTime, Local, NaiveDate};

use crate::currency::{format_brl, parse_brl};
use crate::taxes::compute_taxes;
use crate::Receipt;

const FIELD_FILLER: &str = "__________";
const DATE_FILLER: &str = "____/____/____";
const TIME_FILLER: &str = "__:__";
const DEFAULT_PAYER: &str = "Empresa pagadora";

/// Bold label the page renderer draws in front of the note text.
pub(crate) const NF_NOTE_LABEL: &str = "Observação:";
/// Fixed compliance sentence appended when the toggle resolves true.
pub(crate) const NF_NOTE_TEXT: &str = "este recibo reconhece o pagamento/recebimento. \
Quando exigida por lei, a emissão de Nota Fiscal permanece obrigatória.";

/// Non-empty trimmed value or the given filler.
fn filled(value: Option<&str>, filler: &str) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => filler.to_string(),
    }
}

/// Accepts both full ISO 8601 timestamps (issue dates) and plain
/// `YYYY-MM-DD` values (event/payment dates).
pub(crate) fn parse_date_br(value: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }
    NaiveDate::parse_from_str(value.get(..10).unwrap_or(value), "%Y-%m-%d").ok()
}

fn fmt_date_br(value: Option<&str>) -> String {
    value
        .and_then(parse_date_br)
        .map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| DATE_FILLER.to_string())
}

/// Strict date-only comparison: an event on `today` already counts as
/// past ("realizado"), only strictly later dates read as future.
fn is_future(event_date: Option<&str>, today: NaiveDate) -> bool {
    event_date.and_then(parse_date_br).map_or(false, |d| d > today)
}

/// Build the narrative paragraphs using the local calendar date.
pub fn build_paragraphs(receipt: &Receipt) -> Vec<String> {
    build_paragraphs_at(receipt, Local::now().date_naive())
}

/// Build the narrative paragraphs against an explicit "today", so tense
/// selection and the closing date line are deterministic under test.
pub fn build_paragraphs_at(receipt: &Receipt, today: NaiveDate) -> Vec<String> {
    let gross = parse_brl(&receipt.value).unwrap_or(0.0);
    let gross_fmt = format_brl(gross);
    let summary = compute_taxes(gross, receipt.enable_taxes, receipt.taxes.as_ref());

    let payee = filled(receipt.payee(), FIELD_FILLER);
    let payee_doc = filled(receipt.payee_cpf_cnpj.as_deref(), FIELD_FILLER);
    let payer = filled(receipt.payer_name.as_deref(), DEFAULT_PAYER);
    let payer_doc = filled(receipt.payer_cnpj.as_deref(), FIELD_FILLER);
    let today_br = today.format("%d/%m/%Y").to_string();

    let header = Some(format!(
        "RECIBO DE PAGAMENTO Nº {} – Emitido em {}",
        filled(receipt.receipt_number.as_deref(), "_____"),
        receipt
            .issue_date
            .as_deref()
            .map(|d| fmt_date_br(Some(d)))
            .unwrap_or_else(|| today_br.clone()),
    ));

    let payee_line = Some(format!(
        "Recebedor: {payee} (CPF/CNPJ {payee_doc}){}{}",
        party_address(receipt.payee_address.as_deref()),
        party_city(receipt.payee_city.as_deref(), receipt.payee_state.as_deref()),
    ) + ".");

    let payer_line = Some(format!(
        "Pagador: {payer} (CNPJ {payer_doc}){}{}",
        party_address(receipt.payer_address.as_deref()),
        party_city(receipt.payer_city.as_deref(), receipt.payer_state.as_deref()),
    ) + ".");

    let declaration = Some(format!(
        "Declaramos, para os devidos fins, que {payee} recebeu de {payer} a quantia de R$ {gross_fmt}{}.",
        receipt
            .value_in_words
            .as_deref()
            .filter(|w| !w.trim().is_empty())
            .map(|w| format!(" ({w})"))
            .unwrap_or_default(),
    ));

    let service = Some(service_sentence(receipt, today));

    let payment = Some(format!(
        "Forma de pagamento: {}{}.",
        filled(receipt.payment_method.as_deref(), FIELD_FILLER),
        receipt
            .payment_date
            .as_deref()
            .map(|d| format!(" – Data do pagamento: {}", fmt_date_br(Some(d))))
            .unwrap_or_default(),
    ));

    let references = references_line(receipt);

    let deductions = if receipt.enable_taxes && summary.total_deducted > 0.0 {
        let clauses = summary
            .nonzero_lines()
            .iter()
            .map(|(label, amount)| format!("{label} R$ {}", format_brl(*amount)))
            .collect::<Vec<_>>()
            .join(", ");
        Some(format!(
            "O valor bruto de R$ {gross_fmt} sofreu retenções de {clauses}, \
totalizando R$ {}. Valor líquido recebido: R$ {}.",
            format_brl(summary.total_deducted),
            format_brl(summary.net),
        ))
    } else {
        None
    };

    let closing = Some(format!(
        "{}, {today_br}",
        filled(receipt.city.as_deref(), FIELD_FILLER)
    ));

    let nf_note = receipt
        .nf_note_enabled()
        .then(|| format!("{NF_NOTE_LABEL} {NF_NOTE_TEXT}"));

    [
        header,
        payee_line,
        payer_line,
        declaration,
        service,
        payment,
        references,
        deductions,
        closing,
        nf_note,
    ]
    .into_iter()
    .flatten()
    .filter(|s| !s.is_empty())
    .collect()
}

fn party_address(address: Option<&str>) -> String {
    match address.map(str::trim) {
        Some(a) if !a.is_empty() => format!(" – Endereço: {a}"),
        _ => String::new(),
    }
}

fn party_city(city: Option<&str>, state: Option<&str>) -> String {
    match city.map(str::trim) {
        Some(c) if !c.is_empty() => match state.map(str::trim) {
            Some(uf) if !uf.is_empty() => format!(" – {c}/{uf}"),
            _ => format!(" – {c}"),
        },
        _ => String::new(),
    }
}

fn service_sentence(receipt: &Receipt, today: NaiveDate) -> String {
    let job = filled(receipt.job_description.as_deref(), FIELD_FILLER);
    let event = filled(receipt.event_name.as_deref(), FIELD_FILLER);
    let date = fmt_date_br(receipt.event_date.as_deref());
    let location = filled(receipt.event_location.as_deref(), FIELD_FILLER);
    let start = filled(receipt.start_time.as_deref(), TIME_FILLER);
    let end = filled(receipt.end_time.as_deref(), TIME_FILLER);

    if is_future(receipt.event_date.as_deref(), today) {
        format!(
            "Referente ao(s) serviço(s) de {job} no âmbito do evento {event}, \
que ocorrerá no dia {date} no local {location}, das {start} às {end}."
        )
    } else {
        format!(
            "Referente ao(s) serviço(s) de {job} no âmbito do evento {event}, \
realizado no dia {date} no local {location}, das {start} às {end}."
        )
    }
}

/// Present reference fields joined with ` – `; `None` when there are no
/// references so the assembler drops the paragraph entirely.
fn references_line(receipt: &Receipt) -> Option<String> {
    let mut refs = Vec::new();
    if let Some(po) = receipt.purchase_order.as_deref().filter(|s| !s.is_empty()) {
        refs.push(format!("PO/OS: {po}"));
    }
    if let Some(cc) = receipt.cost_center.as_deref().filter(|s| !s.is_empty()) {
        refs.push(format!("Centro de Custo: {cc}"));
    }
    if let Some(ir) = receipt.internal_ref.as_deref().filter(|s| !s.is_empty()) {
        refs.push(format!("Ref. Interna: {ir}"));
    }
    if refs.is_empty() {
        None
    } else {
        Some(refs.join(" – ") + ".")
    }
}
