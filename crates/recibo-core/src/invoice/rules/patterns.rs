//! Regex patterns for the purchase receipt template.

use lazy_static::lazy_static;
use regex::Regex;

// Digits are ASCII only: the converters parse ASCII digits.
lazy_static! {
    // Receipt number: "Nro.: 0004-00012345" (colon optional)
    pub static ref RECEIPT_NUMBER: Regex = Regex::new(
        r"Nro\.:?\s*([0-9]{4})-([0-9]+)"
    ).unwrap();

    // Issue date: "Fecha: 15/03/2024"
    pub static ref ISSUE_DATE: Regex = Regex::new(
        r"Fecha:\s*([0-9]{2}/[0-9]{2}/[0-9]{4})"
    ).unwrap();

    // Exchange rate: "Tipo de cambio: 950,50"
    pub static ref EXCHANGE_RATE: Regex = Regex::new(
        r"Tipo de cambio:\s*([0-9]+[.,]?[0-9]*)"
    ).unwrap();

    // VAT line at the fixed 21% rate: "IVA 21.00% U$S 10,00"
    pub static ref TAX_AMOUNT: Regex = Regex::new(
        r"IVA\s+21\.00%\s+U\$S\s*([0-9.,]+)"
    ).unwrap();

    // Perceptions line: "Percepciones U$S 3,25"
    pub static ref WITHHOLDING_AMOUNT: Regex = Regex::new(
        r"Percepciones\s+U\$S\s*([0-9.,]+)"
    ).unwrap();

    // Product line: code, description, quantity, then unit price, adjustment
    // and line total each tagged with U$S. Only the code, quantity and total
    // are captured.
    pub static ref LINE_ITEM: Regex = Regex::new(concat!(
        r"(?m)^([A-Z0-9]{4,})\s+",
        r".+?\s+",
        r"([0-9]+(?:[.,][0-9]+)?)\s+",
        r"U\$S\s+[0-9.,]+\s+",
        r"U\$S\s+-?[0-9.,]+\s+",
        r"U\$S\s+([0-9.,]+)"
    )).unwrap();
}

/// Build the line-anchored pattern for a literal supplier name.
pub fn supplier_pattern(name: &str) -> Regex {
    // An escaped literal always compiles.
    Regex::new(&format!(r"(?m)^({})", regex::escape(name))).unwrap()
}
