//! Static reference tables for the categorical codes appearing in quote
//! records: BDI, market type, correction index, and specification.
//!
//! Shipped as embedded CSVs, parsed once at first use. These are consumed by
//! downstream analysis; the decoder itself never resolves codes.

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct NumericEntry {
    code: i64,
    description: String,
}

#[derive(Debug, Deserialize)]
struct TextEntry {
    code: String,
    description: String,
}

fn numeric_table(raw: &'static str) -> HashMap<i64, String> {
    csv::Reader::from_reader(raw.as_bytes())
        .deserialize()
        .map(|entry| {
            let entry: NumericEntry = entry.expect("embedded table row parses");
            (entry.code, entry.description)
        })
        .collect()
}

fn text_table(raw: &'static str) -> HashMap<String, String> {
    csv::Reader::from_reader(raw.as_bytes())
        .deserialize()
        .map(|entry| {
            let entry: TextEntry = entry.expect("embedded table row parses");
            (entry.code, entry.description)
        })
        .collect()
}

/// Description of a BDI code (`bdi_id` column).
pub fn bdi_description(code: i64) -> Option<&'static str> {
    static TABLE: OnceLock<HashMap<i64, String>> = OnceLock::new();
    TABLE
        .get_or_init(|| numeric_table(include_str!("../../assets/codbdi.csv")))
        .get(&code)
        .map(String::as_str)
}

/// Description of a market-type code (`tipo_mercado_id` column).
pub fn market_type_description(code: i64) -> Option<&'static str> {
    static TABLE: OnceLock<HashMap<i64, String>> = OnceLock::new();
    TABLE
        .get_or_init(|| numeric_table(include_str!("../../assets/tpmerc.csv")))
        .get(&code)
        .map(String::as_str)
}

/// Description of a correction-index code (`indice_correcao_id` column).
pub fn correction_index_description(code: i64) -> Option<&'static str> {
    static TABLE: OnceLock<HashMap<i64, String>> = OnceLock::new();
    TABLE
        .get_or_init(|| numeric_table(include_str!("../../assets/indopc.csv")))
        .get(&code)
        .map(String::as_str)
}

/// Description of a paper-specification prefix (`especificacao` column,
/// e.g. `ON`, `PN`, `UNT`).
pub fn specification_description(code: &str) -> Option<&'static str> {
    static TABLE: OnceLock<HashMap<String, String>> = OnceLock::new();
    TABLE
        .get_or_init(|| text_table(include_str!("../../assets/especi.csv")))
        .get(code)
        .map(String::as_str)
}
