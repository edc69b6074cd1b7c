//! Postal address formatting for reconciled records.

use crate::constants::{
    CITY_FIELD, COMPLEMENT_FIELD, HOUSE_NUMBER_FIELD, NEIGHBOURHOOD_FIELD, NOT_INFORMED,
    NO_NUMBER, POSTAL_CODE_FIELD, STATE_FIELD, STREET_NAME_FIELD, STREET_TYPE_FIELD,
};
use crate::record::RecordFields;

/// Reformat a CEP as `NNNNN-NNN` when it carries exactly eight digits.
pub fn format_postal_code(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.len() == 8 {
        format!("{}-{}", &digits[..5], &digits[5..])
    } else {
        raw.to_string()
    }
}

/// Build an uppercased address line from a record's residence fields.
///
/// Returns `None` when the record has no street name, whatever else it carries.
pub fn format_address(record: &RecordFields) -> Option<String> {
    let street_name = record.text(STREET_NAME_FIELD)?;

    let mut line = match record.text(STREET_TYPE_FIELD) {
        Some(street_type) => format!("{street_type} {street_name}"),
        None => street_name.into_owned(),
    };

    line.push_str(", ");
    match record.text(HOUSE_NUMBER_FIELD) {
        Some(number) => line.push_str(&number),
        None => line.push_str(NO_NUMBER),
    }

    for field in [COMPLEMENT_FIELD, NEIGHBOURHOOD_FIELD] {
        if let Some(part) = record.text(field) {
            line.push_str(" - ");
            line.push_str(&part);
        }
    }

    match (record.text(CITY_FIELD), record.text(STATE_FIELD)) {
        (Some(city), Some(state)) => line.push_str(&format!(", {city}/{state}")),
        (Some(only), None) | (None, Some(only)) => line.push_str(&format!(", {only}")),
        (None, None) => {}
    }

    if let Some(cep) = record.text(POSTAL_CODE_FIELD) {
        line.push_str(" - CEP ");
        line.push_str(&format_postal_code(&cep));
    }

    Some(line.to_uppercase())
}

/// Address for the `endereco_unificado` field.
///
/// The primary record's fields are tried first, then the counterpart's.
pub fn unified_address(primary: &RecordFields, counterpart: Option<&RecordFields>) -> String {
    format_address(primary)
        .or_else(|| counterpart.and_then(format_address))
        .unwrap_or_else(|| NOT_INFORMED.to_string())
}
