//! Phone number unification across a referral and its appointment.

use crate::constants::{NOT_INFORMED, PHONE_FIELDS};
use crate::record::RecordFields;

/// Separators used when a single field carries several numbers.
const MULTI_VALUE_SEPARATORS: [char; 2] = [',', ';'];

/// Keep only the digits of a phone fragment.
pub fn phone_digits(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Deduplicated phone numbers from `records`, in first-seen order.
///
/// Fields are scanned in [`PHONE_FIELDS`] order, each field across every record before
/// moving to the next field.
pub fn unified_phones(records: &[&RecordFields]) -> Vec<String> {
    let mut phones: Vec<String> = Vec::new();

    for field in PHONE_FIELDS {
        for record in records {
            let Some(raw) = record.text(field) else {
                continue;
            };
            for fragment in raw.split(MULTI_VALUE_SEPARATORS) {
                let digits = phone_digits(fragment);
                if !digits.is_empty() && !phones.contains(&digits) {
                    phones.push(digits);
                }
            }
        }
    }

    phones
}

/// Render a phone list for the `telefone_unificado` field.
pub fn render_phones(phones: &[String]) -> String {
    if phones.is_empty() {
        NOT_INFORMED.to_string()
    } else {
        phones.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: serde_json::Value) -> RecordFields {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn duplicate_numbers_collapse_across_records() {
        let referral = fields(json!({"telefone": "11999998888, 11999998888"}));
        let appointment = fields(json!({"telefone_usuario": "(11) 99999-8888"}));
        let phones = unified_phones(&[&referral, &appointment]);
        assert_eq!(phones, vec!["11999998888".to_string()]);
        assert_eq!(render_phones(&phones), "11999998888");
    }

    #[test]
    fn order_is_first_seen() {
        let referral = fields(json!({
            "telefone": "67 3521-0000;67 99999-1111",
            "celular": "67999991111"
        }));
        let appointment = fields(json!({"telefone": "(67) 98888-2222"}));
        let phones = unified_phones(&[&referral, &appointment]);
        assert_eq!(phones, vec!["6735210000", "67999991111", "67988882222"]);
        assert_eq!(
            render_phones(&phones),
            "6735210000, 67999991111, 67988882222"
        );
    }

    #[test]
    fn numeric_fields_are_read() {
        let referral = fields(json!({"nu_telefone": 6735211234_u64}));
        assert_eq!(unified_phones(&[&referral]), vec!["6735211234"]);
    }

    #[test]
    fn no_phones_renders_sentinel() {
        let referral = fields(json!({"telefone": " - ", "no_usuario": "X"}));
        let phones = unified_phones(&[&referral, &RecordFields::default()]);
        assert!(phones.is_empty());
        assert_eq!(render_phones(&phones), NOT_INFORMED);
    }

    #[test]
    fn unification_is_deterministic() {
        let referral = fields(json!({"telefone": "1, 2, 3", "celular": "3;4"}));
        let first = unified_phones(&[&referral]);
        for _ in 0..5 {
            assert_eq!(unified_phones(&[&referral]), first);
        }
    }
}
