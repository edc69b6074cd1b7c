//! Referral/appointment reconciliation.
//!
//! Referrals are the primary records. Each one is paired with an appointment sharing
//! its calendar date, gains a unified phone list and address line, and borrows the
//! scheduling fields of its appointment. When a citizen has no referrals the
//! appointments are returned instead, enriched on their own.
//!
//! No record is created or dropped: the output has exactly as many entries as the
//! primary list.

use std::collections::HashMap;

use crate::address::unified_address;
use crate::constants::{
    APPOINTMENT_DATE_FIELDS, BORROWED_APPOINTMENT_FIELDS, REFERRAL_DATE_FIELDS,
    UNIFIED_ADDRESS_FIELD, UNIFIED_PHONE_FIELD,
};
use crate::contact::{render_phones, unified_phones};
use crate::record::{Hit, RecordFields};
use crate::registry::FetchedRecords;

/// Appointments grouped by join key, in upstream order.
struct AppointmentIndex<'a> {
    by_date: HashMap<String, Vec<&'a RecordFields>>,
}

impl<'a> AppointmentIndex<'a> {
    fn build(appointments: &'a [Hit]) -> Self {
        let mut by_date: HashMap<String, Vec<&'a RecordFields>> = HashMap::new();
        for hit in appointments {
            if let Some(key) = hit.source.join_key(APPOINTMENT_DATE_FIELDS) {
                by_date.entry(key).or_default().push(&hit.source);
            }
        }

        for (date, group) in &by_date {
            if group.len() > 1 {
                tracing::warn!(
                    %date,
                    count = group.len(),
                    "several appointments share a date, matching by referral code"
                );
            }
        }

        Self { by_date }
    }

    /// Appointment for a referral on `date`.
    ///
    /// Prefers the latest appointment carrying the same referral code, else the latest
    /// appointment on that date.
    fn lookup(&self, date: &str, referral_code: Option<&str>) -> Option<&'a RecordFields> {
        let group = self.by_date.get(date)?;

        if let Some(code) = referral_code {
            let same_code = group
                .iter()
                .rev()
                .copied()
                .find(|appointment| appointment.referral_code().as_deref() == Some(code));
            if let Some(appointment) = same_code {
                return Some(appointment);
            }
        }

        group.last().copied()
    }
}

/// Add unified contact and address, then copy the counterpart's scheduling fields.
fn enrich(primary: &mut RecordFields, counterpart: Option<&RecordFields>) {
    let phones = {
        let mut sources: Vec<&RecordFields> = vec![&*primary];
        sources.extend(counterpart);
        unified_phones(&sources)
    };
    let address = unified_address(primary, counterpart);

    primary.insert(UNIFIED_PHONE_FIELD, render_phones(&phones));
    primary.insert(UNIFIED_ADDRESS_FIELD, address);

    if let Some(appointment) = counterpart {
        for field in BORROWED_APPOINTMENT_FIELDS {
            if appointment.text(field).is_some() {
                if let Some(value) = appointment.get(field) {
                    primary.insert(field, value.clone());
                }
            }
        }
    }
}

/// Merge both record classes into the list returned to the citizen.
pub fn reconcile(fetched: FetchedRecords) -> Vec<Hit> {
    let FetchedRecords {
        referrals,
        appointments,
    } = fetched;

    if referrals.is_empty() {
        return appointments
            .into_iter()
            .map(|mut hit| {
                enrich(&mut hit.source, None);
                hit
            })
            .collect();
    }

    let index = AppointmentIndex::build(&appointments);
    let mut matched = 0usize;

    let merged: Vec<Hit> = referrals
        .into_iter()
        .map(|mut hit| {
            let counterpart = match hit.source.join_key(REFERRAL_DATE_FIELDS) {
                Some(date) => index.lookup(&date, hit.source.referral_code().as_deref()),
                None => None,
            };
            if counterpart.is_some() {
                matched += 1;
            }
            enrich(&mut hit.source, counterpart);
            hit
        })
        .collect();

    tracing::debug!(
        referrals = merged.len(),
        appointments = appointments.len(),
        matched,
        "reconciled records"
    );

    merged
}
