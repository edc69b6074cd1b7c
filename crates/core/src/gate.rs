//! Two-phase disclosure gate.
//!
//! A consultation runs in one of two phases, chosen by whether the caller supplied the
//! mother's name:
//!
//! - [`Phase::Search`]: fetch and reconcile, then only report whether records exist.
//! - [`Phase::Validate`]: fetch and reconcile again from the registry, compare the
//!   mother's first name on file with the supplied one, and disclose the records on a
//!   match.
//!
//! Nothing is kept between the phases. The validate phase never trusts anything from the
//! search phase; the client resubmits the identifier with the verification value.

use tracing::Instrument;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::cpf::CanonicalCpf;
use crate::reconcile::reconcile;
use crate::record::Hit;
use crate::registry::{fetch_both, RecordSource};
use crate::{SisregError, SisregResult};

/// Which half of the protocol a request belongs to.
#[derive(Clone, PartialEq, Eq)]
pub enum Phase {
    Search,
    Validate(String),
}

impl Phase {
    /// Select the phase from the optional verification parameter.
    ///
    /// A missing or blank value means the search phase.
    pub fn from_param(mother_name: Option<&str>) -> Self {
        match mother_name.map(str::trim) {
            Some(value) if !value.is_empty() => Phase::Validate(value.to_string()),
            _ => Phase::Search,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Search => "search",
            Phase::Validate(_) => "validate",
        }
    }
}

// The verification value is a secret; keep it out of debug output.
impl std::fmt::Debug for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Comparable form of a name: no diacritics, lowercase, first word only.
pub fn first_name_key(raw: &str) -> String {
    let folded: String = raw
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase();

    folded
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Decide whether `supplied` matches the mother's name on file.
pub fn verify_mother_name(on_file: Option<&str>, supplied: &str) -> SisregResult<()> {
    let expected = first_name_key(on_file.unwrap_or_default());
    if expected.is_empty() {
        return Err(SisregError::IncompleteRecord);
    }

    if expected != first_name_key(supplied) {
        return Err(SisregError::VerificationMismatch);
    }

    Ok(())
}

/// Outcome of a consultation that did not fail the gate.
#[derive(Clone, Debug, PartialEq)]
pub enum Disclosure {
    /// The registry has nothing for this citizen.
    NoRecords,
    /// Records exist but are withheld until the mother's name is confirmed.
    AwaitingValidation,
    /// Verified: the reconciled records.
    Records(Vec<Hit>),
}

/// Runs consultations against a record source.
#[derive(Clone, Debug)]
pub struct ConsultaService<S> {
    source: S,
}

impl<S: RecordSource> ConsultaService<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetch and reconcile every record for a citizen, without any gate.
    pub async fn records(&self, cpf: &CanonicalCpf) -> Vec<Hit> {
        reconcile(fetch_both(&self.source, cpf).await)
    }

    /// Run one phase of the protocol for a raw identifier.
    ///
    /// # Errors
    /// Only the validate phase fails, with [`SisregError::IncompleteRecord`] when no
    /// mother's name is on file or [`SisregError::VerificationMismatch`] when it differs.
    pub async fn consult(&self, raw_cpf: &str, phase: Phase) -> SisregResult<Disclosure> {
        let cpf = CanonicalCpf::new(raw_cpf);
        let span = tracing::info_span!(
            "consulta",
            request_id = %uuid::Uuid::new_v4(),
            cpf = %cpf.masked(),
            phase = phase.as_str(),
        );

        self.consult_canonical(&cpf, phase).instrument(span).await
    }

    async fn consult_canonical(
        &self,
        cpf: &CanonicalCpf,
        phase: Phase,
    ) -> SisregResult<Disclosure> {
        let records = self.records(cpf).await;

        if records.is_empty() {
            tracing::info!("no records found");
            return Ok(Disclosure::NoRecords);
        }

        let on_file = records
            .first()
            .and_then(|hit| hit.source.mother_name())
            .map(|name| name.into_owned());

        match phase {
            Phase::Search => {
                tracing::info!(
                    records = records.len(),
                    reference_on_file = on_file.is_some(),
                    "records withheld pending validation"
                );
                Ok(Disclosure::AwaitingValidation)
            }
            Phase::Validate(supplied) => {
                if let Err(e) = verify_mother_name(on_file.as_deref(), &supplied) {
                    tracing::warn!(reason = %e, "validation rejected");
                    return Err(e);
                }
                tracing::info!(records = records.len(), "validation accepted, disclosing");
                Ok(Disclosure::Records(records))
            }
        }
    }
}
