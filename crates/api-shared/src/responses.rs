//! JSON bodies returned by the consultation endpoint.
//!
//! The consultation answers with one of three shapes depending on the gate outcome: an
//! empty list, the awaiting-validation status object, or the list of record envelopes.
//! Gate rejections use [`ErrorRes`].

use serde::{Deserialize, Serialize};
use sisreg_core::constants::{AWAITING_VALIDATION_MESSAGE, AWAITING_VALIDATION_STATUS};
use sisreg_core::{Disclosure, Hit, RecordFields, SisregError};
use utoipa::ToSchema;

/// Liveness response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// Returned by the search phase when records exist but are withheld.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AwaitingValidationRes {
    #[schema(example = "aguardando_validacao")]
    pub status: String,
    #[schema(example = "Confirmação necessária")]
    pub mensagem: String,
}

impl Default for AwaitingValidationRes {
    fn default() -> Self {
        Self {
            status: AWAITING_VALIDATION_STATUS.into(),
            mensagem: AWAITING_VALIDATION_MESSAGE.into(),
        }
    }
}

/// One reconciled registry document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RecordEnvelope {
    #[serde(rename = "_source")]
    #[schema(value_type = Object)]
    pub source: RecordFields,
}

impl From<Hit> for RecordEnvelope {
    fn from(hit: Hit) -> Self {
        Self { source: hit.source }
    }
}

/// Gate rejection detail.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    #[schema(example = "Nome da mãe incorreto")]
    pub detail: String,
}

impl From<&SisregError> for ErrorRes {
    fn from(e: &SisregError) -> Self {
        Self {
            detail: e.to_string(),
        }
    }
}

/// Successful consultation body.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ConsultaRes {
    Records(Vec<RecordEnvelope>),
    AwaitingValidation(AwaitingValidationRes),
}

impl From<Disclosure> for ConsultaRes {
    fn from(disclosure: Disclosure) -> Self {
        match disclosure {
            Disclosure::NoRecords => ConsultaRes::Records(Vec::new()),
            Disclosure::AwaitingValidation => {
                ConsultaRes::AwaitingValidation(AwaitingValidationRes::default())
            }
            Disclosure::Records(hits) => {
                ConsultaRes::Records(hits.into_iter().map(RecordEnvelope::from).collect())
            }
        }
    }
}
