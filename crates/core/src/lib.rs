//! # SISREG Core
//!
//! Core logic for the SISREG consultation proxy.
//!
//! This crate contains the consultation pipeline, free of any HTTP-server concerns:
//! - CPF normalisation ([`cpf`])
//! - Upstream registry access and the concurrent dual fetch ([`registry`])
//! - Referral/appointment reconciliation with unified contact and address ([`reconcile`])
//! - The two-phase mother's-name disclosure gate ([`gate`])
//!
//! **No API concerns**: routing, CORS and response shaping belong in `api-rest`.

pub mod address;
pub mod config;
pub mod constants;
pub mod contact;
pub mod cpf;
mod error;
pub mod gate;
pub mod reconcile;
pub mod record;
pub mod registry;

pub use config::{Credentials, SisregConfig};
pub use cpf::CanonicalCpf;
pub use error::{SisregError, SisregResult};
pub use gate::{ConsultaService, Disclosure, Phase};
pub use record::{Hit, RecordFields};
pub use registry::{fetch_both, FetchedRecords, RecordClass, RecordSource, SisregClient};
