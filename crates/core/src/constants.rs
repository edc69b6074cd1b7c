//! Constants used throughout the SISREG core crate.
//!
//! Upstream field names, default endpoints and the sentinel strings written into
//! reconciled records live here so the fetch, merge and gate stages agree on them.

/// Default SISREG search host.
pub const DEFAULT_BASE_URL: &str = "https://sisreg-es.saude.gov.br";

/// Default index holding ambulatory referrals (solicitações).
pub const DEFAULT_REFERRAL_INDEX: &str = "solicitacao-ambulatorial-ms-tres-lagoas";

/// Default index holding ambulatory appointments (marcações).
pub const DEFAULT_APPOINTMENT_INDEX: &str = "marcacao-ambulatorial-ms-tres-lagoas";

/// Default timeout applied to each upstream search, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Upper bound accepted for the upstream timeout, in seconds.
pub const MAX_TIMEOUT_SECS: u64 = 120;

/// Result cap sent with every search. Effectively unbounded for a single citizen.
pub const SEARCH_RESULT_CAP: u32 = 10_000;

/// Document field holding the citizen identifier.
pub const CPF_FIELD: &str = "cpf_usuario";

/// Referral field the join key is derived from.
pub const REFERRAL_DATE_FIELDS: &[&str] = &["data_solicitacao"];

/// Appointment fields the join key is derived from, first non-empty wins.
pub const APPOINTMENT_DATE_FIELDS: &[&str] = &["data_solicitacao", "data_marcacao"];

/// Referral code shared by a referral and the appointment that fulfils it.
pub const REFERRAL_CODE_FIELD: &str = "codigo_solicitacao";

/// Mother's name on file, used as the verification reference.
pub const MOTHER_NAME_FIELD: &str = "no_mae_usuario";

/// Phone fields scanned, in order, when unifying contact numbers.
pub const PHONE_FIELDS: &[&str] = &[
    "telefone",
    "telefone_usuario",
    "telefone_celular_usuario",
    "telefone_residencial_usuario",
    "telefone_contato",
    "celular",
    "nu_telefone",
];

/// Raw address fields of the patient's residence.
pub const STREET_TYPE_FIELD: &str = "tipo_logradouro_paciente_residencia";
pub const STREET_NAME_FIELD: &str = "endereco_paciente_residencia";
pub const HOUSE_NUMBER_FIELD: &str = "numero_paciente_residencia";
pub const COMPLEMENT_FIELD: &str = "complemento_paciente_residencia";
pub const NEIGHBOURHOOD_FIELD: &str = "bairro_paciente_residencia";
pub const CITY_FIELD: &str = "municipio_paciente_residencia";
pub const STATE_FIELD: &str = "uf_paciente_residencia";
pub const POSTAL_CODE_FIELD: &str = "cep_paciente_residencia";

/// Appointment fields copied onto a matching referral when non-empty.
pub const BORROWED_APPOINTMENT_FIELDS: &[&str] = &[
    "nome_unidade_executante",
    "endereco_unidade_executante",
    "data_marcacao",
    "status_marcacao",
    "descricao_grupo_procedimento",
    "nome_profissional_executante",
];

/// Field added to every reconciled record with the unified phone list.
pub const UNIFIED_PHONE_FIELD: &str = "telefone_unificado";

/// Field added to every reconciled record with the formatted address.
pub const UNIFIED_ADDRESS_FIELD: &str = "endereco_unificado";

/// Written when no phone or address could be derived.
pub const NOT_INFORMED: &str = "NÃO INFORMADO";

/// Written in place of a missing house number.
pub const NO_NUMBER: &str = "S/N";

/// Status returned by the search phase when records exist.
pub const AWAITING_VALIDATION_STATUS: &str = "aguardando_validacao";

/// Message returned by the search phase when records exist.
pub const AWAITING_VALIDATION_MESSAGE: &str = "Confirmação necessária";
