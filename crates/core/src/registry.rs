//! Upstream registry access.
//!
//! The registry is an opaque keyed document store reached over HTTP with basic auth. Two
//! indices are queried per consultation (referrals and appointments) with the same term
//! query on the canonical CPF. [`fetch_both`] runs both searches concurrently and
//! degrades a failing index to an empty set, so the merge and gate stages always see
//! two lists.

use serde_json::{json, Map, Value};
use std::future::Future;
use std::sync::Arc;

use crate::constants::{CPF_FIELD, SEARCH_RESULT_CAP};
use crate::cpf::CanonicalCpf;
use crate::record::{Hit, SearchResponse};
use crate::{SisregConfig, SisregError, SisregResult};

/// Longest upstream error body kept in [`SisregError::UpstreamStatus`].
const ERROR_BODY_EXCERPT: usize = 200;

/// The two record classes held by the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RecordClass {
    /// Requested procedures (solicitações).
    Referral,
    /// Scheduled procedures (marcações).
    Appointment,
}

impl RecordClass {
    pub fn as_str(self) -> &'static str {
        match self {
            RecordClass::Referral => "solicitacao",
            RecordClass::Appointment => "marcacao",
        }
    }
}

/// A searchable store of registry documents.
///
/// Implemented by [`SisregClient`] for the real registry; tests provide in-memory stubs.
pub trait RecordSource: Send + Sync {
    /// Every document of `class` whose identifier field equals `cpf`.
    fn search(
        &self,
        class: RecordClass,
        cpf: &CanonicalCpf,
    ) -> impl Future<Output = SisregResult<Vec<Hit>>> + Send;
}

impl<S: RecordSource> RecordSource for Arc<S> {
    fn search(
        &self,
        class: RecordClass,
        cpf: &CanonicalCpf,
    ) -> impl Future<Output = SisregResult<Vec<Hit>>> + Send {
        (**self).search(class, cpf)
    }
}

/// Term query selecting every document for one citizen.
pub fn search_body(cpf: &CanonicalCpf) -> Value {
    let mut term = Map::new();
    term.insert(CPF_FIELD.to_string(), Value::String(cpf.as_str().to_string()));

    json!({
        "query": {
            "bool": {
                "must": [
                    { "term": term }
                ]
            }
        },
        "size": SEARCH_RESULT_CAP
    })
}

/// HTTP client for the SISREG search endpoints.
#[derive(Clone, Debug)]
pub struct SisregClient {
    cfg: Arc<SisregConfig>,
    http: reqwest::Client,
}

impl SisregClient {
    /// Build a client whose every request carries the configured timeout.
    pub fn new(cfg: Arc<SisregConfig>) -> SisregResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(cfg.timeout())
            .build()
            .map_err(SisregError::HttpClientBuild)?;

        Ok(Self { cfg, http })
    }

    fn url_for(&self, class: RecordClass) -> String {
        match class {
            RecordClass::Referral => self.cfg.search_url(self.cfg.referral_index()),
            RecordClass::Appointment => self.cfg.search_url(self.cfg.appointment_index()),
        }
    }

    fn transport_error(&self, url: &str, e: reqwest::Error) -> SisregError {
        if e.is_timeout() {
            SisregError::Timeout {
                url: url.to_string(),
                secs: self.cfg.timeout().as_secs(),
            }
        } else {
            SisregError::Transport {
                url: url.to_string(),
                source: e,
            }
        }
    }
}

impl RecordSource for SisregClient {
    async fn search(&self, class: RecordClass, cpf: &CanonicalCpf) -> SisregResult<Vec<Hit>> {
        let url = self.url_for(class);
        let creds = self.cfg.credentials();

        tracing::debug!(class = class.as_str(), %url, "searching registry");

        let response = self
            .http
            .post(&url)
            .basic_auth(creds.username(), Some(creds.password()))
            .json(&search_body(cpf))
            .send()
            .await
            .map_err(|e| self.transport_error(&url, e))?;

        let status = response.status();
        tracing::info!(class = class.as_str(), status = status.as_u16(), "registry answered");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SisregError::UpstreamStatus {
                url,
                status: status.as_u16(),
                body: body.chars().take(ERROR_BODY_EXCERPT).collect(),
            });
        }

        let parsed: SearchResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                self.transport_error(&url, e)
            } else {
                SisregError::Decode {
                    url: url.clone(),
                    source: e,
                }
            }
        })?;

        tracing::info!(class = class.as_str(), total = parsed.total(), "registry hits");
        Ok(parsed.into_hits())
    }
}

/// Raw documents of both classes for one citizen.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FetchedRecords {
    pub referrals: Vec<Hit>,
    pub appointments: Vec<Hit>,
}

impl FetchedRecords {
    pub fn is_empty(&self) -> bool {
        self.referrals.is_empty() && self.appointments.is_empty()
    }
}

/// Search both indices concurrently.
///
/// Each search fails independently: an error on one index is logged and replaced by an
/// empty list without affecting the other. Dropping the returned future abandons both
/// in-flight requests.
pub async fn fetch_both<S: RecordSource + ?Sized>(
    source: &S,
    cpf: &CanonicalCpf,
) -> FetchedRecords {
    let (referrals, appointments) = tokio::join!(
        source.search(RecordClass::Referral, cpf),
        source.search(RecordClass::Appointment, cpf),
    );

    FetchedRecords {
        referrals: or_empty(RecordClass::Referral, referrals),
        appointments: or_empty(RecordClass::Appointment, appointments),
    }
}

fn or_empty(class: RecordClass, result: SisregResult<Vec<Hit>>) -> Vec<Hit> {
    match result {
        Ok(hits) => hits,
        Err(e) => {
            tracing::warn!(class = class.as_str(), error = %e, "registry search failed, using empty set");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Credentials;
    use crate::record::RecordFields;
    use axum::{http::HeaderMap, http::StatusCode, routing::post, Json, Router};
    use serde_json::json;
    use std::time::Duration;

    struct Stub {
        referrals: SisregResult<Vec<Hit>>,
        appointments: SisregResult<Vec<Hit>>,
    }

    fn hit(value: Value) -> Hit {
        Hit::new(serde_json::from_value::<RecordFields>(value).unwrap())
    }

    fn clone_result(result: &SisregResult<Vec<Hit>>) -> SisregResult<Vec<Hit>> {
        match result {
            Ok(hits) => Ok(hits.clone()),
            Err(_) => Err(SisregError::Timeout {
                url: "stub".into(),
                secs: 1,
            }),
        }
    }

    impl RecordSource for Stub {
        async fn search(&self, class: RecordClass, _cpf: &CanonicalCpf) -> SisregResult<Vec<Hit>> {
            match class {
                RecordClass::Referral => clone_result(&self.referrals),
                RecordClass::Appointment => clone_result(&self.appointments),
            }
        }
    }

    #[test]
    fn search_body_is_term_query_on_cpf() {
        let body = search_body(&CanonicalCpf::new("123.456.789-00"));
        assert_eq!(
            body,
            json!({
                "query": {"bool": {"must": [{"term": {"cpf_usuario": "12345678900"}}]}},
                "size": 10000
            })
        );
    }

    #[tokio::test]
    async fn failing_index_degrades_to_empty() {
        let stub = Stub {
            referrals: Ok(vec![hit(json!({"data_solicitacao": "2025-10-15"}))]),
            appointments: Err(SisregError::IncompleteRecord),
        };
        let fetched = fetch_both(&stub, &CanonicalCpf::new("1")).await;
        assert_eq!(fetched.referrals.len(), 1);
        assert!(fetched.appointments.is_empty());
        assert!(!fetched.is_empty());
    }

    #[tokio::test]
    async fn both_failing_yields_empty_records() {
        let stub = Stub {
            referrals: Err(SisregError::IncompleteRecord),
            appointments: Err(SisregError::IncompleteRecord),
        };
        assert!(fetch_both(&stub, &CanonicalCpf::new("1")).await.is_empty());
    }

    /// Sleeps before answering, failing the referral search with a timeout.
    struct SlowReferrals {
        delay: Duration,
    }

    impl RecordSource for SlowReferrals {
        async fn search(&self, class: RecordClass, _cpf: &CanonicalCpf) -> SisregResult<Vec<Hit>> {
            tokio::time::sleep(self.delay).await;
            match class {
                RecordClass::Referral => Err(SisregError::Timeout {
                    url: "solicitacao".into(),
                    secs: 0,
                }),
                RecordClass::Appointment => {
                    Ok(vec![hit(json!({"nome_unidade_executante": "HOSPITAL X"}))])
                }
            }
        }
    }

    #[tokio::test]
    async fn searches_run_concurrently_and_fail_independently() {
        let delay = Duration::from_millis(400);
        let started = std::time::Instant::now();
        let fetched = fetch_both(&SlowReferrals { delay }, &CanonicalCpf::new("1")).await;
        let elapsed = started.elapsed();

        assert!(
            elapsed < delay * 2,
            "searches ran one after the other: {elapsed:?}"
        );
        assert!(fetched.referrals.is_empty());
        assert_eq!(fetched.appointments.len(), 1);
        assert_eq!(
            fetched.appointments[0]
                .source
                .text("nome_unidade_executante")
                .as_deref(),
            Some("HOSPITAL X")
        );
    }

    async fn spawn_upstream(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn client_for(base_url: &str, timeout: Duration) -> SisregClient {
        let cfg = SisregConfig::new(Credentials::new("user", "pass").unwrap())
            .with_base_url(base_url)
            .unwrap()
            .with_timeout(timeout);
        SisregClient::new(Arc::new(cfg)).unwrap()
    }

    #[tokio::test]
    async fn client_posts_query_with_basic_auth() {
        let router = Router::new()
            .route(
                "/solicitacao-ambulatorial-ms-tres-lagoas/_search",
                post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                    // base64("user:pass")
                    let auth = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default();
                    if auth != "Basic dXNlcjpwYXNz" {
                        return (StatusCode::UNAUTHORIZED, Json(json!({})));
                    }
                    let cpf = body["query"]["bool"]["must"][0]["term"]["cpf_usuario"].clone();
                    (
                        StatusCode::OK,
                        Json(json!({
                            "hits": {"total": {"value": 1}, "hits": [
                                {"_id": "a", "_source": {"cpf_usuario": cpf}}
                            ]}
                        })),
                    )
                }),
            )
            .route(
                "/marcacao-ambulatorial-ms-tres-lagoas/_search",
                post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
            );
        let base = spawn_upstream(router).await;
        let client = client_for(&base, Duration::from_secs(5));
        let cpf = CanonicalCpf::new("123.456.789-00");

        let referrals = client.search(RecordClass::Referral, &cpf).await.unwrap();
        assert_eq!(referrals.len(), 1);
        assert_eq!(
            referrals[0].source.text("cpf_usuario").as_deref(),
            Some("12345678900")
        );

        let err = client
            .search(RecordClass::Appointment, &cpf)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SisregError::UpstreamStatus { status: 500, ref body, .. } if body == "boom"
        ));

        let fetched = fetch_both(&client, &cpf).await;
        assert_eq!(fetched.referrals.len(), 1);
        assert!(fetched.appointments.is_empty());
    }

    #[tokio::test]
    async fn slow_upstream_times_out() {
        let router = Router::new().route(
            "/solicitacao-ambulatorial-ms-tres-lagoas/_search",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(3)).await;
                Json(json!({"hits": {"hits": []}}))
            }),
        );
        let base = spawn_upstream(router).await;
        let client = client_for(&base, Duration::from_millis(200));

        let err = client
            .search(RecordClass::Referral, &CanonicalCpf::new("1"))
            .await
            .unwrap_err();
        assert!(matches!(err, SisregError::Timeout { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn slow_index_does_not_hold_back_the_other() {
        let router = Router::new()
            .route(
                "/solicitacao-ambulatorial-ms-tres-lagoas/_search",
                post(|| async {
                    tokio::time::sleep(Duration::from_secs(3)).await;
                    Json(json!({"hits": {"hits": []}}))
                }),
            )
            .route(
                "/marcacao-ambulatorial-ms-tres-lagoas/_search",
                post(|| async {
                    Json(json!({"hits": {"total": 1, "hits": [
                        {"_source": {"data_marcacao": "2025-10-15"}}
                    ]}}))
                }),
            );
        let base = spawn_upstream(router).await;
        let client = client_for(&base, Duration::from_millis(200));

        let started = std::time::Instant::now();
        let fetched = fetch_both(&client, &CanonicalCpf::new("1")).await;

        assert!(started.elapsed() < Duration::from_secs(2));
        assert!(fetched.referrals.is_empty());
        assert_eq!(fetched.appointments.len(), 1);
    }

    #[tokio::test]
    async fn unreachable_upstream_is_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let client = client_for(&format!("http://{addr}"), Duration::from_secs(2));

        let err = client
            .search(RecordClass::Referral, &CanonicalCpf::new("1"))
            .await
            .unwrap_err();
        assert!(matches!(err, SisregError::Transport { .. }), "got {err:?}");
    }
}
