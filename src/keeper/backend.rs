/// Backend REST client
///
/// Endpoints used by the jobs:
/// 1. GET  /positions/all-opened-positions     - list open positions
/// 2. POST /should-close                       - close verdict for one position
/// 3. POST /positions/position/{id}/close      - close one position
/// 4. GET  /orders/all-opened-orders           - list open orders
/// 5. POST /should-execute                     - execute verdict for one order
/// 6. POST /orders/order/{id}/execute          - execute one order
///
/// Each call is attempted once; failures are mapped onto the keeper error
/// taxonomy by the caller-facing methods below.
use super::types::CandidateId;
use crate::apis::HttpClient;
use crate::config::BackendConfig;
use crate::errors::{KeeperError, KeeperResult};
use crate::logger::{self, LogTag};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use url::Url;

pub struct BackendClient {
    http: HttpClient,
    base_url: Url,
}

impl BackendClient {
    pub fn new(http: &HttpClient, config: &BackendConfig) -> KeeperResult<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            KeeperError::configuration(format!("backend.base_url '{}': {}", config.base_url, e))
        })?;

        Ok(Self {
            http: http.with_timeout(config.timeout_secs),
            base_url,
        })
    }

    /// Absolute URL for the given path segments; segments are percent-encoded
    pub fn endpoint(&self, segments: &[&str]) -> KeeperResult<String> {
        build_endpoint(&self.base_url, segments)
    }

    /// GET a listing endpoint and return its JSON body.
    ///
    /// Transport errors and non-2xx statuses are `CandidateListUnavailable`.
    /// A 2xx body that is not JSON is returned as `null` (treated as empty).
    pub async fn fetch_list(&self, segments: &[&str]) -> KeeperResult<Value> {
        let url = self.endpoint(segments)?;
        let unavailable = |reason: String| KeeperError::CandidateListUnavailable {
            endpoint: url.clone(),
            reason,
        };

        let response = self
            .http
            .get_json(&url)
            .await
            .map_err(|e| unavailable(e.to_string()))?;

        if !response.is_success() {
            return Err(unavailable(format!(
                "HTTP {}: {}",
                response.status,
                response.body_excerpt()
            )));
        }

        logger::verbose(LogTag::Backend, &format!("GET {} -> {}", url, response.body));

        match response.json() {
            Ok(body) => Ok(body),
            Err(e) => {
                logger::warning(
                    LogTag::Backend,
                    &format!("Listing {} returned non-JSON body ({}), treating as empty", url, e),
                );
                Ok(Value::Null)
            }
        }
    }

    /// POST a decision request and read the boolean `verdict_field`
    pub async fn fetch_decision<T: Serialize + ?Sized>(
        &self,
        segments: &[&str],
        payload: &T,
        verdict_field: &str,
        candidate_id: &CandidateId,
    ) -> KeeperResult<bool> {
        let url = self.endpoint(segments)?;
        let unavailable = |reason: String| KeeperError::DecisionUnavailable {
            candidate_id: candidate_id.to_string(),
            reason,
        };

        let response = self
            .http
            .post_json(&url, payload)
            .await
            .map_err(|e| unavailable(e.to_string()))?;

        if !response.is_success() {
            return Err(unavailable(format!(
                "HTTP {}: {}",
                response.status,
                response.body_excerpt()
            )));
        }

        let body = response.json().map_err(|e| KeeperError::MalformedDecision {
            candidate_id: candidate_id.to_string(),
            reason: format!("response is not JSON: {}", e),
        })?;

        logger::debug(
            LogTag::Backend,
            &format!("POST {} for {} -> {}", url, candidate_id, body),
        );

        parse_decision(&body, verdict_field, candidate_id)
    }

    /// POST a state-changing action. Success is any 2xx; the body is ignored.
    pub async fn perform_action<T: Serialize + ?Sized>(
        &self,
        segments: &[&str],
        payload: &T,
        candidate_id: &CandidateId,
    ) -> KeeperResult<()> {
        let url = self.endpoint(segments)?;
        let failed = |reason: String| KeeperError::ActionFailed {
            candidate_id: candidate_id.to_string(),
            reason,
        };

        let response = self
            .http
            .post_json(&url, payload)
            .await
            .map_err(|e| failed(e.to_string()))?;

        if !response.is_success() {
            return Err(failed(format!(
                "HTTP {}: {}",
                response.status,
                response.body_excerpt()
            )));
        }

        logger::debug(
            LogTag::Backend,
            &format!("POST {} -> HTTP {}", url, response.status),
        );
        Ok(())
    }
}

fn build_endpoint(base: &Url, segments: &[&str]) -> KeeperResult<String> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| {
            KeeperError::configuration(format!("backend.base_url '{}' cannot be a base", base))
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url.to_string())
}

/// Decode the `data` array of a listing response.
///
/// - missing or non-array `data`: empty list
/// - `max_candidates > 0`: only the first N raw entries are considered
/// - entries that do not decode are dropped with a warning
pub fn parse_candidate_list<T: DeserializeOwned>(
    body: &Value,
    max_candidates: usize,
    entity: &str,
) -> Vec<T> {
    let entries = match body.get("data").and_then(Value::as_array) {
        Some(entries) => entries,
        None => {
            logger::debug(
                LogTag::Backend,
                &format!("No {} list in response, nothing to do", entity),
            );
            return Vec::new();
        }
    };

    let limit = if max_candidates == 0 {
        entries.len()
    } else {
        max_candidates.min(entries.len())
    };

    entries[..limit]
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| match T::deserialize(entry) {
            Ok(candidate) => Some(candidate),
            Err(e) => {
                logger::warning(
                    LogTag::Backend,
                    &format!("Skipping malformed {} at index {}: {}", entity, index, e),
                );
                None
            }
        })
        .collect()
}

/// Read a boolean verdict. Absent or non-boolean is `MalformedDecision`,
/// never an implicit "do not act".
pub fn parse_decision(
    body: &Value,
    verdict_field: &str,
    candidate_id: &CandidateId,
) -> KeeperResult<bool> {
    match body.get(verdict_field) {
        Some(Value::Bool(verdict)) => Ok(*verdict),
        Some(other) => Err(KeeperError::MalformedDecision {
            candidate_id: candidate_id.to_string(),
            reason: format!("'{}' is not a boolean: {}", verdict_field, other),
        }),
        None => Err(KeeperError::MalformedDecision {
            candidate_id: candidate_id.to_string(),
            reason: format!("'{}' missing in response: {}", verdict_field, body),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keeper::types::{Order, Position};
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> BackendClient {
        let config = BackendConfig {
            base_url: server.uri(),
            ..Default::default()
        };
        BackendClient::new(&HttpClient::new(5).unwrap(), &config).unwrap()
    }

    fn order(id: u64) -> Value {
        json!({"id": id, "type": "long", "amount": 100, "leverage": 2})
    }

    #[test]
    fn test_endpoint_joins_and_encodes_segments() {
        let base = Url::parse("https://api.example.com").unwrap();
        assert_eq!(
            build_endpoint(&base, &["positions", "position", "17", "close"]).unwrap(),
            "https://api.example.com/positions/position/17/close"
        );

        let nested = Url::parse("https://api.example.com/v1/").unwrap();
        assert_eq!(
            build_endpoint(&nested, &["orders", "order", "a b/c", "execute"]).unwrap(),
            "https://api.example.com/v1/orders/order/a%20b%2Fc/execute"
        );
    }

    #[test]
    fn test_missing_or_non_list_data_is_empty() {
        for body in [json!({}), json!({"data": null}), json!({"data": {"id": 1}}), Value::Null] {
            let orders: Vec<Order> = parse_candidate_list(&body, 0, "order");
            assert!(orders.is_empty(), "{}", body);
        }

        let orders: Vec<Order> = parse_candidate_list(&json!({"data": []}), 0, "order");
        assert!(orders.is_empty());
    }

    #[test]
    fn test_cap_applies_to_first_entries() {
        let body = json!({"data": [order(1), order(2), order(3), order(4), order(5)]});

        let capped: Vec<Order> = parse_candidate_list(&body, 3, "order");
        let ids: Vec<&str> = capped.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);

        let uncapped: Vec<Order> = parse_candidate_list(&body, 0, "order");
        assert_eq!(uncapped.len(), 5);

        let large_cap: Vec<Order> = parse_candidate_list(&body, 10, "order");
        assert_eq!(large_cap.len(), 5);
    }

    #[test]
    fn test_entries_without_id_are_dropped() {
        let body = json!({"data": [order(1), {"type": "long", "amount": 5}, {"id": ""}, order(3)]});
        let orders: Vec<Order> = parse_candidate_list(&body, 0, "order");
        let ids: Vec<&str> = orders.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn test_position_with_null_pnl_is_kept() {
        let body = json!({"data": [
            {"id": 1, "type": "long", "entryPrice": 64000, "pnl": null, "size": 1, "leverage": 5},
            {"id": 2, "type": "long", "entryPrice": 64000, "pnl": 3, "size": 1, "leverage": 5},
            {"id": 3}
        ]});
        let positions: Vec<Position> = parse_candidate_list(&body, 0, "position");
        let ids: Vec<&str> = positions.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
        assert_eq!(positions[0].pnl, None);
    }

    #[test]
    fn test_parse_decision() {
        let id = CandidateId::from("9");
        assert_eq!(parse_decision(&json!({"shouldClose": true}), "shouldClose", &id), Ok(true));
        assert_eq!(
            parse_decision(&json!({"shouldExecute": false}), "shouldExecute", &id),
            Ok(false)
        );

        let missing = parse_decision(&json!({"ok": true}), "shouldClose", &id).unwrap_err();
        assert!(matches!(missing, KeeperError::MalformedDecision { .. }));

        let wrong_type = parse_decision(&json!({"shouldClose": "true"}), "shouldClose", &id);
        assert!(matches!(wrong_type, Err(KeeperError::MalformedDecision { .. })));
    }

    #[tokio::test]
    async fn test_listing_error_status_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/orders/all-opened-orders"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .expect(1)
            .mount(&server)
            .await;

        let err = client(&server)
            .fetch_list(&["orders", "all-opened-orders"])
            .await
            .unwrap_err();
        assert!(matches!(err, KeeperError::CandidateListUnavailable { .. }));
        assert!(err.is_fatal());
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn test_listing_non_json_body_is_null() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/positions/all-opened-positions"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
            .mount(&server)
            .await;

        let body = client(&server)
            .fetch_list(&["positions", "all-opened-positions"])
            .await
            .unwrap();
        assert_eq!(body, Value::Null);
        assert!(parse_candidate_list::<Position>(&body, 0, "position").is_empty());
    }

    #[tokio::test]
    async fn test_decision_non_json_body_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/should-close"))
            .respond_with(ResponseTemplate::new(200).set_body_string("yes please"))
            .mount(&server)
            .await;

        let id = CandidateId::from("4");
        let err = client(&server)
            .fetch_decision(&["should-close"], &json!({}), "shouldClose", &id)
            .await
            .unwrap_err();
        assert!(matches!(err, KeeperError::MalformedDecision { .. }));
    }

    #[tokio::test]
    async fn test_decision_error_status_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/should-execute"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let id = CandidateId::from("5");
        let err = client(&server)
            .fetch_decision(&["should-execute"], &json!({}), "shouldExecute", &id)
            .await
            .unwrap_err();
        assert!(matches!(err, KeeperError::DecisionUnavailable { .. }));
        assert!(!err.is_fatal());
    }

    #[tokio::test]
    async fn test_action_status_decides_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/positions/position/1/close"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/positions/position/2/close"))
            .respond_with(ResponseTemplate::new(500).set_body_string("locked"))
            .mount(&server)
            .await;

        let backend = client(&server);
        let payload = json!({"closePrice": 65000.0});

        let ok = CandidateId::from("1");
        backend
            .perform_action(&["positions", "position", "1", "close"], &payload, &ok)
            .await
            .unwrap();

        let rejected = CandidateId::from("2");
        let err = backend
            .perform_action(&["positions", "position", "2", "close"], &payload, &rejected)
            .await
            .unwrap_err();
        assert!(matches!(err, KeeperError::ActionFailed { .. }));
    }
}
