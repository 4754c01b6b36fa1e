/// JSON-RPC price feed client
///
/// Reads `latestAnswer()` from an aggregator contract with a single `eth_call`
/// and decodes the returned word as an unsigned fixed-point price.
use super::types::Price;
use crate::apis::HttpClient;
use crate::config::OracleConfig;
use crate::errors::{KeeperError, KeeperResult};
use crate::logger::{self, LogTag};
use async_trait::async_trait;
use serde_json::{json, Value};

/// Source of the batch reference price
#[async_trait]
pub trait PriceOracle: Send + Sync {
    async fn fetch_price(&self) -> KeeperResult<Price>;
}

pub struct ChainlinkOracle {
    http: HttpClient,
    config: OracleConfig,
}

impl ChainlinkOracle {
    pub fn new(http: &HttpClient, config: OracleConfig) -> Self {
        Self {
            http: http.with_timeout(config.timeout_secs),
            config,
        }
    }
}

#[async_trait]
impl PriceOracle for ChainlinkOracle {
    async fn fetch_price(&self) -> KeeperResult<Price> {
        let request = build_eth_call_request(&self.config);
        logger::debug(
            LogTag::Oracle,
            &format!("eth_call {} -> {}", self.config.rpc_url, request),
        );

        let response = self
            .http
            .post_json(&self.config.rpc_url, &request)
            .await
            .map_err(|e| KeeperError::oracle_unavailable(e.to_string()))?;

        if !response.is_success() {
            return Err(KeeperError::oracle_unavailable(format!(
                "RPC returned HTTP {}: {}",
                response.status,
                response.body_excerpt()
            )));
        }

        let body = response
            .json()
            .map_err(|e| KeeperError::oracle_unavailable(e.to_string()))?;
        logger::verbose(LogTag::Oracle, &format!("eth_call response: {}", body));

        let price = parse_rpc_response(&body, self.config.decimals)?;
        logger::debug(
            LogTag::Oracle,
            &format!("Decoded price {} (raw {})", price, price.raw()),
        );
        Ok(price)
    }
}

/// `eth_call` request against the configured feed at the latest block
pub fn build_eth_call_request(config: &OracleConfig) -> Value {
    json!({
        "jsonrpc": "2.0",
        "method": "eth_call",
        "params": [
            {
                "to": config.contract_address,
                "data": config.selector,
            },
            "latest"
        ],
        "id": 1
    })
}

/// Extract and decode the `result` field of a JSON-RPC response
pub fn parse_rpc_response(body: &Value, decimals: u32) -> KeeperResult<Price> {
    if let Some(error) = body.get("error").filter(|e| !e.is_null()) {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        return Err(KeeperError::oracle_unavailable(format!(
            "RPC error: {}",
            message
        )));
    }

    match body.get("result") {
        None | Some(Value::Null) => decode_price(None, decimals),
        Some(Value::String(hex)) => decode_price(Some(hex), decimals),
        Some(other) => Err(KeeperError::oracle_unavailable(format!(
            "unexpected result type: {}",
            other
        ))),
    }
}

/// Decode a hex-encoded big-endian integer into a price.
///
/// - missing, empty or `"0x"` result: `OracleUnavailable`
/// - zero, non-hex, or wider than 128 significant bits: `InvalidPrice`
///   (negative int256 answers are two's complement and land in the last case)
pub fn decode_price(result: Option<&str>, decimals: u32) -> KeeperResult<Price> {
    let raw_hex = match result.map(str::trim) {
        None | Some("") | Some("0x") | Some("0X") => {
            return Err(KeeperError::oracle_unavailable("no result from price feed"));
        }
        Some(value) => value,
    };

    let digits = raw_hex
        .strip_prefix("0x")
        .or_else(|| raw_hex.strip_prefix("0X"))
        .unwrap_or(raw_hex);

    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(KeeperError::invalid_price(raw_hex, "not a hex integer"));
    }

    let significant = digits.trim_start_matches('0');
    if significant.is_empty() {
        return Err(KeeperError::invalid_price(
            raw_hex,
            "price must be strictly positive",
        ));
    }
    if significant.len() > 32 {
        return Err(KeeperError::invalid_price(
            raw_hex,
            "value does not fit in 128 bits (negative or out of range)",
        ));
    }

    let raw = u128::from_str_radix(significant, 16)
        .map_err(|e| KeeperError::invalid_price(raw_hex, e.to_string()))?;

    Price::from_raw(raw, decimals).map_err(|e| match e {
        KeeperError::InvalidPrice { reason, .. } => KeeperError::invalid_price(raw_hex, reason),
        other => other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn oracle_answering(server: &MockServer, response: ResponseTemplate) -> ChainlinkOracle {
        Mock::given(method("POST"))
            .and(body_string_contains("eth_call"))
            .and(body_string_contains("0x50d25bcd"))
            .respond_with(response)
            .expect(1)
            .mount(server)
            .await;

        let config = OracleConfig {
            rpc_url: server.uri(),
            ..Default::default()
        };
        ChainlinkOracle::new(&HttpClient::new(5).unwrap(), config)
    }

    const TWO_AND_A_HALF: &str = "0x0000000000000000000000000000000000000000000000000000000ee6b280";

    #[test]
    fn test_decode_scales_by_decimals() {
        // 0x0ee6b280 = 250,000,000
        let price = decode_price(Some(TWO_AND_A_HALF), 8).unwrap();
        assert_eq!(price.raw(), 250_000_000);
        assert_eq!(price.to_string(), "2.50000000");
        assert_eq!(price.as_f64(), 2.5);
    }

    #[test]
    fn test_decode_is_pure() {
        let first = decode_price(Some(TWO_AND_A_HALF), 8).unwrap();
        let second = decode_price(Some(TWO_AND_A_HALF), 8).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_decode_realistic_btc_answer() {
        // 65,123.45678901 USD
        let price = decode_price(Some("0x5ec460d0435"), 8).unwrap();
        assert_eq!(price.raw(), 0x5ec460d0435);
        assert_eq!(price.to_string(), "65123.45678901");
    }

    #[test]
    fn test_missing_or_empty_is_unavailable() {
        for input in [None, Some(""), Some("0x")] {
            let err = decode_price(input, 8).unwrap_err();
            assert!(
                matches!(err, KeeperError::OracleUnavailable { .. }),
                "{:?} -> {:?}",
                input,
                err
            );
        }
    }

    #[test]
    fn test_zero_is_invalid() {
        let zero = format!("0x{}", "0".repeat(64));
        let err = decode_price(Some(&zero), 8).unwrap_err();
        assert!(matches!(err, KeeperError::InvalidPrice { .. }));
    }

    #[test]
    fn test_negative_answer_is_invalid() {
        let negative = format!("0x{}", "f".repeat(64));
        let err = decode_price(Some(&negative), 8).unwrap_err();
        assert!(matches!(err, KeeperError::InvalidPrice { .. }));
    }

    #[test]
    fn test_non_hex_is_invalid() {
        let err = decode_price(Some("0xzz"), 8).unwrap_err();
        assert!(matches!(err, KeeperError::InvalidPrice { .. }));
    }

    #[test]
    fn test_parse_rpc_response_variants() {
        let ok = json!({"jsonrpc": "2.0", "id": 1, "result": TWO_AND_A_HALF});
        assert_eq!(parse_rpc_response(&ok, 8).unwrap().raw(), 250_000_000);

        let missing = json!({"jsonrpc": "2.0", "id": 1});
        assert!(matches!(
            parse_rpc_response(&missing, 8),
            Err(KeeperError::OracleUnavailable { .. })
        ));

        let rpc_error = json!({"jsonrpc": "2.0", "id": 1, "error": {"code": -32000, "message": "execution reverted"}});
        let err = parse_rpc_response(&rpc_error, 8).unwrap_err();
        assert!(err.to_string().contains("execution reverted"));
    }

    #[test]
    fn test_request_shape() {
        let request = build_eth_call_request(&OracleConfig::default());
        assert_eq!(request["method"], "eth_call");
        assert_eq!(request["params"][0]["to"], "0xF4030086522a5bEEa4988F8cA5B36dbC97BeE88c");
        assert_eq!(request["params"][0]["data"], "0x50d25bcd");
        assert_eq!(request["params"][1], "latest");
        assert_eq!(request["id"], 1);
    }

    #[tokio::test]
    async fn test_fetch_price_over_rpc() {
        let server = MockServer::start().await;
        let oracle = oracle_answering(
            &server,
            ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0", "id": 1, "result": TWO_AND_A_HALF
            })),
        )
        .await;

        let price = oracle.fetch_price().await.unwrap();
        assert_eq!(price.to_string(), "2.50000000");
    }

    #[tokio::test]
    async fn test_fetch_price_empty_result_is_unavailable() {
        let server = MockServer::start().await;
        let oracle = oracle_answering(
            &server,
            ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0", "id": 1, "result": "0x"
            })),
        )
        .await;

        let err = oracle.fetch_price().await.unwrap_err();
        assert!(matches!(err, KeeperError::OracleUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_fetch_price_http_error_is_unavailable() {
        let server = MockServer::start().await;
        let oracle =
            oracle_answering(&server, ResponseTemplate::new(502).set_body_string("bad gateway"))
                .await;

        let err = oracle.fetch_price().await.unwrap_err();
        assert!(matches!(err, KeeperError::OracleUnavailable { .. }));
        assert!(err.to_string().contains("502"));
    }
}
