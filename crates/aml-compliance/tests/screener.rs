mod common;

use std::sync::Arc;

use aml_compliance::config::{Config, ListsConfig};
use aml_compliance::metrics::METRIC_GEO_RESTRICTED;
use aml_compliance::{
    ComplianceError, ComplianceScreenerBuilder, GeoComplianceReason, GeoOriginHeaders, ProviderId,
    ProviderRegistry, RiskApiClient, RiskApiError, StaticAddressSet,
};
use common::{risk_config, scored, status, RecordingMetrics, ScriptedTransport};

fn config(provider: &str) -> Config {
    Config {
        provider: provider.to_string(),
        risk_api: risk_config(3),
        lists: ListsConfig {
            blocked_addresses: "dydx1blocked, dydx1twice".to_string(),
            restricted_countries: "US,CU".to_string(),
            allow_listed_addresses: "dydx1twice,dydx1friend".to_string(),
        },
        ..Config::default()
    }
}

#[tokio::test]
async fn test_risk_scoring_threshold() {
    let transport = ScriptedTransport::new(vec![scored(10), scored(9)]);
    let screener = ComplianceScreenerBuilder::new()
        .with_config(config("RISK_SCORING"))
        .with_transport(transport.clone())
        .build()
        .unwrap();

    let at_threshold = screener.screen_address("0xabc").await.unwrap();
    assert!(at_threshold.blocked);
    assert_eq!(at_threshold.risk_score.as_deref(), Some("10"));

    let below = screener.screen_address("0xabc").await.unwrap();
    assert!(!below.blocked);
    assert_eq!(below.risk_score.as_deref(), Some("9"));
    assert_eq!(transport.calls(), 2);
}

#[tokio::test]
async fn test_risk_scoring_sentinels_have_no_score() {
    let transport = ScriptedTransport::new(vec![
        Ok(r#"{"risk_score": null}"#.to_string()),
        status(404, r#"{"name":"NotInBlockchain"}"#),
    ]);
    let screener = ComplianceScreenerBuilder::new()
        .with_config(config("RISK_SCORING"))
        .with_transport(transport)
        .build()
        .unwrap();

    for _ in 0..2 {
        let result = screener.screen_address("0xabc").await.unwrap();
        assert!(!result.blocked);
        assert_eq!(result.risk_score, None);
    }
}

#[tokio::test]
async fn test_risk_scoring_propagates_upstream_errors() {
    let transport = ScriptedTransport::new(vec![status(429, "")]);
    let screener = ComplianceScreenerBuilder::new()
        .with_config(config("RISK_SCORING"))
        .with_transport(transport)
        .build()
        .unwrap();

    let err = screener
        .screen("0xabc", &GeoOriginHeaders::from_country("FR"))
        .await
        .unwrap_err();
    assert!(matches!(err, ComplianceError::RiskApi(RiskApiError::RateLimited)));
}

#[tokio::test]
async fn test_provider_selection() {
    for (name, expected) in [
        ("BLOCKLIST", ProviderId::Blocklist),
        ("heuristic", ProviderId::Heuristic),
        ("RISK_SCORING", ProviderId::RiskScoring),
        ("UNKNOWN_VENDOR", ProviderId::RiskScoring),
        ("", ProviderId::RiskScoring),
    ] {
        let screener = ComplianceScreenerBuilder::new()
            .with_config(config(name))
            .with_transport(ScriptedTransport::new(vec![]))
            .build()
            .unwrap();
        assert_eq!(screener.provider_id(), expected, "provider {:?}", name);
    }
}

#[test]
fn test_registry_select_by_name() {
    let client = RiskApiClient::with_transport(
        &risk_config(3),
        ScriptedTransport::new(vec![]),
        RecordingMetrics::new(),
    )
    .unwrap();
    let registry = ProviderRegistry::new(Arc::new(StaticAddressSet::empty()), Arc::new(client), 10);

    assert_eq!(registry.select_by_name("blocklist").id(), ProviderId::Blocklist);
    assert_eq!(registry.select_by_name("nope").id(), ProviderId::RiskScoring);
    assert_eq!(registry.select(None).id(), ProviderId::RiskScoring);
}

#[tokio::test]
async fn test_signals_are_reported_independently() {
    let transport = ScriptedTransport::new(vec![]);
    let screener = ComplianceScreenerBuilder::new()
        .with_config(config("BLOCKLIST"))
        .with_transport(transport.clone())
        .build()
        .unwrap();

    // Blocked, allow-listed and geo-restricted all at once: nothing is folded together.
    let signals = screener
        .screen("dydx1twice", &GeoOriginHeaders::from_country("US"))
        .await
        .unwrap();
    assert!(signals.compliance.blocked);
    assert!(signals.allow_listed);
    assert!(signals.geo_restricted);
    assert_eq!(signals.geo_reason, Some(GeoComplianceReason::UsGeo));

    let signals = screener
        .screen("dydx1friend", &GeoOriginHeaders::from_country("FR"))
        .await
        .unwrap();
    assert!(!signals.compliance.blocked);
    assert!(signals.allow_listed);
    assert!(!signals.geo_restricted);
    assert_eq!(signals.geo_reason, None);

    // The blocklist provider never calls the risk API.
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn test_missing_country_fails_closed_and_is_counted() {
    let metrics = RecordingMetrics::new();
    let screener = ComplianceScreenerBuilder::new()
        .with_config(config("HEURISTIC"))
        .with_metrics(metrics.clone())
        .with_transport(ScriptedTransport::new(vec![]))
        .build()
        .unwrap();

    assert!(screener.is_restricted_origin(&GeoOriginHeaders::default()));
    assert!(screener.is_restricted_origin(&GeoOriginHeaders::from_country("CU")));
    assert!(!screener.is_restricted_origin(&GeoOriginHeaders::from_country("DE")));

    let tags = metrics.increments(METRIC_GEO_RESTRICTED);
    assert_eq!(
        tags,
        vec![
            vec![("country".to_string(), "undefined".to_string())],
            vec![("country".to_string(), "CU".to_string())],
        ]
    );
}

#[tokio::test]
async fn test_geoblocking_disabled() {
    let mut config = config("HEURISTIC");
    config.geoblocking.enabled = false;
    let metrics = RecordingMetrics::new();
    let screener = ComplianceScreenerBuilder::new()
        .with_config(config)
        .with_metrics(metrics.clone())
        .with_transport(ScriptedTransport::new(vec![]))
        .build()
        .unwrap();

    assert!(!screener.is_restricted_origin(&GeoOriginHeaders::default()));
    assert!(!screener.is_restricted_origin(&GeoOriginHeaders::from_country("US")));
    assert!(metrics.increments(METRIC_GEO_RESTRICTED).is_empty());
}

#[tokio::test]
async fn test_heuristic_provider_via_screener() {
    let screener = ComplianceScreenerBuilder::new()
        .with_config(config("HEURISTIC"))
        .with_transport(ScriptedTransport::new(vec![]))
        .build()
        .unwrap();

    let flagged = screener.screen_address("dydx1xyzc").await.unwrap();
    assert!(flagged.blocked);
    assert_eq!(flagged.risk_score.as_deref(), Some("75"));
    assert!(!screener.screen_address("dydx1xyzq").await.unwrap().blocked);
}

#[test]
fn test_invalid_config_file_fails_build() {
    let result = ComplianceScreenerBuilder::new()
        .with_config_file("/nonexistent/compliance.toml")
        .build();
    assert!(matches!(result, Err(ComplianceError::ConfigError(_))));
}

#[test]
fn test_invalid_secret_only_matters_for_risk_scoring() {
    for name in ["BLOCKLIST", "HEURISTIC"] {
        let mut config = config(name);
        config.risk_api.api_secret = "not base64!!".to_string();
        let screener = ComplianceScreenerBuilder::new().with_config(config).build().unwrap();
        assert_eq!(screener.provider_id().as_str(), name);
    }

    for name in ["RISK_SCORING", "UNKNOWN_VENDOR"] {
        let mut config = config(name);
        config.risk_api.api_secret = "not base64!!".to_string();
        let result = ComplianceScreenerBuilder::new()
            .with_config(config)
            .with_transport(ScriptedTransport::new(vec![]))
            .build();
        assert!(matches!(result, Err(ComplianceError::InvalidSecret(_))), "provider {:?}", name);
    }
}

#[tokio::test]
async fn test_negative_threshold_fails_build() {
    let mut config = config("RISK_SCORING");
    config.risk_api.risk_threshold = -1;
    let transport = ScriptedTransport::new(vec![Ok(r#"{"risk_score": null}"#.to_string())]);
    let result = ComplianceScreenerBuilder::new()
        .with_config(config)
        .with_transport(transport.clone())
        .build();
    assert!(matches!(result, Err(ComplianceError::ConfigError(_))));
    assert_eq!(transport.calls(), 0);
}
