//! Origin-based restriction and the address allow-list.
//!
//! The guard is fail-closed: when geoblocking is enabled, a request without a
//! usable country code is treated as restricted. The allow-list is a separate
//! signal; callers decide how it interacts with the guard.

use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::lists::{StaticAddressSet, StaticCountrySet};
use crate::metrics::{SharedMetrics, METRIC_GEO_RESTRICTED};

pub const HEADER_COUNTRY: &str = "cf-ipcountry";
pub const HEADER_REGION: &str = "cf-region-code";
pub const HEADER_STATUS: &str = "cf-ipcountry-status";

const UNDEFINED_COUNTRY: &str = "undefined";

/// Origin metadata supplied by the edge layer. Untrusted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoOriginHeaders {
    pub country: Option<String>,
    pub region: Option<String>,
    pub status: Option<String>,
}

impl GeoOriginHeaders {
    pub fn from_country(country: impl Into<String>) -> Self {
        Self {
            country: Some(country.into()),
            ..Self::default()
        }
    }

    pub fn from_header_map(headers: &HeaderMap) -> Self {
        let get = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        Self {
            country: get(HEADER_COUNTRY),
            region: get(HEADER_REGION),
            status: get(HEADER_STATUS),
        }
    }

    /// The country code when it looks like an ISO 3166-1 alpha-2 code.
    fn valid_country(&self) -> Option<&str> {
        self.country
            .as_deref()
            .map(str::trim)
            .filter(|c| c.len() == 2 && c.chars().all(|ch| ch.is_ascii_alphabetic()))
    }
}

/// Reason attached to a geo restriction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GeoComplianceReason {
    UsGeo,
    CaGeo,
    GbGeo,
    SanctionedGeo,
}

impl GeoComplianceReason {
    fn for_country(country: Option<&str>) -> Self {
        match country.map(str::to_uppercase).as_deref() {
            Some("US") => GeoComplianceReason::UsGeo,
            Some("CA") => GeoComplianceReason::CaGeo,
            Some("GB") => GeoComplianceReason::GbGeo,
            _ => GeoComplianceReason::SanctionedGeo,
        }
    }
}

#[derive(Clone)]
pub struct GeoRestrictionGuard {
    enabled: bool,
    restricted: Arc<StaticCountrySet>,
    metrics: SharedMetrics,
}

impl GeoRestrictionGuard {
    pub fn new(enabled: bool, restricted: Arc<StaticCountrySet>, metrics: SharedMetrics) -> Self {
        Self {
            enabled,
            restricted,
            metrics,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_restricted(&self, headers: &GeoOriginHeaders) -> bool {
        if !self.check(headers) {
            return false;
        }

        let tag = headers.country.as_deref().unwrap_or(UNDEFINED_COUNTRY);
        self.metrics.increment(METRIC_GEO_RESTRICTED, &[("country", tag)]);
        tracing::info!(country = tag, region = ?headers.region, "Request origin is restricted");
        true
    }

    /// Why the origin is restricted, or `None` when it is not.
    pub fn geo_compliance_reason(&self, headers: &GeoOriginHeaders) -> Option<GeoComplianceReason> {
        self.check(headers)
            .then(|| GeoComplianceReason::for_country(headers.valid_country()))
    }

    fn check(&self, headers: &GeoOriginHeaders) -> bool {
        if !self.enabled {
            return false;
        }
        match headers.valid_country() {
            Some(country) => self.restricted.contains(country),
            None => true,
        }
    }
}

/// Address allow-list, consulted independently of the other signals.
#[derive(Debug, Clone)]
pub struct AllowListCheck {
    allow_listed: Arc<StaticAddressSet>,
}

impl AllowListCheck {
    pub fn new(allow_listed: Arc<StaticAddressSet>) -> Self {
        Self { allow_listed }
    }

    pub fn is_allow_listed(&self, address: &str) -> bool {
        self.allow_listed.contains(address)
    }
}
