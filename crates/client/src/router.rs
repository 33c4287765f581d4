//! Request classification.
//!
//! Rule order is fixed: cross-origin short-circuits everything, then the API
//! path convention, then navigation mode, and static assets last.

use serde::{Deserialize, Serialize};
use swcache_core::InterceptedRequest;
use url::{Origin, Url};

/// Which strategy serves a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RoutingDecision {
    CrossOriginAsset,
    ApiCall,
    Navigation,
    StaticAsset,
}

/// Stateless classifier bound to the page origin.
#[derive(Debug, Clone)]
pub struct Router {
    origin: Origin,
    api_prefix: String,
}

impl Router {
    pub fn new(page_origin: &Url, api_prefix: impl Into<String>) -> Self {
        Self { origin: page_origin.origin(), api_prefix: api_prefix.into() }
    }

    /// Classify a request. Pure and total.
    pub fn route(&self, request: &InterceptedRequest) -> RoutingDecision {
        if request.origin() != self.origin {
            RoutingDecision::CrossOriginAsset
        } else if request.url.path().contains(&self.api_prefix) {
            RoutingDecision::ApiCall
        } else if request.navigate {
            RoutingDecision::Navigation
        } else {
            RoutingDecision::StaticAsset
        }
    }
}
