use std::time::Duration;

use anyhow::{Context, Result};

use crate::{RouteRequest, RouteResponse};

pub const DEFAULT_BASE_URL: &str = "https://router.hereapi.com/v8/routes";

/// Something that can answer a route request.
pub trait RoutingService {
    fn calculate_route(&self, request: &RouteRequest) -> Result<RouteResponse>;
}

/// Talks to the HERE Routing API v8 over blocking HTTP.
pub struct HereRouter {
    agent: ureq::Agent,
    base_url: String,
    api_key: String,
}

impl HereRouter {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL.to_string(), api_key)
    }

    pub fn with_base_url(base_url: String, api_key: String) -> Self {
        Self {
            agent: ureq::AgentBuilder::new()
                .timeout(Duration::from_secs(30))
                .build(),
            base_url,
            api_key,
        }
    }
}

impl RoutingService for HereRouter {
    fn calculate_route(&self, request: &RouteRequest) -> Result<RouteResponse> {
        let mut call = self.agent.get(&self.base_url);
        for (key, value) in request.to_query() {
            call = call.query(key, &value);
        }
        call = call.query("apikey", &self.api_key);

        info!(
            "Requesting a {} route by {} from {:?} to {:?}",
            request.routing_mode.as_str(),
            request.transport_mode.as_str(),
            request.origin,
            request.destination
        );
        // Don't use the ureq error's Display directly; it includes the URL with the API key
        let response = match call.call() {
            Ok(response) => response,
            Err(ureq::Error::Status(code, _)) => {
                bail!("{} responded with HTTP {code}", self.base_url)
            }
            Err(ureq::Error::Transport(transport)) => {
                bail!("{}: {}", self.base_url, transport.kind())
            }
        };
        let routes: RouteResponse = response
            .into_json()
            .with_context(|| format!("parsing the response from {}", self.base_url))?;
        debug!("Got {} routes", routes.routes.len());
        Ok(routes)
    }
}

/// Replays a previously saved response, regardless of the request.
pub struct FileRouter {
    path: String,
}

impl FileRouter {
    pub fn new(path: String) -> Self {
        Self { path }
    }
}

impl RoutingService for FileRouter {
    fn calculate_route(&self, _: &RouteRequest) -> Result<RouteResponse> {
        info!("Reading a saved route response from {}", self.path);
        let json = fs_err::read_to_string(&self.path)?;
        RouteResponse::parse(&json).with_context(|| format!("parsing {}", self.path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_router() {
        let path = format!(
            "{}/../data/sample_response.json",
            env!("CARGO_MANIFEST_DIR")
        );
        let resp = FileRouter::new(path)
            .calculate_route(&RouteRequest::demo())
            .unwrap();
        assert_eq!(resp.routes.len(), 1);

        assert!(FileRouter::new("does/not/exist.json".to_string())
            .calculate_route(&RouteRequest::demo())
            .is_err());
    }

    #[test]
    fn unreachable_server() {
        // Port 9 on localhost is the discard service, which is almost never running
        let router = HereRouter::with_base_url(
            "http://127.0.0.1:9/v8/routes".to_string(),
            "secret-key".to_string(),
        );
        let err = router.calculate_route(&RouteRequest::demo()).unwrap_err();
        assert!(!format!("{err:#}").contains("secret-key"));
    }
}
