use anyhow::{Context, Result};
use serde::Deserialize;

use model::Position;
use routing::{RoutingMode, TransportMode};

/// Optional settings from a JSON file. Command line flags win over anything here.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub origin: Option<Position>,
    pub destination: Option<Position>,
    pub routing_mode: Option<RoutingMode>,
    pub transport_mode: Option<TransportMode>,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let json = fs_err::read_to_string(path)?;
        Self::parse(&json).with_context(|| format!("parsing {path}"))
    }

    pub fn parse(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
