use std::str::FromStr;

use anyhow::Result;
use geom::LonLat;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RoutingMode {
    Fast,
    Short,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransportMode {
    Car,
    Truck,
    Pedestrian,
    Bicycle,
    Scooter,
    Taxi,
    Bus,
}

/// Which optional pieces of each section the service should include.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReturnField {
    Polyline,
    Actions,
    Instructions,
    TurnByTurnActions,
    TravelSummary,
    Summary,
    Elevation,
}

impl RoutingMode {
    pub fn as_str(self) -> &'static str {
        match self {
            RoutingMode::Fast => "fast",
            RoutingMode::Short => "short",
        }
    }
}

impl TransportMode {
    pub fn all() -> Vec<Self> {
        use TransportMode::*;
        vec![Car, Truck, Pedestrian, Bicycle, Scooter, Taxi, Bus]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TransportMode::Car => "car",
            TransportMode::Truck => "truck",
            TransportMode::Pedestrian => "pedestrian",
            TransportMode::Bicycle => "bicycle",
            TransportMode::Scooter => "scooter",
            TransportMode::Taxi => "taxi",
            TransportMode::Bus => "bus",
        }
    }
}

impl ReturnField {
    pub fn as_str(self) -> &'static str {
        match self {
            ReturnField::Polyline => "polyline",
            ReturnField::Actions => "actions",
            ReturnField::Instructions => "instructions",
            ReturnField::TurnByTurnActions => "turnByTurnActions",
            ReturnField::TravelSummary => "travelSummary",
            ReturnField::Summary => "summary",
            ReturnField::Elevation => "elevation",
        }
    }
}

impl FromStr for RoutingMode {
    type Err = anyhow::Error;

    fn from_str(x: &str) -> Result<Self> {
        match x {
            "fast" => Ok(RoutingMode::Fast),
            "short" => Ok(RoutingMode::Short),
            _ => bail!("Unknown routing mode {x}; use fast or short"),
        }
    }
}

impl FromStr for TransportMode {
    type Err = anyhow::Error;

    fn from_str(x: &str) -> Result<Self> {
        for mode in TransportMode::all() {
            if mode.as_str() == x {
                return Ok(mode);
            }
        }
        bail!("Unknown transport mode {x}")
    }
}

#[derive(Clone, Debug)]
pub struct RouteRequest {
    pub routing_mode: RoutingMode,
    pub transport_mode: TransportMode,
    pub origin: LonLat,
    pub destination: LonLat,
    pub return_fields: Vec<ReturnField>,
}

impl RouteRequest {
    /// A car route across central Berlin, asking for everything the demo renders.
    pub fn demo() -> Self {
        Self {
            routing_mode: RoutingMode::Fast,
            transport_mode: TransportMode::Car,
            // Brandenburg Gate
            origin: LonLat::new(13.3779, 52.5160),
            // Friedrichstraße station
            destination: LonLat::new(13.3862, 52.5206),
            return_fields: vec![
                ReturnField::Polyline,
                ReturnField::TurnByTurnActions,
                ReturnField::Actions,
                ReturnField::Instructions,
                ReturnField::TravelSummary,
            ],
        }
    }

    /// The query parameters, minus credentials.
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let return_fields: Vec<&str> = self.return_fields.iter().map(|x| x.as_str()).collect();
        vec![
            ("routingMode", self.routing_mode.as_str().to_string()),
            ("transportMode", self.transport_mode.as_str().to_string()),
            ("origin", format_lat_lng(self.origin)),
            ("destination", format_lat_lng(self.destination)),
            ("return", return_fields.join(",")),
        ]
    }
}

/// The service wants "lat,lng", the opposite order of LonLat.
pub fn format_lat_lng(pt: LonLat) -> String {
    format!("{},{}", pt.y(), pt.x())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_query() {
        let query = RouteRequest::demo().to_query();
        assert_eq!(
            query,
            vec![
                ("routingMode", "fast".to_string()),
                ("transportMode", "car".to_string()),
                ("origin", "52.516,13.3779".to_string()),
                ("destination", "52.5206,13.3862".to_string()),
                (
                    "return",
                    "polyline,turnByTurnActions,actions,instructions,travelSummary".to_string()
                ),
            ]
        );
    }

    #[test]
    fn parse_modes() {
        assert_eq!("short".parse::<RoutingMode>().unwrap(), RoutingMode::Short);
        assert!("scenic".parse::<RoutingMode>().is_err());
        for mode in TransportMode::all() {
            assert_eq!(mode.as_str().parse::<TransportMode>().unwrap(), mode);
        }
        assert!("hovercraft".parse::<TransportMode>().is_err());
    }
}
