use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::polyline::{self, FlexiblePolyline};

// Only the fields the demo uses are modelled. Anything else in the response is ignored.

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteResponse {
    #[serde(default)]
    pub routes: Vec<Route>,
    #[serde(default)]
    pub notices: Vec<Notice>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub title: String,
    #[serde(default)]
    pub code: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub sections: Vec<Section>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default)]
    pub section_type: String,
    pub departure: Option<Stop>,
    pub arrival: Option<Stop>,
    /// Flexible polyline encoding. Only present if requested.
    #[serde(default)]
    pub polyline: String,
    #[serde(default)]
    pub actions: Vec<Action>,
    #[serde(default)]
    pub turn_by_turn_actions: Vec<TurnByTurnAction>,
    pub travel_summary: Option<TravelSummary>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stop {
    pub time: Option<String>,
    pub place: Place,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    #[serde(rename = "type", default)]
    pub place_type: String,
    pub location: Location,
    pub original_location: Option<Location>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
}

/// A manoeuvre along a section.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    pub action: String,
    /// Seconds
    #[serde(default)]
    pub duration: u64,
    /// Meters
    #[serde(default)]
    pub length: u64,
    pub instruction: Option<String>,
    /// Index into the decoded polyline
    pub offset: usize,
    pub direction: Option<String>,
    pub severity: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnByTurnAction {
    pub action: String,
    #[serde(default)]
    pub duration: u64,
    #[serde(default)]
    pub length: u64,
    pub offset: usize,
    pub direction: Option<String>,
    pub severity: Option<String>,
    pub current_road: Option<Road>,
    pub next_road: Option<Road>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Road {
    #[serde(default)]
    pub name: Vec<LocalizedString>,
    #[serde(default)]
    pub number: Vec<LocalizedString>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalizedString {
    pub value: String,
    pub language: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelSummary {
    /// Seconds, including traffic
    pub duration: u64,
    /// Meters
    pub length: u64,
    pub base_duration: Option<u64>,
}

impl RouteResponse {
    pub fn parse(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// The demo only ever looks at the first route.
    pub fn first_route(&self) -> Result<&Route> {
        match self.routes.first() {
            Some(route) => Ok(route),
            None => {
                let notices: Vec<&str> = self.notices.iter().map(|n| n.title.as_str()).collect();
                bail!("No routes in the response. Notices: {:?}", notices)
            }
        }
    }
}

impl Section {
    pub fn decode_polyline(&self) -> Result<FlexiblePolyline> {
        if self.polyline.is_empty() {
            bail!("Section {} has no polyline; was it requested?", self.id);
        }
        polyline::decode(&self.polyline).map_err(|err| anyhow!("section {}: {err}", self.id))
    }
}

impl Road {
    pub fn first_name(&self) -> Option<&str> {
        self.name.first().map(|x| x.value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_sample() {
        let resp = RouteResponse::parse(include_str!("../../data/sample_response.json")).unwrap();
        let route = resp.first_route().unwrap();
        assert_eq!(route.sections.len(), 1);

        let section = &route.sections[0];
        assert_eq!(section.section_type, "vehicle");
        assert_eq!(section.actions.len(), 4);
        assert_eq!(section.actions[1].direction.as_deref(), Some("left"));
        assert_eq!(section.actions[3].offset, 5);
        assert_eq!(
            section.travel_summary,
            Some(TravelSummary {
                duration: 245,
                length: 1347,
                base_duration: Some(210),
            })
        );
        assert_eq!(
            section.turn_by_turn_actions[0]
                .next_road
                .as_ref()
                .and_then(|r| r.first_name()),
            Some("Pariser Platz")
        );
        assert!(section.turn_by_turn_actions[0].current_road.is_none());
        assert_eq!(
            section.departure.as_ref().unwrap().place.location,
            Location {
                lat: 52.51604,
                lng: 13.37792,
            }
        );

        let pl = section.decode_polyline().unwrap();
        assert_eq!(pl.coordinates.len(), 6);
        assert_eq!(pl.coordinates[5].lat, 52.52064);
    }

    #[test]
    fn no_routes() {
        let resp = RouteResponse::parse(
            r#"{"notices": [{"title": "Route calculation failed: Couldn't find a route.", "code": "couldNotMatchDestination"}]}"#,
        )
        .unwrap();
        let err = resp.first_route().unwrap_err().to_string();
        assert!(err.contains("Couldn't find a route"));
    }

    #[test]
    fn missing_polyline() {
        let resp = RouteResponse::parse(r#"{"routes": [{"id": "r", "sections": [{"id": "s1"}]}]}"#)
            .unwrap();
        assert!(resp.routes[0].sections[0].decode_polyline().is_err());
    }
}
