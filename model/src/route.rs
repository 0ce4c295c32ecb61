use anyhow::Result;
use geom::GPSBounds;
use routing::Route;

use crate::Position;

/// Totals over every section of a route.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Summary {
    pub length_meters: u64,
    pub duration_seconds: u64,
}

impl Summary {
    pub fn from_route(route: &Route) -> Self {
        let mut summary = Self {
            length_meters: 0,
            duration_seconds: 0,
        };
        for section in &route.sections {
            match section.travel_summary {
                Some(ts) => {
                    summary.length_meters += ts.length;
                    summary.duration_seconds += ts.duration;
                }
                None => warn!("Section {} has no travel summary", section.id),
            }
        }
        summary
    }
}

/// "2 minutes 5 seconds."
pub fn format_duration(seconds: u64) -> String {
    format!("{} minutes {} seconds.", seconds / 60, seconds % 60)
}

/// For each section, the road it starts onto and the road it ends on.
pub fn waypoint_labels(route: &Route) -> Vec<String> {
    let mut labels = Vec::new();
    for section in &route.sections {
        let first = section
            .turn_by_turn_actions
            .first()
            .and_then(|a| a.next_road.as_ref())
            .and_then(|r| r.first_name());
        let last = section
            .turn_by_turn_actions
            .last()
            .and_then(|a| a.current_road.as_ref())
            .and_then(|r| r.first_name());
        for name in [first, last].into_iter().flatten() {
            labels.push(name.to_string());
        }
    }
    labels
}

#[derive(Clone, Debug, PartialEq)]
pub struct Manoeuvre {
    pub section: usize,
    pub pos: Position,
    pub action: String,
    pub direction: Option<String>,
    pub instruction: Option<String>,
}

impl Manoeuvre {
    /// Like "leftturn" or "depart", for picking an arrow icon.
    pub fn arrow_class(&self) -> String {
        format!("{}{}", self.direction.as_deref().unwrap_or(""), self.action)
    }
}

/// Every action of every section, placed along the decoded shape.
pub fn manoeuvres(route: &Route) -> Result<Vec<Manoeuvre>> {
    place_manoeuvres(route, &section_shapes(route)?)
}

/// Like `manoeuvres`, with the shapes from `section_shapes` already decoded.
pub fn place_manoeuvres(route: &Route, shapes: &[Vec<Position>]) -> Result<Vec<Manoeuvre>> {
    if shapes.len() != route.sections.len() {
        bail!(
            "{} shapes for {} sections",
            shapes.len(),
            route.sections.len()
        );
    }
    let mut results = Vec::new();
    for (idx, (section, shape)) in route.sections.iter().zip(shapes).enumerate() {
        for action in &section.actions {
            let pos = match shape.get(action.offset) {
                Some(pos) => *pos,
                None => bail!(
                    "Section {} has an action at offset {}, but only {} points",
                    section.id,
                    action.offset,
                    shape.len()
                ),
            };
            results.push(Manoeuvre {
                section: idx,
                pos,
                action: action.action.clone(),
                direction: action.direction.clone(),
                instruction: action.instruction.clone(),
            });
        }
    }
    Ok(results)
}

/// The decoded shape of each section, in order.
pub fn section_shapes(route: &Route) -> Result<Vec<Vec<Position>>> {
    let mut shapes = Vec::new();
    for section in &route.sections {
        let pl = section.decode_polyline()?;
        shapes.push(pl.coordinates.into_iter().map(Position::from).collect());
    }
    Ok(shapes)
}

/// None if there are no positions.
pub fn bounds_of<'a, I: IntoIterator<Item = &'a Position>>(positions: I) -> Option<GPSBounds> {
    let mut bounds = GPSBounds::new();
    let mut any = false;
    for pos in positions {
        bounds.update(pos.to_lon_lat());
        any = true;
    }
    if any {
        Some(bounds)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use routing::RouteResponse;

    use super::*;

    fn sample() -> RouteResponse {
        RouteResponse::parse(include_str!("../../data/sample_response.json")).unwrap()
    }

    fn two_sections() -> RouteResponse {
        RouteResponse::parse(
            r#"{"routes": [{"id": "r", "sections": [
                {
                    "id": "a",
                    "polyline": "BFoz5xJ67i1B1B7PzIhaxL7Y",
                    "travelSummary": {"duration": 65, "length": 400},
                    "actions": [{"action": "depart", "offset": 0, "instruction": "Go"}],
                    "turnByTurnActions": [
                        {"action": "depart", "offset": 0, "nextRoad": {"name": [{"value": "A-Straße"}]}},
                        {"action": "arrive", "offset": 3, "currentRoad": {"name": [{"value": "B-Weg"}]}}
                    ]
                },
                {
                    "id": "b",
                    "polyline": "BFoz5xJ67i1B1B7PzIhaxL7Y",
                    "travelSummary": {"duration": 60, "length": 250},
                    "actions": [{"action": "arrive", "offset": 3}],
                    "turnByTurnActions": [
                        {"action": "depart", "offset": 0, "nextRoad": {"name": []}},
                        {"action": "arrive", "offset": 3, "currentRoad": {"name": [{"value": "C-Allee"}]}}
                    ]
                }
            ]}]}"#,
        )
        .unwrap()
    }

    #[test]
    fn durations() {
        assert_eq!(format_duration(0), "0 minutes 0 seconds.");
        assert_eq!(format_duration(125), "2 minutes 5 seconds.");
        assert_eq!(format_duration(3600), "60 minutes 0 seconds.");
    }

    #[test]
    fn summary_sums_sections() {
        let resp = two_sections();
        assert_eq!(
            Summary::from_route(&resp.routes[0]),
            Summary {
                length_meters: 650,
                duration_seconds: 125,
            }
        );

        let resp = sample();
        let summary = Summary::from_route(resp.first_route().unwrap());
        assert_eq!(summary.length_meters, 1347);
        assert_eq!(format_duration(summary.duration_seconds), "4 minutes 5 seconds.");
    }

    #[test]
    fn labels() {
        let resp = sample();
        assert_eq!(
            waypoint_labels(resp.first_route().unwrap()),
            vec!["Pariser Platz".to_string(), "Friedrichstraße".to_string()]
        );
        // The second section's first road has no name
        assert_eq!(
            waypoint_labels(&two_sections().routes[0]),
            vec![
                "A-Straße".to_string(),
                "B-Weg".to_string(),
                "C-Allee".to_string()
            ]
        );
    }

    #[test]
    fn manoeuvres_along_shape() {
        let resp = sample();
        let list = manoeuvres(resp.first_route().unwrap()).unwrap();
        assert_eq!(list.len(), 4);
        assert_eq!(list[0].pos, Position::new(52.51604, 13.37792));
        assert_eq!(list[1].pos, Position::new(52.51627, 13.37947));
        assert_eq!(list[1].arrow_class(), "leftturn");
        assert_eq!(list[3].arrow_class(), "arrive");
        assert_eq!(list[3].pos, Position::new(52.52064, 13.38622));

        let list = manoeuvres(&two_sections().routes[0]).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[1].section, 1);
        assert_eq!(list[1].instruction, None);
    }

    #[test]
    fn offset_past_shape() {
        let resp = RouteResponse::parse(
            r#"{"routes": [{"sections": [{"id": "a", "polyline": "BFoz5xJ67i1B1B7PzIhaxL7Y", "actions": [{"action": "arrive", "offset": 4}]}]}]}"#,
        )
        .unwrap();
        assert!(manoeuvres(&resp.routes[0]).is_err());

        let shapes = section_shapes(&resp.routes[0]).unwrap();
        assert!(place_manoeuvres(&resp.routes[0], &shapes).is_err());
        assert!(place_manoeuvres(&resp.routes[0], &[]).is_err());
    }

    #[test]
    fn shapes_and_bounds() {
        let resp = sample();
        let shapes = section_shapes(resp.first_route().unwrap()).unwrap();
        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes[0].len(), 6);

        let bounds = bounds_of(&shapes[0]).unwrap();
        assert!(bounds.min_lat < bounds.max_lat);
        assert!(bounds.min_lon < bounds.max_lon);
        assert!(bounds_of(&Vec::<Position>::new()).is_none());
    }
}
