//! Turns one route into things on the map and in the panel.

use anyhow::Result;

use model::{bounds_of, format_duration, waypoint_labels, Manoeuvre, Position, Summary};
use routing::Route;

use crate::map::{GroupID, Icon, LineStyle, MapSession, ObjectID, TapAction};
use crate::panel::{Element, Panel};

pub const ROUTE_STROKE_COLOR: &str = "rgba(0, 128, 255, 0.7)";
pub const ROUTE_LINE_WIDTH: f64 = 3.0;

pub fn manoeuvre_icon() -> Icon {
    Icon::Circle {
        radius: 8.0,
        fill: "#1b468d".to_string(),
        stroke: "white".to_string(),
    }
}

/// One polyline per section. Moves the view to fit the whole route. Nothing is added if any
/// shape is too short.
pub fn add_route_shape_to_map(
    map: &mut MapSession,
    shapes: &[Vec<Position>],
) -> Result<Vec<ObjectID>> {
    if let Some((idx, shape)) = shapes.iter().enumerate().find(|(_, s)| s.len() < 2) {
        bail!("Section {idx} only has {} points", shape.len());
    }
    let mut ids = Vec::new();
    for shape in shapes {
        ids.push(map.add_polyline(
            shape.clone(),
            LineStyle {
                stroke_color: ROUTE_STROKE_COLOR.to_string(),
                line_width: ROUTE_LINE_WIDTH,
            },
        )?);
    }
    if let Some(bounds) = bounds_of(shapes.iter().flatten()) {
        map.look_at(&bounds);
    }
    Ok(ids)
}

/// A marker for every manoeuvre. Tapping one centers on it and shows the instruction.
pub fn add_manoeuvres_to_map(map: &mut MapSession, list: &[Manoeuvre]) -> Result<GroupID> {
    let markers = list
        .iter()
        .map(|m| (m.pos, manoeuvre_icon(), m.instruction.clone().unwrap_or_default()))
        .collect();
    let group = map.add_group(markers);
    map.add_tap_listener(group, TapAction::CenterAndShowData)?;
    Ok(group)
}

pub fn add_waypoints_to_panel(panel: &mut Panel, route: &Route) {
    panel.append(Element::new("h3").text(waypoint_labels(route).join(" - ")));
}

pub fn add_summary_to_panel(panel: &mut Panel, route: &Route) {
    let summary = Summary::from_route(route);
    panel.append(
        Element::new("div")
            .class("summary")
            .child(Element::new("b").text("Total distance"))
            .text(format!(": {}m. ", summary.length_meters))
            .child(Element::new("br"))
            .child(Element::new("b").text("Travel Time"))
            .text(format!(
                ": {} (in current traffic)",
                format_duration(summary.duration_seconds)
            )),
    );
}

pub fn add_manoeuvres_to_panel(panel: &mut Panel, list: &[Manoeuvre]) {
    let mut list_element = Element::new("ol").class("directions");
    for m in list {
        list_element = list_element.child(
            Element::new("li")
                .child(Element::new("span").class(format!("arrow {}", m.arrow_class())))
                .child(Element::new("span").text(m.instruction.clone().unwrap_or_default())),
        );
    }
    panel.append(list_element);
}
