use anyhow::Result;
use geojson::{Feature, FeatureCollection, GeoJson};
use geom::GPSBounds;

use model::{bounds_of, Position};

const MAX_ZOOM: f64 = 20.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectID(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupID(pub usize);

#[derive(Clone, Debug, PartialEq)]
pub struct LineStyle {
    pub stroke_color: String,
    pub line_width: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Icon {
    Circle {
        radius: f64,
        fill: String,
        stroke: String,
    },
}

impl Icon {
    pub fn to_svg(&self) -> String {
        match self {
            Icon::Circle {
                radius,
                fill,
                stroke,
            } => {
                let size = 2.0 * radius + 2.0;
                format!(
                    r#"<svg width="{size}" height="{size}" xmlns="http://www.w3.org/2000/svg"><circle cx="{radius}" cy="{radius}" r="{radius}" fill="{fill}" stroke="{stroke}" stroke-width="1" /></svg>"#
                )
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum MapObject {
    Polyline {
        points: Vec<Position>,
        style: LineStyle,
    },
    Marker {
        pos: Position,
        icon: Option<Icon>,
        /// Shown in a bubble when tapped, if the group listens for taps
        data: Option<String>,
        group: Option<GroupID>,
    },
}

/// What happens when one marker in a group is tapped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TapAction {
    /// Center on the marker and open a bubble with its data
    CenterAndShowData,
}

struct Group {
    members: Vec<ObjectID>,
    on_tap: Option<TapAction>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct View {
    pub center: Position,
    pub zoom: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Bubble {
    pub pos: Position,
    pub content: String,
}

/// Everything drawn on one map, plus the camera and any open info bubble. Owned by the app and
/// passed to whatever needs to draw.
pub struct MapSession {
    objects: Vec<MapObject>,
    groups: Vec<Group>,
    view: View,
    bubble: Option<Bubble>,
}

impl MapSession {
    pub fn new(center: Position, zoom: f64) -> Self {
        Self {
            objects: Vec::new(),
            groups: Vec::new(),
            view: View { center, zoom },
            bubble: None,
        }
    }

    pub fn add_polyline(&mut self, points: Vec<Position>, style: LineStyle) -> Result<ObjectID> {
        if points.len() < 2 {
            bail!("A polyline needs at least 2 points, not {}", points.len());
        }
        Ok(self.push(MapObject::Polyline { points, style }))
    }

    pub fn add_marker(&mut self, pos: Position, icon: Option<Icon>) -> ObjectID {
        self.push(MapObject::Marker {
            pos,
            icon,
            data: None,
            group: None,
        })
    }

    /// Each marker is (position, icon, data)
    pub fn add_group(&mut self, markers: Vec<(Position, Icon, String)>) -> GroupID {
        let id = GroupID(self.groups.len());
        let mut members = Vec::new();
        for (pos, icon, data) in markers {
            members.push(self.push(MapObject::Marker {
                pos,
                icon: Some(icon),
                data: Some(data),
                group: Some(id),
            }));
        }
        self.groups.push(Group {
            members,
            on_tap: None,
        });
        id
    }

    pub fn add_tap_listener(&mut self, group: GroupID, action: TapAction) -> Result<()> {
        match self.groups.get_mut(group.0) {
            Some(g) => {
                g.on_tap = Some(action);
                Ok(())
            }
            None => bail!("Unknown {:?}", group),
        }
    }

    pub fn group_members(&self, group: GroupID) -> &[ObjectID] {
        self.groups
            .get(group.0)
            .map(|g| g.members.as_slice())
            .unwrap_or(&[])
    }

    pub fn set_marker_position(&mut self, id: ObjectID, new_pos: Position) -> Result<()> {
        match self.objects.get_mut(id.0) {
            Some(MapObject::Marker { pos, .. }) => {
                *pos = new_pos;
                Ok(())
            }
            Some(MapObject::Polyline { .. }) => bail!("{:?} is a polyline, not a marker", id),
            None => bail!("Unknown {:?}", id),
        }
    }

    pub fn marker_position(&self, id: ObjectID) -> Option<Position> {
        match self.objects.get(id.0) {
            Some(MapObject::Marker { pos, .. }) => Some(*pos),
            _ => None,
        }
    }

    pub fn get(&self, id: ObjectID) -> Option<&MapObject> {
        self.objects.get(id.0)
    }

    pub fn objects(&self) -> impl Iterator<Item = (ObjectID, &MapObject)> {
        self.objects
            .iter()
            .enumerate()
            .map(|(idx, obj)| (ObjectID(idx), obj))
    }

    pub fn bounding_box(&self, id: ObjectID) -> Option<GPSBounds> {
        match self.objects.get(id.0)? {
            MapObject::Polyline { points, .. } => bounds_of(points),
            MapObject::Marker { pos, .. } => bounds_of([pos]),
        }
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn set_center(&mut self, center: Position) {
        self.view.center = center;
    }

    /// Centers on the bounds and picks the closest zoom level that fits all of it.
    pub fn look_at(&mut self, bounds: &GPSBounds) {
        self.view.center = Position::new(
            (bounds.min_lat + bounds.max_lat) / 2.0,
            (bounds.min_lon + bounds.max_lon) / 2.0,
        );
        let span = (bounds.max_lon - bounds.min_lon).max(bounds.max_lat - bounds.min_lat);
        self.view.zoom = if span <= 0.0 {
            MAX_ZOOM
        } else {
            (360.0 / span).log2().floor().clamp(0.0, MAX_ZOOM)
        };
    }

    /// Returns true if the tap did anything.
    pub fn tap(&mut self, id: ObjectID) -> Result<bool> {
        let (pos, data, group) = match self.objects.get(id.0) {
            Some(MapObject::Marker {
                pos, data, group, ..
            }) => (*pos, data.clone(), *group),
            Some(MapObject::Polyline { .. }) => return Ok(false),
            None => bail!("Unknown {:?}", id),
        };
        let action = group.and_then(|g| self.groups[g.0].on_tap);
        match action {
            Some(TapAction::CenterAndShowData) => {
                self.set_center(pos);
                self.open_bubble(pos, data.unwrap_or_default());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Only one bubble is open at a time.
    pub fn open_bubble(&mut self, pos: Position, content: String) {
        self.bubble = Some(Bubble { pos, content });
    }

    pub fn close_bubble(&mut self) {
        self.bubble = None;
    }

    pub fn bubble(&self) -> Option<&Bubble> {
        self.bubble.as_ref()
    }

    pub fn to_geojson(&self) -> GeoJson {
        let mut features = Vec::new();
        for (id, obj) in self.objects() {
            let mut feature = match obj {
                MapObject::Polyline { points, style } => {
                    let mut f = new_feature(geojson::Value::LineString(
                        points.iter().map(|pt| vec![pt.lng, pt.lat]).collect(),
                    ));
                    f.set_property("type", "polyline");
                    f.set_property("stroke", style.stroke_color.clone());
                    f.set_property("stroke-width", style.line_width);
                    f
                }
                MapObject::Marker {
                    pos,
                    icon,
                    data,
                    group,
                } => {
                    let mut f = new_feature(geojson::Value::Point(vec![pos.lng, pos.lat]));
                    f.set_property("type", "marker");
                    if let Some(icon) = icon {
                        f.set_property("icon", icon.to_svg());
                    }
                    if let Some(data) = data {
                        f.set_property("data", data.clone());
                    }
                    if let Some(group) = group {
                        f.set_property("group", group.0);
                    }
                    f
                }
            };
            feature.set_property("id", id.0);
            features.push(feature);
        }
        if let Some(ref bubble) = self.bubble {
            let mut f = new_feature(geojson::Value::Point(vec![bubble.pos.lng, bubble.pos.lat]));
            f.set_property("type", "bubble");
            f.set_property("content", bubble.content.clone());
            features.push(f);
        }

        GeoJson::FeatureCollection(FeatureCollection {
            features,
            bbox: None,
            foreign_members: None,
        })
    }

    fn push(&mut self, obj: MapObject) -> ObjectID {
        let id = ObjectID(self.objects.len());
        self.objects.push(obj);
        id
    }
}

fn new_feature(value: geojson::Value) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(geojson::Geometry::new(value)),
        id: None,
        properties: None,
        foreign_members: None,
    }
}
