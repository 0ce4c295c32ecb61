use anyhow::Result;
use serde::Deserialize;

use crate::Position;

/// Points near the demo route, visited in order by the animated marker.
pub const DEMO_POSITIONS: [Position; 6] = [
    Position::new(52.51604, 13.37792),
    Position::new(52.51627, 13.37947),
    Position::new(52.51748, 13.37926),
    Position::new(52.51887, 13.38247),
    Position::new(52.52052, 13.38588),
    Position::new(52.52064, 13.38622),
];

/// Turns a sequence of positions into consecutive legs: (p0, p1), (p1, p2), ...
pub struct PositionCycle<I: Iterator<Item = Position>> {
    source: I,
    current: Option<Position>,
}

impl<I: Iterator<Item = Position>> PositionCycle<I> {
    pub fn new(source: I) -> Self {
        Self {
            source,
            current: None,
        }
    }
}

impl PositionCycle<std::iter::Cycle<std::vec::IntoIter<Position>>> {
    /// Repeats the list forever, wrapping from the last position back to the first.
    pub fn looping(positions: Vec<Position>) -> Result<Self> {
        if positions.len() < 2 {
            bail!(
                "Need at least 2 positions to cycle through, not {}",
                positions.len()
            );
        }
        Ok(Self::new(positions.into_iter().cycle()))
    }
}

impl<I: Iterator<Item = Position>> Iterator for PositionCycle<I> {
    type Item = (Position, Position);

    fn next(&mut self) -> Option<(Position, Position)> {
        let from = match self.current.take() {
            Some(pos) => pos,
            None => self.source.next()?,
        };
        let to = self.source.next()?;
        self.current = Some(to);
        Some((from, to))
    }
}

/// Reads a CSV file with `lat` and `lng` columns.
pub fn load_positions<R: std::io::Read>(reader: R) -> Result<Vec<Position>> {
    let mut positions = Vec::new();
    for rec in csv::Reader::from_reader(reader).deserialize() {
        let rec: Record = rec?;
        let pos = Position::new(rec.lat, rec.lng);
        if !pos.is_finite() {
            bail!("Row {} has a non-finite position", positions.len() + 1);
        }
        positions.push(pos);
    }
    Ok(positions)
}

pub fn load_positions_from_file(path: &str) -> Result<Vec<Position>> {
    let positions = load_positions(fs_err::File::open(path)?)?;
    info!("Loaded {} positions from {path}", positions.len());
    Ok(positions)
}

#[derive(Deserialize)]
struct Record {
    lat: f64,
    lng: f64,
}
