use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use geom::LonLat;
use serde::{Deserialize, Serialize};

/// A point in geographic space. Unlike `LonLat`, this stores exactly the values it was given, so
/// animations can land on their end position bit-for-bit.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub lat: f64,
    pub lng: f64,
}

impl Position {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_finite(self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }

    pub fn to_lon_lat(self) -> LonLat {
        LonLat::new(self.lng, self.lat)
    }

    pub fn from_lon_lat(pt: LonLat) -> Self {
        Self::new(pt.y(), pt.x())
    }
}

impl From<routing::Coordinate> for Position {
    fn from(c: routing::Coordinate) -> Self {
        Self::new(c.lat, c.lng)
    }
}

impl From<routing::Location> for Position {
    fn from(l: routing::Location) -> Self {
        Self::new(l.lat, l.lng)
    }
}

/// "lat,lng", the format the routing service uses
impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

impl FromStr for Position {
    type Err = anyhow::Error;

    fn from_str(x: &str) -> Result<Self> {
        let (lat, lng) = match x.split_once(',') {
            Some(pair) => pair,
            None => bail!("{x:?} isn't of the form lat,lng"),
        };
        let pos = Self::new(lat.trim().parse()?, lng.trim().parse()?);
        if !pos.is_finite() {
            bail!("{x:?} isn't a finite position");
        }
        Ok(pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_format() {
        let pos: Position = "52.5160, 13.3779".parse().unwrap();
        assert_eq!(pos, Position::new(52.516, 13.3779));
        assert_eq!(pos.to_string(), "52.516,13.3779");

        assert!("52.5160".parse::<Position>().is_err());
        assert!("north,south".parse::<Position>().is_err());
        assert!("NaN,1".parse::<Position>().is_err());
        assert!("inf,1".parse::<Position>().is_err());
    }
}
