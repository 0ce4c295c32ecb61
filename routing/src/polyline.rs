//! The flexible polyline encoding used by the routing service for section shapes. See
//! <https://github.com/heremaps/flexible-polyline> for the format.

use anyhow::Result;
use geom::LonLat;

const ENCODING_TABLE: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";
const FORMAT_VERSION: u64 = 1;

/// What the optional third value of each coordinate means.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThirdDimension {
    Absent = 0,
    Level = 1,
    Altitude = 2,
    Elevation = 3,
    // 4 and 5 are reserved
    Custom1 = 6,
    Custom2 = 7,
}

impl ThirdDimension {
    fn from_header(x: u64) -> Result<Self> {
        use ThirdDimension::*;
        Ok(match x {
            0 => Absent,
            1 => Level,
            2 => Altitude,
            3 => Elevation,
            6 => Custom1,
            7 => Custom2,
            _ => bail!("Polyline header uses reserved third dimension {x}"),
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
    pub z: Option<f64>,
}

impl Coordinate {
    pub fn to_lon_lat(&self) -> LonLat {
        LonLat::new(self.lng, self.lat)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FlexiblePolyline {
    pub precision: u32,
    pub third_dimension: ThirdDimension,
    pub third_dimension_precision: u32,
    pub coordinates: Vec<Coordinate>,
}

impl FlexiblePolyline {
    pub fn to_lon_lats(&self) -> Vec<LonLat> {
        self.coordinates.iter().map(|c| c.to_lon_lat()).collect()
    }
}

pub fn decode(encoded: &str) -> Result<FlexiblePolyline> {
    let mut values = Varints::new(encoded);

    let version = next_value(&mut values, "the version")?;
    if version != FORMAT_VERSION {
        bail!("Unsupported polyline version {version}");
    }
    let header = next_value(&mut values, "the header")?;
    let precision = (header & 15) as u32;
    let third_dimension = ThirdDimension::from_header((header >> 4) & 7)?;
    let third_dimension_precision = ((header >> 7) & 15) as u32;

    let multiplier = 10_f64.powi(precision as i32);
    let z_multiplier = 10_f64.powi(third_dimension_precision as i32);

    let mut coordinates = Vec::new();
    let (mut lat, mut lng, mut z) = (0_i64, 0_i64, 0_i64);
    while let Some(value) = values.next() {
        lat = accumulate(lat, value?)?;
        lng = accumulate(lng, next_value(&mut values, "a longitude")?)?;
        let z_value = if third_dimension == ThirdDimension::Absent {
            None
        } else {
            z = accumulate(z, next_value(&mut values, "a third dimension value")?)?;
            Some(z as f64 / z_multiplier)
        };
        coordinates.push(Coordinate {
            lat: lat as f64 / multiplier,
            lng: lng as f64 / multiplier,
            z: z_value,
        });
    }

    Ok(FlexiblePolyline {
        precision,
        third_dimension,
        third_dimension_precision,
        coordinates,
    })
}

/// Mostly useful for building fixtures; the routing service only hands these out.
pub fn encode(polyline: &FlexiblePolyline) -> Result<String> {
    if polyline.precision > 15 || polyline.third_dimension_precision > 15 {
        bail!("Polyline precision must fit in 4 bits");
    }
    let mut out = String::new();
    encode_unsigned(FORMAT_VERSION, &mut out);
    let header = (polyline.third_dimension_precision as u64) << 7
        | (polyline.third_dimension as u64) << 4
        | polyline.precision as u64;
    encode_unsigned(header, &mut out);

    let multiplier = 10_f64.powi(polyline.precision as i32);
    let z_multiplier = 10_f64.powi(polyline.third_dimension_precision as i32);
    let (mut last_lat, mut last_lng, mut last_z) = (0_i64, 0_i64, 0_i64);
    for coord in &polyline.coordinates {
        let lat = (coord.lat * multiplier).round() as i64;
        let lng = (coord.lng * multiplier).round() as i64;
        encode_signed(delta(lat, last_lat)?, &mut out);
        encode_signed(delta(lng, last_lng)?, &mut out);
        last_lat = lat;
        last_lng = lng;

        if polyline.third_dimension != ThirdDimension::Absent {
            let z = match coord.z {
                Some(z) => (z * z_multiplier).round() as i64,
                None => bail!("{:?} is missing a third dimension value", coord),
            };
            encode_signed(delta(z, last_z)?, &mut out);
            last_z = z;
        }
    }
    Ok(out)
}

fn next_value(values: &mut Varints, what: &str) -> Result<u64> {
    match values.next() {
        Some(value) => value,
        None => bail!("Polyline ended before {what}"),
    }
}

fn accumulate(total: i64, value: u64) -> Result<i64> {
    total
        .checked_add(to_signed(value))
        .ok_or_else(|| anyhow!("Polyline coordinate overflows"))
}

fn delta(value: i64, last: i64) -> Result<i64> {
    value
        .checked_sub(last)
        .ok_or_else(|| anyhow!("Polyline coordinate delta overflows"))
}

fn to_signed(value: u64) -> i64 {
    ((value >> 1) as i64) ^ -((value & 1) as i64)
}

fn encode_signed(value: i64, out: &mut String) {
    encode_unsigned(((value << 1) ^ (value >> 63)) as u64, out);
}

fn encode_unsigned(mut value: u64, out: &mut String) {
    while value > 0x1f {
        out.push(ENCODING_TABLE[((value & 0x1f) | 0x20) as usize] as char);
        value >>= 5;
    }
    out.push(ENCODING_TABLE[value as usize] as char);
}

fn decode_char(c: u8) -> Result<u64> {
    let x = match c {
        b'A'..=b'Z' => c - b'A',
        b'a'..=b'z' => c - b'a' + 26,
        b'0'..=b'9' => c - b'0' + 52,
        b'-' => 62,
        b'_' => 63,
        _ => bail!("Invalid polyline character {:?}", c as char),
    };
    Ok(x as u64)
}

/// Splits the encoded string into unsigned varints, 5 bits per character.
struct Varints<'a> {
    bytes: &'a [u8],
    idx: usize,
}

impl<'a> Varints<'a> {
    fn new(encoded: &'a str) -> Self {
        Self {
            bytes: encoded.as_bytes(),
            idx: 0,
        }
    }
}

impl<'a> Iterator for Varints<'a> {
    type Item = Result<u64>;

    fn next(&mut self) -> Option<Result<u64>> {
        if self.idx == self.bytes.len() {
            return None;
        }
        let mut result = 0;
        let mut shift = 0;
        while self.idx < self.bytes.len() {
            let chunk = match decode_char(self.bytes[self.idx]) {
                Ok(x) => x,
                Err(err) => {
                    // Stop iterating after an error
                    self.idx = self.bytes.len();
                    return Some(Err(err));
                }
            };
            self.idx += 1;
            // Only 4 bits are left at shift 60
            if shift > 60 || (shift == 60 && chunk & 0x1f > 0xf) {
                self.idx = self.bytes.len();
                return Some(Err(anyhow!("Polyline value overflows 64 bits")));
            }
            result |= (chunk & 0x1f) << shift;
            if chunk & 0x20 == 0 {
                return Some(Ok(result));
            }
            shift += 5;
        }
        Some(Err(anyhow!("Polyline ends in the middle of a value")))
    }
}
