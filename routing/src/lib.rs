//! The wire layer for a third-party routing service: building requests, the response format, and
//! decoding section shapes.

#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

mod client;
pub mod polyline;
mod request;
mod response;

pub use client::{FileRouter, HereRouter, RoutingService, DEFAULT_BASE_URL};
pub use polyline::{Coordinate, FlexiblePolyline, ThirdDimension};
pub use request::{format_lat_lng, ReturnField, RouteRequest, RoutingMode, TransportMode};
pub use response::{
    Action, LocalizedString, Location, Notice, Place, Road, Route, RouteResponse, Section, Stop,
    TravelSummary, TurnByTurnAction,
};
