#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

mod animate;
mod config;
pub mod map;
mod page;
pub mod panel;
pub mod render;

use std::time::Duration;

use anyhow::Result;
use structopt::StructOpt;

use model::{
    load_positions_from_file, place_manoeuvres, section_shapes, Position, PositionCycle,
    Scheduler, DEMO_POSITIONS,
};
use routing::{
    FileRouter, HereRouter, RouteRequest, RouteResponse, RoutingMode, RoutingService,
    TransportMode, DEFAULT_BASE_URL,
};

pub use self::animate::cycle_marker;
pub use self::config::Config;
pub use self::page::{render_page, write_outputs};

use self::map::{MapSession, ObjectID};
use self::panel::Panel;

/// The only error a user ever sees
pub const UNREACHABLE_SERVER: &str = "Can't reach the remote server";

const DEFAULT_ZOOM: f64 = 13.0;

#[derive(StructOpt)]
struct Args {
    /// Where the route starts, as "lat,lng"
    #[structopt(long)]
    origin: Option<Position>,
    /// Where the route ends, as "lat,lng"
    #[structopt(long)]
    destination: Option<Position>,
    /// car, truck, pedestrian, bicycle, scooter, taxi, or bus
    #[structopt(long)]
    transport_mode: Option<TransportMode>,
    /// fast or short
    #[structopt(long)]
    routing_mode: Option<RoutingMode>,
    /// Credentials for the routing service
    #[structopt(long, env = "HERE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
    /// Use a previously saved routing response instead of calling the service
    #[structopt(long)]
    response: Option<String>,
    /// A JSON file with defaults for any of these settings
    #[structopt(long)]
    config: Option<String>,
    /// Where to write index.html and route.geojson
    #[structopt(long, default_value = "data/output")]
    output: String,
    /// Animate the marker in real time for this long before writing output
    #[structopt(long, default_value = "0")]
    animate_seconds: f64,
    /// A CSV file with lat,lng columns for the marker to cycle through
    #[structopt(long)]
    positions: Option<String>,
    /// How long each leg of the marker animation takes
    #[structopt(long, default_value = "200")]
    ease_ms: f64,
    /// How often the marker starts a new leg
    #[structopt(long, default_value = "1000")]
    interval_ms: f64,
}

impl Args {
    fn request(&self, config: &Config) -> RouteRequest {
        let mut request = RouteRequest::demo();
        if let Some(pos) = self.origin.or(config.origin) {
            request.origin = pos.to_lon_lat();
        }
        if let Some(pos) = self.destination.or(config.destination) {
            request.destination = pos.to_lon_lat();
        }
        if let Some(mode) = self.routing_mode.or(config.routing_mode) {
            request.routing_mode = mode;
        }
        if let Some(mode) = self.transport_mode.or(config.transport_mode) {
            request.transport_mode = mode;
        }
        request
    }

    fn router(&self, config: &Config) -> Result<Box<dyn RoutingService>> {
        if let Some(ref path) = self.response {
            return Ok(Box::new(FileRouter::new(path.clone())));
        }
        let api_key = match self.api_key.clone().or_else(|| config.api_key.clone()) {
            Some(key) => key,
            None => bail!("Pass --api-key, set HERE_API_KEY, or use a saved --response"),
        };
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Ok(Box::new(HereRouter::with_base_url(base_url, api_key)))
    }

    fn positions(&self) -> Result<Vec<Position>> {
        match self.positions {
            Some(ref path) => load_positions_from_file(path),
            None => Ok(DEMO_POSITIONS.to_vec()),
        }
    }
}

/// All of the state for one run, passed explicitly to everything that draws.
pub struct App {
    pub title: String,
    pub map: MapSession,
    pub panel: Panel,
    /// The marker that cycles through positions
    pub marker: ObjectID,
}

impl App {
    pub fn new(marker_start: Position) -> Self {
        // Until a route arrives, look at central Berlin
        let mut map = MapSession::new(Position::new(52.5160, 13.3779), DEFAULT_ZOOM);
        let marker = map.add_marker(marker_start, None);
        Self {
            title: "Route demo".to_string(),
            map,
            panel: Panel::new("panel"),
            marker,
        }
    }

    /// Only the first route is shown. The map and panel are untouched if the route can't be
    /// decoded.
    pub fn on_route_response(&mut self, response: &RouteResponse) -> Result<()> {
        let route = response.first_route()?;
        info!(
            "Showing route {} with {} sections",
            route.id,
            route.sections.len()
        );
        let shapes = section_shapes(route)?;
        let manoeuvres = place_manoeuvres(route, &shapes)?;

        render::add_route_shape_to_map(&mut self.map, &shapes)?;
        render::add_manoeuvres_to_map(&mut self.map, &manoeuvres)?;
        render::add_waypoints_to_panel(&mut self.panel, route);
        render::add_manoeuvres_to_panel(&mut self.panel, &manoeuvres);
        render::add_summary_to_panel(&mut self.panel, route);
        Ok(())
    }
}

/// Asks `router` for the route. Any failure is reported as the server being unreachable.
pub fn fetch_route(router: &dyn RoutingService, request: &RouteRequest) -> Result<RouteResponse> {
    match router.calculate_route(request) {
        Ok(response) => Ok(response),
        Err(err) => Err(err.context(UNREACHABLE_SERVER)),
    }
}

fn run(args: Args) -> Result<()> {
    let config = match args.config {
        Some(ref path) => Config::load(path)?,
        None => Config::default(),
    };
    let animate_for = match Duration::try_from_secs_f64(args.animate_seconds) {
        Ok(duration) => duration,
        Err(_) => bail!(
            "--animate-seconds must be a reasonable number of seconds, not {}",
            args.animate_seconds
        ),
    };
    let request = args.request(&config);
    let router = args.router(&config)?;
    let positions = args.positions()?;
    let marker_start = match positions.first() {
        Some(pos) => *pos,
        None => bail!("No positions for the marker to cycle through"),
    };
    let legs = PositionCycle::looping(positions)?;

    let mut app = App::new(marker_start);
    let response = fetch_route(router.as_ref(), &request)?;
    app.on_route_response(&response)?;

    if !animate_for.is_zero() {
        let mut scheduler = Scheduler::new();
        cycle_marker(
            &mut scheduler,
            app.marker,
            legs,
            args.ease_ms,
            args.interval_ms,
        )?;
        info!("Animating the marker for {}s", args.animate_seconds);
        scheduler.run_realtime(&mut app, animate_for);
    }

    write_outputs(&app, &args.output)
}

pub fn main() {
    abstutil::logger::setup();

    let args = Args::from_iter(abstutil::cli_args());
    if let Err(err) = run(args) {
        error!("{:#}", err);
        std::process::exit(1);
    }
}
