#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

mod cycle;
mod ease;
mod position;
mod route;
mod scheduler;

pub use self::cycle::{load_positions, load_positions_from_file, PositionCycle, DEMO_POSITIONS};
pub use self::ease::{EaseOptions, EaseSession, Step, TICK_MS};
pub use self::position::Position;
pub use self::route::{
    bounds_of, format_duration, manoeuvres, place_manoeuvres, section_shapes, waypoint_labels,
    Manoeuvre, Summary,
};
pub use self::scheduler::{Handle, Scheduler, Spawner};
