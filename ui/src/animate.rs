use anyhow::Result;

use model::{EaseOptions, EaseSession, Handle, Position, PositionCycle, Scheduler, Spawner};

use crate::map::ObjectID;
use crate::App;

/// Every `interval_ms`, starts easing `marker` along the next leg from `legs`. Earlier
/// animations aren't tracked; a new leg can start while the previous one is still moving.
pub fn cycle_marker<I>(
    scheduler: &mut Scheduler<App>,
    marker: ObjectID,
    mut legs: PositionCycle<I>,
    ease_ms: f64,
    interval_ms: f64,
) -> Result<Handle>
where
    I: Iterator<Item = Position> + 'static,
{
    // Catch a bad duration now, not on every interval
    EaseSession::new(EaseOptions {
        duration_ms: ease_ms,
        ..Default::default()
    })?;

    scheduler.every(
        interval_ms,
        move |_: &mut App, spawner: &mut Spawner<App>| {
            let (from, to) = match legs.next() {
                Some(leg) => leg,
                None => return,
            };
            debug!("Moving the marker from {from} to {to}");
            let result = spawner.ease(
                EaseOptions {
                    start: from,
                    end: to,
                    duration_ms: ease_ms,
                },
                move |app: &mut App, pos| {
                    if let Err(err) = app.map.set_marker_position(marker, pos) {
                        warn!("Can't move the marker: {err}");
                    }
                },
                |_| {},
            );
            if let Err(err) = result {
                warn!("Couldn't start the next leg: {err}");
            }
        },
    )
}
