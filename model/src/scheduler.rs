use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use anyhow::Result;

use crate::{EaseOptions, EaseSession, Position, Step, TICK_MS};

type StepCallback<A> = Box<dyn FnMut(&mut A, Position)>;
type CompleteCallback<A> = Box<dyn FnOnce(&mut A)>;
type IntervalCallback<A> = Box<dyn FnMut(&mut A, &mut Spawner<A>)>;

/// Lets the caller stop an animation or interval that's already been scheduled.
#[derive(Clone, Default)]
pub struct Handle {
    cancelled: Rc<Cell<bool>>,
    finished: Rc<Cell<bool>>,
}

impl Handle {
    /// Checked at the start of every frame. A cancelled animation never calls `on_complete`.
    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }

    /// True once an animation has reached its end. Intervals never finish on their own.
    pub fn is_finished(&self) -> bool {
        self.finished.get()
    }
}

struct Animation<A> {
    session: EaseSession,
    on_step: StepCallback<A>,
    on_complete: Option<CompleteCallback<A>>,
    handle: Handle,
}

impl<A> Animation<A> {
    /// Returns false when the animation shouldn't be ticked again.
    fn tick(&mut self, app: &mut A) -> bool {
        if self.handle.is_cancelled() {
            return false;
        }
        match self.session.tick() {
            Some(Step::Moving(pos)) => {
                (self.on_step)(app, pos);
                true
            }
            Some(Step::Arrived(pos)) => {
                (self.on_step)(app, pos);
                if let Some(cb) = self.on_complete.take() {
                    cb(app);
                }
                self.handle.finished.set(true);
                false
            }
            None => false,
        }
    }
}

struct Interval<A> {
    period_ms: f64,
    next_fire_ms: f64,
    callback: IntervalCallback<A>,
    handle: Handle,
}

/// Collects new animations. They start ticking on the frame after they're created.
pub struct Spawner<A> {
    animations: Vec<Animation<A>>,
}

impl<A> Spawner<A> {
    fn new() -> Self {
        Self {
            animations: Vec::new(),
        }
    }

    pub fn ease<F, G>(&mut self, options: EaseOptions, on_step: F, on_complete: G) -> Result<Handle>
    where
        F: FnMut(&mut A, Position) + 'static,
        G: FnOnce(&mut A) + 'static,
    {
        let handle = Handle::default();
        self.animations.push(Animation {
            session: EaseSession::new(options)?,
            on_step: Box::new(on_step),
            on_complete: Some(Box::new(on_complete)),
            handle: handle.clone(),
        });
        Ok(handle)
    }
}

/// A single-threaded frame loop, standing in for a browser's animation frames and timers.
/// Callbacks receive the application state `A`, so they don't need to capture any of it.
pub struct Scheduler<A> {
    now_ms: f64,
    frames: usize,
    animations: Vec<Animation<A>>,
    intervals: Vec<Interval<A>>,
}

impl<A> Scheduler<A> {
    pub fn new() -> Self {
        Self {
            now_ms: 0.0,
            frames: 0,
            animations: Vec::new(),
            intervals: Vec::new(),
        }
    }

    /// Virtual time, advancing one tick per frame
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn is_idle(&self) -> bool {
        self.animations.is_empty() && self.intervals.is_empty()
    }

    pub fn ease<F, G>(&mut self, options: EaseOptions, on_step: F, on_complete: G) -> Result<Handle>
    where
        F: FnMut(&mut A, Position) + 'static,
        G: FnOnce(&mut A) + 'static,
    {
        let mut spawner = Spawner::new();
        let handle = spawner.ease(options, on_step, on_complete)?;
        self.animations.extend(spawner.animations);
        Ok(handle)
    }

    /// Calls `callback` every `period_ms`, starting one period from now. Periods shorter than a
    /// frame still fire at most once per frame.
    pub fn every<F>(&mut self, period_ms: f64, callback: F) -> Result<Handle>
    where
        F: FnMut(&mut A, &mut Spawner<A>) + 'static,
    {
        if !period_ms.is_finite() || period_ms <= 0.0 {
            bail!("Interval needs a positive period, not {period_ms}ms");
        }
        let handle = Handle::default();
        self.intervals.push(Interval {
            period_ms,
            next_fire_ms: self.now_ms + period_ms,
            callback: Box::new(callback),
            handle: handle.clone(),
        });
        Ok(handle)
    }

    pub fn run_frame(&mut self, app: &mut A) {
        let mut spawner = Spawner::new();
        for interval in &mut self.intervals {
            if interval.handle.is_cancelled() {
                continue;
            }
            if self.now_ms >= interval.next_fire_ms {
                (interval.callback)(app, &mut spawner);
                interval.next_fire_ms += interval.period_ms;
                // Don't try to catch up on missed periods
                if interval.next_fire_ms <= self.now_ms {
                    interval.next_fire_ms = self.now_ms + interval.period_ms;
                }
            }
        }
        self.intervals.retain(|i| !i.handle.is_cancelled());

        self.animations.retain_mut(|anim| anim.tick(app));
        self.animations.extend(spawner.animations);

        self.now_ms += TICK_MS;
        self.frames += 1;
    }

    /// Runs frames back-to-back without sleeping. Fails if things are still running after
    /// `max_frames`; intervals keep a scheduler busy until they're cancelled.
    pub fn run_until_idle(&mut self, app: &mut A, max_frames: usize) -> Result<usize> {
        let mut count = 0;
        while !self.is_idle() {
            if count == max_frames {
                bail!("Scheduler still busy after {max_frames} frames");
            }
            self.run_frame(app);
            count += 1;
        }
        Ok(count)
    }

    /// Runs frames in real time, sleeping between them, until idle or `duration` passes. Returns
    /// the number of frames run.
    pub fn run_realtime(&mut self, app: &mut A, duration: Duration) -> usize {
        let frame = Duration::from_secs_f64(TICK_MS / 1000.0);
        let start = Instant::now();
        let mut count = 0;
        while !self.is_idle() && start.elapsed() < duration {
            let frame_start = Instant::now();
            self.run_frame(app);
            count += 1;
            if let Some(remaining) = frame.checked_sub(frame_start.elapsed()) {
                std::thread::sleep(remaining);
            }
        }
        debug!(
            "Ran {count} frames in {:?}; {} animations still live",
            start.elapsed(),
            self.animations.len()
        );
        count
    }
}

impl<A> Default for Scheduler<A> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        steps: Vec<Position>,
        completions: usize,
        // Which step count each completion saw
        completed_after: Vec<usize>,
    }

    fn demo_options() -> EaseOptions {
        EaseOptions {
            start: Position::new(0.0, 0.0),
            end: Position::new(10.0, 20.0),
            duration_ms: 160.0,
        }
    }

    #[test]
    fn runs_to_completion() {
        let mut scheduler = Scheduler::new();
        let mut rec = Recorder::default();
        let handle = scheduler
            .ease(
                demo_options(),
                |rec: &mut Recorder, pos| rec.steps.push(pos),
                |rec: &mut Recorder| {
                    rec.completions += 1;
                    rec.completed_after.push(rec.steps.len());
                },
            )
            .unwrap();

        let frames = scheduler.run_until_idle(&mut rec, 100).unwrap();
        assert_eq!(frames, 10);
        assert_eq!(rec.steps.len(), 10);
        assert_eq!(*rec.steps.last().unwrap(), Position::new(10.0, 20.0));
        assert_eq!(rec.completions, 1);
        assert_eq!(rec.completed_after, vec![10]);
        assert!(handle.is_finished());
        assert!(scheduler.is_idle());
    }

    #[test]
    fn cancel_stops_steps() {
        let mut scheduler = Scheduler::new();
        let mut rec = Recorder::default();
        let handle = scheduler
            .ease(
                demo_options(),
                |rec: &mut Recorder, pos| rec.steps.push(pos),
                |rec: &mut Recorder| rec.completions += 1,
            )
            .unwrap();

        for _ in 0..3 {
            scheduler.run_frame(&mut rec);
        }
        handle.cancel();
        scheduler.run_until_idle(&mut rec, 100).unwrap();

        assert_eq!(rec.steps.len(), 3);
        assert_eq!(rec.completions, 0);
        assert!(handle.is_cancelled());
        assert!(!handle.is_finished());
    }

    #[test]
    fn concurrent_sessions_are_independent() {
        let mut scheduler = Scheduler::new();
        let mut app: (Vec<Position>, Vec<Position>) = (Vec::new(), Vec::new());
        scheduler
            .ease(
                demo_options(),
                |app: &mut (Vec<Position>, Vec<Position>), pos| app.0.push(pos),
                |_| {},
            )
            .unwrap();
        scheduler
            .ease(
                demo_options(),
                |app: &mut (Vec<Position>, Vec<Position>), pos| app.1.push(pos),
                |_| {},
            )
            .unwrap();
        scheduler.run_until_idle(&mut app, 100).unwrap();
        assert_eq!(app.0.len(), 10);
        assert_eq!(app.0, app.1);
    }

    #[test]
    fn bad_duration_schedules_nothing() {
        let mut scheduler: Scheduler<Recorder> = Scheduler::new();
        let result = scheduler.ease(
            EaseOptions {
                duration_ms: 0.0,
                ..EaseOptions::default()
            },
            |_, _| {},
            |_| {},
        );
        assert!(result.is_err());
        assert!(scheduler.is_idle());
    }

    #[test]
    fn intervals() {
        let mut scheduler = Scheduler::new();
        let mut fired: Vec<f64> = Vec::new();
        let handle = scheduler
            .every(48.0, |fired: &mut Vec<f64>, _| fired.push(0.0))
            .unwrap();
        for _ in 0..10 {
            scheduler.run_frame(&mut fired);
        }
        // Frames run at 0, 16, ..., 144 ms; fires at 48, 96, 144
        assert_eq!(fired.len(), 3);

        handle.cancel();
        scheduler.run_frame(&mut fired);
        assert_eq!(fired.len(), 3);
        assert!(scheduler.is_idle());

        assert!(scheduler.every(0.0, |_, _| {}).is_err());
    }

    #[test]
    fn intervals_spawn_animations() {
        let mut scheduler = Scheduler::new();
        let mut rec = Recorder::default();
        let interval = scheduler
            .every(32.0, |_: &mut Recorder, spawner: &mut Spawner<Recorder>| {
                spawner
                    .ease(
                        EaseOptions {
                            start: Position::new(0.0, 0.0),
                            end: Position::new(1.0, 1.0),
                            duration_ms: 16.0,
                        },
                        |rec: &mut Recorder, pos| rec.steps.push(pos),
                        |rec: &mut Recorder| rec.completions += 1,
                    )
                    .unwrap();
            })
            .unwrap();

        // Fires at 32ms (frame 3). The one-step animation runs on the next frame.
        for _ in 0..3 {
            scheduler.run_frame(&mut rec);
        }
        assert!(rec.steps.is_empty());
        scheduler.run_frame(&mut rec);
        assert_eq!(rec.steps, vec![Position::new(1.0, 1.0)]);
        assert_eq!(rec.completions, 1);

        interval.cancel();
        scheduler.run_until_idle(&mut rec, 10).unwrap();
        assert!(scheduler.run_until_idle(&mut rec, 0).is_ok());
    }

    #[test]
    fn busy_scheduler() {
        let mut scheduler: Scheduler<()> = Scheduler::new();
        scheduler.every(100.0, |_, _| {}).unwrap();
        assert!(scheduler.run_until_idle(&mut (), 5).is_err());
        assert_eq!(scheduler.frames(), 5);
        assert_eq!(scheduler.now_ms(), 80.0);
    }
}
