//! Fixed-step tick clock with a decoupled frame clock
//!
//! The simulation advances in fixed `tick_duration` steps while frames are
//! produced at their own rate. Each frame carries an interpolation factor
//! between the last two ticks. Time owed to the simulation is capped at
//! `max_frame_duration` so a long stall cannot trigger a spiral of catch-up
//! ticks.

use std::thread;
use std::time::{Duration, Instant};

/// Loop timing settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockConfig {
    pub tick_duration: Duration,
    pub frame_duration: Duration,
    /// Most simulated time that may be owed at once
    pub max_frame_duration: Duration,
    /// A frame may start this early
    pub frame_margin: Duration,
}

impl Default for ClockConfig {
    fn default() -> Self {
        let frame = Duration::from_secs_f64(1.0 / 60.0);
        Self {
            tick_duration: frame,
            frame_duration: frame,
            max_frame_duration: frame * 3,
            frame_margin: frame / 2,
        }
    }
}

impl ClockConfig {
    /// Same frame timing with a different tick length
    pub fn with_tick_seconds(seconds: f32) -> Self {
        Self {
            tick_duration: Duration::from_secs_f32(seconds),
            ..Self::default()
        }
    }
}

/// What the loop should do next
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoopEvent {
    /// Advance the simulation by one tick
    Tick,
    /// Render; `interp` in [0, 1] blends the previous and current tick
    Frame { interp: f32 },
}

/// Monotonic time for the loop
pub trait TimeSource {
    /// Time since the source's origin
    fn now(&self) -> Duration;
    /// Block until `deadline` (relative to the same origin)
    fn sleep_until(&mut self, deadline: Duration);
}

/// Wall clock backed by [`Instant`]
#[derive(Debug, Clone)]
pub struct SystemTimeSource {
    origin: Instant,
}

impl SystemTimeSource {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep_until(&mut self, deadline: Duration) {
        let wait = deadline.saturating_sub(self.now());
        if !wait.is_zero() {
            thread::sleep(wait);
        }
    }
}

#[derive(Debug, Clone)]
pub struct TickClock {
    config: ClockConfig,
    /// Simulated time reached by the last tick
    tick_time: Duration,
    next_frame: Duration,
    dropped: Duration,
    ticks: u64,
}

impl TickClock {
    /// A zero `tick_duration` never issues ticks; only frames run
    pub fn new(config: ClockConfig, start: Duration) -> Self {
        if config.tick_duration.is_zero() {
            log::warn!("Tick duration is zero, simulation will not advance");
        }
        Self {
            config,
            tick_time: start,
            next_frame: start,
            dropped: Duration::ZERO,
            ticks: 0,
        }
    }

    /// Simulated time discarded by backlog clamping
    pub fn dropped(&self) -> Duration {
        self.dropped
    }

    /// Ticks issued so far
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Next event due at `now`, ticks first
    pub fn poll(&mut self, now: Duration) -> Option<LoopEvent> {
        let c = self.config;

        let owed = now.saturating_sub(self.tick_time);
        if owed > c.max_frame_duration {
            let skip = owed - c.max_frame_duration;
            self.tick_time += skip;
            self.dropped += skip;
            log::debug!(
                "Clock fell behind by {:.1} ms, dropping {:.1} ms",
                owed.as_secs_f64() * 1000.0,
                skip.as_secs_f64() * 1000.0
            );
        }

        if !c.tick_duration.is_zero() && self.tick_time + c.tick_duration <= now {
            self.tick_time += c.tick_duration;
            self.ticks += 1;
            return Some(LoopEvent::Tick);
        }

        if now + c.frame_margin >= self.next_frame {
            self.next_frame += c.frame_duration;
            if self.next_frame <= now {
                self.next_frame = now + c.frame_duration;
            }
            return Some(LoopEvent::Frame {
                interp: self.interp(now),
            });
        }

        None
    }

    /// Blend factor between the last two ticks at `now`
    pub fn interp(&self, now: Duration) -> f32 {
        let tick = self.config.tick_duration.as_secs_f32();
        if tick <= 0.0 {
            return 1.0;
        }
        (now.saturating_sub(self.tick_time).as_secs_f32() / tick).clamp(0.0, 1.0)
    }

    /// Earliest time at which `poll` can return an event
    pub fn next_wakeup(&self) -> Duration {
        let frame = self.next_frame.saturating_sub(self.config.frame_margin);
        if self.config.tick_duration.is_zero() {
            return frame;
        }
        (self.tick_time + self.config.tick_duration).min(frame)
    }

    /// Wait for and return the next event
    pub fn next_event<T: TimeSource>(&mut self, time: &mut T) -> LoopEvent {
        loop {
            if let Some(event) = self.poll(time.now()) {
                return event;
            }
            time.sleep_until(self.next_wakeup());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ManualTime {
        now: Duration,
        sleeps: u32,
    }

    impl TimeSource for ManualTime {
        fn now(&self) -> Duration {
            self.now
        }

        fn sleep_until(&mut self, deadline: Duration) {
            self.sleeps += 1;
            self.now = self.now.max(deadline);
        }
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn clock() -> TickClock {
        let config = ClockConfig {
            tick_duration: ms(10),
            frame_duration: ms(20),
            max_frame_duration: ms(60),
            frame_margin: ms(5),
        };
        TickClock::new(config, Duration::ZERO)
    }

    fn drain(clock: &mut TickClock, now: Duration) -> Vec<LoopEvent> {
        std::iter::from_fn(|| clock.poll(now)).collect()
    }

    #[test]
    fn test_first_poll_is_a_frame() {
        let mut c = clock();
        assert_eq!(drain(&mut c, ms(0)), vec![LoopEvent::Frame { interp: 0.0 }]);
    }

    #[test]
    fn test_ticks_come_before_frame() {
        let mut c = clock();
        drain(&mut c, ms(0));
        let events = drain(&mut c, ms(25));
        assert_eq!(events.len(), 3);
        assert_eq!(events[0], LoopEvent::Tick);
        assert_eq!(events[1], LoopEvent::Tick);
        match events[2] {
            LoopEvent::Frame { interp } => assert!((interp - 0.5).abs() < 1e-4),
            e => panic!("expected frame, got {:?}", e),
        }
        assert_eq!(c.ticks(), 2);
    }

    #[test]
    fn test_frame_margin_allows_early_frame() {
        let mut c = clock();
        drain(&mut c, ms(0));
        // Next frame at 20 ms, margin 5 ms
        assert!(drain(&mut c, ms(14)).iter().all(|e| *e == LoopEvent::Tick));
        match drain(&mut c, ms(15)).last() {
            Some(LoopEvent::Frame { interp }) => assert!((interp - 0.5).abs() < 1e-4),
            e => panic!("expected frame, got {:?}", e),
        }
    }

    #[test]
    fn test_zero_tick_duration_only_yields_frames() {
        let config = ClockConfig {
            tick_duration: Duration::ZERO,
            ..clock().config
        };
        let mut c = TickClock::new(config, Duration::ZERO);
        let mut time = ManualTime {
            now: Duration::ZERO,
            sleeps: 0,
        };
        for _ in 0..5 {
            assert!(matches!(c.next_event(&mut time), LoopEvent::Frame { .. }));
        }
        assert_eq!(c.ticks(), 0);
        // Frames every 20 ms, starting 5 ms early
        assert_eq!(time.now, ms(75));
    }

    #[test]
    fn test_interp_stays_in_range() {
        let c = clock();
        assert_eq!(c.interp(ms(0)), 0.0);
        assert_eq!(c.interp(ms(500)), 1.0);
    }

    #[test]
    fn test_backlog_is_clamped() {
        let mut c = clock();
        drain(&mut c, ms(0));
        let events = drain(&mut c, ms(200));
        let ticks = events.iter().filter(|e| **e == LoopEvent::Tick).count();
        assert_eq!(ticks, 6);
        assert_eq!(c.dropped(), ms(140));
        assert!(matches!(events.last(), Some(LoopEvent::Frame { .. })));
    }

    #[test]
    fn test_next_event_sleeps_until_due() {
        let mut c = clock();
        let mut time = ManualTime {
            now: Duration::ZERO,
            sleeps: 0,
        };
        assert!(matches!(c.next_event(&mut time), LoopEvent::Frame { .. }));
        assert_eq!(c.next_event(&mut time), LoopEvent::Tick);
        assert_eq!(time.now, ms(10));
        assert_eq!(time.sleeps, 1);
        assert!(matches!(c.next_event(&mut time), LoopEvent::Frame { .. }));
        assert_eq!(time.now, ms(15));
    }
}
