//! Dual heartbeat source (SPEC_FULL §4.1/§9 "Dual heartbeat sources").
//!
//! A blocked upstream stream can go minutes without emitting an event while
//! still making progress, so liveness is signalled from two independent
//! sources: a fixed wall-clock interval, and every Nth underlying event.
//! Dropping either source leads to client timeouts.

use std::time::{Duration, Instant};

use crate::stream::ProviderStreamEvent;

pub const WALL_CLOCK_INTERVAL: Duration = Duration::from_secs(10);

/// Tracks whether a heartbeat is due, from either source, as events arrive.
pub struct HeartbeatPacer {
    start: Instant,
    last_wall_clock_emit: Instant,
    events_received: u64,
    event_count_threshold: u64,
}

impl HeartbeatPacer {
    /// `event_count_threshold` is the "every Nth underlying event" source;
    /// SPEC_FULL names N=10 or N=50 depending on path.
    pub fn new(event_count_threshold: u64) -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_wall_clock_emit: now,
            events_received: 0,
            event_count_threshold,
        }
    }

    /// Call once per underlying provider event. Returns a heartbeat event if
    /// either source fires.
    pub fn on_event(&mut self) -> Option<ProviderStreamEvent> {
        self.events_received += 1;
        if self.event_count_threshold > 0 && self.events_received % self.event_count_threshold == 0
        {
            return Some(self.make_heartbeat());
        }
        self.wall_clock_check()
    }

    /// Call periodically (e.g. from a `tokio::time::interval` tick) even
    /// when no underlying event has arrived, so a fully stalled upstream
    /// still produces liveness signals.
    pub fn wall_clock_check(&mut self) -> Option<ProviderStreamEvent> {
        if self.last_wall_clock_emit.elapsed() >= WALL_CLOCK_INTERVAL {
            return Some(self.make_heartbeat());
        }
        None
    }

    fn make_heartbeat(&mut self) -> ProviderStreamEvent {
        self.last_wall_clock_emit = Instant::now();
        ProviderStreamEvent::Heartbeat {
            events_received: self.events_received,
            elapsed_s: self.start.elapsed().as_secs_f64(),
        }
    }
}
