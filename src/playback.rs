use std::time::{Duration, Instant};

/// Speed 1 plays a step every 2 s; each notch above shaves 180 ms, so
/// speed 10 lands on the 200 ms floor.
const BASE_INTERVAL_MS: u64 = 2000;
const SPEED_STEP_MS: u64 = 180;
pub const MIN_SPEED: u8 = 1;
pub const MAX_SPEED: u8 = 10;

pub fn clamp_speed(speed: u8) -> u8 {
    speed.clamp(MIN_SPEED, MAX_SPEED)
}

pub fn interval_for(speed: u8) -> Duration {
    let speed = clamp_speed(speed) as u64;
    Duration::from_millis(BASE_INTERVAL_MS - (speed - 1) * SPEED_STEP_MS)
}

/// Host-driven playback clock. Nothing fires on its own: the host polls
/// with its own notion of "now" and performs a step when a tick is due,
/// so pausing can never race a pending timer.
#[derive(Debug, Clone)]
pub struct Playback {
    speed: u8,
    /// Time of the last tick (or of `play`); `None` while paused.
    anchor: Option<Instant>,
}

impl Playback {
    pub fn new(speed: u8) -> Self {
        Self {
            speed: clamp_speed(speed),
            anchor: None,
        }
    }

    pub fn speed(&self) -> u8 {
        self.speed
    }

    pub fn interval(&self) -> Duration {
        interval_for(self.speed)
    }

    pub fn is_playing(&self) -> bool {
        self.anchor.is_some()
    }

    /// Arms the clock; the first tick comes due one interval after `now`.
    pub fn play(&mut self, now: Instant) {
        if self.anchor.is_none() {
            self.anchor = Some(now);
        }
    }

    pub fn pause(&mut self) {
        self.anchor = None;
    }

    /// Speed changes apply from the current anchor, so a running clock
    /// re-paces without restarting.
    pub fn set_speed(&mut self, speed: u8) {
        self.speed = clamp_speed(speed);
    }

    /// Reports whether a tick is due and, if so, re-anchors at `now`.
    pub fn poll(&mut self, now: Instant) -> bool {
        let Some(anchor) = self.anchor else {
            return false;
        };
        if now.duration_since(anchor) >= self.interval() {
            self.anchor = Some(now);
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_mapping_matches_the_speed_scale() {
        assert_eq!(interval_for(1), Duration::from_millis(2000));
        assert_eq!(interval_for(5), Duration::from_millis(1280));
        assert_eq!(interval_for(10), Duration::from_millis(200));
    }

    #[test]
    fn out_of_range_speeds_clamp() {
        assert_eq!(clamp_speed(0), 1);
        assert_eq!(clamp_speed(99), 10);
        assert_eq!(interval_for(0), interval_for(1));
        assert_eq!(interval_for(99), interval_for(10));
    }

    #[test]
    fn ticks_come_due_one_interval_apart() {
        let start = Instant::now();
        let mut playback = Playback::new(10);
        assert!(!playback.poll(start));
        playback.play(start);
        assert!(!playback.poll(start + Duration::from_millis(100)));
        assert!(playback.poll(start + Duration::from_millis(200)));
        // Re-anchored: the next tick needs another full interval.
        assert!(!playback.poll(start + Duration::from_millis(250)));
        assert!(playback.poll(start + Duration::from_millis(400)));
    }

    #[test]
    fn pause_cancels_the_pending_tick() {
        let start = Instant::now();
        let mut playback = Playback::new(10);
        playback.play(start);
        playback.pause();
        assert!(!playback.poll(start + Duration::from_secs(60)));
        assert!(!playback.is_playing());
    }

    #[test]
    fn speed_change_repaces_without_restarting() {
        let start = Instant::now();
        let mut playback = Playback::new(1);
        playback.play(start);
        playback.set_speed(10);
        assert!(playback.poll(start + Duration::from_millis(200)));
    }
}
