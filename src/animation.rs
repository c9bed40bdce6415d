//! Time-based animations driven by named easing curves
//!
//! An [`Animation`] is a small timer: `start` records the start instant,
//! `tick` (run by the tree before each draw) stops it once the duration has
//! elapsed, and `ease` samples the curve at the elapsed fraction. Nodes own
//! up to four of them, one per [`Axis`].

use crate::error::{Error, Result};
use std::f32::consts::PI;
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

const BACK_OVERSHOOT: f32 = 1.7;
const TAU: f32 = PI * 2.0;

/// Named easing curve mapping normalized time to normalized progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Easing {
    Linear,
    QuadIn,
    QuadOut,
    QuadInOut,
    CubicIn,
    CubicOut,
    CubicInOut,
    QuartIn,
    QuartOut,
    QuartInOut,
    QuintIn,
    QuintOut,
    QuintInOut,
    SineIn,
    SineOut,
    SineInOut,
    BackIn,
    BackOut,
    BackInOut,
    CircIn,
    CircOut,
    CircInOut,
    BounceIn,
    BounceOut,
    BounceInOut,
    ElasticIn,
    ElasticOut,
    ElasticInOut,
    ExpoIn,
    ExpoOut,
    ExpoInOut,
}

impl Easing {
    /// Every curve with its canonical name
    pub const ALL: [(&'static str, Easing); 31] = [
        ("LINEAR", Easing::Linear),
        ("QUAD_IN", Easing::QuadIn),
        ("QUAD_OUT", Easing::QuadOut),
        ("QUAD_IN_OUT", Easing::QuadInOut),
        ("CUBIC_IN", Easing::CubicIn),
        ("CUBIC_OUT", Easing::CubicOut),
        ("CUBIC_IN_OUT", Easing::CubicInOut),
        ("QUART_IN", Easing::QuartIn),
        ("QUART_OUT", Easing::QuartOut),
        ("QUART_IN_OUT", Easing::QuartInOut),
        ("QUINT_IN", Easing::QuintIn),
        ("QUINT_OUT", Easing::QuintOut),
        ("QUINT_IN_OUT", Easing::QuintInOut),
        ("SINE_IN", Easing::SineIn),
        ("SINE_OUT", Easing::SineOut),
        ("SINE_IN_OUT", Easing::SineInOut),
        ("BACK_IN", Easing::BackIn),
        ("BACK_OUT", Easing::BackOut),
        ("BACK_IN_OUT", Easing::BackInOut),
        ("CIRC_IN", Easing::CircIn),
        ("CIRC_OUT", Easing::CircOut),
        ("CIRC_IN_OUT", Easing::CircInOut),
        ("BOUNCE_IN", Easing::BounceIn),
        ("BOUNCE_OUT", Easing::BounceOut),
        ("BOUNCE_IN_OUT", Easing::BounceInOut),
        ("ELASTIC_IN", Easing::ElasticIn),
        ("ELASTIC_OUT", Easing::ElasticOut),
        ("ELASTIC_IN_OUT", Easing::ElasticInOut),
        ("EASE_IN_EXPO", Easing::ExpoIn),
        ("EASE_OUT_EXPO", Easing::ExpoOut),
        ("EASE_IN_OUT_EXPO", Easing::ExpoInOut),
    ];

    /// Canonical upper-snake name
    pub fn name(&self) -> &'static str {
        Easing::ALL
            .iter()
            .find(|(_, easing)| easing == self)
            .map_or("LINEAR", |(name, _)| name)
    }

    /// Sample the curve at `t` (normally `0.0..=1.0`)
    pub fn apply(self, t: f32) -> f32 {
        match self {
            Easing::Linear => t,
            Easing::QuadIn => pow_in(t, 2),
            Easing::QuadOut => pow_out(t, 2),
            Easing::QuadInOut => pow_in_out(t, 2),
            Easing::CubicIn => pow_in(t, 3),
            Easing::CubicOut => pow_out(t, 3),
            Easing::CubicInOut => pow_in_out(t, 3),
            Easing::QuartIn => pow_in(t, 4),
            Easing::QuartOut => pow_out(t, 4),
            Easing::QuartInOut => pow_in_out(t, 4),
            Easing::QuintIn => pow_in(t, 5),
            Easing::QuintOut => pow_out(t, 5),
            Easing::QuintInOut => pow_in_out(t, 5),
            Easing::SineIn => 1.0 - (t * PI / 2.0).cos(),
            Easing::SineOut => (t * PI / 2.0).sin(),
            Easing::SineInOut => -0.5 * ((PI * t).cos() - 1.0),
            Easing::BackIn => t * t * ((BACK_OVERSHOOT + 1.0) * t - BACK_OVERSHOOT),
            Easing::BackOut => {
                let v = t - 1.0;
                v * v * ((BACK_OVERSHOOT + 1.0) * v + BACK_OVERSHOOT) + 1.0
            }
            Easing::BackInOut => back_in_out(t, BACK_OVERSHOOT),
            Easing::CircIn => 1.0 - (1.0 - t * t).max(0.0).sqrt(),
            Easing::CircOut => {
                let v = t - 1.0;
                (1.0 - v * v).max(0.0).sqrt()
            }
            Easing::CircInOut => {
                let v = t * 2.0;
                if v < 1.0 {
                    -0.5 * ((1.0 - v * v).max(0.0).sqrt() - 1.0)
                } else {
                    let v = v - 2.0;
                    0.5 * ((1.0 - v * v).max(0.0).sqrt() + 1.0)
                }
            }
            Easing::BounceIn => bounce_in(t),
            Easing::BounceOut => bounce_out(t),
            Easing::BounceInOut => {
                if t < 0.5 {
                    bounce_in(t * 2.0) * 0.5
                } else {
                    bounce_out(t * 2.0 - 1.0) * 0.5 + 0.5
                }
            }
            Easing::ElasticIn => elastic_in(t, 1.0, 0.3),
            Easing::ElasticOut => elastic_out(t, 1.0, 0.3),
            Easing::ElasticInOut => elastic_in_out(t, 1.0, 0.45),
            Easing::ExpoIn => {
                if t <= 0.0 {
                    0.0
                } else {
                    2f32.powf(10.0 * (t - 1.0))
                }
            }
            Easing::ExpoOut => {
                if t >= 1.0 {
                    1.0
                } else {
                    1.0 - 2f32.powf(-10.0 * t)
                }
            }
            Easing::ExpoInOut => {
                if t <= 0.0 {
                    return 0.0;
                }
                if t >= 1.0 {
                    return 1.0;
                }
                let v = t * 2.0;
                if v < 1.0 {
                    0.5 * 2f32.powf(10.0 * (v - 1.0))
                } else {
                    0.5 * (2.0 - 2f32.powf(-10.0 * (v - 1.0)))
                }
            }
        }
    }
}

impl FromStr for Easing {
    type Err = Error;

    /// Accepts canonical names in any case, with `-`, `_` or spaces as
    /// separators (`quad-in`, `Ease Out Expo`), plus `EXPO_IN`-style aliases
    fn from_str(name: &str) -> Result<Self> {
        let normalized: String = name
            .trim()
            .chars()
            .map(|c| match c {
                '-' | ' ' => '_',
                c => c.to_ascii_uppercase(),
            })
            .collect();

        let alias = match normalized.as_str() {
            "EXPO_IN" => "EASE_IN_EXPO",
            "EXPO_OUT" => "EASE_OUT_EXPO",
            "EXPO_IN_OUT" => "EASE_IN_OUT_EXPO",
            other => other,
        };

        Easing::ALL
            .iter()
            .find(|(canonical, _)| *canonical == alias)
            .map(|(_, easing)| *easing)
            .ok_or_else(|| Error::UnknownEasing(name.to_string()))
    }
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn pow_in(t: f32, pow: i32) -> f32 {
    t.powi(pow)
}

fn pow_out(t: f32, pow: i32) -> f32 {
    1.0 - (1.0 - t).powi(pow)
}

fn pow_in_out(t: f32, pow: i32) -> f32 {
    let v = t * 2.0;
    if v < 1.0 {
        0.5 * v.powi(pow)
    } else {
        0.5 * (2.0 - (2.0 - v).powi(pow))
    }
}

fn back_in_out(t: f32, amount: f32) -> f32 {
    let s = amount * 1.525;
    let v = t * 2.0;
    if v < 1.0 {
        return 0.5 * (v * v * ((s + 1.0) * v - s));
    }
    let v = v - 2.0;
    0.5 * (v * v * ((s + 1.0) * v + s) + 2.0)
}

fn bounce_out(t: f32) -> f32 {
    if t < 1.0 / 2.75 {
        7.5625 * t * t
    } else if t < 2.0 / 2.75 {
        let v = t - 1.5 / 2.75;
        7.5625 * v * v + 0.75
    } else if t < 2.5 / 2.75 {
        let v = t - 2.25 / 2.75;
        7.5625 * v * v + 0.9375
    } else {
        let v = t - 2.625 / 2.75;
        7.5625 * v * v + 0.984375
    }
}

fn bounce_in(t: f32) -> f32 {
    1.0 - bounce_out(1.0 - t)
}

fn elastic_shift(amplitude: f32, period: f32) -> f32 {
    period / TAU * (1.0 / amplitude).asin()
}

fn elastic_in(t: f32, amplitude: f32, period: f32) -> f32 {
    if t <= 0.0 || t >= 1.0 {
        return t.clamp(0.0, 1.0);
    }
    let s = elastic_shift(amplitude, period);
    let v = t - 1.0;
    -(amplitude * 2f32.powf(10.0 * v) * ((v - s) * TAU / period).sin())
}

fn elastic_out(t: f32, amplitude: f32, period: f32) -> f32 {
    if t <= 0.0 || t >= 1.0 {
        return t.clamp(0.0, 1.0);
    }
    let s = elastic_shift(amplitude, period);
    amplitude * 2f32.powf(-10.0 * t) * ((t - s) * TAU / period).sin() + 1.0
}

fn elastic_in_out(t: f32, amplitude: f32, period: f32) -> f32 {
    if t <= 0.0 || t >= 1.0 {
        return t.clamp(0.0, 1.0);
    }
    let s = elastic_shift(amplitude, period);
    let v = t * 2.0 - 1.0;
    if v < 0.0 {
        -0.5 * (amplitude * 2f32.powf(10.0 * v) * ((v - s) * TAU / period).sin())
    } else {
        amplitude * 2f32.powf(-10.0 * v) * ((v - s) * TAU / period).sin() * 0.5 + 1.0
    }
}

/// A timed run of one easing curve
#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    easing: Easing,
    duration: Duration,
    started: Option<Instant>,
    completed: bool,
}

impl Animation {
    /// Create a stopped animation
    pub fn new(easing: Easing, duration: Duration) -> Self {
        Animation {
            easing,
            duration,
            started: None,
            completed: false,
        }
    }

    /// Create from a curve name, failing fast on unknown names
    pub fn named(name: &str, duration: Duration) -> Result<Self> {
        Ok(Animation::new(name.parse()?, duration))
    }

    pub fn easing(&self) -> Easing {
        self.easing
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Change the duration of future runs
    pub fn set_duration(&mut self, duration: Duration) {
        self.duration = duration;
    }

    /// Start (or restart) at `now`
    pub fn start_at(&mut self, now: Instant) -> &mut Self {
        self.started = Some(now);
        self.completed = false;
        self
    }

    /// Start (or restart) now
    pub fn start(&mut self) -> &mut Self {
        self.start_at(Instant::now())
    }

    /// Stop and reset without completing
    pub fn stop(&mut self) -> &mut Self {
        self.started = None;
        self.completed = false;
        self
    }

    /// Whether the animation is currently running
    pub fn is_running(&self) -> bool {
        self.started.is_some()
    }

    /// Whether the last run reached its full duration
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Per-frame check: auto-stops once the duration has elapsed
    pub fn tick(&mut self, now: Instant) {
        let Some(started) = self.started else {
            return;
        };
        if now.saturating_duration_since(started) >= self.duration {
            self.started = None;
            self.completed = true;
        }
    }

    /// Normalized elapsed fraction: `0.0` before a run, `1.0` after one
    pub fn progress(&self, now: Instant) -> f32 {
        match self.started {
            Some(started) => {
                if self.duration.is_zero() {
                    return 1.0;
                }
                let elapsed = now.saturating_duration_since(started);
                (elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
            }
            None if self.completed => 1.0,
            None => 0.0,
        }
    }

    /// Curve value at the current progress, clamped to be non-negative
    pub fn ease(&self, now: Instant) -> f32 {
        self.easing.apply(self.progress(now)).max(0.0)
    }
}

/// Geometry axis an animation drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Width,
    Height,
}

impl Axis {
    pub const ALL: [Axis; 4] = [Axis::X, Axis::Y, Axis::Width, Axis::Height];

    fn slot(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Width => 2,
            Axis::Height => 3,
        }
    }
}

/// The four independent per-axis animations of a node
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AxisAnimations {
    slots: [Option<Animation>; 4],
}

impl AxisAnimations {
    pub fn get(&self, axis: Axis) -> Option<&Animation> {
        self.slots[axis.slot()].as_ref()
    }

    pub fn get_mut(&mut self, axis: Axis) -> Option<&mut Animation> {
        self.slots[axis.slot()].as_mut()
    }

    pub fn set(&mut self, axis: Axis, animation: Animation) {
        self.slots[axis.slot()] = Some(animation);
    }

    pub fn clear(&mut self, axis: Axis) -> Option<Animation> {
        self.slots[axis.slot()].take()
    }

    /// Tick every present animation
    pub fn tick(&mut self, now: Instant) {
        for animation in self.slots.iter_mut().flatten() {
            animation.tick(now);
        }
    }

    /// Whether any axis is mid-run
    pub fn any_running(&self) -> bool {
        self.slots.iter().flatten().any(Animation::is_running)
    }
}
