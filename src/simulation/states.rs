//! Core state types for the 2D N-body simulation.
//!
//! Defines the body/system structs:
//! - `Body` using `NVec2` (position, velocity, acceleration, mass, charge, color)
//! - `System` holding the list of bodies and the current simulation time `t`
//!
//! A body with mass exactly 0 is a tombstone left behind by a depth-limit
//! merge; it stays in the collection until the engine purges it.

use nalgebra::Vector2;
pub type NVec2 = Vector2<f64>;

/// RGB tag carried on each body for the external renderer.
/// Merged bodies blend their tags by mass fraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorTag {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl ColorTag {
    pub const WHITE: ColorTag = ColorTag { r: 255, g: 255, b: 255 };

    /// Linear blend toward `other` by `t` in `[0, 1]`.
    pub fn lerp(self, other: ColorTag, t: f64) -> ColorTag {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        ColorTag {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Body {
    pub x: NVec2, // position
    pub v: NVec2, // velocity
    pub a: NVec2, // acceleration, rebuilt every step
    pub m: f64, // mass, >= 0; exactly 0 marks a tombstone
    pub p: i8, // charge sign, -1 or +1
    pub color: ColorTag,
}

impl Body {
    /// Convenience constructor for a neutral white body at rest.
    pub fn at(x: NVec2, m: f64) -> Self {
        Body {
            x,
            v: NVec2::zeros(),
            a: NVec2::zeros(),
            m,
            p: 1,
            color: ColorTag::WHITE,
        }
    }

    /// True once a merge has zeroed this body's mass.
    pub fn is_tombstone(&self) -> bool {
        self.m == 0.0
    }
}

#[derive(Debug, Clone)]
pub struct System {
    pub bodies: Vec<Body>, // collection of bodies, owned exclusively
    pub t: f64, // time
}

impl System {
    pub fn new(bodies: Vec<Body>) -> Self {
        System { bodies, t: 0.0 }
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Sum of all live body masses.
    pub fn total_mass(&self) -> f64 {
        self.bodies.iter().map(|b| b.m).sum()
    }

    /// Mass-weighted average position of all bodies, or the origin for an
    /// empty (or massless) system.
    pub fn center_of_mass(&self) -> NVec2 {
        let m = self.total_mass();
        if m == 0.0 {
            return NVec2::zeros();
        }
        let weighted: NVec2 = self.bodies.iter().map(|b| b.x * b.m).sum();
        weighted / m
    }
}
