//! The player's composite vehicle: hull plus detachable parts
//!
//! The hull's `x` is screen-relative; horizontal travel is the separate
//! scroll accumulator on [`GameState`](super::GameState). Parts live at
//! offsets from the hull and steer toward the active formation. They are
//! addressed by index for the whole level: a destroyed part stays in the
//! vector as falling debris, then as an inert slot.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geom::Box2;
use crate::input::ButtonState;
use crate::level::LevelError;
use crate::tuning::Tuning;

/// Target part offsets for every shape, indexed `[shape][part]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeFormation {
    shapes: Vec<Vec<Vec2>>,
}

impl Default for ShapeFormation {
    /// Four parts stacked above and below the hull, spreading one tile per shape
    fn default() -> Self {
        let shapes = (1..=3)
            .map(|step| {
                let dy = 48.0 * step as f32;
                vec![
                    Vec2::new(0.0, dy),
                    Vec2::new(36.0, dy),
                    Vec2::new(0.0, -dy),
                    Vec2::new(36.0, -dy),
                ]
            })
            .collect();
        Self { shapes }
    }
}

impl ShapeFormation {
    pub fn new(shapes: Vec<Vec<Vec2>>) -> Result<Self, LevelError> {
        let Some(first) = shapes.first() else {
            return Err(LevelError::BadFormation {
                reason: "no shapes".into(),
            });
        };
        let parts = first.len();
        if shapes.iter().any(|s| s.len() != parts) {
            return Err(LevelError::BadFormation {
                reason: "shapes have different part counts".into(),
            });
        }
        Ok(Self { shapes })
    }

    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    pub fn part_count(&self) -> usize {
        self.shapes.first().map_or(0, Vec::len)
    }

    /// Clamp any shape index into range
    pub fn clamp_shape(&self, shape: i64) -> usize {
        shape.clamp(0, (self.shapes.len() as i64 - 1).max(0)) as usize
    }

    /// Target offset of `part` in `shape` (shape clamped)
    pub fn target(&self, shape: usize, part: usize) -> Vec2 {
        let shape = shape.min(self.shapes.len().saturating_sub(1));
        self.shapes
            .get(shape)
            .and_then(|s| s.get(part))
            .copied()
            .unwrap_or(Vec2::ZERO)
    }
}

/// Life cycle of a part
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PartState {
    /// Flying in formation
    Attached,
    /// Knocked off; falls in world space until off-screen
    Debris { pos: Vec2 },
    /// Gone for the rest of the attempt
    Inert,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub state: PartState,
    /// Position relative to the hull
    pub offset: Vec2,
    /// Movement applied this tick (pixels/tick)
    pub vel: Vec2,
}

impl Part {
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.state == PartState::Attached
    }
}

/// Result of one steering pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Steering {
    /// Parts that fell out of formation this tick
    pub lost: Vec<usize>,
    /// Sum of the attached parts' vertical velocity
    pub vertical: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleBody {
    /// Hull bottom-left (x screen-relative, y world)
    pub pos: Vec2,
    pub size: Vec2,
    pub part_size: Vec2,
    /// Pixels per second
    pub h_speed: f32,
    /// Pixels per tick, positive is up
    pub v_speed: f32,
    pub climb_charge: f32,
    pub dive_charge: f32,
    pub shape: usize,
    pub parts: Vec<Part>,
}

impl VehicleBody {
    /// Fresh vehicle with every part in place for shape 0
    pub fn new(tuning: &Tuning, formation: &ShapeFormation) -> Self {
        let parts = (0..formation.part_count())
            .map(|i| Part {
                state: PartState::Attached,
                offset: formation.target(0, i),
                vel: Vec2::ZERO,
            })
            .collect();
        Self {
            pos: tuning.hull_start,
            size: tuning.hull_size,
            part_size: tuning.part_size,
            h_speed: 0.0,
            v_speed: 0.0,
            climb_charge: tuning.thrust_max_charge,
            dive_charge: tuning.thrust_max_charge,
            shape: 0,
            parts,
        }
    }

    /// Hull box relative to the screen
    pub fn hull_box(&self) -> Box2 {
        Box2::from_pos_size(self.pos, self.size)
    }

    /// Box of an attached part relative to the screen
    pub fn part_box(&self, index: usize) -> Option<Box2> {
        let part = self.parts.get(index)?;
        part.is_alive()
            .then(|| Box2::from_pos_size(self.pos + part.offset, self.part_size))
    }

    pub fn alive_parts(&self) -> usize {
        self.parts.iter().filter(|p| p.is_alive()).count()
    }

    /// Accelerate and brake for one tick
    pub fn apply_throttle(&mut self, accelerate: bool, brake: bool, tuning: &Tuning) {
        let mut speed = self.h_speed;
        if accelerate {
            let damping = 1.0 + speed / tuning.h_speed_damping;
            speed += tuning.acceleration / (damping * damping);
        }
        if brake {
            speed = tuning.braking.apply(speed);
        }
        self.h_speed = speed.max(0.0);
    }

    /// Move one formation step on each rising edge
    pub fn shift_shape(&mut self, up: ButtonState, down: ButtonState, formation: &ShapeFormation) {
        let mut shape = self.shape as i64;
        if up.pressed {
            shape += 1;
        }
        if down.pressed {
            shape -= 1;
        }
        self.shape = formation.clamp_shape(shape);
    }

    /// Compute part velocities toward the active formation
    ///
    /// A part whose vertical gap exceeds `snap_distance` is torn off
    /// instead of steered. Needs the current scroll to place the debris.
    pub fn steer_parts(&mut self, formation: &ShapeFormation, scroll: f32, tuning: &Tuning) -> Steering {
        let mut steering = Steering::default();
        for i in 0..self.parts.len() {
            if !self.parts[i].is_alive() {
                continue;
            }
            let gap = formation.target(self.shape, i) - self.parts[i].offset;
            if gap.y.abs() > tuning.snap_distance {
                self.detach_part(i, scroll);
                steering.lost.push(i);
                continue;
            }
            let vel = gap.clamp_length_max(tuning.part_base_speed);
            self.parts[i].vel = vel;
            steering.vertical += vel.y;
        }
        steering
    }

    /// Vertical thrust, damping, part drag, cap and grid snap
    pub fn apply_thrust(&mut self, climb: ButtonState, dive: ButtonState, part_drag: f32, tuning: &Tuning) {
        let max = tuning.thrust_max_charge;
        self.climb_charge = (self.climb_charge + tuning.thrust_rate_charge).clamp(0.0, max);
        self.dive_charge = (self.dive_charge + tuning.thrust_rate_charge).clamp(0.0, max);

        let mut v = self.v_speed;
        if climb.pressed {
            v += self.climb_charge;
            self.climb_charge = 0.0;
        }
        if dive.pressed {
            v -= self.dive_charge;
            self.dive_charge = 0.0;
        }
        if climb.held {
            v += tuning.thrust_power;
        }
        if dive.held {
            v -= tuning.thrust_power;
        }
        if !climb.held && !dive.held {
            v *= tuning.v_speed_damping;
        }

        v -= part_drag * tuning.mass_ratio;
        v = v.clamp(-tuning.v_speed_cap, tuning.v_speed_cap);

        if v.abs() < tuning.v_speed_floor {
            v = 0.0;
            let lane = (self.pos.y / tuning.tile_size).round() * tuning.tile_size;
            self.pos.y += (lane - self.pos.y) * tuning.snap_rate;
        }
        self.v_speed = v;
    }

    /// Apply this tick's velocities to hull and attached parts
    pub fn integrate(&mut self) {
        self.pos.y += self.v_speed;
        for part in self.parts.iter_mut().filter(|p| p.is_alive()) {
            part.offset += part.vel;
        }
    }

    /// Let debris fall; debris leaving the screen turns inert
    pub fn update_debris(&mut self, scroll: f32, tuning: &Tuning) {
        let size = self.part_size;
        for part in &mut self.parts {
            if let PartState::Debris { pos } = part.state {
                part.vel.y -= tuning.debris_gravity;
                let pos = pos + part.vel;
                let screen_x = pos.x - scroll;
                part.state = if screen_x + size.x < 0.0 || pos.y + size.y < 0.0 {
                    PartState::Inert
                } else {
                    PartState::Debris { pos }
                };
            }
        }
    }

    /// Knock an attached part off; false if it was already gone
    pub fn detach_part(&mut self, index: usize, scroll: f32) -> bool {
        let v_speed = self.v_speed;
        let hull = self.pos;
        let Some(part) = self.parts.get_mut(index) else {
            return false;
        };
        if !part.is_alive() {
            return false;
        }
        let world = hull + part.offset + Vec2::new(scroll, 0.0);
        part.state = PartState::Debris { pos: world };
        part.vel = Vec2::new(0.0, v_speed + part.vel.y);
        true
    }

    /// Detach every attached part (hull destroyed)
    pub fn detach_all(&mut self, scroll: f32) -> Vec<usize> {
        (0..self.parts.len())
            .filter(|&i| self.detach_part(i, scroll))
            .collect()
    }
}
