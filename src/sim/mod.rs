//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay pure:
//! - Fixed timestep only
//! - Tuning passed in, never read from globals
//! - Parts and blocks addressed by index in stable order
//! - No rendering or platform dependencies

pub mod blocks;
pub mod collision;
pub mod geom;
pub mod state;
pub mod tick;
pub mod vehicle;

pub use blocks::{Block, BlockIndex, BlockKind};
pub use collision::{Contact, Overlap, collect, collide, deepest_wall_overlap, sweep_window};
pub use geom::Box2;
pub use state::{GameEvent, GamePhase, GameState, Hud, Snapshot, WarningMarker};
pub use tick::tick;
pub use vehicle::{Part, PartState, ShapeFormation, Steering, VehicleBody};
