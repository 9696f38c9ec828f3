//! Shift Runner - a side-scrolling formation runner
//!
//! Core modules:
//! - `sim`: Deterministic simulation (block index, vehicle physics, collisions, game state)
//! - `level`: Section masks, level metadata and procedural section picks
//! - `clock`: Fixed tick / variable frame loop timing
//! - `input`: Per-tick button snapshots
//! - `script`: Distance-triggered cutscene steps
//! - `tuning`: Data-driven game balance

pub mod clock;
pub mod input;
pub mod level;
pub mod script;
pub mod sim;
pub mod tuning;

pub use clock::{ClockConfig, LoopEvent, SystemTimeSource, TickClock, TimeSource};
pub use input::{ButtonState, HeldActions, InputTracker, TickInput};
pub use level::{Level, LevelDef, LevelError, SectionLibrary, SectionMask, assemble};
pub use sim::{GameEvent, GamePhase, GameState, tick};
pub use tuning::{BrakingRule, Tuning};
