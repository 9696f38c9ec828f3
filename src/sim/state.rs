//! Game state and render-facing outputs
//!
//! Everything the tick mutates lives in [`GameState`]. Rendering only reads
//! the two latest [`Snapshot`]s, the HUD numbers and the warning markers.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::blocks::BlockIndex;
use super::geom::Box2;
use super::vehicle::{PartState, ShapeFormation, VehicleBody};
use crate::level::{Level, LevelDef};
use crate::script::{ScriptCue, Sequencer};
use crate::tuning::Tuning;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Playing,
    /// Hull destroyed; the level restarts once `ticks` reaches the death length
    Dying { ticks: u32 },
    /// Hull reached the end of the level
    Complete { passed: bool },
}

/// Things that happened during a tick, for sound and effects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// `part` is `None` for the hull
    Bump { part: Option<usize>, correction: f32 },
    PartLost { part: usize },
    HullCrashed,
    PickupCollected { points: u64 },
    /// Rate-limited pickup feedback
    PickupCue,
    LevelRestarted,
    LevelComplete { passed: bool, score: u64 },
    Script(ScriptCue),
}

/// Screen-space transforms for one tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub scroll: f32,
    pub hull: Vec2,
    /// `None` once a part is inert
    pub parts: Vec<Option<Vec2>>,
}

impl Snapshot {
    /// Blend toward `next`; parts that changed state jump to `next`
    pub fn lerp(&self, next: &Snapshot, t: f32) -> Snapshot {
        let t = t.clamp(0.0, 1.0);
        let parts = self
            .parts
            .iter()
            .zip(&next.parts)
            .map(|(a, b)| match (a, b) {
                (Some(a), Some(b)) => Some(a.lerp(*b, t)),
                (_, b) => *b,
            })
            .collect();
        Snapshot {
            scroll: self.scroll + (next.scroll - self.scroll) * t,
            hull: self.hull.lerp(next.hull, t),
            parts,
        }
    }
}

/// Numbers shown on the HUD
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hud {
    pub score: u64,
    /// Pixels per second
    pub speed: f32,
    /// Tiles travelled
    pub distance: f32,
}

/// Warning arrow for a wall row just beyond the right screen edge
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WarningMarker {
    pub row: i32,
    pub screen_box: Box2,
}

/// Complete simulation state for one level
#[derive(Debug, Clone)]
pub struct GameState {
    pub tuning: Tuning,
    pub def: LevelDef,
    pub formation: ShapeFormation,
    pub blocks: BlockIndex,
    /// Block array as assembled, restored on restart
    pristine: BlockIndex,
    pub vehicle: VehicleBody,
    /// Horizontal offset in pixels after the last tick
    pub scroll: f32,
    /// Horizontal offset one tick earlier
    pub prev_scroll: f32,
    pub score: u64,
    pub phase: GamePhase,
    /// Simulation tick counter (never reset)
    pub time_ticks: u64,
    /// Restarts so far
    pub attempts: u32,
    pub script: Sequencer,
    pub(crate) next_trigger: usize,
    pub(crate) last_cue_tick: Option<u64>,
    pub(crate) events: Vec<GameEvent>,
    pub(crate) previous: Snapshot,
    pub(crate) current: Snapshot,
}

impl GameState {
    pub fn new(level: Level, tuning: Tuning) -> Self {
        let Level {
            mut def,
            blocks,
            formation,
        } = level;
        debug_assert_eq!(
            blocks.tile_size(),
            tuning.tile_size,
            "level assembled with a different tile size"
        );
        def.triggers
            .sort_by(|a, b| a.distance.total_cmp(&b.distance));

        let vehicle = VehicleBody::new(&tuning, &formation);
        let mut state = Self {
            tuning,
            def,
            formation,
            pristine: blocks.clone(),
            blocks,
            vehicle,
            scroll: 0.0,
            prev_scroll: 0.0,
            score: 0,
            phase: GamePhase::Playing,
            time_ticks: 0,
            attempts: 0,
            script: Sequencer::new(),
            next_trigger: 0,
            last_cue_tick: None,
            events: Vec::new(),
            previous: Snapshot {
                scroll: 0.0,
                hull: Vec2::ZERO,
                parts: Vec::new(),
            },
            current: Snapshot {
                scroll: 0.0,
                hull: Vec2::ZERO,
                parts: Vec::new(),
            },
        };
        state.current = state.snapshot();
        state.previous = state.current.clone();
        state
    }

    /// Back to the level start with a fresh vehicle and every pickup restored
    pub fn restart(&mut self) {
        self.blocks = self.pristine.clone();
        self.vehicle = VehicleBody::new(&self.tuning, &self.formation);
        self.scroll = 0.0;
        self.prev_scroll = 0.0;
        self.score = 0;
        self.phase = GamePhase::Playing;
        self.script = Sequencer::new();
        self.next_trigger = 0;
        self.last_cue_tick = None;
        self.attempts += 1;
        self.current = self.snapshot();
        self.previous = self.current.clone();
        self.events.push(GameEvent::LevelRestarted);
        log::info!("Level \"{}\" restarted (attempt {})", self.def.name, self.attempts + 1);
    }

    /// Tiles travelled
    pub fn distance(&self) -> f32 {
        self.scroll / self.tuning.tile_size
    }

    pub fn hud(&self) -> Hud {
        Hud {
            score: self.score,
            speed: self.vehicle.h_speed,
            distance: self.distance(),
        }
    }

    /// Whether a running script is holding gameplay
    pub fn pauses_gameplay(&self) -> bool {
        self.script.pauses_gameplay()
    }

    /// Take the events queued since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn previous_snapshot(&self) -> &Snapshot {
        &self.previous
    }

    pub fn current_snapshot(&self) -> &Snapshot {
        &self.current
    }

    /// Transforms between the last two ticks; `interp` comes from the clock
    pub fn interpolated(&self, interp: f32) -> Snapshot {
        self.previous.lerp(&self.current, interp)
    }

    /// Rows with walls in the columns just past the right screen edge
    pub fn warnings(&self) -> Vec<WarningMarker> {
        let t = &self.tuning;
        let tile = t.tile_size;
        let edge = (self.scroll / tile).floor() as i32 + t.view_span;
        let begin = self.blocks.begin_index(edge);
        let end = self.blocks.end_index(edge, t.warning_lookahead);

        let x = (t.view_span - 1) as f32 * tile;
        (1..t.level_rows - 1)
            .filter(|&row| self.blocks.has_wall_at_row_in_range(row, begin, end))
            .map(|row| WarningMarker {
                row,
                screen_box: Box2::from_pos_size(Vec2::new(x, row as f32 * tile), Vec2::splat(tile)),
            })
            .collect()
    }

    /// Hull box in world space at the given scroll
    pub fn hull_world_box(&self, scroll: f32) -> Box2 {
        self.vehicle.hull_box().translate(Vec2::new(scroll, 0.0))
    }

    pub(crate) fn snapshot(&self) -> Snapshot {
        let v = &self.vehicle;
        let parts = v
            .parts
            .iter()
            .map(|p| match p.state {
                PartState::Attached => Some(v.pos + p.offset),
                PartState::Debris { pos } => Some(pos - Vec2::new(self.scroll, 0.0)),
                PartState::Inert => None,
            })
            .collect();
        Snapshot {
            scroll: self.scroll,
            hull: v.pos,
            parts,
        }
    }
}
