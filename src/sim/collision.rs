//! Collision of vehicle bodies against level tiles
//!
//! Bodies are tested in the frame of the previous tick: the query box is
//! built with last tick's scroll and every tile is moved left by this tick's
//! scroll delta. A body advancing less than one tile per tick therefore
//! cannot skip over a wall column.
//!
//! Severity comes from the deepest vertical overlap seen this tick:
//! scratches are ignored, bumps push the body away, crashes destroy it.

use std::ops::Range;

use glam::Vec2;

use super::blocks::BlockIndex;
use super::geom::Box2;
use crate::tuning::Tuning;

/// Outcome of one body's collision pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Contact {
    /// No overlap, or a scratch below `scratch_threshold`
    None,
    /// Vertical push in pixels/tick; negative when the wall is above
    Bump { correction: f32 },
    Crash,
}

/// Deepest vertical overlap found for a body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Overlap {
    pub depth: f32,
    /// True when the overlapping geometry is above the body's centre
    pub above: bool,
}

/// Tile indices that can touch `query` this tick
pub fn sweep_window(blocks: &BlockIndex, query: &Box2, scroll_delta: f32, view_span: i32) -> Range<usize> {
    let tile = blocks.tile_size();
    let first = ((query.min.x - scroll_delta) / tile).floor() as i32;
    let last = (query.min.x / tile).floor() as i32 + view_span;
    let begin = blocks.begin_index(first);
    let end = blocks.begin_index(last).max(begin);
    begin..end
}

/// Implicit floor and ceiling strips under and over the body
fn boundary_strips(query: &Box2, tuning: &Tuning) -> [Box2; 2] {
    let tile = tuning.tile_size;
    let height = tuning.level_height();
    let floor = Box2::new(Vec2::new(query.min.x, -height), Vec2::new(query.max.x, tile));
    let ceiling = Box2::new(
        Vec2::new(query.min.x, height - tile),
        Vec2::new(query.max.x, height * 2.0),
    );
    [floor, ceiling]
}

/// Largest vertical overlap between `query` and any wall
pub fn deepest_wall_overlap(
    blocks: &BlockIndex,
    query: &Box2,
    scroll_delta: f32,
    tuning: &Tuning,
) -> Option<Overlap> {
    if query.is_empty() {
        return None;
    }
    let center = query.center().y;
    let mut deepest: Option<Overlap> = None;
    let mut consider = |overlap: Box2| {
        if overlap.is_empty() {
            return;
        }
        let depth = overlap.height();
        if deepest.is_none_or(|d| depth > d.depth) {
            deepest = Some(Overlap {
                depth,
                above: overlap.center().y > center,
            });
        }
    };

    for i in sweep_window(blocks, query, scroll_delta, tuning.view_span) {
        consider(blocks.hit(query, i, scroll_delta));
    }
    for strip in boundary_strips(query, tuning) {
        consider(query.intersection(&strip));
    }
    deepest
}

/// Map an overlap onto a contact tier
pub fn classify(overlap: Option<Overlap>, tuning: &Tuning) -> Contact {
    let Some(overlap) = overlap else {
        return Contact::None;
    };
    if overlap.depth < tuning.scratch_threshold {
        Contact::None
    } else if overlap.depth < tuning.crash_threshold {
        let push = overlap.depth / tuning.bump_time;
        Contact::Bump {
            correction: if overlap.above { -push } else { push },
        }
    } else {
        Contact::Crash
    }
}

/// Collide one body against walls and the level boundary
pub fn collide(blocks: &BlockIndex, query: &Box2, scroll_delta: f32, tuning: &Tuning) -> Contact {
    classify(deepest_wall_overlap(blocks, query, scroll_delta, tuning), tuning)
}

/// Clear every pickup `query` overlaps deeper than `crash_threshold`
///
/// Returns the number of pickups collected. Cleared tiles are `Empty`, so
/// the same pickup is never counted twice.
pub fn collect(blocks: &mut BlockIndex, query: &Box2, scroll_delta: f32, tuning: &Tuning) -> usize {
    if query.is_empty() {
        return 0;
    }
    let mut collected = 0;
    for i in sweep_window(blocks, query, scroll_delta, tuning.view_span) {
        let overlap = blocks.pickup(query, i, scroll_delta);
        if !overlap.is_empty() && overlap.height() > tuning.crash_threshold {
            blocks.clear_block(i);
            collected += 1;
        }
    }
    collected
}
