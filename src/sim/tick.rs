//! Fixed timestep simulation tick
//!
//! One call advances the game by exactly one step. The order inside a
//! playing tick never changes: throttle and scroll, part steering, vertical
//! thrust, collision and collection (hull first, then parts), integration,
//! then debris and level bookkeeping.

use glam::Vec2;

use super::collision::{Contact, collect, collide};
use super::state::{GameEvent, GamePhase, GameState};
use crate::input::TickInput;

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput) {
    let dt = state.tuning.tick_duration;
    state.time_ticks += 1;

    if state.script.is_running() {
        let cues = state.script.advance(dt);
        state.events.extend(cues.into_iter().map(GameEvent::Script));
    }

    state.previous = state.current.clone();

    // A cutscene holds the world still
    if state.script.pauses_gameplay() {
        return;
    }

    match state.phase {
        GamePhase::Playing => tick_playing(state, input),
        GamePhase::Dying { ticks } => tick_dying(state, ticks + 1),
        GamePhase::Complete { .. } => {}
    }

    if matches!(state.phase, GamePhase::Playing | GamePhase::Dying { .. }) {
        state.current = state.snapshot();
    }
}

fn tick_playing(state: &mut GameState, input: &TickInput) {
    let dt = state.tuning.tick_duration;

    // Horizontal
    state
        .vehicle
        .apply_throttle(input.accelerate.held, input.brake.held, &state.tuning);
    state.prev_scroll = state.scroll;
    state.scroll += state.vehicle.h_speed * dt;
    let delta = state.scroll - state.prev_scroll;

    // Formation
    state
        .vehicle
        .shift_shape(input.shape_up, input.shape_down, &state.formation);
    let steering = state
        .vehicle
        .steer_parts(&state.formation, state.scroll, &state.tuning);
    for part in steering.lost {
        log::debug!("Part {} torn out of formation", part);
        state.events.push(GameEvent::PartLost { part });
    }

    // Vertical
    state
        .vehicle
        .apply_thrust(input.climb, input.dive, steering.vertical, &state.tuning);

    // Collision, hull first
    let frame = Vec2::new(state.prev_scroll, 0.0);
    let hull = state.vehicle.hull_box().translate(frame);
    match collide(&state.blocks, &hull, delta, &state.tuning) {
        Contact::Crash => {
            crash_hull(state);
            state.vehicle.integrate();
            return;
        }
        Contact::Bump { correction } => {
            state.vehicle.v_speed += correction;
            state.events.push(GameEvent::Bump {
                part: None,
                correction,
            });
        }
        Contact::None => {}
    }
    let picked = collect(&mut state.blocks, &hull, delta, &state.tuning);
    award_pickups(state, picked);

    for i in 0..state.vehicle.parts.len() {
        let Some(part_box) = state.vehicle.part_box(i) else {
            continue;
        };
        let part_box = part_box.translate(frame);
        match collide(&state.blocks, &part_box, delta, &state.tuning) {
            Contact::Crash => {
                state.vehicle.detach_part(i, state.scroll);
                log::debug!("Part {} crashed", i);
                state.events.push(GameEvent::PartLost { part: i });
                continue;
            }
            Contact::Bump { correction } => {
                state.vehicle.parts[i].vel.y += correction;
                state.events.push(GameEvent::Bump {
                    part: Some(i),
                    correction,
                });
            }
            Contact::None => {}
        }
        let picked = collect(&mut state.blocks, &part_box, delta, &state.tuning);
        award_pickups(state, picked);
    }

    // Integration
    state.vehicle.integrate();
    state.vehicle.update_debris(state.scroll, &state.tuning);

    fire_triggers(state);
    check_level_end(state);
}

fn tick_dying(state: &mut GameState, ticks: u32) {
    let drop = state.tuning.death_drop_speed;
    state.vehicle.v_speed = -drop;
    state.vehicle.pos.y -= drop;
    state.vehicle.update_debris(state.scroll, &state.tuning);
    state.prev_scroll = state.scroll;

    if ticks >= state.tuning.death_ticks() {
        state.restart();
    } else {
        state.phase = GamePhase::Dying { ticks };
    }
}

fn crash_hull(state: &mut GameState) {
    log::info!(
        "Hull crashed at distance {:.1} (score {})",
        state.distance(),
        state.score
    );
    state.phase = GamePhase::Dying { ticks: 0 };
    state.vehicle.h_speed = 0.0;
    state.events.push(GameEvent::HullCrashed);
    for part in state.vehicle.detach_all(state.scroll) {
        state.events.push(GameEvent::PartLost { part });
    }
}

/// Score scales with speed at the moment of pickup
fn award_pickups(state: &mut GameState, count: usize) {
    if count == 0 {
        return;
    }
    let t = &state.tuning;
    let points = t.point_score + (state.vehicle.h_speed * t.point_speed_factor).floor() as u64;
    for _ in 0..count {
        state.score += points;
        state.events.push(GameEvent::PickupCollected { points });
    }

    let cooldown = t.pickup_cue_ticks();
    let ready = state
        .last_cue_tick
        .is_none_or(|last| state.time_ticks - last >= cooldown);
    if ready {
        state.last_cue_tick = Some(state.time_ticks);
        state.events.push(GameEvent::PickupCue);
    }
}

fn fire_triggers(state: &mut GameState) {
    let distance = state.distance();
    while let Some(trigger) = state.def.triggers.get(state.next_trigger) {
        if distance < trigger.distance {
            break;
        }
        log::debug!("Script trigger at distance {:.1}", trigger.distance);
        state.script.start(trigger.script.clone());
        state.next_trigger += 1;
    }
}

fn check_level_end(state: &mut GameState) {
    let hull = state.hull_world_box(state.scroll);
    let column = (hull.min.x / state.tuning.tile_size).floor() as i32;
    if column < state.blocks.length() {
        return;
    }
    let passed = state.score >= state.def.min_score;
    state.phase = GamePhase::Complete { passed };
    state.events.push(GameEvent::LevelComplete {
        passed,
        score: state.score,
    });
    log::info!(
        "Level \"{}\" complete: score {} (needed {}), {}",
        state.def.name,
        state.score,
        state.def.min_score,
        if passed { "passed" } else { "failed" }
    );
}
