//! Scripted cutscene steps
//!
//! Levels can attach short scripts to distance markers (dialogue lines,
//! camera or sprite tweens). The presentation layer plays the cues; the
//! simulation only needs to know whether a running script holds gameplay.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// One command of a script
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum ScriptStep {
    Wait { seconds: f32 },
    PauseGameplay,
    ResumeGameplay,
    /// Show a line of dialogue for `seconds`
    Say { text: String, seconds: f32 },
    /// Move a named presentation entity to `to` over `seconds`
    Tween { target: String, to: Vec2, seconds: f32 },
}

/// Presentation work emitted while a script runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScriptCue {
    Say { text: String, seconds: f32 },
    Tween { target: String, to: Vec2, seconds: f32 },
    Finished,
}

/// Step interpreter for one script at a time
#[derive(Debug, Clone, Default)]
pub struct Sequencer {
    steps: Vec<ScriptStep>,
    cursor: usize,
    /// Seconds left before the next step runs
    wait: f32,
    paused: bool,
    running: bool,
}

impl Sequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace whatever is running with `steps`
    pub fn start(&mut self, steps: Vec<ScriptStep>) {
        log::debug!("Script started ({} steps)", steps.len());
        self.steps = steps;
        self.cursor = 0;
        self.wait = 0.0;
        self.paused = false;
        self.running = true;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Whether gameplay ticks should be held back
    pub fn pauses_gameplay(&self) -> bool {
        self.running && self.paused
    }

    /// Run the script forward by `dt` seconds
    pub fn advance(&mut self, dt: f32) -> Vec<ScriptCue> {
        let mut cues = Vec::new();
        if !self.running {
            return cues;
        }

        self.wait -= dt;
        while self.wait <= 0.0 {
            let Some(step) = self.steps.get(self.cursor).cloned() else {
                self.running = false;
                self.paused = false;
                self.wait = 0.0;
                cues.push(ScriptCue::Finished);
                log::debug!("Script finished");
                break;
            };
            self.cursor += 1;

            match step {
                ScriptStep::Wait { seconds } => self.wait += seconds,
                ScriptStep::PauseGameplay => self.paused = true,
                ScriptStep::ResumeGameplay => self.paused = false,
                ScriptStep::Say { text, seconds } => {
                    cues.push(ScriptCue::Say { text, seconds });
                    self.wait += seconds;
                }
                ScriptStep::Tween {
                    target,
                    to,
                    seconds,
                } => {
                    cues.push(ScriptCue::Tween {
                        target,
                        to,
                        seconds,
                    });
                    self.wait += seconds;
                }
            }
        }
        cues
    }
}
