//! Scripted input source
//!
//! Replays control changes from a CSV file so the surface can run on a
//! machine with no pins. Each row sets one pin to a level at a given tick:
//!
//! ```text
//! tick,pin,level
//! 10,49,0
//! 25,49,1
//! 40,54,2050
//! ```
//!
//! Levels persist until changed. Digital reads treat any non-zero level as
//! high; pins never mentioned read high (released) and 0 on the ADC.

use serde::Deserialize;
use std::collections::HashMap;
use std::io;
use std::path::Path;
use thiserror::Error;

use super::InputPins;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("failed to read input script {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("invalid input script row: {0}")]
    Row(#[from] csv::Error),
}

/// One scheduled level change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ScriptStep {
    pub tick: u64,
    pub pin: u8,
    pub level: u16,
}

/// Input pins driven by a replayed script
#[derive(Debug, Default)]
pub struct ScriptedInputs {
    steps: Vec<ScriptStep>,
    cursor: usize,
    tick: u64,
    levels: HashMap<u8, u16>,
}

impl ScriptedInputs {
    /// No scheduled changes: every button released, every pot at 0
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn from_steps(mut steps: Vec<ScriptStep>) -> Self {
        // Stable: rows for the same tick keep their file order
        steps.sort_by_key(|step| step.tick);
        Self {
            steps,
            ..Self::default()
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ScriptError> {
        let path = path.as_ref();
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .comment(Some(b'#'))
            .from_path(path)
            .map_err(|source| ScriptError::Open {
                path: path.display().to_string(),
                source,
            })?;
        Self::from_csv(reader)
    }

    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self, ScriptError> {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .comment(Some(b'#'))
            .from_reader(reader);
        Self::from_csv(reader)
    }

    fn from_csv<R: io::Read>(mut reader: csv::Reader<R>) -> Result<Self, ScriptError> {
        let steps = reader
            .deserialize()
            .collect::<Result<Vec<ScriptStep>, _>>()?;
        Ok(Self::from_steps(steps))
    }

    /// Apply the changes scheduled for the current tick, then move on
    pub fn advance(&mut self) {
        while let Some(step) = self.steps.get(self.cursor) {
            if step.tick > self.tick {
                break;
            }
            self.levels.insert(step.pin, step.level);
            self.cursor += 1;
        }
        self.tick += 1;
    }

    /// Every scheduled change has been applied
    pub fn is_finished(&self) -> bool {
        self.cursor >= self.steps.len()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl InputPins for ScriptedInputs {
    fn read_digital(&mut self, pin: u8) -> bool {
        !matches!(self.levels.get(&pin), Some(0))
    }

    fn read_analog(&mut self, pin: u8) -> u16 {
        self.levels.get(&pin).copied().unwrap_or(0)
    }
}
