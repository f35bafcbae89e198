use alloc::string::ToString;
use core::time::Duration;
use serde::{Deserialize, Serialize};

use crate::*;

/// Flashing window between selecting cells and committing their removal.
pub const FLASH_DURATION: Duration = Duration::from_secs(3);

/// Grace period during which the whole path flashes before it sinks.
pub const FINAL_WARNING_DURATION: Duration = Duration::from_secs(10);

/// Share of a fresh island removed by the initial shaping pass.
pub const DEFAULT_INITIAL_EROSION: f64 = 0.25;

/// Translation between the player's selection coordinates and the island's grid coordinates.
///
/// The selection layer addresses cells from its own origin, which sits `(dx, dy)` away from the
/// island center. The offset depends on how the host lays the grid out, so it is configuration,
/// not a constant.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionOffset {
    pub dx: Coord,
    pub dy: Coord,
}

impl SelectionOffset {
    pub const fn new(dx: Coord, dy: Coord) -> Self {
        Self { dx, dy }
    }

    /// Converts a selection-space position into grid space.
    pub const fn to_grid(self, (x, y): Coord2) -> Coord2 {
        (x.saturating_sub(self.dx), y.saturating_sub(self.dy))
    }

    /// Converts a grid-space position into selection space.
    pub const fn to_selection(self, (x, y): Coord2) -> Coord2 {
        (x.saturating_add(self.dx), y.saturating_add(self.dy))
    }

    pub fn normalize(self, cell: &Cell) -> Cell {
        let (x, y) = self.to_grid(cell.pos());
        Cell { x, y, ..*cell }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErosionPreset {
    /// 5% of the erodable cells per initial cycle, then 10%.
    Gentle,
    /// 7% of the erodable cells per initial cycle, then 14%.
    Brisk,
}

impl Default for ErosionPreset {
    fn default() -> Self {
        Self::Gentle
    }
}

/// Timing and intensity knobs of the erosion controller.
///
/// Erosion always starts slow and accelerates: the first `initial_phase_count` cycles use the
/// initial interval and percentage, every later cycle the standard ones.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErosionConfig {
    #[serde(with = "serde_millis")]
    pub initial_interval: Duration,
    #[serde(with = "serde_millis")]
    pub standard_interval: Duration,
    pub initial_phase_count: u32,
    pub initial_percentage: f64,
    pub standard_percentage: f64,
    #[serde(with = "serde_millis")]
    pub flash_duration: Duration,
    #[serde(with = "serde_millis")]
    pub final_warning_duration: Duration,
    pub selection_offset: SelectionOffset,
}

impl ErosionConfig {
    pub const fn gentle() -> Self {
        Self {
            initial_interval: Duration::from_secs(15),
            standard_interval: Duration::from_secs(10),
            initial_phase_count: 1,
            initial_percentage: 0.05,
            standard_percentage: 0.10,
            flash_duration: FLASH_DURATION,
            final_warning_duration: FINAL_WARNING_DURATION,
            selection_offset: SelectionOffset::new(0, 0),
        }
    }

    pub const fn brisk() -> Self {
        Self {
            initial_percentage: 0.07,
            standard_percentage: 0.14,
            ..Self::gentle()
        }
    }

    pub const fn from_preset(preset: ErosionPreset) -> Self {
        match preset {
            ErosionPreset::Gentle => Self::gentle(),
            ErosionPreset::Brisk => Self::brisk(),
        }
    }

    pub const fn with_selection_offset(self, selection_offset: SelectionOffset) -> Self {
        Self {
            selection_offset,
            ..self
        }
    }

    /// Parses a JSON config, any missing field keeps its `gentle` value.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|err| ErosionError::InvalidConfig(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        validate_percentage(self.initial_percentage)?;
        validate_percentage(self.standard_percentage)?;
        if self.initial_phase_count == 0 {
            return Err(ErosionError::InvalidPhaseCount);
        }
        for (name, duration) in [
            ("initial_interval", self.initial_interval),
            ("standard_interval", self.standard_interval),
            ("flash_duration", self.flash_duration),
            ("final_warning_duration", self.final_warning_duration),
        ] {
            if duration.is_zero() {
                return Err(ErosionError::InvalidDuration(name));
            }
        }
        Ok(())
    }

    pub const fn is_initial_phase(&self, phase: u32) -> bool {
        phase < self.initial_phase_count
    }

    pub const fn interval_for_phase(&self, phase: u32) -> Duration {
        if self.is_initial_phase(phase) {
            self.initial_interval
        } else {
            self.standard_interval
        }
    }

    pub const fn percentage_for_phase(&self, phase: u32) -> f64 {
        if self.is_initial_phase(phase) {
            self.initial_percentage
        } else {
            self.standard_percentage
        }
    }

    /// How many cells a cycle in `phase` removes out of `erodable` candidates, never less than one.
    pub fn removal_count(&self, phase: u32, erodable: usize) -> usize {
        ceil_fraction(erodable, self.percentage_for_phase(phase)).max(1)
    }
}

impl Default for ErosionConfig {
    fn default() -> Self {
        Self::gentle()
    }
}

pub(crate) fn validate_percentage(percentage: f64) -> Result<()> {
    if percentage > 0.0 && percentage <= 1.0 {
        Ok(())
    } else {
        Err(ErosionError::InvalidPercentage(percentage))
    }
}

/// Durations travel as whole milliseconds.
mod serde_millis {
    use core::time::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis = value.as_millis().min(u64::MAX as u128) as u64;
        serializer.serialize_u64(millis)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
