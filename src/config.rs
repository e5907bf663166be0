use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::grid::GridError;

const APP_DIR_NAME: &str = "psnake";
const CONFIG_FILE_NAME: &str = "config.json";

/// Edge length of one grid cell in window pixels.
pub const BLOCK_SIZE: u32 = 16;

/// Segments in a freshly spawned snake.
pub const INITIAL_SNAKE_LENGTH: usize = 10;

/// Free cells required ahead of the initial snake on each axis.
pub const GRID_MARGIN: usize = 1;

/// Upper bound on grid cells, far above the largest offered resolution.
pub const MAX_GRID_CELLS: usize = 256 * 256;

/// Largest apple count offered by the settings.
pub const MAX_APPLES: usize = 10;

/// Resolutions offered by the settings.
pub const RESOLUTIONS: &[(u32, u32)] = &[(800, 600), (1024, 768)];

/// Logical grid dimensions in cells.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct GridSize {
    pub width: usize,
    pub height: usize,
}

impl GridSize {
    /// Returns the total number of cells in the grid.
    #[must_use]
    pub fn total_cells(self) -> usize {
        self.width * self.height
    }
}

/// Game speed. Higher levels tick faster.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Difficulty {
    Easy,
    Normal,
    Hard,
}

impl Difficulty {
    /// Minimum wall time between two simulation ticks.
    #[must_use]
    pub fn tick_interval(self) -> std::time::Duration {
        let millis = match self {
            Self::Easy => 80,
            Self::Normal => 50,
            Self::Hard => 30,
        };
        std::time::Duration::from_millis(millis)
    }

    /// Returns the 1-based level number.
    #[must_use]
    pub fn level(self) -> u8 {
        match self {
            Self::Easy => 1,
            Self::Normal => 2,
            Self::Hard => 3,
        }
    }

    /// Wrap-around fields are only offered below the hardest level.
    #[must_use]
    pub fn allows_wall_mode(self) -> bool {
        self != Self::Hard
    }
}

impl TryFrom<u8> for Difficulty {
    type Error = ConfigError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        match level {
            1 => Ok(Self::Easy),
            2 => Ok(Self::Normal),
            3 => Ok(Self::Hard),
            other => Err(ConfigError::InvalidDifficulty(other)),
        }
    }
}

impl From<Difficulty> for u8 {
    fn from(difficulty: Difficulty) -> Self {
        difficulty.level()
    }
}

/// Errors raised while building or validating a [`GameConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("window size {width}x{height} is too small; need at least {min_width}x{min_height} pixels")]
    InvalidDimensions {
        width: u32,
        height: u32,
        min_width: u32,
        min_height: u32,
    },
    #[error(
        "window size {width}x{height} is too large; the grid may hold at most {max} cells",
        max = MAX_GRID_CELLS
    )]
    GridTooLarge { width: u32, height: u32 },
    #[error("apple count {0} is out of range (1..={max})", max = MAX_APPLES)]
    InvalidAppleCount(usize),
    #[error("apple count {apples} does not fit in the {free} free cells of the grid")]
    TooManyApples { apples: usize, free: usize },
    #[error("difficulty {0} is out of range (1..=3)")]
    InvalidDifficulty(u8),
    #[error("malformed resolution `{0}`, expected WIDTHxHEIGHT")]
    InvalidResolution(String),
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Session settings handed to the engine before a game starts.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Play-field width in pixels.
    pub width: u32,
    /// Play-field height in pixels.
    pub height: u32,
    /// When set, the field wraps around instead of ending the game at the edge.
    pub wall_mode: bool,
    pub max_apples: usize,
    pub difficulty: Difficulty,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: RESOLUTIONS[0].0,
            height: RESOLUTIONS[0].1,
            wall_mode: true,
            max_apples: 1,
            difficulty: Difficulty::Easy,
        }
    }
}

impl GameConfig {
    /// Grid dimensions derived from the pixel size.
    #[must_use]
    pub fn grid_size(&self) -> GridSize {
        GridSize {
            width: (self.width / BLOCK_SIZE) as usize,
            height: (self.height / BLOCK_SIZE) as usize,
        }
    }

    /// Whether the running game wraps at the edges.
    ///
    /// The hardest level always plays on a bounded field.
    #[must_use]
    pub fn wraps(&self) -> bool {
        self.wall_mode && self.difficulty.allows_wall_mode()
    }

    /// Checks every constraint and returns the grid the engine will use.
    pub fn validate(&self) -> Result<GridSize, ConfigError> {
        let grid = self.grid_size();
        let min_cells = INITIAL_SNAKE_LENGTH + GRID_MARGIN;
        if grid.width < min_cells || grid.height < min_cells {
            let min_px = min_cells as u32 * BLOCK_SIZE;
            return Err(ConfigError::InvalidDimensions {
                width: self.width,
                height: self.height,
                min_width: min_px,
                min_height: min_px,
            });
        }

        let cells = grid.width.checked_mul(grid.height);
        if cells.is_none_or(|cells| cells > MAX_GRID_CELLS) {
            return Err(ConfigError::GridTooLarge {
                width: self.width,
                height: self.height,
            });
        }

        if self.max_apples == 0 || self.max_apples > MAX_APPLES {
            return Err(ConfigError::InvalidAppleCount(self.max_apples));
        }

        let free = grid.total_cells() - INITIAL_SNAKE_LENGTH;
        if self.max_apples > free {
            return Err(ConfigError::TooManyApples {
                apples: self.max_apples,
                free,
            });
        }

        Ok(grid)
    }

    /// Loads a config from `path`, falling back to defaults for missing keys.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads the per-user config file when it exists, defaults otherwise.
    pub fn load_default() -> Result<Self, ConfigError> {
        match default_config_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct ConfigOverrides {
    pub resolution: Option<(u32, u32)>,
    pub wall_mode: Option<bool>,
    pub max_apples: Option<usize>,
    pub difficulty: Option<Difficulty>,
}

impl GameConfig {
    /// Replaces every field that `overrides` sets.
    #[must_use]
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some((width, height)) = overrides.resolution {
            self.width = width;
            self.height = height;
        }
        if let Some(wall_mode) = overrides.wall_mode {
            self.wall_mode = wall_mode;
        }
        if let Some(max_apples) = overrides.max_apples {
            self.max_apples = max_apples;
        }
        if let Some(difficulty) = overrides.difficulty {
            self.difficulty = difficulty;
        }
        self
    }
}

/// Returns the platform-correct config file path.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    let mut base = dirs::config_dir()?;
    base.push(APP_DIR_NAME);
    base.push(CONFIG_FILE_NAME);
    Some(base)
}

/// Parses a `WIDTHxHEIGHT` pixel resolution.
pub fn parse_resolution(raw: &str) -> Result<(u32, u32), ConfigError> {
    let invalid = || ConfigError::InvalidResolution(raw.to_owned());
    let (width, height) = raw
        .trim()
        .split_once(['x', 'X'])
        .ok_or_else(invalid)?;
    let width = width.trim().parse().map_err(|_| invalid())?;
    let height = height.trim().parse().map_err(|_| invalid())?;
    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    use super::{
        BLOCK_SIZE, ConfigError, ConfigOverrides, Difficulty, GameConfig, GridSize, MAX_GRID_CELLS,
        parse_resolution,
    };

    #[test]
    fn default_config_maps_to_fifty_by_thirty_seven_grid() {
        let grid = GameConfig::default()
            .validate()
            .expect("default config should be valid");

        assert_eq!(
            grid,
            GridSize {
                width: 50,
                height: 37,
            }
        );
    }

    #[test]
    fn tick_interval_follows_difficulty_table() {
        assert_eq!(Difficulty::Easy.tick_interval(), Duration::from_millis(80));
        assert_eq!(Difficulty::Normal.tick_interval(), Duration::from_millis(50));
        assert_eq!(Difficulty::Hard.tick_interval(), Duration::from_millis(30));
    }

    #[test]
    fn difficulty_outside_range_is_rejected() {
        assert!(matches!(
            Difficulty::try_from(0_u8),
            Err(ConfigError::InvalidDifficulty(0))
        ));
        assert!(matches!(
            Difficulty::try_from(4_u8),
            Err(ConfigError::InvalidDifficulty(4))
        ));
        assert_eq!(Difficulty::try_from(2_u8).ok(), Some(Difficulty::Normal));
    }

    #[test]
    fn tiny_window_is_rejected() {
        let config = GameConfig {
            width: 160,
            height: 600,
            ..GameConfig::default()
        };

        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn huge_window_is_rejected_before_allocation() {
        let config = GameConfig {
            width: 2_000_000,
            height: 2_000_000,
            ..GameConfig::default()
        };

        assert!(matches!(
            config.validate(),
            Err(ConfigError::GridTooLarge {
                width: 2_000_000,
                height: 2_000_000,
            })
        ));
    }

    #[test]
    fn largest_allowed_grid_is_accepted() {
        let side = 256 * BLOCK_SIZE;
        let config = GameConfig {
            width: side,
            height: side,
            ..GameConfig::default()
        };
        assert_eq!(config.validate().ok().map(GridSize::total_cells), Some(MAX_GRID_CELLS));

        let taller = GameConfig {
            height: side + BLOCK_SIZE,
            ..config
        };
        assert!(matches!(
            taller.validate(),
            Err(ConfigError::GridTooLarge { .. })
        ));
    }

    #[test]
    fn zero_apples_are_rejected() {
        let config = GameConfig {
            max_apples: 0,
            ..GameConfig::default()
        };

        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidAppleCount(0))
        ));
    }

    #[test]
    fn hard_difficulty_disables_wrapping() {
        let config = GameConfig {
            wall_mode: true,
            difficulty: Difficulty::Hard,
            ..GameConfig::default()
        };

        assert!(!config.wraps());
    }

    #[test]
    fn overrides_replace_only_the_fields_they_set() {
        let config = GameConfig::default().with_overrides(ConfigOverrides {
            resolution: Some((1024, 768)),
            max_apples: Some(5),
            ..ConfigOverrides::default()
        });

        assert_eq!((config.width, config.height), (1024, 768));
        assert_eq!(config.max_apples, 5);
        assert!(config.wall_mode);
        assert_eq!(config.difficulty, Difficulty::Easy);
        assert_eq!(
            config.validate().ok(),
            Some(GridSize {
                width: 64,
                height: 48,
            })
        );
    }

    #[test]
    fn resolution_parsing_accepts_both_separators() {
        assert_eq!(parse_resolution("1024x768").ok(), Some((1024, 768)));
        assert_eq!(parse_resolution(" 800X600 ").ok(), Some((800, 600)));
        assert!(parse_resolution("800-600").is_err());
        assert!(parse_resolution("wide x tall").is_err());
    }

    #[test]
    fn config_file_fills_missing_keys_with_defaults() {
        let path = unique_test_path("partial");
        write_test_file(&path, r#"{ "max_apples": 3, "difficulty": 2 }"#);

        let config = GameConfig::load(&path).expect("partial config should load");

        assert_eq!(config.max_apples, 3);
        assert_eq!(config.difficulty, Difficulty::Normal);
        assert_eq!(config.width, 800);
        assert!(config.wall_mode);
        cleanup_test_path(&path);
    }

    #[test]
    fn config_file_with_bad_difficulty_fails_to_parse() {
        let path = unique_test_path("bad-difficulty");
        write_test_file(&path, r#"{ "difficulty": 9 }"#);

        assert!(matches!(
            GameConfig::load(&path),
            Err(ConfigError::Parse { .. })
        ));
        cleanup_test_path(&path);
    }

    #[test]
    fn missing_config_file_is_a_read_error() {
        let path = unique_test_path("missing");

        assert!(matches!(
            GameConfig::load(&path),
            Err(ConfigError::Read { .. })
        ));
    }

    fn write_test_file(path: &PathBuf, contents: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("test parent directory should be creatable");
        }
        fs::write(path, contents).expect("test file write should succeed");
    }

    fn unique_test_path(label: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time should be after epoch")
            .as_nanos();

        std::env::temp_dir()
            .join("psnake-config-tests")
            .join(format!("{label}-{nanos}.json"))
    }

    fn cleanup_test_path(path: &PathBuf) {
        let _ = fs::remove_file(path);
        if let Some(parent) = path.parent() {
            let _ = fs::remove_dir(parent);
        }
    }
}
