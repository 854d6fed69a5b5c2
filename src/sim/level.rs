/// Level loader.
///
/// ## Sources (priority order):
///   1. `levels_file` from `config.toml` (TOML level pack)
///   2. Built-in embedded levels
///
/// ## Pack format:
///   ```toml
///   [[level]]
///   width = 200
///   height = 40
///
///   [[level.text]]            # decorative, drawn behind everything
///   x = 10
///   y = 20
///   rows = ["hello", "world"]
///
///   [[level.block]]           # solid, drawn with one glyph
///   x = 0.0
///   y = 0.0
///   width = 60.0
///   height = 3.0
///   glyph = "▓"
///
///   [[level.collider]]        # solid, invisible
///   x = 60.0
///   y = 12.0
///   width = 8.0
///   height = 1.0
///   ```
///
/// Levels are ordered left to right. The first block of each level is where
/// the entity reappears after falling out of the world.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::domain::geometry::{Camera, Rect};
use crate::domain::glyph::GlyphGrid;
use crate::domain::level::{Block, DecorativeText, Level};

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("could not read level pack {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("level pack {path} is not valid TOML: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("no levels defined")]
    Empty,
    #[error("level {level}: extent {width}x{height} must be positive")]
    BadExtent { level: usize, width: i32, height: i32 },
    #[error("level {level}: text {text} has rows of different widths")]
    RaggedText { level: usize, text: usize },
    #[error("level {level}: block {block} has a non-positive size")]
    BadBlock { level: usize, block: usize },
    #[error("level {level}: needs at least one block to spawn on")]
    NoSpawn { level: usize },
}

// ══════════════════════════════════════════════════════════════
// Pack schema
// ══════════════════════════════════════════════════════════════

#[derive(Deserialize, Debug)]
struct PackFile {
    #[serde(default, rename = "level")]
    levels: Vec<LevelDef>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct LevelDef {
    pub width: i32,
    pub height: i32,
    #[serde(default, rename = "text")]
    pub texts: Vec<TextDef>,
    #[serde(default, rename = "block")]
    pub blocks: Vec<BlockDef>,
    #[serde(default, rename = "collider")]
    pub colliders: Vec<RectDef>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct TextDef {
    pub x: i32,
    pub y: i32,
    pub rows: Vec<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct BlockDef {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default = "default_block_glyph")]
    pub glyph: char,
}

#[derive(Deserialize, Debug, Clone, Copy)]
pub struct RectDef {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

fn default_block_glyph() -> char { '█' }

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

/// Load the pack at `path`, or the embedded levels when `path` is `None`.
pub fn load_levels(path: Option<&Path>) -> Result<Vec<Level>, LevelError> {
    let defs = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|source| LevelError::Read { path: path.to_path_buf(), source })?;
            let defs = parse_pack(&text)
                .map_err(|source| LevelError::Parse { path: path.to_path_buf(), source })?;
            info!(path = %path.display(), levels = defs.len(), "loaded level pack");
            defs
        }
        None => embedded_levels(),
    };
    build_levels(&defs)
}

fn parse_pack(text: &str) -> Result<Vec<LevelDef>, toml::de::Error> {
    toml::from_str::<PackFile>(text).map(|pack| pack.levels)
}

/// Validate definitions and turn them into runtime levels.
pub fn build_levels(defs: &[LevelDef]) -> Result<Vec<Level>, LevelError> {
    if defs.is_empty() {
        return Err(LevelError::Empty);
    }
    defs.iter().enumerate().map(|(i, def)| build_level(i, def)).collect()
}

fn build_level(index: usize, def: &LevelDef) -> Result<Level, LevelError> {
    if def.width <= 0 || def.height <= 0 {
        return Err(LevelError::BadExtent { level: index, width: def.width, height: def.height });
    }
    if def.blocks.is_empty() {
        return Err(LevelError::NoSpawn { level: index });
    }

    let mut texts = Vec::with_capacity(def.texts.len());
    for (t, text) in def.texts.iter().enumerate() {
        let rows: Vec<&str> = text.rows.iter().map(String::as_str).collect();
        let glyphs = GlyphGrid::from_rows(&rows)
            .ok_or(LevelError::RaggedText { level: index, text: t })?;
        texts.push(DecorativeText { x: text.x, y: text.y, glyphs });
    }

    let mut blocks = Vec::with_capacity(def.blocks.len());
    for (b, block) in def.blocks.iter().enumerate() {
        if block.width <= 0.0 || block.height <= 0.0 {
            return Err(LevelError::BadBlock { level: index, block: b });
        }
        blocks.push(Block {
            rect: Rect::new(block.x, block.y, block.width, block.height),
            glyph: block.glyph,
        });
    }

    let colliders = def.colliders.iter()
        .map(|c| Rect::new(c.x, c.y, c.width, c.height))
        .collect();

    Ok(Level {
        width: def.width,
        height: def.height,
        camera: Camera::default(),
        texts,
        blocks,
        colliders,
    })
}

// ══════════════════════════════════════════════════════════════
// Embedded levels
// ══════════════════════════════════════════════════════════════

const GROUND: char = '▓';
const LEDGE: char = '═';

fn embedded_levels() -> Vec<LevelDef> {
    vec![
        // 1: flat run with two gaps and a step
        LevelDef {
            width: 200,
            height: 40,
            texts: vec![
                text(6, 24, &[
                    "┌───────────────────────────┐",
                    "│  ←/→ or A/D : walk        │",
                    "│  ↑, W, Space : jump       │",
                    "│  T : invert colours       │",
                    "│  Esc : quit               │",
                    "└───────────────────────────┘",
                ]),
                text(150, 18, &["this way  →"]),
            ],
            blocks: vec![
                block(0.0, 0.0, 60.0, 3.0, GROUND),
                block(68.0, 0.0, 50.0, 3.0, GROUND),
                block(90.0, 3.0, 10.0, 3.0, GROUND),
                block(126.0, 0.0, 74.0, 3.0, GROUND),
                block(140.0, 10.0, 20.0, 1.0, LEDGE),
            ],
            colliders: vec![],
        },
        // 2: a staircase up and a long drop, taller than the screen
        LevelDef {
            width: 150,
            height: 60,
            texts: vec![
                text(20, 50, &["up there ↑"]),
                text(88, 12, &["· · · · ·"]),
            ],
            blocks: vec![
                block(0.0, 0.0, 45.0, 3.0, GROUND),
                block(45.0, 0.0, 10.0, 8.0, GROUND),
                block(55.0, 0.0, 10.0, 13.0, GROUND),
                block(65.0, 0.0, 20.0, 18.0, GROUND),
                block(85.0, 0.0, 65.0, 3.0, GROUND),
                block(20.0, 30.0, 25.0, 1.0, LEDGE),
                block(45.0, 40.0, 15.0, 1.0, LEDGE),
            ],
            colliders: vec![
                // the dotted bridge above
                rect(88.0, 11.0, 9.0, 1.0),
            ],
        },
        // 3: last stretch
        LevelDef {
            width: 180,
            height: 40,
            texts: vec![
                text(140, 12, &[
                    "╔═════════╗",
                    "║ THE END ║",
                    "╚═════════╝",
                ]),
            ],
            blocks: vec![
                block(0.0, 0.0, 70.0, 3.0, GROUND),
                block(80.0, 0.0, 100.0, 3.0, GROUND),
                block(95.0, 8.0, 15.0, 2.0, LEDGE),
            ],
            colliders: vec![],
        },
    ]
}

fn text(x: i32, y: i32, rows: &[&str]) -> TextDef {
    TextDef { x, y, rows: rows.iter().map(|r| r.to_string()).collect() }
}

fn block(x: f64, y: f64, width: f64, height: f64, glyph: char) -> BlockDef {
    BlockDef { x, y, width, height, glyph }
}

fn rect(x: f64, y: f64, width: f64, height: f64) -> RectDef {
    RectDef { x, y, width, height }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_levels_are_valid() {
        let levels = load_levels(None).unwrap();
        let sizes: Vec<_> = levels.iter().map(|l| (l.width, l.height)).collect();
        assert_eq!(sizes, vec![(200, 40), (150, 60), (180, 40)]);
        for l in &levels {
            assert_eq!(l.spawn_anchor().1, 3.0);
        }
    }

    #[test]
    fn ground_lines_up_at_level_seams() {
        // walking off one level's right edge lands on the next level's ground
        let levels = load_levels(None).unwrap();
        for pair in levels.windows(2) {
            let (left, right) = (&pair[0], &pair[1]);
            let edge = left.width as f64 - 0.5;
            assert!(left.blocks.iter().any(|b| b.rect.x <= edge && b.rect.right() > edge && b.rect.top() == 3.0));
            assert!(right.blocks.iter().any(|b| b.rect.x <= 0.5 && b.rect.right() > 0.5 && b.rect.top() == 3.0));
        }
    }

    #[test]
    fn parses_pack() {
        let pack = r##"
            [[level]]
            width = 100
            height = 30

            [[level.text]]
            x = 2
            y = 10
            rows = ["ab", "cd"]

            [[level.block]]
            x = 0.0
            y = 0.0
            width = 100.0
            height = 2.0
            glyph = "#"

            [[level.block]]
            x = 20.0
            y = 2.0
            width = 3.0
            height = 3.0

            [[level.collider]]
            x = 50.0
            y = 5.0
            width = 4.0
            height = 1.0

            [[level]]
            width = 80
            height = 30
            [[level.block]]
            x = 0.0
            y = 0.0
            width = 80.0
            height = 2.0
        "##;
        let levels = build_levels(&parse_pack(pack).unwrap()).unwrap();
        assert_eq!(levels.len(), 2);
        let first = &levels[0];
        assert_eq!(first.texts[0].glyphs.get(1, 1), Some('d'));
        assert_eq!(first.blocks[0].glyph, '#');
        assert_eq!(first.blocks[1].glyph, '█');
        assert_eq!(first.colliders, vec![Rect::new(50.0, 5.0, 4.0, 1.0)]);
        assert_eq!(first.obstacles().count(), 3);
    }

    #[test]
    fn rejects_ragged_text() {
        let mut defs = embedded_levels();
        defs[1].texts.push(text(0, 0, &["abc", "ab"]));
        let t = defs[1].texts.len() - 1;
        assert!(matches!(build_levels(&defs), Err(LevelError::RaggedText { level: 1, text }) if text == t));
    }

    #[test]
    fn rejects_level_without_blocks() {
        let mut defs = embedded_levels();
        defs[2].blocks.clear();
        assert!(matches!(build_levels(&defs), Err(LevelError::NoSpawn { level: 2 })));
    }

    #[test]
    fn rejects_empty_pack_and_bad_extent() {
        assert!(matches!(build_levels(&parse_pack("").unwrap()), Err(LevelError::Empty)));
        let mut defs = embedded_levels();
        defs[0].height = 0;
        assert!(matches!(build_levels(&defs), Err(LevelError::BadExtent { level: 0, .. })));
    }

    #[test]
    fn rejects_zero_sized_block() {
        let mut defs = embedded_levels();
        defs[0].blocks.push(block(5.0, 5.0, 0.0, 2.0, '#'));
        assert!(matches!(build_levels(&defs), Err(LevelError::BadBlock { level: 0, .. })));
    }

    #[test]
    fn missing_pack_is_a_read_error() {
        let err = load_levels(Some(Path::new("/nonexistent/strapkint/levels.toml"))).unwrap_err();
        assert!(matches!(err, LevelError::Read { .. }));
        assert!(err.to_string().contains("levels.toml"));
    }
}
