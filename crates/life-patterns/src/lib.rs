//! Pattern sources: built-in presets, random fill, and file loaders.
//!
//! A [`PatternCatalog`] is an ordered list of generators. Index 0 is always
//! the random fill; built-in presets follow, then any pattern files
//! discovered in an optional directory, sorted by name. `generate` stamps
//! the selected pattern centered on a grid of exactly the requested
//! dimensions.

use life_core::{Rgba, Seed};
use rand::Rng;
use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub mod macrocell;
pub mod plaintext;
pub mod rle;

/// Errors raised while selecting or parsing patterns.
#[derive(Debug, Error)]
pub enum PatternError {
    #[error("pattern index {index} out of range (catalog has {len} entries)")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("pattern file {}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: Box<PatternError>,
    },
    #[error("unsupported pattern file extension: {}", path.display())]
    UnsupportedFormat { path: PathBuf },
    #[error("pattern file is empty")]
    EmptyFile,
    #[error("header not found")]
    MissingHeader,
    #[error("invalid header line: {line}")]
    InvalidHeader { line: String },
    #[error("invalid run length '{digits}'")]
    InvalidRunLength { digits: String },
    #[error("unexpected character '{token}' at line {line}, column {column}")]
    UnexpectedToken {
        token: char,
        line: usize,
        column: usize,
    },
    #[error("invalid character '{token}' in leaf node")]
    InvalidLeafToken { token: char },
    #[error("node reference {reference} out of range in line: {line}")]
    NodeReferenceOutOfRange { reference: usize, line: String },
    #[error("malformed quadtree node line: {line}")]
    InvalidNode { line: String },
}

/// Built-in patterns, stamped centered on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    Glider,
    GosperGliderGun,
    Blinker,
    Toad,
    Pulsar,
    RPentomino,
    Acorn,
    BlockLayingSwitchEngine,
}

impl Preset {
    pub const ALL: [Preset; 8] = [
        Preset::Glider,
        Preset::GosperGliderGun,
        Preset::Blinker,
        Preset::Toad,
        Preset::Pulsar,
        Preset::RPentomino,
        Preset::Acorn,
        Preset::BlockLayingSwitchEngine,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Preset::Glider => "glider",
            Preset::GosperGliderGun => "gosper-glider-gun",
            Preset::Blinker => "blinker",
            Preset::Toad => "toad",
            Preset::Pulsar => "pulsar",
            Preset::RPentomino => "r-pentomino",
            Preset::Acorn => "acorn",
            Preset::BlockLayingSwitchEngine => "block-laying-switch-engine",
        }
    }

    /// Live-cell offsets relative to the pattern's own top-left corner.
    pub fn cells(self) -> Vec<(i64, i64)> {
        match self {
            Preset::Glider => vec![(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)],
            Preset::Blinker => vec![(0, 0), (1, 0), (2, 0)],
            Preset::Toad => vec![(1, 0), (2, 0), (3, 0), (0, 1), (1, 1), (2, 1)],
            Preset::RPentomino => vec![(1, 0), (2, 0), (0, 1), (1, 1), (1, 2)],
            Preset::Acorn => vec![(1, 0), (3, 1), (0, 2), (1, 2), (4, 2), (5, 2), (6, 2)],
            Preset::GosperGliderGun => vec![
                (24, 0),
                (22, 1),
                (24, 1),
                (12, 2),
                (13, 2),
                (20, 2),
                (21, 2),
                (34, 2),
                (35, 2),
                (11, 3),
                (15, 3),
                (20, 3),
                (21, 3),
                (34, 3),
                (35, 3),
                (0, 4),
                (1, 4),
                (10, 4),
                (16, 4),
                (20, 4),
                (21, 4),
                (0, 5),
                (1, 5),
                (10, 5),
                (14, 5),
                (16, 5),
                (17, 5),
                (22, 5),
                (24, 5),
                (10, 6),
                (16, 6),
                (24, 6),
                (11, 7),
                (15, 7),
                (12, 8),
                (13, 8),
            ],
            Preset::Pulsar => {
                // Four-fold symmetric period-3 oscillator on a 13x13 box.
                let arms = [2i64, 3, 4, 8, 9, 10];
                let rails = [0i64, 5, 7, 12];
                let mut cells = Vec::with_capacity(48);
                for &rail in &rails {
                    for &arm in &arms {
                        cells.push((arm, rail));
                        cells.push((rail, arm));
                    }
                }
                cells
            }
            Preset::BlockLayingSwitchEngine => vec![
                (0, 0),
                (1, 0),
                (2, 0),
                (4, 0),
                (0, 1),
                (3, 2),
                (4, 2),
                (1, 3),
                (2, 3),
                (4, 3),
                (0, 4),
                (2, 4),
                (4, 4),
            ],
        }
    }
}

/// A single generator in the catalog.
#[derive(Debug, Clone)]
pub enum PatternEntry {
    /// Uniform random fill at a caller-supplied density.
    Random,
    Preset(Preset),
    /// A plaintext, RLE, or Macrocell file parsed on demand.
    File(PathBuf),
}

impl PatternEntry {
    pub fn name(&self) -> Cow<'_, str> {
        match self {
            PatternEntry::Random => Cow::Borrowed("random"),
            PatternEntry::Preset(preset) => Cow::Borrowed(preset.name()),
            PatternEntry::File(path) => path
                .file_stem()
                .map(|stem| stem.to_string_lossy())
                .unwrap_or_else(|| Cow::Borrowed("pattern")),
        }
    }
}

/// Ordered pattern catalog with random fill first.
#[derive(Debug, Clone)]
pub struct PatternCatalog {
    entries: Vec<PatternEntry>,
}

impl PatternCatalog {
    /// Catalog holding the random fill and every built-in preset.
    #[must_use]
    pub fn builtin() -> Self {
        let mut entries = vec![PatternEntry::Random];
        entries.extend(Preset::ALL.iter().copied().map(PatternEntry::Preset));
        Self { entries }
    }

    /// Catalog over an explicit entry list, in the given order.
    #[must_use]
    pub fn from_entries(entries: Vec<PatternEntry>) -> Self {
        Self { entries }
    }

    /// Built-in catalog extended with pattern files found in `dir`, sorted
    /// by file name. Unrecognized extensions are ignored.
    pub fn with_directory(dir: &Path) -> Result<Self, PatternError> {
        let mut catalog = Self::builtin();
        let mut files: Vec<PathBuf> = fs::read_dir(dir)
            .map_err(|source| PatternError::Io {
                path: dir.to_path_buf(),
                source,
            })?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file()
                    && matches!(
                        path.extension().and_then(|ext| ext.to_str()),
                        Some("txt" | "cells" | "rle" | "mc")
                    )
            })
            .collect();
        files.sort();
        catalog
            .entries
            .extend(files.into_iter().map(PatternEntry::File));
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[PatternEntry] {
        &self.entries
    }

    pub fn name(&self, index: usize) -> Option<Cow<'_, str>> {
        self.entries.get(index).map(PatternEntry::name)
    }

    /// Position of the entry with the given name, if any.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.name() == name)
    }

    /// Produce a seed of exactly `width` x `height` for the entry at
    /// `index`. A bad index or a broken file is an error; the caller keeps
    /// its last valid state in that case.
    pub fn generate(
        &self,
        index: usize,
        width: usize,
        height: usize,
        fill_density: f64,
        rng: &mut impl Rng,
    ) -> Result<Seed, PatternError> {
        let entry = self
            .entries
            .get(index)
            .ok_or(PatternError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            })?;

        match entry {
            PatternEntry::Random => Ok(random_seed(width, height, fill_density, rng)),
            PatternEntry::Preset(preset) => Ok(stamp_centered(
                width,
                height,
                &preset.cells(),
                preset.name(),
                rng,
            )),
            PatternEntry::File(path) => {
                let cells = load_pattern_file(path)?;
                let name = entry.name().into_owned();
                Ok(stamp_centered(width, height, &cells, &name, rng))
            }
        }
    }
}

/// Uniform random fill, the catalog's index-0 generator.
pub fn random_seed(width: usize, height: usize, density: f64, rng: &mut impl Rng) -> Seed {
    let density = density.clamp(0.0, 1.0);
    let mut seed = Seed::blank(width, height, "random");
    for y in 0..seed.height() {
        for x in 0..seed.width() {
            if rng.random_bool(density) {
                let color = Rgba::random(rng);
                seed.stamp(x as i64, y as i64, color);
            }
        }
    }
    seed
}

/// Stamp a coordinate list centered on the grid, wrapping toroidally, with
/// a fresh random color per cell.
pub fn stamp_centered(
    width: usize,
    height: usize,
    cells: &[(i64, i64)],
    name: &str,
    rng: &mut impl Rng,
) -> Seed {
    let mut seed = Seed::blank(width, height, name);
    let span_x = cells.iter().map(|&(x, _)| x).max().unwrap_or(0) + 1;
    let span_y = cells.iter().map(|&(_, y)| y).max().unwrap_or(0) + 1;
    let offset_x = (seed.width() as i64 - span_x) / 2;
    let offset_y = (seed.height() as i64 - span_y) / 2;
    for &(x, y) in cells {
        let color = Rgba::random(rng);
        seed.stamp(x + offset_x, y + offset_y, color);
    }
    seed
}

/// Parse a pattern file into a live-cell coordinate list, dispatching on
/// the file extension.
pub fn load_pattern_file(path: &Path) -> Result<Vec<(i64, i64)>, PatternError> {
    let text = fs::read_to_string(path).map_err(|source| PatternError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let in_file = |source: PatternError| PatternError::File {
        path: path.to_path_buf(),
        source: Box::new(source),
    };
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("txt" | "cells") => Ok(plaintext::parse(&text)),
        Some("rle") => rle::parse(&text).map(|p| p.cells).map_err(in_file),
        Some("mc") => macrocell::parse(&text).map(|p| p.cells).map_err(in_file),
        _ => Err(PatternError::UnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::SmallRng};
    use std::io::Write;

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(0xC0FFEE)
    }

    #[test]
    fn catalog_starts_with_random() {
        let catalog = PatternCatalog::builtin();
        assert_eq!(catalog.name(0).unwrap(), "random");
        assert_eq!(catalog.len(), 1 + Preset::ALL.len());
        assert_eq!(catalog.index_of("glider"), Some(1));
        assert_eq!(catalog.index_of("no-such-pattern"), None);
    }

    #[test]
    fn out_of_range_index_is_an_error() {
        let catalog = PatternCatalog::builtin();
        let err = catalog
            .generate(999, 10, 10, 0.2, &mut rng())
            .expect_err("index must be rejected");
        assert!(matches!(err, PatternError::IndexOutOfRange { index: 999, .. }));
    }

    #[test]
    fn generated_seed_has_requested_dimensions() {
        let catalog = PatternCatalog::builtin();
        for index in 0..catalog.len() {
            let seed = catalog.generate(index, 40, 25, 0.2, &mut rng()).unwrap();
            assert_eq!(seed.width(), 40);
            assert_eq!(seed.height(), 25);
        }
    }

    #[test]
    fn presets_have_expected_populations() {
        let mut rng = rng();
        for (preset, population) in [
            (Preset::Glider, 5),
            (Preset::Blinker, 3),
            (Preset::Toad, 6),
            (Preset::Pulsar, 48),
            (Preset::RPentomino, 5),
            (Preset::Acorn, 7),
            (Preset::GosperGliderGun, 36),
            (Preset::BlockLayingSwitchEngine, 13),
        ] {
            let seed = stamp_centered(64, 64, &preset.cells(), preset.name(), &mut rng);
            assert_eq!(seed.population(), population, "{}", preset.name());
        }
    }

    #[test]
    fn blinker_is_centered() {
        let seed = stamp_centered(7, 7, &Preset::Blinker.cells(), "blinker", &mut rng());
        assert!(seed.is_alive(2, 3));
        assert!(seed.is_alive(3, 3));
        assert!(seed.is_alive(4, 3));
        assert_eq!(seed.population(), 3);
    }

    #[test]
    fn random_density_extremes() {
        let empty = random_seed(20, 20, 0.0, &mut rng());
        assert_eq!(empty.population(), 0);
        let full = random_seed(20, 20, 1.0, &mut rng());
        assert_eq!(full.population(), 400);
    }

    #[test]
    fn directory_catalog_discovers_files_sorted() {
        let dir = tempfile::tempdir().expect("tempdir");
        for name in ["zebra.rle", "alpha.txt", "notes.md"] {
            let mut file = std::fs::File::create(dir.path().join(name)).expect("create");
            writeln!(file, "O").expect("write");
        }
        let catalog = PatternCatalog::with_directory(dir.path()).expect("catalog");
        let builtin = PatternCatalog::builtin().len();
        assert_eq!(catalog.len(), builtin + 2);
        assert_eq!(catalog.name(builtin).unwrap(), "alpha");
        assert_eq!(catalog.name(builtin + 1).unwrap(), "zebra");
    }

    #[test]
    fn broken_file_reports_path_context() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("broken.rle");
        std::fs::write(&path, "no header here\n").expect("write");
        let err = load_pattern_file(&path).expect_err("must fail");
        let message = err.to_string();
        assert!(message.contains("broken.rle"), "{message}");
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("pattern.bmp");
        std::fs::write(&path, "xx").expect("write");
        assert!(matches!(
            load_pattern_file(&path),
            Err(PatternError::UnsupportedFormat { .. })
        ));
    }
}
