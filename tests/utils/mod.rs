#![allow(dead_code)]

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use bzip2::Compression;
use bzip2::write::BzEncoder;
use fars_reader::{FarsConfig, FileSource, PatternResolver};
use tempfile::TempDir;

/// Header used by the generated accident files
pub const HEADER: &str = "ST_CASE,STATE,MONTH,DAY,YEAR,LATITUDE,LONGITUDE,FATALS";

/// One generated accident row
#[derive(Debug, Clone, Copy)]
pub struct Accident {
    pub state: i64,
    pub month: u32,
    pub latitude: f64,
    pub longitude: f64,
}

impl Accident {
    #[must_use]
    pub fn new(state: i64, month: u32, latitude: f64, longitude: f64) -> Self {
        Self {
            state,
            month,
            latitude,
            longitude,
        }
    }

    /// An accident with a plausible Alabama location
    #[must_use]
    pub fn in_month(state: i64, month: u32) -> Self {
        Self::new(state, month, 32.5, -86.5)
    }
}

/// Render accidents as CSV text in the FARS column layout
#[must_use]
pub fn accident_csv(year: i32, accidents: &[Accident]) -> String {
    let mut out = String::from(HEADER);
    out.push('\n');
    for (i, a) in accidents.iter().enumerate() {
        out.push_str(&format!(
            "{},{},{},1,{},{:.4},{:.4},1\n",
            10_000 + i,
            a.state,
            a.month,
            year,
            a.latitude,
            a.longitude
        ));
    }
    out
}

/// A temporary data directory holding generated yearly files
pub struct Fixture {
    dir: TempDir,
}

impl Fixture {
    #[must_use]
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("create temp dir"),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `accident_{year}.csv.bz2`, the default layout
    pub fn write_year(&self, year: i32, accidents: &[Accident]) -> PathBuf {
        let path = self.path().join(format!("accident_{year}.csv.bz2"));
        let file = File::create(&path).expect("create bz2 file");
        let mut encoder = BzEncoder::new(file, Compression::default());
        encoder
            .write_all(accident_csv(year, accidents).as_bytes())
            .expect("write bz2 data");
        encoder.finish().expect("finish bz2 stream");
        path
    }

    /// Write an uncompressed file with arbitrary contents
    pub fn write_raw(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.path().join(name);
        fs::write(&path, contents).expect("write raw file");
        path
    }

    #[must_use]
    pub fn config(&self) -> FarsConfig {
        FarsConfig::new(self.path())
    }

    #[must_use]
    pub fn source(&self) -> FileSource<PatternResolver> {
        self.config().source()
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}
