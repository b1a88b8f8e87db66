//! Grouping of files into series.
//!
//! Candidate files are parsed up to group 0x0020,
//! grouped by study and series instance UID,
//! and ordered by instance number within each series.
//! Files which are not images are skipped.

use crate::error::{
    FileNotFoundSnafu, IsDirectorySnafu, NotAnImageSnafu, Result, ScanDirectorySnafu,
    SeedNotInSeriesSnafu,
};
use dcmstack_dictionary_std::tags;
use dcmstack_parser::{can_read_file, parse_file, ParseOptions};
use snafu::{ensure, OptionExt, ResultExt};
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Compare two UIDs numerically.
///
/// Each run of digits is compared by its length before its characters,
/// so that `1.2.9` comes before `1.2.10`.
/// A UID which is a prefix of another comes first,
/// so `1.2` comes before `1.2.1` and the two are never equal.
/// The empty string comes first.
pub fn compare_uids(u1: &str, u2: &str) -> Ordering {
    /// The length of the run starting at the first byte,
    /// which spans the first byte and the digits after it.
    fn run_length(s: &[u8]) -> usize {
        1 + s[1..].iter().take_while(|c| c.is_ascii_digit()).count()
    }

    let (mut a, mut b) = (u1.as_bytes(), u2.as_bytes());
    while !a.is_empty() && !b.is_empty() {
        let (n1, n2) = (run_length(a), run_length(b));
        let ord = n1.cmp(&n2).then_with(|| a[..n1].cmp(&b[..n2]));
        if ord != Ordering::Equal {
            return ord;
        }
        a = &a[n1..];
        b = &b[n2..];
    }
    a.len().cmp(&b.len())
}

/// The information used to sort one file.
#[derive(Debug, Clone)]
struct FileInfo {
    path: PathBuf,
    study_uid: String,
    series_uid: String,
    instance_number: i64,
}

/// The series of one study,
/// as a range of indices into [`SortedFiles::series`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct StudyEntry {
    /// The index of the first series of the study.
    pub first_series: usize,
    /// The number of series in the study.
    pub series_count: usize,
}

/// The result of sorting files into series.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SortedFiles {
    series: Vec<Vec<PathBuf>>,
    studies: Vec<StudyEntry>,
    file_names: Vec<PathBuf>,
}

impl SortedFiles {
    /// The number of series found.
    pub fn number_of_series(&self) -> usize {
        self.series.len()
    }

    /// The number of studies found.
    pub fn number_of_studies(&self) -> usize {
        self.studies.len()
    }

    /// The file names of each series, in order.
    pub fn series(&self) -> &[Vec<PathBuf>] {
        &self.series
    }

    /// The file names of a series.
    pub fn file_names_for_series(&self, series: usize) -> Option<&[PathBuf]> {
        self.series.get(series).map(Vec::as_slice)
    }

    /// The series of each study.
    pub fn studies(&self) -> &[StudyEntry] {
        &self.studies
    }

    /// The index of the first series in a study.
    pub fn first_series_in_study(&self, study: usize) -> Option<usize> {
        self.studies.get(study).map(|s| s.first_series)
    }

    /// The number of series in a study.
    pub fn number_of_series_in_study(&self, study: usize) -> Option<usize> {
        self.studies.get(study).map(|s| s.series_count)
    }

    /// The files selected by the sort:
    /// all series one after the other when sorting a list of files,
    /// or the series of the seed file.
    pub fn output_file_names(&self) -> &[PathBuf] {
        &self.file_names
    }

    fn push_series(&mut self, study: usize, files: Vec<PathBuf>) {
        if study == self.studies.len() {
            self.studies.push(StudyEntry {
                first_series: self.series.len(),
                series_count: 1,
            });
        } else if let Some(entry) = self.studies.last_mut() {
            entry.series_count += 1;
        }
        self.series.push(files);
    }
}

fn read_file_info(path: &Path) -> Option<FileInfo> {
    if path.is_dir() {
        return None;
    }
    let parsed = match parse_file(path, &ParseOptions::new().group(0x0020)) {
        Ok(parsed) if parsed.pixel_data_found() => parsed,
        Ok(_) => {
            debug!("Skipping {}: no pixel data", path.display());
            return None;
        }
        Err(e) => {
            debug!("Skipping {}: {}", path.display(), e);
            return None;
        }
    };
    let item = &parsed.dataset;
    Some(FileInfo {
        path: path.to_owned(),
        study_uid: item.get_str(tags::STUDY_INSTANCE_UID).unwrap_or_default(),
        series_uid: item.get_str(tags::SERIES_INSTANCE_UID).unwrap_or_default(),
        instance_number: item.get_int(tags::INSTANCE_NUMBER).unwrap_or(0),
    })
}

/// Sort a list of candidate files into series.
///
/// Series are ordered by study and series UID,
/// files within a series by instance number,
/// keeping the given order for equal instance numbers.
/// An empty or imageless input gives no series.
pub fn sort_files<P>(inputs: &[P]) -> SortedFiles
where
    P: AsRef<Path>,
{
    let mut groups: Vec<Vec<FileInfo>> = Vec::new();
    for info in inputs.iter().filter_map(|p| read_file_info(p.as_ref())) {
        let found = groups.binary_search_by(|group| {
            let first = &group[0];
            compare_uids(&first.study_uid, &info.study_uid)
                .then_with(|| compare_uids(&first.series_uid, &info.series_uid))
        });
        match found {
            Ok(i) => groups[i].push(info),
            Err(i) => groups.insert(i, vec![info]),
        }
    }

    let mut sorted = SortedFiles::default();
    let mut last_study: Option<String> = None;
    let mut study_count = 0;
    for mut group in groups {
        group.sort_by_key(|info| info.instance_number);
        if last_study.as_deref() != Some(group[0].study_uid.as_str()) {
            last_study = Some(group[0].study_uid.clone());
            study_count += 1;
        }
        let files = group.into_iter().map(|info| info.path).collect();
        sorted.push_series(study_count - 1, files);
    }
    sorted.file_names = sorted.series.iter().flatten().cloned().collect();
    sorted
}

/// Find the series of a single seed file among the files of its directory.
///
/// Sibling files are those with the same extension
/// when it is one of `.dc`, `.dcm`, `.DC` or `.DCM`,
/// otherwise all files of the directory.
pub fn sort_seed<P>(seed: P) -> Result<SortedFiles>
where
    P: AsRef<Path>,
{
    let seed = seed.as_ref();
    ensure!(seed.exists(), FileNotFoundSnafu { filename: seed });
    ensure!(!seed.is_dir(), IsDirectorySnafu { filename: seed });
    ensure!(can_read_file(seed), NotAnImageSnafu { filename: seed });

    let dir = match seed.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_owned(),
        _ => PathBuf::from("."),
    };
    let extension = seed
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| matches!(*e, "dc" | "dcm" | "DC" | "DCM"));

    let mut candidates = Vec::new();
    for entry in std::fs::read_dir(&dir).context(ScanDirectorySnafu { dir: &dir })? {
        let path = entry.context(ScanDirectorySnafu { dir: &dir })?.path();
        if path.is_dir() {
            continue;
        }
        if let Some(ext) = extension {
            if path.extension().and_then(|e| e.to_str()) != Some(ext) {
                continue;
            }
        }
        candidates.push(path);
    }
    candidates.sort();

    let mut sorted = sort_files(&candidates);
    let seed_path = std::fs::canonicalize(seed).unwrap_or_else(|_| seed.to_owned());
    let series = sorted
        .series
        .iter()
        .find(|files| {
            files.iter().any(|f| {
                std::fs::canonicalize(f).map_or(false, |f| f == seed_path) || f == seed
            })
        })
        .context(SeedNotInSeriesSnafu { filename: seed })?;
    sorted.file_names = series.clone();
    Ok(sorted)
}
