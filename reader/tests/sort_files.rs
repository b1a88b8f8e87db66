//! Grouping candidate files into studies and series.
mod common;

use common::*;
use dcmstack_reader::{sort_files, sort_seed, ErrorKind};
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn empty_and_imageless_inputs_give_no_series() {
    let none: Vec<PathBuf> = Vec::new();
    let sorted = sort_files(&none);
    assert_eq!(sorted.number_of_series(), 0);
    assert_eq!(sorted.number_of_studies(), 0);
    assert!(sorted.output_file_names().is_empty());

    let dir = TempDir::new().unwrap();
    let notes = dir.path().join("notes.txt");
    std::fs::write(&notes, "not an image").unwrap();
    let sorted = sort_files(&[notes, dir.path().join("missing.dcm")]);
    assert_eq!(sorted.number_of_series(), 0);
}

#[test]
fn files_are_grouped_by_series() {
    let dir = TempDir::new().unwrap();
    let mut files = write_series(dir.path(), "1.2.3.20", &[0., 5.]);
    files.extend(write_series(dir.path(), "1.2.3.3", &[0., 5., 10.]));
    files.reverse();

    let sorted = sort_files(&files);
    assert_eq!(sorted.number_of_studies(), 1);
    assert_eq!(sorted.number_of_series(), 2);
    assert_eq!(sorted.first_series_in_study(0), Some(0));
    assert_eq!(sorted.number_of_series_in_study(0), Some(2));

    // shorter UIDs come first, files follow their instance numbers
    let first = sorted.file_names_for_series(0).unwrap();
    assert_eq!(first.len(), 3);
    assert!(first[0].ends_with("1.2.3.3_0.dcm"));
    assert!(first[2].ends_with("1.2.3.3_2.dcm"));
    assert_eq!(sorted.file_names_for_series(1).unwrap().len(), 2);
    assert_eq!(sorted.output_file_names().len(), 5);
}

#[test]
fn seed_selects_its_series() {
    let dir = TempDir::new().unwrap();
    let series = write_series(dir.path(), "1.2.3.1", &[10., 0., 5.]);
    write_series(dir.path(), "1.2.3.2", &[0., 5.]);
    std::fs::write(dir.path().join("readme.txt"), "unrelated").unwrap();

    let sorted = sort_seed(&series[1]).unwrap();
    assert_eq!(sorted.number_of_series(), 2);
    let names = sorted.output_file_names();
    assert_eq!(names.len(), 3);
    for (name, expected) in names.iter().zip(&series) {
        assert_eq!(name.file_name(), expected.file_name());
    }
}

#[test]
fn invalid_seeds_are_rejected() {
    let dir = TempDir::new().unwrap();
    let err = sort_seed(dir.path().join("missing.dcm")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);

    let err = sort_seed(dir.path()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);

    let notes = dir.path().join("notes.txt");
    std::fs::write(&notes, "not an image").unwrap();
    let err = sort_seed(&notes).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
}
