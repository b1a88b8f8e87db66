//! A CLI tool for loading a series of image files as a volume
//! and dumping its voxels into a raw file.
use std::path::PathBuf;

use clap::Parser;
use dcmstack_reader::{
    sort_files, sort_seed, MemoryRowOrder, ReadOptions, SortedFiles, VolumeReader,
};
use snafu::{Report, ResultExt, Whatever};
use tracing::{debug, error, Level};

/// Load an image series as a volume and dump its raw voxels
#[derive(Debug, Parser)]
struct App {
    /// Files of the series, or a single file whose series is looked up
    /// in its directory
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Path to the raw output file
    #[arg(short = 'o', long = "out", default_value = "volume.raw")]
    output: PathBuf,

    /// List the series found and exit
    #[arg(short = 'l', long = "list")]
    list: bool,

    /// Index of the series to load (0-indexed)
    #[arg(short = 's', long = "series", default_value = "0")]
    series: usize,

    /// Keep the order of the files instead of sorting slices by position
    #[arg(long = "no-sort")]
    no_sort: bool,

    /// Store the time points of each slice as components
    #[arg(long = "time-as-vector", conflicts_with = "time_index")]
    time_as_vector: bool,

    /// Read only this time point (0-indexed)
    #[arg(short = 't', long = "time-index")]
    time_index: Option<usize>,

    /// Read only the stack with this ID
    #[arg(long = "stack")]
    stack_id: Option<String>,

    /// Store rows bottom-up in memory
    #[arg(long = "bottom-up")]
    bottom_up: bool,

    /// Keep stored values when files differ in rescale parameters
    #[arg(long = "no-rescale")]
    no_rescale: bool,

    /// Print more information about the volume and the output file
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

fn list_series(sorted: &SortedFiles) {
    for (study, entry) in sorted.studies().iter().enumerate() {
        println!("Study {}", study);
        for index in entry.first_series..entry.first_series + entry.series_count {
            let files = &sorted.series()[index];
            let first = files.first().map(|f| f.display().to_string());
            println!(
                "  [{}] {} files, first: {}",
                index,
                files.len(),
                first.unwrap_or_default()
            );
        }
    }
}

fn main() {
    let App {
        files,
        output,
        list,
        series,
        no_sort,
        time_as_vector,
        time_index,
        stack_id,
        bottom_up,
        no_rescale,
        verbose,
    } = App::parse();

    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_max_level(if verbose { Level::DEBUG } else { Level::INFO })
            .finish(),
    )
    .whatever_context("Could not set up global logging subscriber")
    .unwrap_or_else(|e: Whatever| {
        eprintln!("[ERROR] {}", Report::from_error(e));
    });

    let seeded = files.len() == 1;
    let sorted = if seeded {
        sort_seed(&files[0]).unwrap_or_else(|e| {
            error!("{}", Report::from_error(e));
            std::process::exit(-1);
        })
    } else {
        sort_files(&files)
    };

    if list {
        list_series(&sorted);
        return;
    }

    let series_files = if seeded && series == 0 {
        sorted.output_file_names()
    } else {
        sorted.file_names_for_series(series).unwrap_or_else(|| {
            error!(
                "No series {} among the {} series found",
                series,
                sorted.number_of_series()
            );
            std::process::exit(-2);
        })
    };

    let options = ReadOptions::new()
        .sorting(!no_sort)
        .time_as_vector(time_as_vector)
        .desired_time_index(time_index)
        .desired_stack_id(stack_id)
        .memory_row_order(if bottom_up {
            MemoryRowOrder::BottomUp
        } else {
            MemoryRowOrder::FileNative
        })
        .auto_rescale(!no_rescale);

    let mut reader = VolumeReader::new(options);
    reader.on_progress(|fraction| debug!("{:.0}% of files read", fraction * 100.));
    let volume = reader.read_volume(series_files).unwrap_or_else(|e| {
        error!("{}", Report::from_error(e));
        std::process::exit(-3);
    });

    if verbose {
        let info = volume.info();
        let [columns, rows, slices] = info.dimensions();
        let [sx, sy, sz] = info.spacing();
        println!(
            "{}x{}x{} volume, {} components of {:?}",
            columns,
            rows,
            slices,
            info.components(),
            info.scalar_type()
        );
        println!("spacing {} {} {}", sx, sy, sz);
        println!("origin {:?}", info.patient_matrix().origin());
        if info.time_points() > 0 {
            println!(
                "{} time points, {} apart",
                info.time_points(),
                info.time_spacing()
            );
        }
        if let Some(description) = info.properties().series_description {
            println!("series: {}", description);
        }
    }

    std::fs::write(&output, volume.data()).unwrap_or_else(|e| {
        error!("Could not write {}: {}", output.display(), e);
        std::process::exit(-4);
    });

    if verbose {
        println!("Voxels saved to {}", output.display());
    }
}
