use offview::core::shape_filter::{ collect_shape_records, ShapeDistributions };
use offview::io::csv_utils::{ write_distributions_csv, write_shape_records_csv };

use std::env;
use std::path::PathBuf;

fn main() {
    if env::var_os("RUST_LOG").is_none() {
        env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <mesh-directory> [--out-dir DIR]", args[0]);
        std::process::exit(1);
    }

    let mesh_dir = &args[1];
    let mut out_dir = PathBuf::from(".");

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--out-dir" => {
                i += 1;
                if let Some(dir) = args.get(i) {
                    out_dir = PathBuf::from(dir);
                }
            }
            other => eprintln!("Ignoring unknown argument: {}", other),
        }
        i += 1;
    }

    let records = collect_shape_records(mesh_dir).unwrap_or_else(|e| {
        eprintln!("Failed to read {}: {}", mesh_dir, e);
        std::process::exit(2);
    });

    if let Err(e) = write_shape_records_csv(&records, out_dir.join("shape-data.csv")) {
        eprintln!("Failed to write shape data: {}", e);
        std::process::exit(2);
    }

    match ShapeDistributions::from_records(&records) {
        Some(dist) => {
            if let Err(e) = write_distributions_csv(&dist, out_dir.join("shape-data-distributions.csv")) {
                eprintln!("Failed to write shape distributions: {}", e);
                std::process::exit(2);
            }
        }
        None => log::warn!("No shapes loaded from {}, skipping distributions.", mesh_dir),
    }
}
