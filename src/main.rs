// Copyright 2020 TwoCookingMice

use offview::core::mesh::MeshStatistics;
use offview::io::off_utils::{ load_off_from_file, save_off };

use std::env;

fn print_statistics(path: &str, stats: &MeshStatistics) {
    let bound = &stats.bounding_box;
    let size = bound.diagnal();
    println!("File:         {}", path);
    println!("Vertices:     {}", stats.vertex_count);
    println!("Faces:        {}", stats.face_count);
    println!("Edges:        {}", stats.edge_count);
    println!("Face type:    {}", stats.face_type);
    println!("Bounding box: ({}, {}, {}) - ({}, {}, {})",
             bound.p_min.x, bound.p_min.y, bound.p_min.z,
             bound.p_max.x, bound.p_max.y, bound.p_max.z);
    println!("Box size:     ({}, {}, {})", size.x, size.y, size.z);
}

fn main() {
    if env::var_os("RUST_LOG").is_none() {
        env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <mesh.off> [--dump <output.off>]", args[0]);
        std::process::exit(1);
    }

    let input_path = &args[1];
    let mut dump_path: Option<String> = None;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--dump" => {
                i += 1;
                dump_path = args.get(i).cloned();
            }
            other => eprintln!("Ignoring unknown argument: {}", other),
        }
        i += 1;
    }

    let (mesh, stats) = match load_off_from_file(input_path) {
        Ok(loaded) => loaded,
        Err(err) => {
            eprintln!("Failed to load {}: {}", input_path, err);
            std::process::exit(2);
        }
    };

    print_statistics(input_path, &stats);
    println!("Triangles:    {}", mesh.triangle_count());

    if let Some(path) = dump_path {
        if let Err(err) = save_off(&mesh, stats.edge_count, &path) {
            eprintln!("Failed to write {}: {}", path, err);
            std::process::exit(2);
        }
    }
}
