use offview::core::backend::{ Backend, BackendConfig, ReturnType };
use offview::io::off_utils::load_off_from_file;

use std::env;

fn main() {
    if env::var_os("RUST_LOG").is_none() {
        env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <query.off> [--store] [--database PATH] [--debug]", args[0]);
        std::process::exit(1);
    }

    let input_path = &args[1];
    let mut store = false;
    let mut debug = false;
    let mut config = BackendConfig::from_env();

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--store" => store = true,
            "--debug" => debug = true,
            "--database" => {
                i += 1;
                if let Some(db) = args.get(i) {
                    config.database = db.into();
                }
            }
            other => eprintln!("Ignoring unknown argument: {}", other),
        }
        i += 1;
    }

    // Reject a broken query before handing it to the backend.
    if let Err(err) = load_off_from_file(input_path) {
        eprintln!("Failed to load {}: {}", input_path, err);
        std::process::exit(2);
    }

    let backend = Backend::new(config).with_debug(debug);
    let result = if store {
        backend.store(input_path.as_str())
    } else {
        backend.query(input_path.as_str())
    };
    let result = result.unwrap_or_else(|e| {
        eprintln!("{}", e);
        std::process::exit(2);
    });

    for line in &result.error_data {
        log::warn!("backend: {}", line);
    }

    match result.return_type {
        ReturnType::Ok => {}
        ReturnType::NotFound => {
            println!("No match found.");
            return;
        }
        ReturnType::Error => {
            eprintln!("Backend failed.");
            std::process::exit(3);
        }
    }

    if store {
        println!("Stored {}.", input_path);
        return;
    }

    for path in result.result_paths(&backend.config().backend_dir) {
        match load_off_from_file(&path) {
            Ok((_, stats)) => println!("{}: {} vertices, {} faces, {}",
                                       path.display(), stats.vertex_count, stats.face_count, stats.face_type),
            Err(err) => log::warn!("Skipping {}: {}.", path.display(), err),
        }
    }
}
