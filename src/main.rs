use std::path::PathBuf;
use anyhow::{bail, Context};
use tileset_registry::{RegistryConfig, TilesetRegistry};

const USAGE: &str = "Usage: tileset_registry [--config <file.yaml>] <tileset.tsx>...";

fn main() -> anyhow::Result<()> {
    env_logger::init();
    #[cfg(feature = "profile")]
    let _guard = init_profiling();

    let (config_path, tilesets) = parse_args(std::env::args().skip(1))?;
    let config = match config_path {
        Some(path) => RegistryConfig::load(&path)?,
        None => RegistryConfig::default(),
    };
    log::debug!("Using asset root {:?}", config.asset_root);

    let mut registry = TilesetRegistry::from_config(&config);
    let mut failures = 0;
    for path in &tilesets {
        if let Err(err) = registry.load_tileset(path) {
            log::error!("{err}");
            failures += 1;
        }
    }

    for (_, tileset) in registry.tilesets() {
        println!("{} ({} tiles)", tileset.name, tileset.len());
        println!("  {:>8} {:>8} {:>10} {:>9}  {}", "local", "global", "size", "polygons", "image");
        for (local_id, handle) in tileset.tiles() {
            let Ok(tile) = registry.get_tile(handle) else { continue };
            let polygons = match registry.get_geometry(handle) {
                Ok(Some(collision)) => collision.len(),
                _ => 0,
            };
            let size = format!("{}x{}", tile.size.x, tile.size.y);
            println!("  {:>8} {:>8} {:>10} {:>9}  {}", local_id, handle, size, polygons, tile.image.path());
        }
    }

    if failures > 0 {
        bail!("{failures} of {} tilesets failed to load", tilesets.len());
    }
    Ok(())
}

fn parse_args(mut args: impl Iterator<Item = String>) -> anyhow::Result<(Option<PathBuf>, Vec<String>)> {
    let mut config = None;
    let mut tilesets = Vec::new();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let path = args.next().context(USAGE)?;
                config = Some(PathBuf::from(path));
            },
            "-h" | "--help" => {
                println!("{USAGE}");
                std::process::exit(0);
            },
            _ => tilesets.push(arg),
        }
    }
    if tilesets.is_empty() {
        bail!(USAGE);
    }
    Ok((config, tilesets))
}

#[cfg(feature = "profile")]
fn init_profiling() -> tracing_chrome::FlushGuard {
    use tracing_subscriber::prelude::*;
    let (chrome_layer, guard) = tracing_chrome::ChromeLayerBuilder::new().build();
    tracing_subscriber::registry().with(chrome_layer).init();
    guard
}
