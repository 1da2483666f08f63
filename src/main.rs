use std::path::{Path, PathBuf};
use std::process::ExitCode;
use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use rayon::prelude::*;
use tsxkit::{AssetManager, Config, Level, Tileset};
use tsxkit::tileset::{any_errors, validate_file, write_tsx, TilesetFormat, ValidationIssue};

const DEFAULT_CONFIG: &str = "tsxkit.yaml";

#[derive(Parser)]
#[command(author, version, about = "Inspect, validate and convert Tiled tilesets and maps.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the sizes of a tileset and the tiles it describes.
    Info {
        tileset: String,
    },
    /// Check tilesets for integrity problems.
    Validate(ValidateArgs),
    /// Convert a tileset between .tsx and JSON, picking the format from the output extension.
    Convert {
        input: PathBuf,
        /// Defaults to the export target the tileset names.
        output: Option<PathBuf>,
    },
    /// Write a tileset back to .tsx and check that reading it again gives the same tileset.
    Roundtrip {
        tileset: String,
    },
    /// Print which cells of a map block movement.
    Map {
        map: String,
    },
}

#[derive(Args)]
struct ValidateArgs {
    /// YAML config declaring property types. Defaults to tsxkit.yaml when present.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Also compare the sheet image on disk with its declared size.
    #[arg(long)]
    check_image: bool,
    #[arg(required = true)]
    files: Vec<String>,
}

fn main() -> Result<ExitCode> {
    env_logger::init();
    #[cfg(feature = "profile")]
    let _guard = install_profiler()?;

    let cli = Cli::parse();
    let manager = AssetManager::with_defaults();
    match cli.command {
        Commands::Info { tileset } => print_info(&manager, &tileset),
        Commands::Validate(args) => validate(&manager, args),
        Commands::Convert { input, output } => convert(&manager, &input, output),
        Commands::Roundtrip { tileset } => roundtrip(&manager, &tileset),
        Commands::Map { map } => print_map(&manager, &map),
    }
}

/// Writes spans to a trace file readable by chrome://tracing.
#[cfg(feature = "profile")]
fn install_profiler() -> Result<tracing_chrome::FlushGuard> {
    use tracing_subscriber::prelude::*;
    let (chrome_layer, guard) = tracing_chrome::ChromeLayerBuilder::new().build();
    let subscriber = tracing_subscriber::registry().with(chrome_layer);
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(guard)
}

fn print_info(manager: &AssetManager, path: &str) -> Result<ExitCode> {
    let tileset = manager.load::<Tileset>(path)?;
    println!("name:       {}", tileset.name);
    println!("version:    {} (tiled {})", tileset.version, tileset.tiled_version);
    println!("tile size:  {}x{}", tileset.tile_width, tileset.tile_height);
    println!("grid:       {} columns x {} rows, {} tiles", tileset.columns, tileset.rows(), tileset.tile_count);
    match tileset.declared_image_size() {
        Some(size) => println!("image:      {} ({}x{})", tileset.image.source, size.x, size.y),
        None => println!("image:      {}", tileset.image.source),
    }
    if let Some(export) = tileset.export_target() {
        println!("export:     {} ({})", export.target, export.format);
    }
    for property in &tileset.properties {
        println!("property:   {} = {}", property.name, property.value);
    }
    for tile in &tileset.tiles {
        let properties: Vec<String> = tile.properties
            .iter()
            .map(|property| format!("{}={}", property.name, property.value))
            .collect();
        println!("tile {:>4}:  {:<10} {}", tile.id, tile.kind, properties.join(" "));
    }
    Ok(ExitCode::SUCCESS)
}

fn validate(manager: &AssetManager, args: ValidateArgs) -> Result<ExitCode> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None if Path::new(DEFAULT_CONFIG).exists() => Config::load_or_default(DEFAULT_CONFIG),
        None => Config::default(),
    };
    config.check_image |= args.check_image;

    let reports: Vec<(&String, Result<Vec<ValidationIssue>>)> = args.files
        .par_iter()
        .map(|file| (file, validate_file(manager, &config, file)))
        .collect();

    let mut failed = false;
    for (file, report) in reports {
        match report {
            Ok(issues) if issues.is_empty() => println!("{file}: ok"),
            Ok(issues) => {
                for issue in &issues {
                    println!("{file}: {}: {issue}", issue.severity());
                }
                failed |= any_errors(&issues);
            },
            Err(err) => {
                println!("{file}: error: {err:#}");
                failed = true;
            },
        }
    }
    Ok(if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS })
}

fn convert(manager: &AssetManager, input: &Path, output: Option<PathBuf>) -> Result<ExitCode> {
    let tileset = manager.load::<Tileset>(input.to_string_lossy())?;
    let output = match output {
        Some(output) => output,
        None => tileset
            .export_path(input)
            .with_context(|| format!("{} names no export target, give an output path", input.display()))?,
    };
    let format = TilesetFormat::from_path(&output)
        .with_context(|| format!("Can't tell the format of {} from its extension", output.display()))?;
    let contents = format.write(&tileset)?;
    std::fs::write(&output, contents)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    log::info!("Converted {} to {}", input.display(), output.display());
    println!("{}", output.display());
    Ok(ExitCode::SUCCESS)
}

fn roundtrip(manager: &AssetManager, path: &str) -> Result<ExitCode> {
    let tileset = manager.load::<Tileset>(path)?;
    let written = write_tsx(&tileset)?;
    let reparsed = Tileset::parse_str(&written).context("Written tileset can't be read back")?;
    if reparsed != tileset {
        log::debug!("Before: {tileset:#?}\nAfter: {reparsed:#?}");
        bail!("{path} changed after writing and reading it back");
    }
    println!("{path}: ok");
    Ok(ExitCode::SUCCESS)
}

fn print_map(manager: &AssetManager, path: &str) -> Result<ExitCode> {
    let level = Level::load(manager, path)?;
    let title = level.map.title();
    if !title.is_empty() {
        println!("{title}");
    }
    println!("{}x{}", level.width(), level.height());
    print!("{}", level.render_grid());
    Ok(ExitCode::SUCCESS)
}
