use character::{AssetLibrary, CharacterStudio, PersonaLanguage, Style};
use clap::{Parser, Subcommand};
use cli::RunConfig;
use color_eyre::eyre::{Result, WrapErr};
use object_mask::{MaskSelectorBuilder, Strategy};
use rand::SeedableRng;
use rand_pcg::Pcg32;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;
use tracing_subscriber::{self, EnvFilter};

#[derive(Parser)]
#[command(author, version, about = "Turn photos of everyday objects into characters", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Segment the main object of a photo and save its binary mask
    Mask {
        /// Path to the input photo
        #[arg(short, long)]
        input: PathBuf,
        /// Where to write the mask PNG
        #[arg(short, long)]
        output: PathBuf,
        /// TOML or JSON run configuration
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Optional JSON report of every candidate's score
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Compose a character from a photo and print its persona
    Character {
        /// Path to the input photo
        #[arg(short, long)]
        input: PathBuf,
        /// Where to write the character PNG
        #[arg(short, long)]
        output: PathBuf,
        /// Character style: cute, calm or action (Korean labels accepted)
        #[arg(short, long, default_value = "cute")]
        style: Style,
        /// Seed for face-asset choice (defaults to the current time)
        #[arg(long)]
        seed: Option<u64>,
        /// Directory with eyes/ and mouths/ images (overrides the config file)
        #[arg(short, long)]
        assets: Option<PathBuf>,
        /// TOML or JSON run configuration
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Also write the persona text to this file
        #[arg(long)]
        persona: Option<PathBuf>,
        /// Persona language: english or korean (overrides the config file)
        #[arg(short, long)]
        language: Option<PersonaLanguage>,
    },
    /// List the segmentation strategies in evaluation order
    Strategies,
    /// Write the default run configuration (.toml or .json)
    InitConfig {
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Print the JSON schema of the run configuration
    Schema,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Mask { input, output, config, report } => {
            run_mask(&input, &output, config.as_deref(), report.as_deref())?;
        }
        Commands::Character { input, output, style, seed, assets, config, persona, language } => {
            let options = CharacterOptions { style, seed, assets, language, persona_output: persona };
            run_character(&input, &output, config.as_deref(), options)?;
        }
        Commands::Strategies => {
            for strategy in Strategy::all() {
                println!("{:<14} {}", strategy.to_string(), strategy.description());
            }
        }
        Commands::InitConfig { output } => {
            RunConfig::default().to_file(&output)?;
            info!("Default configuration saved to: {:?}", output);
        }
        Commands::Schema => {
            println!("{}", RunConfig::schema_json()?);
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<RunConfig> {
    match path {
        Some(path) => RunConfig::from_file(path)
            .wrap_err_with(|| format!("Failed to load configuration {}", path.display())),
        None => Ok(RunConfig::default()),
    }
}

fn run_mask(input: &Path, output: &Path, config: Option<&Path>, report: Option<&Path>) -> Result<()> {
    let config = load_config(config)?;
    let photo = object_mask::load_rgb(input)
        .wrap_err_with(|| format!("Failed to open {}", input.display()))?;
    info!("Segmenting {:?} ({}x{})", input, photo.width(), photo.height());

    let selector = MaskSelectorBuilder::build_with_config(config.segmentation);
    let selection = selector.select(&photo);
    selection.mask.save(output)?;
    info!("Mask from '{}' (score {:.3}) saved to: {:?}", selection.generator, selection.score, output);

    if let Some(report_path) = report {
        std::fs::write(report_path, selection.report().to_json()?)?;
        info!("Candidate report saved to: {:?}", report_path);
    }
    Ok(())
}

struct CharacterOptions {
    style: Style,
    seed: Option<u64>,
    assets: Option<PathBuf>,
    language: Option<PersonaLanguage>,
    persona_output: Option<PathBuf>,
}

fn run_character(input: &Path, output: &Path, config: Option<&Path>, options: CharacterOptions) -> Result<()> {
    let mut config = load_config(config)?;
    if let Some(language) = options.language {
        config.character.persona_language = language;
    }
    let photo = object_mask::load_rgb(input)
        .wrap_err_with(|| format!("Failed to open {}", input.display()))?;

    let library = match options.assets.or(config.assets_dir) {
        Some(dir) => AssetLibrary::new(dir),
        None => AssetLibrary::procedural(),
    };
    let seed = options.seed.unwrap_or_else(clock_seed);
    info!("Creating '{}' character from {:?} with seed {}", options.style, input, seed);

    let studio = CharacterStudio::from_config(config.segmentation, library, config.character);
    let character = studio.create(&photo, options.style, &mut Pcg32::seed_from_u64(seed))?;
    character.image.save(output)?;
    info!("Character saved to: {:?}", output);

    println!("{}", character.persona);
    if let Some(path) = options.persona_output {
        std::fs::write(path, &character.persona)?;
    }
    Ok(())
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or_default()
}
