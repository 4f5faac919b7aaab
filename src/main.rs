//! Player Injury Risk CLI
//!
//! Scores a player's short-term injury risk from workload and wellness inputs.

use clap::{Args, Parser, Subcommand};
use injury::{Config, PlayerInput, Result};

#[derive(Parser)]
#[command(name = "injury")]
#[command(about = "Football player injury risk prediction", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train the risk classifier on synthetic data
    Train {
        /// Override number of synthetic samples
        #[arg(long)]
        samples: Option<usize>,
        /// Override number of ensemble members
        #[arg(long)]
        estimators: Option<usize>,
        /// Override number of epochs per member
        #[arg(long)]
        epochs: Option<usize>,
        /// Override random seed
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Predict injury risk for a player
    Predict {
        /// Input player file (JSON object or array of objects)
        #[arg(long)]
        input: Option<String>,
        #[command(flatten)]
        player: PlayerArgs,
        /// Output format
        #[arg(long, default_value = "table")]
        format: OutputFormat,
    },
    /// Model management commands
    Model {
        #[command(subcommand)]
        action: ModelCommands,
    },
    /// Initialize a new project with default config
    Init,
}

#[derive(Subcommand)]
enum ModelCommands {
    /// Show model information
    Info,
}

/// Player fields; any omitted field keeps its default
#[derive(Args, Debug, Default)]
struct PlayerArgs {
    #[arg(long)]
    age: Option<u32>,
    #[arg(long)]
    position: Option<String>,
    /// Fatigue on a 0-1 scale
    #[arg(long)]
    fatigue: Option<f64>,
    /// Training load on a 0-1 scale
    #[arg(long)]
    load: Option<f64>,
    /// Hours since last session
    #[arg(long)]
    recovery: Option<f64>,
    /// Fitness on a 0-1 scale
    #[arg(long)]
    fitness: Option<f64>,
    #[arg(long)]
    matches: Option<u32>,
    #[arg(long)]
    minutes: Option<f64>,
    #[arg(long)]
    injuries: Option<u32>,
    #[arg(long)]
    weather: Option<String>,
}

impl PlayerArgs {
    fn apply(self, mut input: PlayerInput) -> PlayerInput {
        if let Some(v) = self.age {
            input.age = v;
        }
        if let Some(v) = self.position {
            input.position = v;
        }
        if let Some(v) = self.fatigue {
            input.fatigue_level = v;
        }
        if let Some(v) = self.load {
            input.training_load = v;
        }
        if let Some(v) = self.recovery {
            input.recovery_time = v;
        }
        if let Some(v) = self.fitness {
            input.fitness_score = v;
        }
        if let Some(v) = self.matches {
            input.matches_played = v;
        }
        if let Some(v) = self.minutes {
            input.total_minutes_played = v;
        }
        if let Some(v) = self.injuries {
            input.previous_injuries_count = v;
        }
        if let Some(v) = self.weather {
            input.weather_condition = v;
        }
        input
    }
}

#[derive(Clone, Debug)]
enum OutputFormat {
    Table,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}. Use table or json.", s)),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Load or create config
    let config = if std::path::Path::new(&cli.config).exists() {
        match Config::load(&cli.config) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        Config::default()
    };

    // Run command
    let result = match cli.command {
        Commands::Train {
            samples,
            estimators,
            epochs,
            seed,
        } => commands::train(&config, samples, estimators, epochs, seed),
        Commands::Predict {
            input,
            player,
            format,
        } => commands::predict(&config, input, player, format),
        Commands::Model { action } => match action {
            ModelCommands::Info => commands::model_info(&config),
        },
        Commands::Init => commands::init(&cli.config),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        let code = if e.is_client_error() { 2 } else { 1 };
        std::process::exit(code);
    }
}

mod commands {
    use super::*;
    use injury::model::{load_classifier, Classifier, ClassifierSlot};
    use injury::predict::{format_prediction, RiskPredictor};
    use injury::training::train_synthetic;
    use injury::InjuryError;

    pub fn init(config_path: &str) -> Result<()> {
        let config = Config::default();
        config.save(config_path)?;
        println!("Created default config at {}", config_path);

        if let Some(dir) = std::path::Path::new(&config.model.artifact_path).parent() {
            std::fs::create_dir_all(dir)?;
            println!("Created {}/ directory", dir.display());
        }

        println!("\nNext steps:");
        println!("  1. Edit {} to customize settings", config_path);
        println!("  2. Run 'injury train' to train the classifier");
        println!("  3. Run 'injury predict --age 27 --fatigue 0.8' to score a player");

        Ok(())
    }

    pub fn train(
        config: &Config,
        samples: Option<usize>,
        estimators: Option<usize>,
        epochs: Option<usize>,
        seed: Option<u64>,
    ) -> Result<()> {
        let mut training = config.training.clone();
        if let Some(n) = samples {
            training.samples = n;
        }
        if let Some(n) = estimators {
            training.estimators = n;
        }
        if let Some(n) = epochs {
            training.epochs = n;
        }
        if let Some(s) = seed {
            training.seed = s;
        }

        println!(
            "Training {} members on {} synthetic samples...",
            training.estimators, training.samples
        );
        let (classifier, report) = train_synthetic(&training)?;

        println!("\nSaving model to {}...", config.model.artifact_path);
        classifier.save(&config.model.artifact_path)?;

        println!("\nTraining complete!");
        println!("  Training samples: {}", report.training_samples);
        println!("  Test samples:     {}", report.test_samples);
        println!("  Test accuracy:    {:.1}%", report.accuracy * 100.0);
        println!("  {}", report.test_metrics);

        Ok(())
    }

    pub fn predict(
        config: &Config,
        input: Option<String>,
        player: PlayerArgs,
        format: OutputFormat,
    ) -> Result<()> {
        let players = match input {
            Some(path) => read_players(&path)?,
            None => vec![player.apply(PlayerInput::default())],
        };
        for p in &players {
            p.validate()?;
        }

        let slot = ClassifierSlot::new(config.clone());
        let predictor = RiskPredictor::new(slot.get_or_load()?)?;

        let results = predictor
            .predict_batch(&players)
            .into_iter()
            .collect::<Result<Vec<_>>>()?;

        match format {
            OutputFormat::Table => {
                for result in &results {
                    print!("{}", format_prediction(result));
                }
            }
            OutputFormat::Json => {
                let json = if results.len() == 1 {
                    serde_json::to_string_pretty(&results[0])?
                } else {
                    serde_json::to_string_pretty(&results)?
                };
                println!("{}", json);
            }
        }

        Ok(())
    }

    /// Read one player object or an array of them
    fn read_players(path: &str) -> Result<Vec<PlayerInput>> {
        let content = std::fs::read_to_string(path)?;
        let value: serde_json::Value = serde_json::from_str(&content)
            .map_err(|e| InjuryError::InvalidInput(format!("{}: {}", path, e)))?;
        let players = if value.is_array() {
            serde_json::from_value(value)
        } else {
            serde_json::from_value(value).map(|p| vec![p])
        };
        players.map_err(|e| InjuryError::InvalidInput(format!("{}: {}", path, e)))
    }

    pub fn model_info(config: &Config) -> Result<()> {
        let classifier = load_classifier(&config.model.artifact_path)?;

        println!("Model Information");
        println!("───────────────────────────────");
        println!("  Path:           {}", config.model.artifact_path);
        println!("  Trained at:     {}", classifier.trained_at().format("%Y-%m-%d %H:%M:%S UTC"));
        println!("  Members:        {}", classifier.member_count());
        match classifier.accuracy() {
            Some(acc) => println!("  Test accuracy:  {:.1}%", acc * 100.0),
            None => println!("  Test accuracy:  n/a"),
        }

        let mut importances: Vec<(String, f64)> =
            classifier.feature_importances().into_iter().collect();
        importances.sort_by(|a, b| b.1.total_cmp(&a.1));

        println!("\nFeature importances");
        println!("───────────────────────────────");
        for (name, weight) in importances {
            println!("  {:<24}{:>6.1}%", name, weight * 100.0);
        }

        Ok(())
    }
}
