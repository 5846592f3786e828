// labelpress CLI: train the classifier, generate sheets, inspect labels
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use labelpress::classifier::{self, Classifier};
use labelpress::flyer::{FlyerGenerator, QrFlyer};
use labelpress::{Config, Pipeline};

#[derive(Parser, Debug)]
#[command(name = "labelpress", version, about = "Shipping label sheet generator")]
struct Cli {
    /// Base directory holding data/, model/, tmp/ and out/
    #[arg(long, default_value = ".", global = true)]
    base_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Train the carrier classifier from the labeled PDF folders
    Train,
    /// Process the label in the base directory into a printable sheet
    Generate,
    /// Classify one label document and print its carrier
    Classify { pdf: PathBuf },
    /// Build the promotional flyer intermediate for one order
    Flyer {
        #[arg(long)]
        medium: String,
        #[arg(long)]
        order: String,
    },
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = Config::new(cli.base_dir);

    match cli.command {
        Command::Train => {
            config.ensure_dirs()?;
            let report = classifier::train(&config)?;
            match report.cv_accuracy {
                Some(acc) => println!("mean cross-validated accuracy: {acc:.4}"),
                None => println!("corpus too small for cross-validation"),
            }
        }
        Command::Generate => {
            config.ensure_dirs()?;
            let sheet = Pipeline::new(config).run()?;
            println!("{}", sheet.display());
        }
        Command::Classify { pdf } => {
            let classifier = Classifier::load(&config.model_dir())?;
            let category = classifier.predict_document(&pdf)?;
            println!("{category}");
        }
        Command::Flyer { medium, order } => {
            let flyer = QrFlyer::new(config);
            let intermediate = flyer.generate(&medium, &order)?;
            println!("{}", intermediate.display());
        }
    }
    Ok(())
}
