//! koi-explain - Explain one KOI sample from the command line

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use exoplanet_core::constants::{self, APP_NAME, APP_VERSION};
use exoplanet_core::logic::features::LayoutInfo;
use exoplanet_core::{EngineConfig, ExplainResult, ModelFormat};

#[derive(Parser, Debug)]
#[command(name = "koi-explain", version, about = "Explain a KOI classifier decision per vetting criterion")]
struct Args {
    /// KOI CSV export
    #[arg(long, env = "DATASET_PATH", default_value = constants::DEFAULT_DATASET_PATH)]
    dataset: PathBuf,

    /// Model artifact (JSON for linear, .onnx for onnx)
    #[arg(long, env = "MODEL_PATH", default_value = constants::DEFAULT_MODEL_PATH)]
    model: PathBuf,

    /// Model backend: linear | onnx
    #[arg(long, env = "MODEL_FORMAT", default_value = constants::DEFAULT_MODEL_FORMAT)]
    format: String,

    /// ONNX explainer graph (onnx format only)
    #[arg(long, env = "EXPLAINER_PATH")]
    explainer: Option<PathBuf>,

    /// Expected SHA-256 of the model artifact
    #[arg(long, env = "MODEL_SHA256")]
    sha256: Option<String>,

    /// Label column holding the display disposition
    #[arg(long, env = "LABEL_COLUMN", default_value = exoplanet_core::logic::dataset::DEFAULT_LABEL_COLUMN)]
    label_column: String,

    /// Zero-based sample index
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    index: i64,

    /// Print the feature layout instead of an explanation
    #[arg(long)]
    layout: bool,
}

fn run(args: Args) -> ExplainResult<String> {
    if args.layout {
        return serde_json::to_string_pretty(&LayoutInfo::current())
            .map_err(|e| exoplanet_core::ExplainError::configuration(e.to_string()));
    }

    let config = EngineConfig {
        dataset_path: args.dataset,
        label_column: args.label_column,
        model_format: args.format.parse::<ModelFormat>()?,
        model_path: args.model,
        explainer_path: args.explainer,
        model_sha256: args.sha256,
        classes: constants::get_model_classes(),
    };

    config.build()?.explain_sample_json(args.index)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    log::info!("{} v{}", APP_NAME, APP_VERSION);

    match run(Args::parse()) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
