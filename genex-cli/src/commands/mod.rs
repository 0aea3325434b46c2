pub mod check;
pub mod eval;
pub mod preprocess;
pub mod split;

use crate::output;

use std::path::Path;

use clap::ValueEnum;
use color_eyre::Result;

use genex_engine::BuildModel;

/// Result rendering for commands that print structured data
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Load the model file, or an empty model when none is given
pub fn load_model(path: Option<&Path>) -> Result<BuildModel> {
    let Some(path) = path else {
        return Ok(BuildModel::new());
    };

    if !path.exists() {
        color_eyre::eyre::bail!("Model file not found: {}", path.display());
    }

    output::status("Loading", &format!("{}", path.display()));
    Ok(BuildModel::parse_file(path)?)
}
