use crate::commands::OutputFormat;

use clap::Args;
use color_eyre::Result;

use genex_engine::GeneratorExpression;

/// Split a list, one element per line
#[derive(Args, Debug)]
pub struct SplitArgs {
    /// ;-separated list text
    pub input: String,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

pub fn execute(args: SplitArgs) -> Result<()> {
    let items = GeneratorExpression::split(&args.input);

    match args.format {
        OutputFormat::Text => {
            for item in &items {
                println!("{}", item);
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string(&items)?),
    }

    Ok(())
}
