use clap::{Args, ValueEnum};
use color_eyre::Result;

use genex_engine::{GeneratorExpression, PreprocessMode};

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum Mode {
    /// Remove every expression
    StripAll,
    /// Keep $<BUILD_INTERFACE:...> content
    Build,
    /// Keep $<INSTALL_INTERFACE:...> content
    Install,
}

impl From<Mode> for PreprocessMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::StripAll => PreprocessMode::StripAll,
            Mode::Build => PreprocessMode::BuildInterface,
            Mode::Install => PreprocessMode::InstallInterface,
        }
    }
}

/// Resolve interface expressions in a list
#[derive(Args, Debug)]
pub struct PreprocessArgs {
    /// List text to preprocess
    pub input: String,

    /// Which interface content to keep
    #[arg(long, value_enum, default_value = "build")]
    pub mode: Mode,

    /// Prefix for relative install-interface entries
    #[arg(long, value_name = "DIR")]
    pub install_prefix: Option<String>,
}

pub fn execute(args: PreprocessArgs) -> Result<()> {
    let output = GeneratorExpression::preprocess(
        &args.input,
        args.mode.into(),
        args.install_prefix.as_deref(),
    );
    println!("{}", output);
    Ok(())
}
