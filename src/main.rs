use anyhow::Result;
use clap::Parser;
use modshim::commands::{Config, execute, reverse};
use modshim::package::ManifestError;
use std::path::PathBuf;

/// modshim - move selected packages out of node_modules
///
/// Packages opted in through `extraDependencies` in the project's package.json,
/// or through `alternateEntry` in their own package.json, are moved to
/// relocated_modules. A shim left in node_modules forwards `require()` calls to
/// the relocated copy.
///
/// Examples:
///   modshim            # Relocate eligible packages
///   modshim --reverse  # Undo the relocation
#[derive(Parser, Debug)]
#[command(author, version = env!("MODSHIM_VERSION"), about)]
struct Cli {
    /// Undo a previous relocation
    #[arg(long, short = 'r')]
    reverse: bool,

    /// Project root directory (defaults to the current directory; also via MODSHIM_ROOT)
    #[arg(long = "root", env = "MODSHIM_ROOT", value_name = "PATH")]
    root: Option<PathBuf>,

    /// Move already relocated packages back if the move phase fails
    #[arg(long, conflicts_with = "reverse")]
    atomic: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let runtime = modshim::runtime::RealRuntime;
    let config = Config::new(&runtime, cli.root)?.with_atomic(cli.atomic);

    let result = if cli.reverse {
        reverse(&runtime, &config).map(|_| ())
    } else {
        execute(&runtime, &config).map(|_| ())
    };

    match result {
        Err(e) => match e.downcast_ref::<ManifestError>() {
            Some(manifest_error) => {
                println!("modshim: {}", manifest_error);
                Ok(())
            }
            None => Err(e),
        },
        Ok(()) => Ok(()),
    }
}
