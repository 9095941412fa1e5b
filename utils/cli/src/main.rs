use std::{fs::File, io::BufReader, path::PathBuf, time::Duration};

use anyhow::Context;
use cani_cli::{convert_image_to_cani, inspect};
use clap::{CommandFactory, Parser, Subcommand};
use embedded_io::adapters::FromStd;

/// Colour image viewer utility
///
/// A command line application for preparing and checking the viewer image files
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = false)]
struct Cli {
    /// Actual command
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Convert an image or a GIF animation into the CANI animation
    Convert {
        /// Image path, must be 98x70 pixels
        #[arg(value_name = "FILE")]
        path: PathBuf,
        /// Output path, the image path with the `pca` extension by default
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
        /// Pause after every animation frame, overrides the GIF frame delays
        #[arg(short, long, value_name = "MS")]
        pause: Option<u64>,
    },
    /// Decode an image file the way the viewer does and print its summary
    Info {
        /// Image file path
        #[arg(value_name = "FILE")]
        path: PathBuf,
    },
    /// Generate shell completions
    Completions {
        /// The shell to generate the completions for
        #[arg(value_enum)]
        shell: clap_complete_command::Shell,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Convert {
            path,
            output,
            pause,
        } => {
            let output = output.unwrap_or_else(|| path.with_extension("pca"));
            let pause = pause.map(Duration::from_millis);

            log::info!("Converting {:?} into {:?}", path, output);
            let bytes = convert_image_to_cani(&path, pause)?;
            std::fs::write(&output, &bytes)
                .with_context(|| format!("Unable to write {output:?}"))?;
            log::info!("Written {} bytes into {:?}", bytes.len(), output);
        }
        Command::Info { path } => {
            let name = path
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or_default()
                .to_owned();
            let file = BufReader::new(File::open(&path)?);

            let stats = inspect(FromStd::new(file), &name)
                .with_context(|| format!("The viewer rejects {path:?}"))?;
            println!("{stats}");
        }
        Command::Completions { shell } => {
            shell.generate(&mut Cli::command(), &mut std::io::stdout());
        }
    }

    Ok(())
}
