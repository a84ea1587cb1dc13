use camino::Utf8PathBuf;
use clap::builder::{styling::AnsiColor, Styles};
use clap::ColorChoice;
use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use commands::{pack_textures, scan_textures, PackTexturesArgs, ScanTexturesArgs};
use miette::{IntoDiagnostic, Result};

mod commands;
mod errors;
mod utils;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Also write log output to this file
    #[arg(long, global = true)]
    log_file: Option<Utf8PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Pack a texture dump into a GXA archive
    Pack {
        /// The directory holding the texture PNGs (searched recursively)
        #[arg(short, long)]
        textures: Utf8PathBuf,

        /// The archive file to write
        #[arg(short, long)]
        output: Utf8PathBuf,

        /// The pack config file (defaults to pack.config.json or pack.config.toml
        /// in the texture directory or the working directory)
        #[arg(short, long)]
        config: Option<Utf8PathBuf>,

        /// Archive description, at most 64 bytes
        #[arg(short, long)]
        description: Option<String>,

        /// Texture pack author, at most 16 bytes
        #[arg(short, long)]
        author: Option<String>,

        /// Name of whoever packed the archive, at most 16 bytes
        #[arg(short, long)]
        packer: Option<String>,

        /// A 96x72 banner image
        #[arg(short, long)]
        icon: Option<Utf8PathBuf>,

        /// Header date as yyyy/mm/dd (defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// Convert textures on all cores
        #[arg(long)]
        parallel: bool,
    },
    /// List the textures a pack would contain without writing anything
    Scan {
        /// The directory holding the texture PNGs (searched recursively)
        #[arg(short, long)]
        textures: Utf8PathBuf,
    },
}

fn parse_args() -> Result<Args> {
    // Configure colored/styled help output
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default())
        .placeholder(AnsiColor::Blue.on_default());

    let matches = Args::command()
        .styles(styles)
        .color(ColorChoice::Auto)
        .get_matches();

    Args::from_arg_matches(&matches).into_diagnostic()
}

fn main() -> Result<()> {
    let args = parse_args()?;
    let _log_guard = utils::logging::init_logging(args.log_file.as_deref())?;

    tracing::debug!("gxa-packer {}", env!("CARGO_PKG_VERSION"));

    match args.command {
        Commands::Pack {
            textures,
            output,
            config,
            description,
            author,
            packer,
            icon,
            date,
            parallel,
        } => pack_textures(PackTexturesArgs {
            textures,
            output,
            config,
            description,
            author,
            packer,
            icon,
            date,
            parallel,
        }),
        Commands::Scan { textures } => scan_textures(ScanTexturesArgs { textures }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn parses_pack_flags() {
        let args = Args::try_parse_from([
            "gxa-packer",
            "pack",
            "-t",
            "dump",
            "-o",
            "out.gxa",
            "--author",
            "me",
            "--parallel",
            "--log-file",
            "pack.log",
        ])
        .unwrap();

        assert_eq!(args.log_file, Some(Utf8PathBuf::from("pack.log")));
        match args.command {
            Commands::Pack {
                textures,
                output,
                author,
                parallel,
                date,
                ..
            } => {
                assert_eq!(textures, "dump");
                assert_eq!(output, "out.gxa");
                assert_eq!(author.as_deref(), Some("me"));
                assert!(parallel);
                assert_eq!(date, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
