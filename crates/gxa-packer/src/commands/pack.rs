use camino::{Utf8Path, Utf8PathBuf};
use colored::Colorize;
use gxa_texpak::{ArchiveHeader, ImageLoader, PackStage, Packer, PngLoader};
use miette::{IntoDiagnostic, Result, WrapErr};

use crate::errors::CliError;
use crate::println_pad;
use crate::utils::config::{load_config, resolve_config_path, PackConfig};
use crate::utils::{format_size, print_ansi_boxed_lines};

#[derive(Debug, Default)]
pub struct PackTexturesArgs {
    pub textures: Utf8PathBuf,
    pub output: Utf8PathBuf,
    pub config: Option<Utf8PathBuf>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub packer: Option<String>,
    pub icon: Option<Utf8PathBuf>,
    pub date: Option<String>,
    pub parallel: bool,
}

pub fn pack_textures(args: PackTexturesArgs) -> Result<()> {
    if !args.textures.is_dir() {
        return Err(CliError::texture_directory_not_found(args.textures.clone()).into());
    }

    let config = match resolve_config(&args)? {
        Some(path) => {
            println_pad!("{} {}", "⚙️  Using config:".bright_blue(), path.as_str().bright_white());
            load_config(&path)?
        }
        None => PackConfig::default(),
    };

    let parallel = args.parallel || config.parallel.unwrap_or(false);
    let header = build_header(&args, config)?;

    println!(
        "{} {}",
        "📦 Packing textures from:".bright_blue().bold(),
        args.textures.as_str().bright_cyan().bold()
    );
    print_ansi_boxed_lines(&[
        format!("{} {}", "Description:".bright_yellow(), header.description),
        format!("{} {}", "Author:".bright_yellow(), header.author),
        format!("{} {}", "Packer:".bright_yellow(), header.packer),
        format!("{} {}", "Date:".bright_yellow(), header.date),
        format!(
            "{} {}",
            "Banner:".bright_yellow(),
            if header.icon().is_some() { "yes" } else { "none" }
        ),
    ]);

    let summary = Packer::new(header)
        .with_parallel_conversion(parallel)
        .with_progress(|progress| match progress.stage {
            PackStage::Selecting => println_pad!("{}", "🔍 Selecting textures...".bright_blue()),
            PackStage::Finalizing => println_pad!("{}", "🧾 Writing lookup table...".bright_blue()),
            _ => {}
        })
        .pack_directory(&args.textures, &args.output)
        .map_err(CliError::from)?;

    for orphan in &summary.orphaned_alpha {
        println_pad!(
            "{} {}",
            "⚠️  Skipped alpha image without a matching _rgb.png:".bright_yellow(),
            orphan.as_str()
        );
    }

    println!(
        "{}\n{} {}",
        "✅ Texture archive created successfully!".bright_green().bold(),
        "📍 Path:".bright_green(),
        args.output.as_str().bright_white().bold()
    );
    print_ansi_boxed_lines(&[
        format!("{} {}", "Entries added:".bright_green(), summary.entries_added),
        format!("{} {:#X}", "Table offset:".bright_green(), summary.table_offset),
        format!("{} {}", "Size:".bright_green(), format_size(summary.archive_size)),
        format!("{} {:.2?}", "Build time:".bright_green(), summary.build_time),
    ]);

    Ok(())
}

/// An explicit `--config`, else a config file in the texture directory or the
/// working directory.
fn resolve_config(args: &PackTexturesArgs) -> Result<Option<Utf8PathBuf>> {
    let cwd = std::env::current_dir().into_diagnostic()?;
    let cwd = Utf8PathBuf::from_path_buf(cwd).unwrap_or_else(|_| Utf8PathBuf::from("."));
    resolve_config_path(args.config.as_deref(), &[args.textures.as_path(), cwd.as_path()])
}

/// Merge flags over config values into a validated header.
fn build_header(args: &PackTexturesArgs, config: PackConfig) -> Result<ArchiveHeader> {
    let date = match &args.date {
        Some(date) => validate_date(date)?,
        None => ArchiveHeader::today(),
    };

    let header = ArchiveHeader::new()
        .with_description(pick(&args.description, config.description))
        .with_author(pick(&args.author, config.author))
        .with_packer(pick(&args.packer, config.packer))
        .with_date(date);
    header.check_lengths().map_err(CliError::from)?;

    match args.icon.clone().or(config.icon) {
        Some(icon_path) => with_banner(header, &icon_path),
        None => Ok(header),
    }
}

fn pick(flag: &Option<String>, config: Option<String>) -> String {
    flag.clone().or(config).unwrap_or_default()
}

fn with_banner(header: ArchiveHeader, icon_path: &Utf8Path) -> Result<ArchiveHeader> {
    let icon = PngLoader
        .load_rgba(icon_path)
        .map_err(CliError::from)
        .wrap_err_with(|| format!("Failed to load banner icon: {icon_path}"))?;

    header.with_icon(&icon).map_err(|e| match e {
        gxa_texpak::Error::InvalidIconDimensions { width, height } => CliError::InvalidIcon {
            path: icon_path.to_path_buf(),
            width,
            height,
        }
        .into(),
        other => CliError::from(other).into(),
    })
}

/// Accept only `yyyy/mm/dd` dates that exist.
pub fn validate_date(date: &str) -> Result<String> {
    match chrono::NaiveDate::parse_from_str(date, "%Y/%m/%d") {
        Ok(parsed) if date.len() == 10 => Ok(parsed.format("%Y/%m/%d").to_string()),
        _ => Err(CliError::invalid_date(date.to_string()).into()),
    }
}
