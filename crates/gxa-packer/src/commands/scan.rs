use camino::Utf8PathBuf;
use colored::Colorize;
use gxa_texpak::selector::{collect_candidates, select_textures};
use gxa_texpak::TextureMetadata;
use miette::{miette, Result};

use crate::errors::CliError;
use crate::println_pad;

#[derive(Debug)]
pub struct ScanTexturesArgs {
    pub textures: Utf8PathBuf,
}

/// List what `pack` would write without converting anything.
pub fn scan_textures(args: ScanTexturesArgs) -> Result<()> {
    if !args.textures.is_dir() {
        return Err(CliError::texture_directory_not_found(args.textures).into());
    }

    println!(
        "{} {}",
        "🔍 Scanning textures in:".bright_blue().bold(),
        args.textures.as_str().bright_cyan().bold()
    );

    let candidates = collect_candidates(&args.textures).map_err(CliError::from)?;
    let selection = select_textures(&candidates);

    let mut malformed = 0usize;
    for job in &selection.jobs {
        match TextureMetadata::parse(job.primary.as_str()) {
            Ok(meta) => {
                println_pad!(
                    "{} {} {}",
                    format!("{:016X}", meta.key()).bright_cyan(),
                    meta.kind.to_string().bright_yellow(),
                    meta.file_name
                );
                if let Some(alpha) = &job.alpha {
                    println_pad!("    {} {}", "+ alpha".bright_green(), alpha.as_str());
                }
            }
            Err(e) => {
                malformed += 1;
                println_pad!("{} {}", "✗".bright_red().bold(), e.to_string().bright_red());
            }
        }
    }

    for orphan in &selection.orphaned_alpha {
        println_pad!(
            "{} {}",
            "⚠️  Alpha image without a matching _rgb.png:".bright_yellow(),
            orphan.as_str()
        );
    }

    println!(
        "{} {} of {} candidate files would be packed",
        "📋".bright_green(),
        (selection.jobs.len() - malformed).to_string().bright_white().bold(),
        candidates.len()
    );

    if malformed > 0 {
        return Err(miette!(
            help = "Rename or remove the files listed above before packing",
            "{malformed} texture file name(s) could not be parsed"
        ));
    }
    Ok(())
}
