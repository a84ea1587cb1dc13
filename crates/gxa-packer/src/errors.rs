use camino::Utf8PathBuf;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    #[error("Configuration file not found: {path}")]
    #[diagnostic(
        code(config::not_found),
        help("Pass an existing pack.config.json or pack.config.toml, or omit --config")
    )]
    ConfigNotFound { path: Utf8PathBuf },

    #[error("Texture directory not found: {path}")]
    #[diagnostic(
        code(textures::not_found),
        help("Point --textures at the folder holding your texture dump")
    )]
    TextureDirectoryNotFound { path: Utf8PathBuf },

    #[error("The {field} is {len} bytes long, but at most {max} bytes fit in the archive header")]
    #[diagnostic(code(header::field_too_long), help("Shorten the {field}"))]
    FieldTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("Invalid date: {date}")]
    #[diagnostic(code(header::invalid_date), help("Dates are written as yyyy/mm/dd, e.g. 2024/01/31"))]
    InvalidDate { date: String },

    #[error("Banner icon {path} is {width}x{height}")]
    #[diagnostic(code(header::invalid_icon), help("The banner icon must be a 96x72 image"))]
    InvalidIcon {
        path: Utf8PathBuf,
        width: u32,
        height: u32,
    },

    #[error("Alpha image for {file_name} is {alpha_width}x{alpha_height}, expected {width}x{height}")]
    #[diagnostic(
        code(texture::dimension_mismatch),
        help("Every _a.png must have the same size as its _rgb.png")
    )]
    DimensionMismatch {
        file_name: String,
        width: u32,
        height: u32,
        alpha_width: u32,
        alpha_height: u32,
    },

    #[error("Malformed texture file name: {file_name}")]
    #[diagnostic(
        code(texture::malformed_name),
        help("Texture names look like <name>#<crc>#<format>#<size>[#<palette crc>]_<type>.png ({reason})")
    )]
    MalformedTextureName { file_name: String, reason: String },

    #[error("Failed to pack textures")]
    #[diagnostic(code(pack::failed))]
    PackFailed {
        #[source]
        source: gxa_texpak::Error,
    },
}

impl CliError {
    pub fn config_not_found(path: Utf8PathBuf) -> Self {
        Self::ConfigNotFound { path }
    }

    pub fn texture_directory_not_found(path: Utf8PathBuf) -> Self {
        Self::TextureDirectoryNotFound { path }
    }

    pub fn invalid_date(date: String) -> Self {
        Self::InvalidDate { date }
    }
}

impl From<gxa_texpak::Error> for CliError {
    fn from(error: gxa_texpak::Error) -> Self {
        use gxa_texpak::Error;

        match error {
            Error::FieldTooLong { field, len, max } => Self::FieldTooLong { field, len, max },
            Error::DimensionMismatch {
                file_name,
                width,
                height,
                alpha_width,
                alpha_height,
            } => Self::DimensionMismatch {
                file_name,
                width,
                height,
                alpha_width,
                alpha_height,
            },
            Error::MetadataParse { file_name, reason } => {
                Self::MalformedTextureName { file_name, reason }
            }
            source => Self::PackFailed { source },
        }
    }
}
