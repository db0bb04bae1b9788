//! Command-line options.

use std::path::PathBuf;

pub const USAGE: &str = "\
Usage: bezcad [options]

Options:
  -s, --settings <path>  Load settings from a JSON file
  -f, --frames <count>   Number of frames to run (default 120)
  -h, --help             Print this help";

pub const DEFAULT_FRAMES: u64 = 120;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum OptionsError {
    #[error("unknown argument '{0}'")]
    UnknownArgument(String),
    #[error("missing value for '{0}'")]
    MissingValue(String),
    #[error("invalid number '{value}' for '{flag}'")]
    InvalidNumber { flag: String, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub settings_path: Option<PathBuf>,
    pub frames: u64,
    pub show_help: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            settings_path: None,
            frames: DEFAULT_FRAMES,
            show_help: false,
        }
    }
}

impl Options {
    /// Parses arguments without the program name.
    pub fn parse<I, S>(args: I) -> Result<Self, OptionsError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut options = Self::default();
        let mut args = args.into_iter().map(Into::into);

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-h" | "--help" => options.show_help = true,
                "-s" | "--settings" => {
                    let value = args.next().ok_or(OptionsError::MissingValue(arg.clone()))?;
                    options.settings_path = Some(PathBuf::from(value));
                }
                "-f" | "--frames" => {
                    let value = args.next().ok_or(OptionsError::MissingValue(arg.clone()))?;
                    options.frames = value
                        .parse()
                        .map_err(|_| OptionsError::InvalidNumber {
                            flag: arg.clone(),
                            value,
                        })?;
                }
                _ => return Err(OptionsError::UnknownArgument(arg)),
            }
        }

        Ok(options)
    }
}
