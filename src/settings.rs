use std::path::PathBuf;

use crate::args::Args;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Config file {0:?} does not exist")]
    ConfigNotFound(PathBuf),
}

/// Settings are like Args, except all the logic has
/// been applied so e.g. defaults are added in.
#[derive(Debug)]
pub struct Settings {
    pub config: PathBuf,
    /// `None` means stdout.
    pub output: Option<PathBuf>,
    pub verbose: u8,
    /// whether to render leftover components
    pub components: bool,
}

impl TryFrom<Args> for Settings {
    type Error = anyhow::Error;
    fn try_from(args: Args) -> Result<Self, Self::Error> {
        let mut config = PathBuf::from(&args.config);
        if config.exists() {
            config = config.canonicalize()?;
        } else {
            return Err(Error::ConfigNotFound(config).into());
        }

        Ok(Self {
            config,
            output: args.output.map(PathBuf::from),
            verbose: args.verbose,
            components: !args.no_components,
        })
    }
}
