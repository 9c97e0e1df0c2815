//! Command line [`Args`] of the server.

use clap::Parser;

/// Server of the delegated purchases planner.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Path to the TOML file with the [`Config`] of the server.
    ///
    /// A missing file is not an error, so the defaults and the `CONF.`
    /// environment variables are used then.
    ///
    /// [`Config`]: crate::Config
    #[arg(short, long, env = "CONFIG", default_value = "config.toml")]
    pub config: String,
}

impl Args {
    /// Parses the [`Args`] of the current process.
    ///
    /// # Errors
    ///
    /// If the provided [`Args`] are malformed, or `--help` or `--version` is
    /// requested.
    pub fn parse() -> Result<Self, clap::Error> {
        <Self as Parser>::try_parse()
    }
}

#[cfg(test)]
mod spec {
    use clap::Parser as _;

    use super::Args;

    #[test]
    fn defaults_to_local_config() {
        let args = Args::try_parse_from(["server"]).unwrap();

        assert_eq!(args.config, "config.toml");
    }

    #[test]
    fn accepts_config_path() {
        let args = Args::try_parse_from(["server", "-c", "/etc/market.toml"])
            .unwrap();

        assert_eq!(args.config, "/etc/market.toml");
    }
}
