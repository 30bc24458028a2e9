//! Command line definition.

use clap::{Parser, Subcommand};

use securitydb_market_data::Sampling;

#[derive(Parser)]
#[command(name = "securitydb-updater")]
#[command(about = "Keeps a local price database in sync with upstream providers")]
#[command(version)]
pub struct Cli {
    /// Settings file
    #[arg(long, default_value = "settings.json", global = true)]
    pub settings: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Reconcile and update tracked symbol histories
    Update {
        /// Update daily history (the default)
        #[arg(long, conflicts_with = "intraday")]
        daily: bool,

        /// Update intraday history instead of daily
        #[arg(long)]
        intraday: bool,

        /// Pause between symbols, in seconds
        #[arg(long, default_value_t = 2)]
        delay: u64,

        /// Hour after which today's session counts as complete
        #[arg(long, default_value_t = 17, value_parser = clap::value_parser!(u32).range(0..24))]
        cutoff_hour: u32,

        /// Fetch attempts per symbol before it is reported as failed
        #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..))]
        max_attempts: u32,

        /// Built-in universe names to update
        #[arg(default_value = "etfs")]
        universes: Vec<String>,
    },

    /// Summarize stored price history
    Report {
        /// Report on the intraday database instead of the daily one
        #[arg(long)]
        intraday: bool,

        /// Window for the close-versus-average comparison, in days
        #[arg(long, default_value_t = 30)]
        average_days: u32,

        /// Window for range and close extreme summaries, in days
        #[arg(long, default_value_t = 365)]
        range_days: u32,
    },
}

impl Commands {
    pub fn sampling(&self) -> Sampling {
        let intraday = match self {
            Commands::Update { intraday, .. } => *intraday,
            Commands::Report { intraday, .. } => *intraday,
        };
        if intraday {
            Sampling::Intraday
        } else {
            Sampling::Daily
        }
    }

    /// Settings key of the database this command operates on.
    pub fn database_key(&self) -> &'static str {
        match self.sampling() {
            Sampling::Daily => "daily",
            Sampling::Intraday => "intraday",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("securitydb-updater").chain(args.iter().copied()))
    }

    #[test]
    fn test_update_defaults() {
        let cli = parse(&["update"]).unwrap();
        assert_eq!(cli.settings, "settings.json");
        assert_eq!(cli.command.sampling(), Sampling::Daily);
        assert_eq!(cli.command.database_key(), "daily");
        match cli.command {
            Commands::Update {
                delay,
                cutoff_hour,
                max_attempts,
                universes,
                ..
            } => {
                assert_eq!(delay, 2);
                assert_eq!(cutoff_hour, 17);
                assert_eq!(max_attempts, 3);
                assert_eq!(universes, vec!["etfs".to_string()]);
            }
            _ => panic!("expected update command"),
        }
    }

    #[test]
    fn test_update_full_invocation() {
        let cli = parse(&[
            "--settings",
            "/etc/securitydb.json",
            "update",
            "--intraday",
            "--delay",
            "0",
            "--cutoff-hour",
            "16",
            "--max-attempts",
            "5",
            "etfs",
        ])
        .unwrap();
        assert_eq!(cli.settings, "/etc/securitydb.json");
        assert_eq!(cli.command.sampling(), Sampling::Intraday);
        assert_eq!(cli.command.database_key(), "intraday");
    }

    #[test]
    fn test_update_rejects_invalid_values() {
        assert!(parse(&["update", "--delay"]).is_err());
        assert!(parse(&["update", "--delay", "soon"]).is_err());
        assert!(parse(&["update", "--cutoff-hour", "24"]).is_err());
        assert!(parse(&["update", "--max-attempts", "0"]).is_err());
        assert!(parse(&["update", "--daily", "--intraday"]).is_err());
        assert!(parse(&["update", "--bogus"]).is_err());
    }

    #[test]
    fn test_report_defaults() {
        let cli = parse(&["report"]).unwrap();
        match cli.command {
            Commands::Report {
                intraday,
                average_days,
                range_days,
            } => {
                assert!(!intraday);
                assert_eq!(average_days, 30);
                assert_eq!(range_days, 365);
            }
            _ => panic!("expected report command"),
        }
    }
}
