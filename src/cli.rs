use clap::{Parser, Subcommand};
use std::path::PathBuf;
use wcpt_privacy::EXPORTER_ID;

#[derive(Debug, Parser)]
#[command(name = "wcpt", version, about = "Export personal data held in WordCamp application records")]
pub struct Cli {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(short, long, global = true, env = "WCPT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Record database, overriding the configured one
    #[arg(short, long, global = true)]
    pub database: Option<PathBuf>,

    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Export personal data for an email address as JSON
    Export {
        email_address: String,
        /// Export a single page (any input is coerced to a page number);
        /// every page of every exporter when omitted
        #[arg(short, long)]
        page: Option<String>,
        /// Exporter used for single-page exports
        #[arg(short, long, default_value = EXPORTER_ID)]
        exporter: String,
    },
    /// Run the personal data eraser for one page (placeholder, removes nothing)
    Erase {
        email_address: String,
        #[arg(short, long, default_value = "1")]
        page: String,
        #[arg(short, long, default_value = EXPORTER_ID)]
        eraser: String,
    },
    /// List registered exporters and erasers
    Exporters,
    /// Load records from a JSON array into the record database
    Import { file: PathBuf },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_export_page_is_raw_input() {
        let cli = Cli::parse_from(["wcpt", "export", "a@x.com", "--page", "2abc"]);
        match cli.command {
            Command::Export { email_address, page, exporter } => {
                assert_eq!(email_address, "a@x.com");
                assert_eq!(page.as_deref(), Some("2abc"));
                assert_eq!(exporter, EXPORTER_ID);
            },
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["wcpt", "exporters", "--database", "records.sqlite", "-v"]);
        assert_eq!(cli.database, Some(PathBuf::from("records.sqlite")));
        assert!(cli.verbose);
    }
}
