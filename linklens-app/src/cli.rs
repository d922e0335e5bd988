use clap::Parser;
use linklens_common::observability::LogFormat;
use std::path::PathBuf;

pub const DEFAULT_CONFIG: &str = "linklens.yaml";

/// Serve VK profile snapshots over HTTP, or print one and exit.
#[derive(Debug, Parser)]
#[command(name = "linklens", version, about)]
pub struct Args {
    /// Config file; `linklens.yaml` is used when present if this is omitted.
    #[arg(short, long, env = "LINKLENS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Listen address, overriding `server.bind`.
    #[arg(short, long)]
    pub bind: Option<String>,

    /// Log encoding, overriding `logging.format`.
    #[arg(long, value_parser = clap::value_parser!(LogFormat))]
    pub log_format: Option<LogFormat>,

    /// Resolve a single profile link, print the result and exit.
    #[arg(long)]
    pub link: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_one_shot_mode() {
        let args = Args::parse_from([
            "linklens",
            "--link",
            "https://vk.com/id1",
            "--log-format",
            "json",
        ]);
        assert_eq!(args.link.as_deref(), Some("https://vk.com/id1"));
        assert_eq!(args.log_format, Some(LogFormat::Json));
        assert!(args.bind.is_none());
    }

    #[test]
    fn rejects_unknown_log_format() {
        assert!(Args::try_parse_from(["linklens", "--log-format", "xml"]).is_err());
    }

    #[test]
    fn clap_definition_is_consistent() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
