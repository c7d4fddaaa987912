//! Command-line arguments for the batch binaries.

use clap::Parser;
use std::path::PathBuf;

/// Build a JSON report for every topic/subtopic in a YAML file.
///
/// ```sh
/// echo -n "YOUR_KEY" | base64 > api_key.enc
/// topic_report --topics-file topics.yaml --key-file api_key.enc --output report.json
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct ReportArgs {
    /// YAML file mapping topics to lists of subtopics
    #[arg(long, default_value = "topics.yaml")]
    pub topics_file: PathBuf,

    /// Base64-encoded API key file
    #[arg(long, default_value = "api_key.enc")]
    pub key_file: PathBuf,

    /// Where to write the JSON report
    #[arg(short, long, default_value = "report.json")]
    pub output: PathBuf,

    /// Optional path to briefing.toml
    #[arg(short, long, env = "BRIEFING_CONFIG_PATH")]
    pub config: Option<PathBuf>,
}

/// Print the latest feed entries and a brief for each active interest.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct FeedArgs {
    /// JSON interest file (`{"News": true, ...}`) or a `.txt` list, one interest per line
    #[arg(short, long, default_value = "config/interests.json")]
    pub interests: PathBuf,

    /// Entries per interest
    #[arg(short, long, default_value_t = crate::feeds::DEFAULT_LIMIT)]
    pub limit: usize,

    /// Optional path to briefing.toml
    #[arg(short, long, env = "BRIEFING_CONFIG_PATH")]
    pub config: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_defaults() {
        let args = ReportArgs::parse_from(["topic_report"]);
        assert_eq!(args.topics_file, PathBuf::from("topics.yaml"));
        assert_eq!(args.key_file, PathBuf::from("api_key.enc"));
        assert_eq!(args.output, PathBuf::from("report.json"));
    }

    #[test]
    fn report_flags() {
        let args = ReportArgs::parse_from([
            "topic_report",
            "--topics-file",
            "/tmp/t.yaml",
            "--key-file",
            "/tmp/k.enc",
            "-o",
            "/tmp/out.json",
        ]);
        assert_eq!(args.topics_file, PathBuf::from("/tmp/t.yaml"));
        assert_eq!(args.key_file, PathBuf::from("/tmp/k.enc"));
        assert_eq!(args.output, PathBuf::from("/tmp/out.json"));
    }

    #[test]
    fn feed_limit_flag() {
        let args = FeedArgs::parse_from(["feed_brief", "--limit", "3"]);
        assert_eq!(args.limit, 3);
        assert_eq!(args.interests, PathBuf::from("config/interests.json"));
    }
}
