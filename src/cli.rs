use clap::Parser;
use std::path::PathBuf;

use crate::corpus::DEFAULT_EXTENSIONS;
use crate::error::Result;
use crate::labels::LabelScheme;

const DEFAULT_LABELS: [&str; 2] = ["yes", "no"];

#[derive(Debug, Parser)]
#[command(name = "figure-inspector")]
#[command(about = "Classify figures one by one into a resumable CSV log", long_about = None)]
pub struct Cli {
    /// A folder of figures, or an explicit ordered list of image files
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Button labels, bound to keys 1..n when there are fewer than nine
    #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_LABELS.map(String::from), conflicts_with = "checklist")]
    pub labels: Vec<String>,

    /// Use checkboxes with Success/Failure instead of label buttons
    #[arg(long, value_delimiter = ',')]
    pub checklist: Option<Vec<String>>,

    /// Image extensions picked up when scanning a folder
    #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_EXTENSIONS.map(String::from))]
    pub extensions: Vec<String>,

    /// Resume from an existing log
    #[arg(long, conflicts_with = "new_log")]
    pub log: Option<PathBuf>,

    /// Start a new log at this path (must not exist)
    #[arg(long)]
    pub new_log: Option<PathBuf>,

    /// CSV catalog with an `lc_path` column narrowing the corpus
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Folder with secondary figures sharing file names with the inputs
    #[arg(long)]
    pub compare_dir: Option<PathBuf>,

    /// Name recorded with each decision
    #[arg(long)]
    pub user: Option<String>,

    /// Fixed image box width in pixels (needs --height)
    #[arg(long, requires = "height")]
    pub width: Option<u32>,

    /// Fixed image box height in pixels (needs --width)
    #[arg(long, requires = "width")]
    pub height: Option<u32>,

    /// Seed for the order of unclassified figures
    #[arg(long)]
    pub seed: Option<u64>,

    /// Rewrite the log after every decision
    #[arg(long)]
    pub autosave: bool,
}

impl Cli {
    pub fn label_scheme(&self) -> Result<LabelScheme> {
        match &self.checklist {
            Some(boxes) => LabelScheme::checklist(trimmed(boxes)),
            None => LabelScheme::buttons(trimmed(&self.labels)),
        }
    }

    pub fn user_name(&self) -> String {
        self.user
            .clone()
            .or_else(|| std::env::var("USER").ok())
            .or_else(|| std::env::var("USERNAME").ok())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

fn trimmed(names: &[String]) -> Vec<String> {
    names.iter().map(|n| n.trim().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["figure-inspector", "plots"]).unwrap();
        assert_eq!(cli.inputs, vec![PathBuf::from("plots")]);
        assert_eq!(cli.extensions, vec!["jpg", "jpeg", "png"]);
        assert_eq!(
            cli.label_scheme().unwrap(),
            LabelScheme::Buttons(vec!["yes".to_string(), "no".to_string()])
        );
        assert!(!cli.autosave);
    }

    #[test]
    fn checklist_and_sizes() {
        let cli = Cli::try_parse_from([
            "figure-inspector",
            "scan",
            "--checklist",
            "deep eclipse, bad period",
            "--width",
            "900",
            "--height",
            "900",
            "--user",
            "kh",
        ])
        .unwrap();
        assert_eq!(
            cli.label_scheme().unwrap(),
            LabelScheme::Checklist(vec!["deep eclipse".to_string(), "bad period".to_string()])
        );
        assert_eq!((cli.width, cli.height), (Some(900), Some(900)));
        assert_eq!(cli.user_name(), "kh");
    }

    #[test]
    fn conflicting_options_rejected() {
        assert!(Cli::try_parse_from(["figure-inspector", "p", "--log", "a.csv", "--new-log", "b.csv"]).is_err());
        assert!(Cli::try_parse_from(["figure-inspector", "p", "--labels", "a", "--checklist", "b"]).is_err());
        assert!(Cli::try_parse_from(["figure-inspector", "p", "--width", "10"]).is_err());
        assert!(Cli::try_parse_from(["figure-inspector"]).is_err());
    }
}
