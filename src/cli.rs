//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser};
use serde_json::json;
use std::path::PathBuf;

/// Stage API Console sources into a local directory
///
/// Downloads the latest or a tagged console release from GitHub, a zip from
/// any URL, or copies a local directory or zip file. Downloaded releases are
/// cached per tag so repeated builds skip the network.
#[derive(Parser, Debug)]
#[command(name = "console-sources")]
#[command(author, version, long_about = None)]
pub struct Cli {
    /// Directory to stage the console sources into
    pub destination: PathBuf,

    /// Exact release tag to fetch (e.g. v4.2.0)
    #[arg(long, value_name = "TAG", conflicts_with = "src")]
    pub tag: Option<String>,

    /// Local path or zip URL to take the sources from
    #[arg(long, value_name = "PATH_OR_URL")]
    pub src: Option<String>,

    /// Bypass cache lookups and always download
    #[arg(long)]
    pub ignore_cache: bool,

    /// GitHub repository to resolve releases from
    #[arg(long, value_name = "OWNER/REPO", default_value = "mulesoft/api-console")]
    pub repo: String,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Assemble the raw options value so the same validation rules run on
    /// CLI input as on programmatic input.
    pub fn to_raw_options(&self) -> serde_json::Value {
        let mut raw = serde_json::Map::new();
        if let Some(ref tag) = self.tag {
            raw.insert("tagName".to_string(), json!(tag));
        }
        if let Some(ref src) = self.src {
            raw.insert("src".to_string(), json!(src));
        }
        if self.ignore_cache {
            raw.insert("ignoreCache".to_string(), json!(true));
        }
        if self.verbose > 0 {
            raw.insert("verbose".to_string(), json!(true));
        }
        serde_json::Value::Object(raw)
    }
}
