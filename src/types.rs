use std::path::PathBuf;

use clap::{ArgAction, Parser};

use crate::prompt::Style;

// CLI Args
#[derive(Parser, Debug)]
#[command(
   author,
   version,
   disable_version_flag = true,
   about = "Generate Conventional Commits messages from staged changes",
   long_about = None
)]
pub struct Args {
   /// Extra context for the model (e.g. "fixing login bug")
   #[arg(long, short = 'c')]
   pub context: Option<String>,

   /// Stage all files (git add .) before reading the diff
   #[arg(long, short = 'A')]
   pub add: bool,

   /// Auto mode: stage, commit and push without prompts
   #[arg(long, short = 'a')]
   pub auto: bool,

   /// Message style
   #[arg(long, short = 's', value_enum, default_value_t = Style::Default)]
   pub style: Style,

   /// Extension kept when the diff is too large (default: .gml)
   #[arg(long, short = 'f')]
   pub filter: Option<String>,

   /// Print the last prompt sent to the model and exit
   #[arg(long)]
   pub show_prompt: bool,

   /// Print version
   #[arg(long, short = 'v', action = ArgAction::Version)]
   pub version: (),

   /// Path to config file (default: ~/.config/git-scribe/config.toml)
   #[arg(long)]
   pub config: Option<PathBuf>,

   /// Directory to run git commands in
   #[arg(long, default_value = ".")]
   pub dir: PathBuf,
}

impl Default for Args {
   fn default() -> Self {
      Self {
         context:     None,
         add:         false,
         auto:        false,
         style:       Style::Default,
         filter:      None,
         show_prompt: false,
         version:     (),
         config:      None,
         dir:         PathBuf::from("."),
      }
   }
}
