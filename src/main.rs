use api::CommitMessageGenerator;
use clap::Parser;
use git::{Git, VersionControl};
use git_scribe::*;
use interact::{AutoPilot, Interaction, TerminalPrompter};
use tracing_subscriber::EnvFilter;
use types::Args;
use workflow::PushOutcome;

/// Apply CLI overrides to config
fn apply_cli_overrides(config: &mut ScribeConfig, args: &Args) {
   if let Some(ref filter) = args.filter {
      let filter = filter.trim();
      if filter.is_empty() {
         style::warn(&format!(
            "Ignoring empty --filter, using default {}",
            config.filter_extension
         ));
      } else if filter.starts_with('.') {
         config.filter_extension = filter.to_string();
      } else {
         config.filter_extension = format!(".{filter}");
      }
   }
}

/// Load config from args or default
fn load_config_from_args(args: &Args) -> Result<ScribeConfig> {
   if let Some(ref config_path) = args.config {
      ScribeConfig::from_file(config_path)
   } else {
      ScribeConfig::load()
   }
}

fn workflow_options(args: &Args) -> WorkflowOptions {
   WorkflowOptions {
      auto:         args.auto,
      force_stage:  args.add,
      style:        args.style,
      user_context: args.context.clone().unwrap_or_default(),
   }
}

fn init_tracing() {
   let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
   tracing_subscriber::fmt()
      .with_env_filter(filter)
      .with_writer(std::io::stderr)
      .with_target(false)
      .init();
}

fn run(args: &Args) -> Result<()> {
   let mut config = load_config_from_args(args)?;
   apply_cli_overrides(&mut config, args);

   if args.show_prompt {
      match prompt::read_last_prompt(&config.last_prompt_path) {
         Some(text) => println!("{text}"),
         None => style::print_info(&format!(
            "No prompt logged yet ({})",
            config.last_prompt_path.display()
         )),
      }
      return Ok(());
   }

   style::print_banner();

   let repo = Git::new(&args.dir);
   if !repo.is_repository() {
      return Err(ScribeError::NotARepository);
   }

   // Fail on a missing credential before touching the index
   let generator = CommitMessageGenerator::from_config(&config)?;

   let interaction: Box<dyn Interaction> = if args.auto {
      style::print_info(&format!(
         "{} Auto mode: staging, committing and pushing without prompts",
         style::icons::ROCKET
      ));
      Box::new(AutoPilot)
   } else {
      Box::new(TerminalPrompter::new())
   };

   let driver = WorkflowDriver::new(&config, &repo, &generator, interaction.as_ref());
   let outcome = driver.run(&workflow_options(args))?;
   tracing::debug!(?outcome, "done");

   if let WorkflowOutcome::Committed { push: PushOutcome::Skipped, .. } = outcome {
      style::print_info("Commit kept locally (not pushed).");
   }

   style::print_footer();
   Ok(())
}

fn main() {
   dotenvy::dotenv().ok();
   init_tracing();

   let args = Args::parse();
   if let Err(err) = run(&args) {
      style::fail(&err.to_string());
      let mut source = std::error::Error::source(&err);
      while let Some(cause) = source {
         eprintln!("  {} {cause}", style::dim("caused by:"));
         source = cause.source();
      }
      std::process::exit(1);
   }
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_filter_override_adds_dot() {
      let mut config = ScribeConfig::default();
      let args = Args { filter: Some("rs".to_string()), ..Default::default() };
      apply_cli_overrides(&mut config, &args);
      assert_eq!(config.filter_extension, ".rs");
   }

   #[test]
   fn test_filter_override_keeps_dot() {
      let mut config = ScribeConfig::default();
      let args = Args { filter: Some(".txt".to_string()), ..Default::default() };
      apply_cli_overrides(&mut config, &args);
      assert_eq!(config.filter_extension, ".txt");
   }

   #[test]
   fn test_no_filter_keeps_config() {
      let mut config = ScribeConfig { filter_extension: ".yy".to_string(), ..Default::default() };
      apply_cli_overrides(&mut config, &Args::default());
      assert_eq!(config.filter_extension, ".yy");

      let blank = Args { filter: Some("  ".to_string()), ..Default::default() };
      apply_cli_overrides(&mut config, &blank);
      assert_eq!(config.filter_extension, ".yy");
   }

   #[test]
   fn test_workflow_options_from_args() {
      let args = Args {
         context: Some("fixing login bug".to_string()),
         add: true,
         style: Style::Concise,
         ..Default::default()
      };
      let options = workflow_options(&args);
      assert!(options.force_stage);
      assert!(!options.auto);
      assert_eq!(options.style, Style::Concise);
      assert_eq!(options.user_context, "fixing login bug");

      assert_eq!(workflow_options(&Args::default()).user_context, "");
   }
}
