//! Terminal styling for operator-facing output.
//!
//! Respects `NO_COLOR` environment variable and terminal capabilities.

use std::{
   io::{self, Write},
   sync::OnceLock,
   thread,
   time::Duration,
};

use owo_colors::OwoColorize;

/// Whether color output is enabled (cached on first call).
static COLOR_ENABLED: OnceLock<bool> = OnceLock::new();

pub fn colors_enabled() -> bool {
   *COLOR_ENABLED.get_or_init(|| {
      // NO_COLOR takes precedence (https://no-color.org/)
      if std::env::var("NO_COLOR").is_ok() {
         return false;
      }
      supports_color::on(supports_color::Stream::Stdout).is_some_and(|level| level.has_basic)
   })
}

// === Color Palette ===

/// Success: checkmarks, completed actions (green + bold).
pub fn success(s: &str) -> String {
   if colors_enabled() {
      s.green().bold().to_string()
   } else {
      s.to_string()
   }
}

/// Warning: non-fatal issues (yellow).
pub fn warning(s: &str) -> String {
   if colors_enabled() {
      s.yellow().to_string()
   } else {
      s.to_string()
   }
}

/// Error: failures, hard errors (red + bold).
pub fn error(s: &str) -> String {
   if colors_enabled() {
      s.red().bold().to_string()
   } else {
      s.to_string()
   }
}

/// Info: informational messages (cyan).
pub fn info(s: &str) -> String {
   if colors_enabled() {
      s.cyan().to_string()
   } else {
      s.to_string()
   }
}

pub fn dim(s: &str) -> String {
   if colors_enabled() {
      s.dimmed().to_string()
   } else {
      s.to_string()
   }
}

pub fn bold(s: &str) -> String {
   if colors_enabled() {
      s.bold().to_string()
   } else {
      s.to_string()
   }
}

/// Get terminal width, capped at 100 columns.
pub fn term_width() -> usize {
   terminal_size::terminal_size()
      .map_or(80, |(w, _)| w.0 as usize)
      .min(100)
}

// === Status Icons ===

pub mod icons {
   pub const SUCCESS: &str = "\u{2713}";
   pub const WARNING: &str = "\u{26A0}";
   pub const ERROR: &str = "\u{2716}";
   pub const INFO: &str = "\u{2139}";
   pub const WAIT: &str = "\u{2026}";
   pub const LINK: &str = "\u{1F517}";
   pub const ROCKET: &str = "\u{1F680}";
}

/// Progress state of a workflow step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
   Wait,
   Done,
}

/// Print a one-line workflow step status.
pub fn step_status(msg: &str, step: Step) {
   match step {
      Step::Wait => println!("{} {}", info(icons::WAIT), dim(msg)),
      Step::Done => println!("{} {}", success(icons::SUCCESS), msg),
   }
}

/// Print warning message, clearing any active spinner line first.
pub fn warn(msg: &str) {
   print!("\r\x1b[K");
   io::stdout().flush().ok();
   eprintln!("{} {}", warning(icons::WARNING), warning(msg));
}

/// Print an error line to stderr.
pub fn fail(msg: &str) {
   eprintln!("{} {}", error(icons::ERROR), error(msg));
}

pub fn print_info(msg: &str) {
   use std::io::IsTerminal;
   if std::io::stderr().is_terminal() && colors_enabled() {
      eprintln!("\r\x1b[K{} {msg}", icons::INFO.cyan());
   } else {
      eprintln!("{} {msg}", icons::INFO);
   }
}

/// Startup banner.
pub fn print_banner() {
   let title = format!("GitScribe v{}", env!("CARGO_PKG_VERSION"));
   println!("{} {} {}", bold(&info(&title)), dim("|"), dim("AI-Powered Commit Tool"));
   println!("{}", separator(50));
}

pub fn print_footer() {
   println!("{}", separator(50));
}

/// Show the web link of the commit just pushed.
pub fn print_commit_link(url: &str) {
   println!("{} {} {}", icons::LINK, dim("View commit:"), info(url));
}

/// Horizontal separator line.
pub fn separator(width: usize) -> String {
   let line = box_chars::HORIZONTAL.to_string().repeat(width);
   if colors_enabled() { dim(&line) } else { line }
}

// === Unicode Box Drawing ===

pub mod box_chars {
   pub const TOP_LEFT: char = '\u{256D}';
   pub const TOP_RIGHT: char = '\u{256E}';
   pub const BOTTOM_LEFT: char = '\u{2570}';
   pub const BOTTOM_RIGHT: char = '\u{256F}';
   pub const HORIZONTAL: char = '\u{2500}';
   pub const VERTICAL: char = '\u{2502}';
}

/// Wrap text to fit within a given width, preserving words.
fn wrap_line(line: &str, max_width: usize) -> Vec<String> {
   if line.trim().is_empty() {
      return vec![String::new()];
   }

   let mut lines = Vec::new();
   let mut current = String::new();

   for word in line.split_whitespace() {
      let word_len = word.chars().count();
      let current_len = current.chars().count();

      if current.is_empty() {
         // First word on line - take it even if too long
         current = word.to_string();
      } else if current_len + 1 + word_len <= max_width {
         current.push(' ');
         current.push_str(word);
      } else {
         lines.push(current);
         current = word.to_string();
      }
   }

   if !current.is_empty() {
      lines.push(current);
   }

   lines
}

/// Render a box-framed message with word wrapping.
pub fn boxed_message(title: &str, content: &str, width: usize) -> String {
   use box_chars::*;

   let mut out = String::new();
   let inner_width = width.saturating_sub(4); // "│ " and " │"

   let title_len = title.chars().count();
   let border_width = width.saturating_sub(2);
   let padding = border_width.saturating_sub(title_len + 2);
   let left_pad = padding / 2;
   let right_pad = padding - left_pad;

   out.push(TOP_LEFT);
   out.push_str(&HORIZONTAL.to_string().repeat(left_pad));
   out.push(' ');
   out.push_str(&bold(title));
   out.push(' ');
   out.push_str(&HORIZONTAL.to_string().repeat(right_pad));
   out.push(TOP_RIGHT);
   out.push('\n');

   for line in content.lines() {
      for wrapped_line in wrap_line(line, inner_width) {
         out.push(VERTICAL);
         out.push(' ');
         let line_chars = wrapped_line.chars().count();
         out.push_str(&wrapped_line);
         out.push_str(&" ".repeat(inner_width.saturating_sub(line_chars)));
         out.push(' ');
         out.push(VERTICAL);
         out.push('\n');
      }
   }

   out.push(BOTTOM_LEFT);
   out.push_str(&HORIZONTAL.to_string().repeat(border_width));
   out.push(BOTTOM_RIGHT);

   out
}

// === Spinner ===

const SPINNER_FRAMES: &[char] = &[
   '\u{280B}', '\u{2819}', '\u{2839}', '\u{2838}', '\u{283C}', '\u{2834}', '\u{2826}', '\u{2827}',
   '\u{2807}', '\u{280F}',
];

/// Run a blocking call under a spinner, marking the line with the outcome.
/// Falls back to static text if colors are off or stdout is not a TTY.
pub fn with_spinner_result<F, T, E>(message: &str, f: F) -> Result<T, E>
where
   F: FnOnce() -> Result<T, E>,
{
   if !colors_enabled() {
      println!("{message}");
      return f();
   }

   let (tx, rx) = std::sync::mpsc::channel::<bool>();
   let msg = message.to_string();

   let spinner = thread::spawn(move || {
      let mut idx = 0;
      loop {
         match rx.try_recv() {
            Ok(success) => {
               let icon = if success {
                  icons::SUCCESS.green().to_string()
               } else {
                  icons::ERROR.red().to_string()
               };
               print!("\r\x1b[K{icon} {msg}\n");
               io::stdout().flush().ok();
               break;
            },
            Err(std::sync::mpsc::TryRecvError::Disconnected) => break,
            Err(std::sync::mpsc::TryRecvError::Empty) => {},
         }
         print!("\r{} {}", SPINNER_FRAMES[idx].cyan(), msg);
         io::stdout().flush().ok();
         idx = (idx + 1) % SPINNER_FRAMES.len();
         thread::sleep(Duration::from_millis(80));
      }
   });

   let result = f();
   tx.send(result.is_ok()).ok();
   spinner.join().ok();
   result
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_wrap_line_respects_width() {
      let wrapped = wrap_line("feat(ui): add a commit link footer to the push step", 20);
      assert!(wrapped.len() > 1);
      assert!(wrapped.iter().all(|line| line.chars().count() <= 20));
      assert_eq!(wrapped.join(" "), "feat(ui): add a commit link footer to the push step");
   }

   #[test]
   fn test_wrap_line_keeps_blank_lines() {
      assert_eq!(wrap_line("", 20), vec![String::new()]);
      assert_eq!(wrap_line("   ", 20), vec![String::new()]);
   }

   #[test]
   fn test_boxed_message_frames_every_line() {
      let boxed = boxed_message("Generated", "fix(git): handle detached HEAD\n\n- guard push", 40);
      let lines: Vec<&str> = boxed.lines().collect();
      assert!(lines[0].starts_with(box_chars::TOP_LEFT));
      assert!(lines[0].contains("Generated"));
      assert!(lines.last().unwrap().starts_with(box_chars::BOTTOM_LEFT));
      // subject, blank separator, bullet
      assert_eq!(lines.len(), 5);
      for line in &lines[1..lines.len() - 1] {
         assert!(line.starts_with(box_chars::VERTICAL));
         assert!(line.ends_with(box_chars::VERTICAL));
      }
   }

   #[test]
   fn test_spinner_passes_result_through() {
      let ok: Result<u32, String> = with_spinner_result("working", || Ok(7));
      assert_eq!(ok, Ok(7));
      let err: Result<u32, String> = with_spinner_result("working", || Err("boom".to_string()));
      assert_eq!(err, Err("boom".to_string()));
   }
}
