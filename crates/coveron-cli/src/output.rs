//! Terminal output

use crate::config::CliConfig;
use console::{style, Term};

/// Writes command results to stdout and diagnostics to stderr
#[derive(Debug)]
pub struct Reporter {
    out: Term,
    err: Term,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Reporter {
    /// Create a reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            out: Term::stdout(),
            err: Term::stderr(),
            use_color,
            quiet,
        }
    }

    /// Create a reporter from CLI configuration
    #[must_use]
    pub fn from_config(config: &CliConfig) -> Self {
        Self::new(config.color.should_color(), config.verbosity.is_quiet())
    }

    /// Print command output verbatim
    ///
    /// Machine-readable output is printed even in quiet mode.
    pub fn raw(&self, text: &str) {
        let _ = self.out.write_line(text);
    }

    /// Print a section heading
    pub fn heading(&self, title: &str) {
        if self.quiet {
            return;
        }
        let line = if self.use_color {
            style(title).bold().underlined().to_string()
        } else {
            title.to_string()
        };
        let _ = self.out.write_line(&line);
    }

    /// Print an aligned `label: value` line
    pub fn field(&self, label: &str, value: &str) {
        if self.quiet {
            return;
        }
        let label = format!("{label:<12}");
        let label = if self.use_color {
            style(label).cyan().to_string()
        } else {
            label
        };
        let _ = self.out.write_line(&format!("  {label} {value}"));
    }

    /// Print a plain line
    pub fn line(&self, text: &str) {
        if self.quiet {
            return;
        }
        let _ = self.out.write_line(text);
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }
        let prefix = if self.use_color {
            style("✓").green().bold().to_string()
        } else {
            "OK".to_string()
        };
        let _ = self.out.write_line(&format!("{prefix} {message}"));
    }

    /// Print a failure message
    pub fn failure(&self, message: &str) {
        // Always print failures, even in quiet mode
        let prefix = if self.use_color {
            style("✗").red().bold().to_string()
        } else {
            "FAIL".to_string()
        };
        let _ = self.err.write_line(&format!("{prefix} {message}"));
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new(false, false)
    }
}
