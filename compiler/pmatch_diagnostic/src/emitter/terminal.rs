//! Terminal emitter: human-readable output with optional ANSI colors.
//!
//! When the host supplies the pattern source text, labels are rendered as
//! `line:col` with the offending line and a caret underline; otherwise as raw
//! byte spans.

use std::io::{self, Write};

use crate::{Diagnostic, Label, Severity};

use super::{line_col, DiagnosticEmitter};

mod colors {
    pub const ERROR: &str = "\x1b[1;31m";
    pub const WARNING: &str = "\x1b[1;33m";
    pub const NOTE: &str = "\x1b[1;36m";
    pub const HELP: &str = "\x1b[1;32m";
    pub const BOLD: &str = "\x1b[1m";
    pub const SECONDARY: &str = "\x1b[1;34m";
    pub const RESET: &str = "\x1b[0m";
}

#[inline]
fn plural_s(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorMode {
    /// Colors when the output is a TTY.
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    pub fn should_use_colors(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

pub struct TerminalEmitter<'src, W: Write> {
    writer: W,
    colors: bool,
    source: Option<&'src str>,
}

impl<'src, W: Write> TerminalEmitter<'src, W> {
    pub fn with_color_mode(writer: W, mode: ColorMode, is_tty: bool) -> Self {
        TerminalEmitter {
            writer,
            colors: mode.should_use_colors(is_tty),
            source: None,
        }
    }

    /// Render labels against `source` (line, column and snippet).
    #[must_use]
    pub fn with_source(mut self, source: &'src str) -> Self {
        self.source = Some(source);
        self
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_colored(&mut self, text: &str, color: &str) {
        if self.colors {
            let _ = write!(self.writer, "{color}{text}{}", colors::RESET);
        } else {
            let _ = write!(self.writer, "{text}");
        }
    }

    fn write_severity(&mut self, severity: Severity) {
        let color = match severity {
            Severity::Error => colors::ERROR,
            Severity::Warning => colors::WARNING,
            Severity::Note => colors::NOTE,
        };
        self.write_colored(&severity.to_string(), color);
    }

    fn write_label(&mut self, label: &Label) {
        let marker = if label.is_primary { "-->" } else { "   " };
        let color = if label.is_primary {
            colors::ERROR
        } else {
            colors::SECONDARY
        };

        let Some(source) = self.source else {
            let _ = write!(self.writer, "  {marker} {:?}: ", label.span);
            self.write_colored(&label.message, color);
            let _ = writeln!(self.writer);
            return;
        };

        let (line, column) = line_col(source, label.span.start);
        let _ = writeln!(self.writer, "  {marker} {line}:{column}");

        let line_text = source
            .lines()
            .nth(line.saturating_sub(1) as usize)
            .unwrap_or_default();
        let gutter = line.to_string();
        let pad = " ".repeat(gutter.len());
        let _ = writeln!(self.writer, "  {pad} |");
        let _ = writeln!(self.writer, "  {gutter} | {line_text}");

        let start = column.saturating_sub(1) as usize;
        let width = (label.span.len() as usize)
            .min(line_text.chars().count().saturating_sub(start))
            .max(1);
        let caret = if label.is_primary { "^" } else { "-" };
        let underline = format!("{}{} {}", " ".repeat(start), caret.repeat(width), label.message);
        let _ = write!(self.writer, "  {pad} | ");
        self.write_colored(&underline, color);
        let _ = writeln!(self.writer);
    }
}

impl TerminalEmitter<'_, io::Stderr> {
    pub fn stderr(mode: ColorMode, is_tty: bool) -> Self {
        TerminalEmitter {
            writer: io::stderr(),
            colors: mode.should_use_colors(is_tty),
            source: None,
        }
    }
}

impl<W: Write> DiagnosticEmitter for TerminalEmitter<'_, W> {
    fn emit(&mut self, diagnostic: &Diagnostic) {
        self.write_severity(diagnostic.severity);
        if self.colors {
            let _ = write!(
                self.writer,
                "{}[{}]{}",
                colors::BOLD,
                diagnostic.code,
                colors::RESET
            );
        } else {
            let _ = write!(self.writer, "[{}]", diagnostic.code);
        }
        let _ = writeln!(self.writer, ": {}", diagnostic.message);

        for label in &diagnostic.labels {
            self.write_label(label);
        }

        for note in &diagnostic.notes {
            let _ = write!(self.writer, "  = ");
            self.write_colored("note", colors::BOLD);
            let _ = writeln!(self.writer, ": {note}");
        }

        for suggestion in &diagnostic.suggestions {
            let _ = write!(self.writer, "  = ");
            self.write_colored("help", colors::HELP);
            let _ = writeln!(self.writer, ": {suggestion}");
        }

        let _ = writeln!(self.writer);
    }

    fn flush(&mut self) {
        let _ = self.writer.flush();
    }

    fn emit_summary(&mut self, error_count: usize, warning_count: usize) {
        if error_count > 0 {
            self.write_colored("error", colors::ERROR);
            let error_part = if error_count == 1 {
                "previous error".to_string()
            } else {
                format!("{error_count} previous errors")
            };
            if warning_count > 0 {
                let _ = writeln!(
                    self.writer,
                    ": aborting due to {error_part}; {warning_count} warning{} emitted",
                    plural_s(warning_count)
                );
            } else {
                let _ = writeln!(self.writer, ": aborting due to {error_part}");
            }
        } else if warning_count > 0 {
            self.write_colored("warning", colors::WARNING);
            let _ = writeln!(
                self.writer,
                ": {warning_count} warning{} emitted",
                plural_s(warning_count)
            );
        }
    }
}
