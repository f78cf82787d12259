//! Terminal output for the model's answer.
//!
//! The answer is framed by banners. On a terminal the banner is styled and
//! long prose lines are wrapped; shell commands (`$ ...`) and fenced code
//! blocks are printed untouched so they stay copy-pasteable.

use std::io::{self, IsTerminal, Write};

use crossterm::style::Stylize;

use crate::ai::Response;

pub const BANNER_WIDTH: usize = 50;
pub const TITLE: &str = "🤖 CLIHelper says:";

/// Wrapping never goes wider than this, even on very wide terminals.
const MAX_WRAP_WIDTH: usize = 100;
const MIN_WRAP_WIDTH: usize = 40;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PresenterOptions {
    pub color: bool,
    /// `None` disables wrapping.
    pub wrap_width: Option<usize>,
}

impl PresenterOptions {
    /// Styled and wrapped when stdout is a terminal, plain otherwise.
    pub fn for_stdout() -> Self {
        if !io::stdout().is_terminal() {
            return Self::default();
        }
        let width = crossterm::terminal::size()
            .ok()
            .map(|(cols, _)| usize::from(cols).clamp(MIN_WRAP_WIDTH, MAX_WRAP_WIDTH));
        Self {
            color: true,
            wrap_width: width,
        }
    }
}

pub struct Presenter<W: Write> {
    out: W,
    options: PresenterOptions,
}

impl<W: Write> Presenter<W> {
    pub fn new(out: W, options: PresenterOptions) -> Self {
        Self { out, options }
    }

    pub fn present(&mut self, response: &Response) -> io::Result<()> {
        writeln!(self.out)?;
        self.rule()?;
        if self.options.color {
            writeln!(self.out, "{}", TITLE.bold().cyan())?;
        } else {
            writeln!(self.out, "{TITLE}")?;
        }
        self.rule()?;
        self.body(&response.text)?;
        self.rule()?;
        writeln!(self.out)?;
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn rule(&mut self) -> io::Result<()> {
        let rule = "=".repeat(BANNER_WIDTH);
        if self.options.color {
            writeln!(self.out, "{}", rule.dark_grey())
        } else {
            writeln!(self.out, "{rule}")
        }
    }

    fn body(&mut self, text: &str) -> io::Result<()> {
        let mut in_fence = false;
        for line in text.lines() {
            let trimmed = line.trim_start();

            if trimmed.starts_with("```") {
                in_fence = !in_fence;
                writeln!(self.out, "{line}")?;
                continue;
            }
            if in_fence {
                writeln!(self.out, "{line}")?;
                continue;
            }
            if is_command_line(trimmed) {
                if self.options.color {
                    writeln!(self.out, "{}", line.green())?;
                } else {
                    writeln!(self.out, "{line}")?;
                }
                continue;
            }

            match self.options.wrap_width {
                Some(width) if line.chars().count() > width => {
                    let indent = &line[..line.len() - trimmed.len()];
                    let options = textwrap::Options::new(width).subsequent_indent(indent);
                    for part in textwrap::wrap(line, options) {
                        writeln!(self.out, "{part}")?;
                    }
                }
                _ => writeln!(self.out, "{line}")?,
            }
        }
        Ok(())
    }
}

fn is_command_line(trimmed: &str) -> bool {
    trimmed == "$" || trimmed.starts_with("$ ")
}

/// One-line progress note for stderr before the request goes out.
pub fn status(out: &mut impl Write, message: &str) -> io::Result<()> {
    writeln!(out, "\n🔍 {message}")
}
