//! User-facing output: the answer banner, progress notes, usage text and
//! the first-run key prompt.

pub mod presenter;
pub mod setup;

pub use presenter::{Presenter, PresenterOptions};

/// Usage block shown when there is nothing to analyze.
pub fn usage() -> String {
    format!(
        "CLIHelper v{} - Instant command-line help\n\
         \n\
         Usage:\n  \
           clihelper 'how do I find large files?'        # Direct query\n  \
           clihelper 'what was that git command?'        # Ask about recent commands\n  \
           command_that_fails 2>&1 | clihelper           # Analyze error\n  \
           command_that_fails 2>&1 | clihelper 'context' # Analyze with context\n\
         \n\
         Examples:\n  \
           clihelper 'how to compress a directory'\n  \
           clihelper 'explain the last command'\n  \
           ls --fake-flag 2>&1 | clihelper",
        env!("CARGO_PKG_VERSION")
    )
}
