//! First-run setup: ask for an API key once and store it.

use std::fs::File;
use std::io::{self, BufRead, BufReader, IsTerminal, Write};

use tracing::info;
use zeroize::Zeroizing;

use crate::config::{Credential, CredentialStore, ENV_API_KEY};
use crate::error::{CliError, Result};

pub const KEY_URL: &str = "https://platform.openai.com/api-keys";

/// Prompt on `output`, read one line from `input`, save the key.
pub fn prompt_for_key(
    input: &mut impl BufRead,
    output: &mut impl Write,
    store: &CredentialStore,
) -> Result<Credential> {
    writeln!(output, "🚀 Welcome to CLIHelper!")?;
    writeln!(output, "\nGet your API key at: {KEY_URL}")?;
    write!(output, "Enter your API key: ")?;
    output.flush()?;

    let mut line = Zeroizing::new(String::new());
    input.read_line(&mut line)?;
    let credential = Credential::new(line.as_str())
        .ok_or_else(|| CliError::AuthMissing("no key was entered".into()))?;

    store.save(&credential)?;
    writeln!(output, "✅ Key saved to {}\n", store.path().display())?;
    Ok(credential)
}

/// Run the setup against the user's terminal.
///
/// Reads from stdin when it is a terminal, otherwise from the controlling
/// terminal, since a piped stdin has already been consumed as input.
pub fn run_interactive(store: &CredentialStore) -> Result<Credential> {
    info!("starting first-run setup");
    let mut stderr = io::stderr();

    if io::stdin().is_terminal() {
        let stdin = io::stdin();
        return prompt_for_key(&mut stdin.lock(), &mut stderr, store);
    }

    match open_controlling_terminal() {
        Ok(tty) => prompt_for_key(&mut BufReader::new(tty), &mut stderr, store),
        Err(e) => Err(CliError::AuthMissing(format!(
            "no terminal available to ask for it ({e}); set {ENV_API_KEY} or run `clihelper --setup`"
        ))),
    }
}

#[cfg(unix)]
fn open_controlling_terminal() -> io::Result<File> {
    File::open("/dev/tty")
}

#[cfg(not(unix))]
fn open_controlling_terminal() -> io::Result<File> {
    Err(io::Error::new(io::ErrorKind::NotFound, "no controlling terminal"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_prompt_saves_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path());
        let mut input = Cursor::new(b"  sk-entered-key  \n".to_vec());
        let mut output = Vec::new();

        let credential = prompt_for_key(&mut input, &mut output, &store).unwrap();
        assert_eq!(credential.expose(), "sk-entered-key");
        assert_eq!(store.load().unwrap().unwrap().expose(), "sk-entered-key");

        let shown = String::from_utf8(output).unwrap();
        assert!(shown.contains(KEY_URL));
        assert!(shown.contains("Key saved to"));
        assert!(!shown.contains("sk-entered-key"));
    }

    #[test]
    fn test_empty_entry_is_auth_missing() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path());
        let mut input = Cursor::new(b"\n".to_vec());
        let mut output = Vec::new();

        let err = prompt_for_key(&mut input, &mut output, &store).unwrap_err();
        assert!(matches!(err, CliError::AuthMissing(_)));
        assert!(store.load().unwrap().is_none());
    }
}
