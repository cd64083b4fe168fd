use std::fs;
use std::io;
use std::path::Path;

use anyhow::Context;
use scl_gate::FieldSource;
use tracing::{info, warn};

/// Who is logged in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
}

/// Username/password pairs read from a `user,password` file.
#[derive(Clone, Debug, Default)]
pub struct CredentialStore {
    entries: Vec<(String, String)>,
}

impl CredentialStore {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("opening credentials file {}", path.display()))?;
        Ok(Self::parse(&text))
    }

    /// One pair per line, split at the first comma. Whitespace is removed
    /// from both halves; lines without a comma are skipped.
    pub fn parse(text: &str) -> Self {
        let entries = text
            .lines()
            .filter_map(|line| line.split_once(','))
            .map(|(user, pass)| (strip_whitespace(user), strip_whitespace(pass)))
            .collect();
        Self { entries }
    }

    pub fn verify(&self, username: &str, password: &str) -> bool {
        self.entries
            .iter()
            .any(|(user, pass)| user == username && pass == password)
    }
}

fn strip_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Ask for credentials up to `max_attempts` times.
///
/// Returns `None` when every attempt failed or the input closed. A missing
/// credentials file fails each attempt with the reason shown to the user.
pub fn login<S: FieldSource>(
    source: &mut S,
    credentials: &Path,
    max_attempts: u32,
) -> io::Result<Option<Identity>> {
    for attempt in 1..=max_attempts {
        let Some(username) = source.ask("Enter Username")? else {
            return Ok(None);
        };
        let Some(password) = source.ask("Enter Password")? else {
            return Ok(None);
        };
        let (username, password) = (strip_whitespace(&username), strip_whitespace(&password));

        match CredentialStore::load(credentials) {
            Ok(store) if store.verify(&username, &password) => {
                info!(user = %username, "login succeeded");
                return Ok(Some(Identity { name: username }));
            }
            Ok(_) => {
                warn!(user = %username, attempt, "login failed");
                source.reject("Invalid username or password. Please try again.")?;
            }
            Err(e) => {
                warn!(error = %e, attempt, "credentials unavailable");
                source.reject(&format!("Error: {e:#}"))?;
            }
        }
    }
    Ok(None)
}
