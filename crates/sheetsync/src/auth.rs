//! Installed-app OAuth flow for obtaining a Sheets access token.
//!
//! The client secrets come from a JSON file downloaded from the Google Cloud
//! console. The resulting token is cached in a second JSON file and reused
//! until it expires, after which it is refreshed with the stored refresh
//! token. Only when neither works is the user asked to authorize in a
//! browser.

use std::{
    fs,
    io::{self, BufRead, Write},
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{Config, Error, Result};

/// Full read/write access to the user's spreadsheets.
pub const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const DEFAULT_REDIRECT_URI: &str = "http://localhost";

/// Tokens this close to expiry are treated as expired.
const EXPIRY_MARGIN_SECS: u64 = 60;

/// The `installed` or `web` section of a client secrets file.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(default)]
    pub redirect_uris: Vec<String>,
}

fn default_auth_uri() -> String {
    DEFAULT_AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

#[derive(Deserialize)]
struct ClientSecretsFile {
    installed: Option<ClientSecrets>,
    web: Option<ClientSecrets>,
}

impl ClientSecrets {
    /// Reads a client secrets file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingCredentials`] with the absolute path when the
    /// file does not exist, and [`Error::Auth`] when it has neither an
    /// `installed` nor a `web` section.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
            return Err(Error::MissingCredentials(absolute));
        }
        let file: ClientSecretsFile = serde_json::from_str(&fs::read_to_string(path)?)?;
        file.installed.or(file.web).ok_or_else(|| {
            Error::Auth(format!(
                "{} has no \"installed\" or \"web\" client section",
                path.display()
            ))
        })
    }

    fn redirect_uri(&self) -> &str {
        self.redirect_uris
            .first()
            .map_or(DEFAULT_REDIRECT_URI, String::as_str)
    }
}

/// A cached access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Expiry as seconds since the Unix epoch. `None` never expires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<u64>,
}

impl StoredToken {
    /// Reads a token file, returning `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        match fs::read_to_string(path) {
            Ok(contents) => Ok(Some(serde_json::from_str(&contents)?)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Writes the token file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn is_valid_at(&self, now: u64) -> bool {
        self.expires_at
            .is_none_or(|expires_at| now + EXPIRY_MARGIN_SECS < expires_at)
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// Obtains access tokens for one client, caching them in `token_path`.
#[derive(Debug, Clone)]
pub struct Authenticator {
    secrets: ClientSecrets,
    token_path: PathBuf,
    http: reqwest::Client,
}

impl Authenticator {
    pub fn new(secrets: ClientSecrets, token_path: impl Into<PathBuf>) -> Self {
        Self {
            secrets,
            token_path: token_path.into(),
            http: reqwest::Client::new(),
        }
    }

    /// Creates an authenticator from the credential and token paths in
    /// `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the client secrets file is missing or invalid.
    pub fn from_config(config: &Config) -> Result<Self> {
        let secrets = ClientSecrets::load(&config.credentials_path())?;
        Ok(Self::new(secrets, config.token_path()))
    }

    pub fn token_path(&self) -> &Path {
        &self.token_path
    }

    /// The consent page the user must visit to authorize this client.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Auth`] if the client's `auth_uri` is not a URL.
    pub fn authorization_url(&self) -> Result<reqwest::Url> {
        let mut url = reqwest::Url::parse(&self.secrets.auth_uri)
            .map_err(|err| Error::Auth(format!("invalid auth_uri: {err}")))?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.secrets.client_id)
            .append_pair("redirect_uri", self.secrets.redirect_uri())
            .append_pair("response_type", "code")
            .append_pair("scope", SPREADSHEETS_SCOPE)
            .append_pair("access_type", "offline")
            .append_pair("prompt", "consent");
        Ok(url)
    }

    /// Returns a usable access token.
    ///
    /// A cached token is reused while it is valid and refreshed once it has
    /// expired. Otherwise `prompt` is shown the consent URL and must return
    /// the authorization code, or the full URL the browser was redirected
    /// to. Any new token is written back to the token file.
    ///
    /// # Errors
    ///
    /// Returns an error if the token file is unreadable, the prompt fails, or
    /// the token endpoint rejects the request.
    pub async fn access_token<F>(&self, prompt: F) -> Result<String>
    where
        F: FnOnce(&reqwest::Url) -> Result<String>,
    {
        let cached = StoredToken::load(&self.token_path)?;

        let token = match cached {
            Some(token) if token.is_valid_at(now_unix()) => {
                debug!(path = %self.token_path.display(), "reusing cached token");
                return Ok(token.access_token);
            }
            Some(token) if token.refresh_token.is_some() => self.refresh(&token).await?,
            _ => {
                let input = prompt(&self.authorization_url()?)?;
                self.exchange_code(&extract_code(&input)?).await?
            }
        };

        token.save(&self.token_path)?;
        Ok(token.access_token)
    }

    /// Trades a refresh token for a new access token. The old refresh token
    /// is kept when the response does not carry a new one.
    ///
    /// # Errors
    ///
    /// Returns an error if `token` has no refresh token or the token
    /// endpoint rejects the request.
    pub async fn refresh(&self, token: &StoredToken) -> Result<StoredToken> {
        let refresh_token = token
            .refresh_token
            .as_deref()
            .ok_or_else(|| Error::Auth("token has no refresh token".to_string()))?;

        let mut refreshed = self
            .request_token(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
                ("client_id", self.secrets.client_id.as_str()),
                ("client_secret", self.secrets.client_secret.as_str()),
            ])
            .await?;
        if refreshed.refresh_token.is_none() {
            refreshed.refresh_token = Some(refresh_token.to_string());
        }

        info!("refreshed access token");
        Ok(refreshed)
    }

    /// Trades an authorization code for a token.
    ///
    /// # Errors
    ///
    /// Returns an error if the token endpoint rejects the code.
    pub async fn exchange_code(&self, code: &str) -> Result<StoredToken> {
        let token = self
            .request_token(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("client_id", self.secrets.client_id.as_str()),
                ("client_secret", self.secrets.client_secret.as_str()),
                ("redirect_uri", self.secrets.redirect_uri()),
            ])
            .await?;

        info!("authorization complete");
        Ok(token)
    }

    async fn request_token(&self, form: &[(&str, &str)]) -> Result<StoredToken> {
        debug!(url = %self.secrets.token_uri, "token request");
        let response = self
            .http
            .post(&self.secrets.token_uri)
            .form(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Auth(format!(
                "token endpoint returned {status}: {body}"
            )));
        }

        let response: TokenResponse = response.json().await?;
        Ok(StoredToken {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            expires_at: response.expires_in.map(|secs| now_unix() + secs),
        })
    }
}

/// Asks for the authorization code on the terminal.
///
/// # Errors
///
/// Returns an error if stdin cannot be read.
pub fn prompt_on_terminal(url: &reqwest::Url) -> Result<String> {
    let mut stderr = io::stderr().lock();
    writeln!(stderr, "Please visit this URL to authorize this application:")?;
    writeln!(stderr, "{url}")?;
    write!(stderr, "Enter the authorization code (or the full redirect URL): ")?;
    stderr.flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line)
}

/// Pulls the authorization code out of what the user pasted, which may be
/// the bare code or the URL the browser was redirected to.
///
/// # Errors
///
/// Returns [`Error::Auth`] for empty input, a redirect carrying an `error`
/// parameter, or a URL without a `code`.
pub fn extract_code(input: &str) -> Result<String> {
    let input = input.trim();
    if input.is_empty() {
        return Err(Error::Auth("no authorization code entered".to_string()));
    }

    let Ok(url) = reqwest::Url::parse(input) else {
        return Ok(input.to_string());
    };
    let mut code = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "error" => return Err(Error::Auth(format!("authorization denied: {value}"))),
            _ => {}
        }
    }
    code.ok_or_else(|| Error::Auth(format!("no code parameter in {input}")))
}

fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_secs())
}
