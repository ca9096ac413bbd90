// ABOUTME: Auth bootstrap for the change case org from environment variables
// ABOUTME: Parses sfdx auth URLs and exchanges the refresh token for an access token

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use url::Url;

use crate::constants::{env as env_names, urls};
use crate::error::{ChangeCaseError, Result};

/// Client id sfdx uses when an auth URL carries no explicit connected app
const DEFAULT_CLIENT_ID: &str = "PlatformCLI";

/// Credentials recovered from a `force://` auth URL
#[derive(Debug)]
pub struct SfdxAuthUrl {
    pub client_id: String,
    pub client_secret: Option<SecretString>,
    pub refresh_token: SecretString,
    pub instance_url: Url,
}

/// A resolved org session: everything the client needs to talk to the API
#[derive(Debug)]
pub struct OrgAuth {
    pub instance_url: Url,
    pub access_token: SecretString,
    /// Salesforce user id of the authenticated user, when known
    pub user_id: Option<String>,
}

/// Parse an sfdx auth URL of the form
/// `force://<clientId>:<clientSecret>:<refreshToken>@<instanceUrl>`.
/// The short form `force://<refreshToken>@<instanceUrl>` is also accepted.
pub fn parse_sfdx_auth_url(raw: &str) -> Result<SfdxAuthUrl> {
    let url = Url::parse(raw).map_err(|e| ChangeCaseError::Auth(format!("unparseable auth URL: {e}")))?;

    if url.scheme() != "force" {
        return Err(ChangeCaseError::Auth(format!(
            "expected force:// auth URL, got {}://",
            url.scheme()
        )));
    }

    let host = url
        .host_str()
        .ok_or_else(|| ChangeCaseError::Auth("auth URL has no instance host".to_string()))?;
    let instance_url = Url::parse(&format!("https://{host}"))
        .map_err(|e| ChangeCaseError::Auth(format!("invalid instance host: {e}")))?;

    let username = url.username();
    if username.is_empty() {
        return Err(ChangeCaseError::Auth(
            "auth URL carries no refresh token".to_string(),
        ));
    }

    match url.password() {
        // force://clientId:clientSecret:refreshToken@host
        // The password part holds "clientSecret:refreshToken"; the secret may be empty.
        Some(password) => {
            let (secret, token) = password
                .split_once(':')
                .ok_or_else(|| ChangeCaseError::Auth("auth URL is missing the refresh token".to_string()))?;
            if token.is_empty() {
                return Err(ChangeCaseError::Auth(
                    "auth URL is missing the refresh token".to_string(),
                ));
            }
            Ok(SfdxAuthUrl {
                client_id: username.to_string(),
                client_secret: if secret.is_empty() {
                    None
                } else {
                    Some(SecretString::new(secret.to_string().into_boxed_str()))
                },
                refresh_token: SecretString::new(token.to_string().into_boxed_str()),
                instance_url,
            })
        }
        // force://refreshToken@host
        None => Ok(SfdxAuthUrl {
            client_id: DEFAULT_CLIENT_ID.to_string(),
            client_secret: None,
            refresh_token: SecretString::new(username.to_string().into_boxed_str()),
            instance_url,
        }),
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    instance_url: String,
    /// Identity URL, e.g. `https://login.salesforce.com/id/<orgId>/<userId>`
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    error_description: Option<String>,
}

/// Exchange the refresh token from an auth URL for a live access token.
pub async fn exchange_refresh_token(auth: &SfdxAuthUrl) -> Result<OrgAuth> {
    let token_url = auth
        .instance_url
        .join(urls::OAUTH_TOKEN_PATH)
        .map_err(|e| ChangeCaseError::Auth(e.to_string()))?;

    let mut form = vec![
        ("grant_type", "refresh_token".to_string()),
        ("client_id", auth.client_id.clone()),
        ("refresh_token", auth.refresh_token.expose_secret().to_string()),
    ];
    if let Some(secret) = &auth.client_secret {
        form.push(("client_secret", secret.expose_secret().to_string()));
    }

    let client = reqwest::Client::builder()
        .timeout(crate::constants::timeouts::HTTP_REQUEST_TIMEOUT)
        .build()?;
    let response = client.post(token_url).form(&form).send().await?;

    if !response.status().is_success() {
        let err: TokenErrorResponse = response.json().await?;
        return Err(ChangeCaseError::Auth(format!(
            "token exchange failed: {} {}",
            err.error,
            err.error_description.unwrap_or_default()
        )));
    }

    let token: TokenResponse = response.json().await?;
    let instance_url = Url::parse(&token.instance_url)
        .map_err(|e| ChangeCaseError::Auth(format!("invalid instance_url in token response: {e}")))?;

    Ok(OrgAuth {
        instance_url,
        access_token: SecretString::new(token.access_token.into_boxed_str()),
        user_id: token.id.as_deref().and_then(user_id_from_identity_url),
    })
}

/// The identity URL's last path segment is the user id.
fn user_id_from_identity_url(identity: &str) -> Option<String> {
    identity
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
}

/// Resolve org credentials from the environment.
///
/// `SF_CHANGE_CASE_ACCESS_TOKEN` + `SF_CHANGE_CASE_INSTANCE_URL` short-circuit
/// the token exchange (testing mode); otherwise `SF_CHANGE_CASE_SFDX_AUTH_URL`
/// is parsed and exchanged (CI mode).
pub async fn org_auth_from_env() -> Result<OrgAuth> {
    let access_token_var = env_names::full_name("ACCESS_TOKEN");
    let instance_url_var = env_names::full_name("INSTANCE_URL");

    if let (Ok(token), Ok(instance)) = (
        std::env::var(&access_token_var),
        std::env::var(&instance_url_var),
    ) {
        let instance_url = Url::parse(&instance)
            .map_err(|e| ChangeCaseError::Auth(format!("invalid {instance_url_var}: {e}")))?;
        return Ok(OrgAuth {
            instance_url,
            access_token: SecretString::new(token.into_boxed_str()),
            user_id: std::env::var(env_names::full_name("USER_ID")).ok(),
        });
    }

    let auth_url_var = env_names::full_name("SFDX_AUTH_URL");
    let raw = std::env::var(&auth_url_var)
        .map_err(|_| ChangeCaseError::MissingEnvVar(auth_url_var))?;
    let parsed = parse_sfdx_auth_url(&raw)?;
    exchange_refresh_token(&parsed).await
}
