use serde::Deserialize;
use url::Url;

use super::{AuthTokens, IdentityError};

const FEDERATED_SCOPE: &str = "aws.cognito.signin.user.admin email openid";

/// `{domain}/oauth2/authorize` URL that starts a federated sign-in
pub fn authorize_url(
    domain: &str,
    client_id: &str,
    redirect_uri: &str,
    provider: &str,
) -> Result<String, IdentityError> {
    let mut url = endpoint(domain, "oauth2/authorize")?;
    url.query_pairs_mut()
        .append_pair("identity_provider", provider)
        .append_pair("redirect_uri", redirect_uri)
        .append_pair("response_type", "CODE")
        .append_pair("client_id", client_id)
        .append_pair("scope", FEDERATED_SCOPE);
    Ok(url.into())
}

pub fn token_url(domain: &str) -> Result<String, IdentityError> {
    Ok(endpoint(domain, "oauth2/token")?.into())
}

fn endpoint(domain: &str, path: &str) -> Result<Url, IdentityError> {
    if domain.is_empty() {
        return Err(IdentityError::Misconfigured("COGNITO_DOMAIN is not set".into()));
    }
    let base = Url::parse(domain)
        .map_err(|e| IdentityError::Misconfigured(format!("invalid hosted UI domain '{}': {}", domain, e)))?;
    base.join(path)
        .map_err(|e| IdentityError::Misconfigured(format!("invalid hosted UI path: {}", e)))
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    pub id_token: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
}

impl From<TokenResponse> for AuthTokens {
    fn from(tokens: TokenResponse) -> Self {
        AuthTokens {
            access_token: tokens.access_token,
            id_token: tokens.id_token,
            refresh_token: tokens.refresh_token,
            expires_in: tokens.expires_in,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenErrorResponse {
    pub error: String,
    pub error_description: Option<String>,
}
