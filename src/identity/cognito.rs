use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use reqwest::header::CONTENT_TYPE;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::hosted_ui::{self, TokenErrorResponse, TokenResponse};
use super::sigv4::{self, hmac_sha256, AwsCredentials, SigningRequest};
use super::{
    AuthTokens, CodeDelivery, Identity, IdentityError, IdentityGateway, IdentityOp, RejectionKind,
};
use crate::config::IdentityConfig;

const JSON_1_1: &str = "application/x-amz-json-1.1";
const TARGET_PREFIX: &str = "AWSCognitoIdentityProviderService";
const SERVICE: &str = "cognito-idp";
const PAGE_SIZE: u32 = 60;

/// Cognito user pool client built once at startup and shared by every request
pub struct CognitoGateway {
    http: reqwest::Client,
    host: String,
    region: String,
    client_id: String,
    client_secret: String,
    user_pool_id: String,
    domain: String,
    redirect_uri: String,
    credentials: Option<AwsCredentials>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CodeDeliveryResponse {
    code_delivery_details: Option<CodeDeliveryDetails>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CodeDeliveryDetails {
    destination: Option<String>,
}

impl From<CodeDeliveryResponse> for CodeDelivery {
    fn from(response: CodeDeliveryResponse) -> Self {
        CodeDelivery {
            destination: response
                .code_delivery_details
                .and_then(|details| details.destination)
                .unwrap_or_default(),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InitiateAuthResponse {
    authentication_result: Option<AuthenticationResult>,
    challenge_name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AuthenticationResult {
    access_token: String,
    id_token: Option<String>,
    refresh_token: Option<String>,
    expires_in: Option<i64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GetUserResponse {
    username: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GroupsPage {
    #[serde(default)]
    groups: Vec<Group>,
    next_token: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Group {
    group_name: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(rename = "__type")]
    error_type: Option<String>,
    #[serde(alias = "Message")]
    message: Option<String>,
}

impl CognitoGateway {
    pub fn new(config: &IdentityConfig) -> Result<Self, IdentityError> {
        config
            .validate()
            .map_err(|e| IdentityError::Misconfigured(e.to_string()))?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| IdentityError::Misconfigured(format!("http client: {}", e)))?;

        let credentials = match (&config.access_key_id, &config.secret_access_key) {
            (Some(access_key_id), Some(secret_access_key)) => Some(AwsCredentials {
                access_key_id: access_key_id.clone(),
                secret_access_key: secret_access_key.clone(),
                session_token: config.session_token.clone(),
            }),
            _ => {
                warn!("AWS credentials not set; group administration calls will fail");
                None
            }
        };

        Ok(Self {
            http,
            host: format!("cognito-idp.{}.amazonaws.com", config.region),
            region: config.region.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            user_pool_id: config.user_pool_id.clone(),
            domain: config.domain.clone(),
            redirect_uri: config.redirect_uri.clone(),
            credentials,
        })
    }

    /// base64(HMAC-SHA256(client_secret, username + client_id))
    fn secret_hash(&self, username: &str) -> String {
        secret_hash(&self.client_secret, username, &self.client_id)
    }

    /// Public app-client operation, authorized by client id + secret hash
    async fn call<T: DeserializeOwned>(
        &self,
        op: IdentityOp,
        action: &str,
        body: Value,
    ) -> Result<T, IdentityError> {
        self.send(op, action, body, false).await
    }

    /// Developer-authenticated operation, SigV4-signed with the service credentials
    async fn admin_call<T: DeserializeOwned>(
        &self,
        op: IdentityOp,
        action: &str,
        body: Value,
    ) -> Result<T, IdentityError> {
        self.send(op, action, body, true).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        op: IdentityOp,
        action: &str,
        body: Value,
        signed: bool,
    ) -> Result<T, IdentityError> {
        let target = format!("{}.{}", TARGET_PREFIX, action);
        let payload = serde_json::to_vec(&body)
            .map_err(|e| IdentityError::Misconfigured(format!("encode {}: {}", action, e)))?;

        let mut request = self
            .http
            .post(format!("https://{}/", self.host))
            .header(CONTENT_TYPE, JSON_1_1)
            .header("x-amz-target", &target);

        if signed {
            let credentials = self.credentials.as_ref().ok_or_else(|| {
                IdentityError::Misconfigured(format!("{} requires AWS credentials", action))
            })?;
            let signing = SigningRequest {
                region: &self.region,
                service: SERVICE,
                host: &self.host,
                content_type: JSON_1_1,
                target: &target,
                payload: &payload,
                timestamp: Utc::now(),
            };
            for (name, value) in sigv4::sign(credentials, &signing) {
                request = request.header(name, value);
            }
        }

        let response = request
            .body(payload)
            .send()
            .await
            .map_err(|e| IdentityError::Unavailable(format!("{}: {}", action, e)))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| IdentityError::Unavailable(format!("{}: {}", action, e)))?;

        if status.is_success() {
            return decode_success(action, &bytes);
        }

        if status.is_client_error() {
            let error: ErrorBody = serde_json::from_slice(&bytes).unwrap_or(ErrorBody {
                error_type: None,
                message: None,
            });
            let kind = RejectionKind::from_type(error.error_type.as_deref().unwrap_or_default());
            let message = error.message.unwrap_or_else(|| status.to_string());
            debug!("{} rejected: {:?} {}", action, kind, message);
            return Err(IdentityError::localized(op, kind, &message));
        }

        Err(IdentityError::Unavailable(format!("{} returned {}", action, status)))
    }

    async fn paged_groups(&self, op: IdentityOp, action: &str, mut body: Value) -> Result<Vec<String>, IdentityError> {
        let mut names = Vec::new();
        loop {
            let page: GroupsPage = self.admin_call(op, action, body.clone()).await?;
            names.extend(page.groups.into_iter().map(|group| group.group_name));
            match page.next_token {
                Some(token) => body["NextToken"] = json!(token),
                None => break,
            }
        }
        Ok(names)
    }
}

pub fn secret_hash(client_secret: &str, username: &str, client_id: &str) -> String {
    let message = format!("{}{}", username, client_id);
    STANDARD.encode(hmac_sha256(client_secret.as_bytes(), message.as_bytes()))
}

#[async_trait]
impl IdentityGateway for CognitoGateway {
    async fn sign_up(&self, username: &str, password: &str) -> Result<CodeDelivery, IdentityError> {
        let response: CodeDeliveryResponse = self
            .call(
                IdentityOp::SignUp,
                "SignUp",
                json!({
                    "ClientId": self.client_id,
                    "Username": username,
                    "Password": password,
                    "SecretHash": self.secret_hash(username),
                }),
            )
            .await?;
        Ok(response.into())
    }

    async fn confirm_sign_up(&self, username: &str, code: &str) -> Result<(), IdentityError> {
        let _: IgnoredAny = self
            .call(
                IdentityOp::ConfirmSignUp,
                "ConfirmSignUp",
                json!({
                    "ClientId": self.client_id,
                    "Username": username,
                    "ConfirmationCode": code,
                    "SecretHash": self.secret_hash(username),
                }),
            )
            .await?;
        Ok(())
    }

    async fn sign_in(&self, username: &str, password: &str) -> Result<AuthTokens, IdentityError> {
        let response: InitiateAuthResponse = self
            .call(
                IdentityOp::SignIn,
                "InitiateAuth",
                json!({
                    "ClientId": self.client_id,
                    "AuthFlow": "USER_PASSWORD_AUTH",
                    "AuthParameters": {
                        "USERNAME": username,
                        "PASSWORD": password,
                        "SECRET_HASH": self.secret_hash(username),
                    },
                }),
            )
            .await?;

        match response.authentication_result {
            Some(result) => Ok(AuthTokens {
                access_token: result.access_token,
                id_token: result.id_token,
                refresh_token: result.refresh_token,
                expires_in: result.expires_in,
            }),
            // MFA and forced password changes are not supported by this API
            None => Err(IdentityError::rejected(
                RejectionKind::NotAuthorized,
                format!(
                    "challenge {} tidak didukung",
                    response.challenge_name.unwrap_or_else(|| "unknown".into())
                ),
            )),
        }
    }

    async fn resend_confirmation_code(&self, username: &str) -> Result<CodeDelivery, IdentityError> {
        let response: CodeDeliveryResponse = self
            .call(
                IdentityOp::ResendCode,
                "ResendConfirmationCode",
                json!({
                    "ClientId": self.client_id,
                    "Username": username,
                    "SecretHash": self.secret_hash(username),
                }),
            )
            .await?;
        Ok(response.into())
    }

    async fn forgot_password(&self, username: &str) -> Result<CodeDelivery, IdentityError> {
        let response: CodeDeliveryResponse = self
            .call(
                IdentityOp::ForgotPassword,
                "ForgotPassword",
                json!({
                    "ClientId": self.client_id,
                    "Username": username,
                    "SecretHash": self.secret_hash(username),
                }),
            )
            .await?;
        Ok(response.into())
    }

    async fn confirm_forgot_password(
        &self,
        username: &str,
        password: &str,
        code: &str,
    ) -> Result<(), IdentityError> {
        let _: IgnoredAny = self
            .call(
                IdentityOp::ResetPassword,
                "ConfirmForgotPassword",
                json!({
                    "ClientId": self.client_id,
                    "Username": username,
                    "Password": password,
                    "ConfirmationCode": code,
                    "SecretHash": self.secret_hash(username),
                }),
            )
            .await?;
        Ok(())
    }

    async fn resolve_identity(&self, access_token: &str) -> Result<Identity, IdentityError> {
        let response: GetUserResponse = self
            .call(IdentityOp::ResolveToken, "GetUser", json!({ "AccessToken": access_token }))
            .await?;
        Ok(Identity { username: response.username })
    }

    async fn exchange_authorization_code(&self, code: &str) -> Result<AuthTokens, IdentityError> {
        let url = hosted_ui::token_url(&self.domain)?;
        let form = [
            ("grant_type", "authorization_code"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("code", code),
            ("redirect_uri", self.redirect_uri.as_str()),
        ];

        let response = self
            .http
            .post(url)
            .form(&form)
            .send()
            .await
            .map_err(|e| IdentityError::Unavailable(format!("token exchange: {}", e)))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| IdentityError::Unavailable(format!("token exchange: {}", e)))?;

        if status.is_success() {
            let tokens: TokenResponse = serde_json::from_slice(&bytes).map_err(|e| {
                IdentityError::Unavailable(format!("token exchange: unexpected response: {}", e))
            })?;
            return Ok(tokens.into());
        }

        if status.is_client_error() {
            let (kind, message) = match serde_json::from_slice::<TokenErrorResponse>(&bytes) {
                Ok(body) => (
                    RejectionKind::from_type(&body.error),
                    body.error_description.unwrap_or(body.error),
                ),
                Err(_) => (RejectionKind::InvalidGrant, status.to_string()),
            };
            return Err(IdentityError::localized(IdentityOp::ExchangeCode, kind, &message));
        }

        Err(IdentityError::Unavailable(format!("token exchange returned {}", status)))
    }

    async fn add_user_to_group(&self, username: &str, group: &str) -> Result<(), IdentityError> {
        let _: IgnoredAny = self
            .admin_call(
                IdentityOp::AddUserToGroup,
                "AdminAddUserToGroup",
                json!({
                    "UserPoolId": self.user_pool_id,
                    "Username": username,
                    "GroupName": group,
                }),
            )
            .await?;
        Ok(())
    }

    async fn list_groups_for_user(&self, username: &str) -> Result<Vec<String>, IdentityError> {
        self.paged_groups(
            IdentityOp::ListGroupsForUser,
            "AdminListGroupsForUser",
            json!({
                "UserPoolId": self.user_pool_id,
                "Username": username,
                "Limit": PAGE_SIZE,
            }),
        )
        .await
    }

    async fn list_groups(&self) -> Result<Vec<String>, IdentityError> {
        self.paged_groups(
            IdentityOp::ListGroups,
            "ListGroups",
            json!({
                "UserPoolId": self.user_pool_id,
                "Limit": PAGE_SIZE,
            }),
        )
        .await
    }

    fn authorize_url(&self, provider: &str) -> Result<String, IdentityError> {
        hosted_ui::authorize_url(&self.domain, &self.client_id, &self.redirect_uri, provider)
    }
}

/// Several admin actions answer 200 with an empty body; read that as `{}`
fn decode_success<T: DeserializeOwned>(action: &str, bytes: &[u8]) -> Result<T, IdentityError> {
    let body = if bytes.iter().all(u8::is_ascii_whitespace) { &b"{}"[..] } else { bytes };
    serde_json::from_slice(body)
        .map_err(|e| IdentityError::Unavailable(format!("{}: unexpected response: {}", action, e)))
}
