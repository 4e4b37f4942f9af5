//! Hosted identity provider boundary.
//!
//! Handlers and the authorization gate only see [`IdentityGateway`]; the
//! production implementation talks to a Cognito user pool.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

pub mod cognito;
pub mod hosted_ui;
pub mod sigv4;

pub use cognito::CognitoGateway;

/// Canonical caller identity as reported by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub username: String,
}

#[derive(Debug, Clone)]
pub struct AuthTokens {
    pub access_token: String,
    pub id_token: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
}

/// Where a confirmation or reset code was sent (masked by the provider)
#[derive(Debug, Clone, Serialize)]
pub struct CodeDelivery {
    pub destination: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityOp {
    SignUp,
    ConfirmSignUp,
    SignIn,
    ResendCode,
    ForgotPassword,
    ResetPassword,
    ResolveToken,
    ExchangeCode,
    AddUserToGroup,
    ListGroupsForUser,
    ListGroups,
}

/// Provider-side reason for refusing a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectionKind {
    UsernameExists,
    InvalidParameter,
    InvalidPassword,
    CodeMismatch,
    ExpiredCode,
    NotAuthorized,
    UserNotConfirmed,
    UserNotFound,
    ResourceNotFound,
    LimitExceeded,
    TooManyRequests,
    InvalidGrant,
    Other(String),
}

impl RejectionKind {
    /// Accepts both bare and namespaced error types,
    /// e.g. `com.amazonaws.cognito#NotAuthorizedException`
    pub fn from_type(raw: &str) -> Self {
        let name = raw.rsplit('#').next().unwrap_or(raw);
        let name = name.split(':').next().unwrap_or(name);
        match name {
            "UsernameExistsException" => RejectionKind::UsernameExists,
            "InvalidParameterException" => RejectionKind::InvalidParameter,
            "InvalidPasswordException" => RejectionKind::InvalidPassword,
            "CodeMismatchException" => RejectionKind::CodeMismatch,
            "ExpiredCodeException" => RejectionKind::ExpiredCode,
            "NotAuthorizedException" => RejectionKind::NotAuthorized,
            "UserNotConfirmedException" => RejectionKind::UserNotConfirmed,
            "UserNotFoundException" => RejectionKind::UserNotFound,
            "ResourceNotFoundException" => RejectionKind::ResourceNotFound,
            "LimitExceededException" => RejectionKind::LimitExceeded,
            "TooManyRequestsException" | "TooManyFailedAttemptsException" => RejectionKind::TooManyRequests,
            "invalid_grant" => RejectionKind::InvalidGrant,
            other => RejectionKind::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Error)]
pub enum IdentityError {
    /// The provider answered and refused; `message` is user-facing
    #[error("{message}")]
    Rejected { kind: RejectionKind, message: String },

    #[error("identity provider unavailable: {0}")]
    Unavailable(String),

    #[error("identity provider misconfigured: {0}")]
    Misconfigured(String),
}

impl IdentityError {
    pub fn rejected(kind: RejectionKind, message: impl Into<String>) -> Self {
        IdentityError::Rejected { kind, message: message.into() }
    }

    /// Build a rejection with the localized text for this operation
    pub fn localized(op: IdentityOp, kind: RejectionKind, provider_message: &str) -> Self {
        let message = localized_message(op, &kind)
            .map(String::from)
            .unwrap_or_else(|| provider_message.to_string());
        IdentityError::Rejected { kind, message }
    }
}

/// Indonesian user-facing text for the rejections clients are expected to show
pub fn localized_message(op: IdentityOp, kind: &RejectionKind) -> Option<&'static str> {
    use IdentityOp as Op;
    use RejectionKind as K;

    let text = match (op, kind) {
        (Op::SignUp, K::UsernameExists) => {
            "akun dengan email yang ingin didaftarkan telah ada, jika lupa password silahkan klik lupa password"
        }
        (Op::SignUp, K::InvalidParameter) => "username harus berupa email",
        (Op::SignUp, K::InvalidPassword) | (Op::ResetPassword, K::InvalidPassword) => {
            "password tidak memenuhi ketentuan keamanan"
        }
        (Op::ConfirmSignUp, K::ExpiredCode) => "kode telah expire, silahkan request kode konfirmasi kembali",
        (Op::ConfirmSignUp, K::CodeMismatch) => "kode verifikasi gagal, silahkan cek kembali pesan di email anda",
        (Op::SignIn, K::NotAuthorized) => "nama pengguna atau password kurang tepat",
        (Op::SignIn, K::UserNotConfirmed) => {
            "akun belum terkonfirmasi, silahkan cek kode konfirmasi didalam email"
        }
        (Op::SignIn, K::InvalidParameter) => "parameter tidak valid",
        (Op::ResetPassword, K::CodeMismatch) => {
            "kode verifikasi tidak cocok, silahkan request kode konfirmasi kembali"
        }
        (Op::ResetPassword, K::LimitExceeded) => {
            "maksimum pengulangan password hanya sampai 3x. Silahkan coba lagi untuk beberapa waktu"
        }
        (Op::ResetPassword, K::ExpiredCode) => "kode verifikasi gagal, silahkan request lupa password kembali",
        (Op::ResetPassword, K::InvalidParameter) => "parameter tidak bisa dipakai, silahkan ubah parameternya",
        (Op::AddUserToGroup, K::ResourceNotFound) => "group tidak ada",
        (Op::ExchangeCode, K::InvalidGrant) => "kode otorisasi tidak valid atau sudah kedaluwarsa",
        (Op::ResolveToken, K::NotAuthorized) => "token tidak valid atau sudah kedaluwarsa",
        (_, K::UserNotFound) => "nama pengguna belum terdaftar",
        (_, K::LimitExceeded) | (_, K::TooManyRequests) => {
            "terlalu banyak percobaan, silahkan coba lagi beberapa saat lagi"
        }
        _ => return None,
    };
    Some(text)
}

/// Operations consumed from the hosted user directory
#[async_trait]
pub trait IdentityGateway: Send + Sync {
    async fn sign_up(&self, username: &str, password: &str) -> Result<CodeDelivery, IdentityError>;

    async fn confirm_sign_up(&self, username: &str, code: &str) -> Result<(), IdentityError>;

    async fn sign_in(&self, username: &str, password: &str) -> Result<AuthTokens, IdentityError>;

    async fn resend_confirmation_code(&self, username: &str) -> Result<CodeDelivery, IdentityError>;

    async fn forgot_password(&self, username: &str) -> Result<CodeDelivery, IdentityError>;

    async fn confirm_forgot_password(
        &self,
        username: &str,
        password: &str,
        code: &str,
    ) -> Result<(), IdentityError>;

    /// Exchange an access token for the identity it was issued to
    async fn resolve_identity(&self, access_token: &str) -> Result<Identity, IdentityError>;

    /// Hosted-UI authorization code grant
    async fn exchange_authorization_code(&self, code: &str) -> Result<AuthTokens, IdentityError>;

    async fn add_user_to_group(&self, username: &str, group: &str) -> Result<(), IdentityError>;

    async fn list_groups_for_user(&self, username: &str) -> Result<Vec<String>, IdentityError>;

    async fn list_groups(&self) -> Result<Vec<String>, IdentityError>;

    /// Federated sign-in entry point for an external provider such as "Google"
    fn authorize_url(&self, provider: &str) -> Result<String, IdentityError>;
}
