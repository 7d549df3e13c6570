use std::{sync::Arc, time::Duration};

use tracing::{debug, error, info};

use super::{error::Error, token::TokenCredential, Result};

/// Security plugin endpoint used only to check reachability and auth.
pub const ACCOUNT_PATH: &str = "/_plugins/_security/api/account";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait AccountDriven: Send + Sync {
    /// Issues a GET to `url`. Transport failures come back as
    /// [`super::error::Error::Transport`], any received response is `Ok`.
    async fn get(&self, url: &str, authorization: Option<String>) -> Result<AccountResponse>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountResponse {
    pub status: u16,
    pub body: String,
}
impl AccountResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TlsVerification {
    #[default]
    Verify,
    /// Only for trusted test environments with self-signed certificates.
    DangerAcceptInvalidCerts,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationResult {
    Authenticated { status: u16 },
    Rejected { status: u16, body: String },
    Unreachable { message: String },
}
impl VerificationResult {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Authenticated { status } | Self::Rejected { status, .. } => Some(*status),
            Self::Unreachable { .. } => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Authenticated { .. } => None,
            Self::Rejected { body, .. } => Some(body),
            Self::Unreachable { message } => Some(message),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Authenticated { .. } => "authenticated",
            Self::Rejected { .. } => "rejected",
            Self::Unreachable { .. } => "unreachable",
        }
    }
}

/// Trailing slashes are trimmed from `host_url` before the path is appended.
pub fn account_url(host_url: &str) -> String {
    format!("{}{ACCOUNT_PATH}", host_url.trim_end_matches('/'))
}

#[derive(Clone)]
pub struct ConnectionVerifier {
    account: Arc<dyn AccountDriven>,
}
impl ConnectionVerifier {
    pub fn new(account: Arc<dyn AccountDriven>) -> Self {
        Self { account }
    }

    /// Single attempt, never retried. The credential is attached as is, its
    /// expiry is the caller's concern.
    pub async fn verify(
        &self,
        host_url: &str,
        credential: Option<&TokenCredential>,
    ) -> VerificationResult {
        let url = account_url(host_url);
        let authorization = credential.map(TokenCredential::authorization_header_value);

        let response = match self.account.get(&url, authorization).await {
            Ok(response) => response,
            Err(Error::InvalidCredential(reason)) => {
                error!(url, reason, "credential cannot be sent, backend was not contacted");
                return VerificationResult::Unreachable {
                    message: Error::InvalidCredential(reason).to_string(),
                };
            }
            Err(err) => {
                error!(
                    url,
                    error = err.to_string(),
                    "connection to search backend could not be established"
                );
                return VerificationResult::Unreachable {
                    message: err.to_string(),
                };
            }
        };

        if response.is_success() {
            info!(url, status = response.status, "connection to search backend ok");
            return VerificationResult::Authenticated {
                status: response.status,
            };
        }

        error!(
            url,
            status = response.status,
            "search backend rejected the connection"
        );
        debug!(body = response.body.as_str(), "search backend rejection body");

        VerificationResult::Rejected {
            status: response.status,
            body: response.body,
        }
    }

    pub async fn is_connected(&self, host_url: &str, credential: Option<&TokenCredential>) -> bool {
        self.verify(host_url, credential).await.is_authenticated()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOST: &str = "https://search.example.com:9200";

    impl Default for AccountResponse {
        fn default() -> Self {
            Self {
                status: 200,
                body: r#"{"user_name":"admin","backend_roles":["admin"]}"#.into(),
            }
        }
    }

    fn credential() -> TokenCredential {
        TokenCredential::new("abc123", None)
    }

    #[test]
    fn it_should_build_account_url() {
        assert_eq!(
            account_url(HOST),
            "https://search.example.com:9200/_plugins/_security/api/account"
        );
        assert_eq!(account_url(&format!("{HOST}/")), account_url(HOST));
        assert_eq!(account_url(&format!("{HOST}//")), account_url(HOST));
    }

    #[tokio::test]
    async fn it_should_be_authenticated_on_success() {
        let mut account = MockAccountDriven::new();
        account
            .expect_get()
            .withf(|url, authorization| {
                url == account_url(HOST) && authorization.as_deref() == Some("Bearer abc123")
            })
            .return_once(|_, _| Ok(AccountResponse::default()));

        let verifier = ConnectionVerifier::new(Arc::new(account));
        let result = verifier.verify(HOST, Some(&credential())).await;

        assert_eq!(result, VerificationResult::Authenticated { status: 200 });
        assert_eq!(result.status(), Some(200));
        assert!(result.message().is_none());
    }

    #[tokio::test]
    async fn it_should_treat_any_2xx_as_authenticated() {
        let mut account = MockAccountDriven::new();
        account.expect_get().return_once(|_, _| {
            Ok(AccountResponse {
                status: 204,
                body: String::new(),
            })
        });

        let verifier = ConnectionVerifier::new(Arc::new(account));
        assert!(verifier.is_connected(HOST, Some(&credential())).await);
    }

    #[tokio::test]
    async fn it_should_be_rejected_on_unauthorized() {
        let mut account = MockAccountDriven::new();
        account.expect_get().return_once(|_, _| {
            Ok(AccountResponse {
                status: 401,
                body: "Unauthorized".into(),
            })
        });

        let verifier = ConnectionVerifier::new(Arc::new(account));
        let result = verifier.verify(HOST, Some(&credential())).await;

        assert_eq!(
            result,
            VerificationResult::Rejected {
                status: 401,
                body: "Unauthorized".into()
            }
        );
        assert_eq!(result.status(), Some(401));
        assert_eq!(result.message(), Some("Unauthorized"));
        assert!(!result.is_authenticated());
    }

    #[tokio::test]
    async fn it_should_be_rejected_on_server_error() {
        let mut account = MockAccountDriven::new();
        account.expect_get().return_once(|_, _| {
            Ok(AccountResponse {
                status: 503,
                body: "OpenSearch Security not initialized.".into(),
            })
        });

        let verifier = ConnectionVerifier::new(Arc::new(account));
        let result = verifier.verify(HOST, Some(&credential())).await;

        assert_eq!(result.kind(), "rejected");
        assert_eq!(result.status(), Some(503));
    }

    #[tokio::test]
    async fn it_should_be_unreachable_on_transport_error() {
        let mut account = MockAccountDriven::new();
        account
            .expect_get()
            .return_once(|_, _| Err(Error::Transport("connection refused".into())));

        let verifier = ConnectionVerifier::new(Arc::new(account));
        let result = verifier.verify(HOST, Some(&credential())).await;

        assert_eq!(
            result,
            VerificationResult::Unreachable {
                message: "connection refused".into()
            }
        );
        assert!(result.status().is_none());
    }

    #[tokio::test]
    async fn it_should_report_malformed_credential_distinctly() {
        let mut account = MockAccountDriven::new();
        account.expect_get().return_once(|_, _| {
            Err(Error::InvalidCredential(
                "token is not a valid header value".into(),
            ))
        });

        let verifier = ConnectionVerifier::new(Arc::new(account));
        let result = verifier
            .verify(HOST, Some(&TokenCredential::new("abc\ndef", None)))
            .await;

        assert_eq!(
            result,
            VerificationResult::Unreachable {
                message: "invalid credential: token is not a valid header value".into()
            }
        );
    }

    #[tokio::test]
    async fn it_should_omit_authorization_without_credential() {
        let mut account = MockAccountDriven::new();
        account
            .expect_get()
            .withf(|_, authorization| authorization.is_none())
            .return_once(|_, _| Ok(AccountResponse::default()));

        let verifier = ConnectionVerifier::new(Arc::new(account));
        let result = verifier.verify(HOST, None).await;

        assert!(result.is_authenticated());
    }

    #[tokio::test]
    async fn it_should_attach_expired_credential_as_is() {
        let expired = TokenCredential::new("old", chrono::DateTime::from_timestamp(0, 0));

        let mut account = MockAccountDriven::new();
        account
            .expect_get()
            .withf(|_, authorization| authorization.as_deref() == Some("Bearer old"))
            .return_once(|_, _| {
                Ok(AccountResponse {
                    status: 401,
                    body: String::new(),
                })
            });

        let verifier = ConnectionVerifier::new(Arc::new(account));
        let result = verifier.verify(HOST, Some(&expired)).await;

        assert_eq!(result.status(), Some(401));
    }

    #[tokio::test]
    async fn it_should_classify_repeated_calls_the_same() {
        let mut account = MockAccountDriven::new();
        account
            .expect_get()
            .times(2)
            .returning(|_, _| Ok(AccountResponse::default()));

        let verifier = ConnectionVerifier::new(Arc::new(account));
        let first = verifier.verify(HOST, Some(&credential())).await;
        let second = verifier.verify(HOST, Some(&credential())).await;

        assert_eq!(first, second);
    }
}
