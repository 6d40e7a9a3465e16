//! Google Cloud IAM client for service-account keys.
//!
//! Only the two calls the `create` command needs are implemented: uploading a
//! public key certificate and reading the service account's unique id.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;
use crate::error::{Result, SakeError};

const METADATA_TOKEN_PATH: &str = "computeMetadata/v1/instance/service-accounts/default/token";

/// Fully-qualified resource name of a service account.
pub fn service_account_name(project_id: &str, email: &str) -> String {
    format!("projects/{project_id}/serviceAccounts/{email}")
}

/// Strips the `{sa_name}/keys/` prefix from a key resource name.
pub fn key_id_from_name(sa_name: &str, key_name: &str) -> String {
    let prefix = format!("{sa_name}/keys/");
    key_name
        .strip_prefix(&prefix)
        .unwrap_or(key_name)
        .to_string()
}

/// Operations against the cloud identity service.
#[async_trait]
pub trait KeyUploader: Send + Sync {
    /// Registers a base64-encoded PEM certificate as a key of `sa_name` and
    /// returns the new key id.
    async fn upload_public_key(&self, sa_name: &str, public_key_data: &str) -> Result<String>;

    /// Returns the numeric unique id of `sa_name`.
    async fn service_account_unique_id(&self, sa_name: &str) -> Result<String>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadServiceAccountKeyRequest<'a> {
    public_key_data: &'a str,
}

#[derive(Debug, Deserialize)]
struct ServiceAccountKey {
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServiceAccount {
    unique_id: String,
}

#[derive(Debug, Deserialize)]
struct MetadataToken {
    access_token: String,
}

/// IAM v1 REST client.
pub struct IamClient {
    client: Client,
    endpoint: String,
    access_token: Option<String>,
    metadata_token_url: String,
}

impl IamClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| SakeError::UploadError(format!("failed to initiate IAM client: {e}")))?;

        Ok(Self {
            client,
            endpoint: config.iam_endpoint.clone(),
            access_token: config.access_token.clone(),
            metadata_token_url: format!("http://{}/{METADATA_TOKEN_PATH}", config.metadata_host),
        })
    }

    async fn bearer_token(&self) -> Result<String> {
        if let Some(token) = &self.access_token {
            return Ok(token.clone());
        }

        debug!("fetching access token from metadata server");
        let token: MetadataToken = self
            .client
            .get(&self.metadata_token_url)
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| SakeError::UploadError(format!("failed to obtain access token: {e}")))?
            .json()
            .await
            .map_err(|e| SakeError::UploadError(format!("invalid access token response: {e}")))?;
        Ok(token.access_token)
    }
}

#[async_trait]
impl KeyUploader for IamClient {
    async fn upload_public_key(&self, sa_name: &str, public_key_data: &str) -> Result<String> {
        let url = format!("{}/{sa_name}/keys:upload", self.endpoint);
        debug!(%url, "uploading public key");

        let key: ServiceAccountKey = self
            .client
            .post(&url)
            .bearer_auth(self.bearer_token().await?)
            .json(&UploadServiceAccountKeyRequest { public_key_data })
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                SakeError::UploadError(format!("failed to upload key to service account: {e}"))
            })?
            .json()
            .await
            .map_err(|e| SakeError::UploadError(format!("invalid upload response: {e}")))?;

        Ok(key_id_from_name(sa_name, &key.name))
    }

    async fn service_account_unique_id(&self, sa_name: &str) -> Result<String> {
        let url = format!("{}/{sa_name}", self.endpoint);
        debug!(%url, "reading service account");

        let account: ServiceAccount = self
            .client
            .get(&url)
            .bearer_auth(self.bearer_token().await?)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| SakeError::UploadError(format!("getting service account: {e}")))?
            .json()
            .await
            .map_err(|e| {
                SakeError::UploadError(format!("invalid service account response: {e}"))
            })?;

        Ok(account.unique_id)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    use super::*;

    const SA_NAME: &str = "projects/p/serviceAccounts/sa@p.iam.gserviceaccount.com";

    /// Canned answer for requests whose request line starts with `method` and
    /// contains `path`.
    struct Route {
        method: &'static str,
        path: &'static str,
        status: u16,
        body: &'static str,
    }

    type Requests = Arc<Mutex<Vec<String>>>;

    /// Serves `routes` on a loopback port, one request per connection.
    /// Returns the `host:port` and the raw requests received so far.
    async fn serve(routes: Vec<Route>) -> (String, Requests) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let requests = Requests::default();
        let routes = Arc::new(routes);

        let seen = requests.clone();
        tokio::spawn(async move {
            loop {
                let Ok((mut stream, _)) = listener.accept().await else {
                    return;
                };
                let routes = routes.clone();
                let seen = seen.clone();
                tokio::spawn(async move {
                    let request = read_request(&mut stream).await;
                    let request_line = request.lines().next().unwrap_or_default().to_string();
                    seen.lock().unwrap().push(request);

                    let (status, body) = routes
                        .iter()
                        .find(|r| {
                            request_line.starts_with(&format!("{} ", r.method))
                                && request_line.contains(r.path)
                        })
                        .map_or((404, "{}"), |r| (r.status, r.body));
                    let response = format!(
                        "HTTP/1.1 {status} Canned\r\ncontent-type: application/json\r\n\
                         content-length: {}\r\nconnection: close\r\n\r\n{body}",
                        body.len()
                    );
                    let _ = stream.write_all(response.as_bytes()).await;
                    let _ = stream.shutdown().await;
                });
            }
        });

        (addr, requests)
    }

    async fn read_request(stream: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = stream.read(&mut chunk).await.unwrap_or(0);
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
                let body_len = head
                    .lines()
                    .find_map(|l| l.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + body_len {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    fn client(addr: &str, access_token: Option<&str>) -> IamClient {
        IamClient::new(&Config {
            access_token: access_token.map(str::to_string),
            iam_endpoint: format!("http://{addr}/v1"),
            metadata_host: addr.to_string(),
            ..Config::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_upload_public_key_returns_key_id() {
        let (addr, requests) = serve(vec![Route {
            method: "POST",
            path: "/keys:upload",
            status: 200,
            body: r#"{"name":"projects/p/serviceAccounts/sa@p.iam.gserviceaccount.com/keys/0a1b2c3d","keyAlgorithm":"KEY_ALG_RSA_2048"}"#,
        }])
        .await;

        let key_id = client(&addr, Some("ya29.static"))
            .upload_public_key(SA_NAME, "LS0t")
            .await
            .unwrap();
        assert_eq!(key_id, "0a1b2c3d");

        let requests = requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert!(request.starts_with(&format!("POST /v1/{SA_NAME}/keys:upload ")));
        assert!(request.to_lowercase().contains("authorization: bearer ya29.static"));
        assert!(request.contains(r#"{"publicKeyData":"LS0t"}"#));
    }

    #[tokio::test]
    async fn test_token_falls_back_to_metadata_server() {
        let (addr, requests) = serve(vec![
            Route {
                method: "GET",
                path: "/default/token",
                status: 200,
                body: r#"{"access_token":"ya29.metadata","expires_in":3599,"token_type":"Bearer"}"#,
            },
            Route {
                method: "GET",
                path: "/v1/projects/p/serviceAccounts/",
                status: 200,
                body: r#"{"name":"projects/p/serviceAccounts/sa@p","uniqueId":"112233445566"}"#,
            },
        ])
        .await;

        let unique_id = client(&addr, None)
            .service_account_unique_id(SA_NAME)
            .await
            .unwrap();
        assert_eq!(unique_id, "112233445566");

        let requests = requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].starts_with(&format!("GET /{METADATA_TOKEN_PATH} ")));
        assert!(requests[0].to_lowercase().contains("metadata-flavor: google"));
        assert!(
            requests[1]
                .to_lowercase()
                .contains("authorization: bearer ya29.metadata")
        );
    }

    #[tokio::test]
    async fn test_error_status_is_an_upload_error() {
        let (addr, _) = serve(vec![Route {
            method: "POST",
            path: "/keys:upload",
            status: 403,
            body: r#"{"error":{"code":403,"message":"Permission denied"}}"#,
        }])
        .await;

        let err = client(&addr, Some("ya29.static"))
            .upload_public_key(SA_NAME, "LS0t")
            .await
            .unwrap_err();
        match err {
            SakeError::UploadError(message) => {
                assert!(message.starts_with("failed to upload key to service account"))
            }
            other => panic!("expected UploadError, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_metadata_server_is_an_upload_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);

        let err = client(&addr, None)
            .service_account_unique_id(SA_NAME)
            .await
            .unwrap_err();
        match err {
            SakeError::UploadError(message) => {
                assert!(message.starts_with("failed to obtain access token"))
            }
            other => panic!("expected UploadError, got {other:?}"),
        }
    }

    #[test]
    fn test_service_account_name() {
        assert_eq!(
            service_account_name("my-project", "sa@my-project.iam.gserviceaccount.com"),
            "projects/my-project/serviceAccounts/sa@my-project.iam.gserviceaccount.com"
        );
    }

    #[test]
    fn test_key_id_from_name() {
        let sa = service_account_name("p", "sa@p.iam.gserviceaccount.com");
        assert_eq!(
            key_id_from_name(&sa, &format!("{sa}/keys/0123456789abcdef")),
            "0123456789abcdef"
        );
        assert_eq!(key_id_from_name(&sa, "unexpected"), "unexpected");
    }

    #[test]
    fn test_upload_request_shape() {
        let body = serde_json::to_value(UploadServiceAccountKeyRequest {
            public_key_data: "LS0t",
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({ "publicKeyData": "LS0t" }));
    }

    #[test]
    fn test_service_account_response_parsing() {
        let account: ServiceAccount = serde_json::from_str(
            r#"{"name":"projects/p/serviceAccounts/sa@p","uniqueId":"1234","email":"sa@p"}"#,
        )
        .unwrap();
        assert_eq!(account.unique_id, "1234");
    }
}
