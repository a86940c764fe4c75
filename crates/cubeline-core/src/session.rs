//! HTTP session against an OData service root.
//!
//! Uses async reqwest internally on a shared tokio runtime, but presents a
//! sync interface so fetchers, trackers and publishers stay plain loops that
//! can run on rayon workers.

use std::sync::LazyLock;
use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};

use crate::error::FetchError;

/// Default connect timeout
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default timeout for a whole request/response cycle
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Shared tokio runtime for HTTP operations.
pub static SHARED_RUNTIME: LazyLock<tokio::runtime::Runtime> = LazyLock::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("failed to build tokio runtime")
});

/// Read side of a collection endpoint.
///
/// This is everything [`PagedFetcher`](crate::paging::PagedFetcher) and
/// [`ChangeTracker`](crate::tracking::ChangeTracker) know about the network.
pub trait Transport {
    /// GET `target` and return the body of a `200 OK` response.
    ///
    /// `target` is relative to the service root unless it is an absolute URL.
    /// `prefer` is sent as the `Prefer` header when present.
    fn get(&self, target: &str, prefer: Option<&str>, operation: &str)
        -> Result<String, FetchError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn get(
        &self,
        target: &str,
        prefer: Option<&str>,
        operation: &str,
    ) -> Result<String, FetchError> {
        (**self).get(target, prefer, operation)
    }
}

/// Connection settings for one service root
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub service_root: String,
    pub user: Option<String>,
    pub password: Option<String>,
    pub accept_invalid_certs: bool,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl SessionConfig {
    pub fn new(service_root: impl Into<String>) -> Self {
        Self {
            service_root: service_root.into(),
            user: None,
            password: None,
            accept_invalid_certs: false,
            connect_timeout: CONNECT_TIMEOUT,
            request_timeout: REQUEST_TIMEOUT,
        }
    }
}

/// Client bound to one service root, with a cookie store so a server session
/// established by [`Session::probe`] is reused by every later request.
pub struct Session {
    client: reqwest::Client,
    service_root: String,
    credentials: Option<(String, String)>,
}

impl Session {
    pub fn open(config: &SessionConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(|e| FetchError::from_reqwest("open session", &e))?;

        let credentials = config
            .user
            .as_ref()
            .map(|user| (user.clone(), config.password.clone().unwrap_or_default()));

        Ok(Self {
            client,
            service_root: normalize_root(&config.service_root),
            credentials,
        })
    }

    pub fn service_root(&self) -> &str {
        &self.service_root
    }

    /// Absolute URL for `target`
    pub fn url(&self, target: &str) -> String {
        resolve(&self.service_root, target)
    }

    /// First request of a session: GET with basic credentials (if configured)
    /// and `Accept: */*`, expecting `200 OK`. Returns the body as text.
    pub fn probe(&self, target: &str, operation: &str) -> Result<String, FetchError> {
        let url = self.url(target);
        log::debug!("GET {url}");
        let mut request = self.client.get(&url).header(ACCEPT, "*/*");
        if let Some((user, password)) = &self.credentials {
            request = request.basic_auth(user, Some(password));
        }
        execute(request, 200, operation)
    }

    /// POST a JSON `body`, expecting `expected` as response status.
    pub fn post(
        &self,
        target: &str,
        body: String,
        expected: u16,
        operation: &str,
    ) -> Result<String, FetchError> {
        let url = self.url(target);
        log::debug!("POST {url} ({} bytes)", body.len());
        log::trace!("{body}");
        let request = self
            .client
            .post(&url)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        execute(request, expected, operation)
    }
}

impl Transport for Session {
    fn get(
        &self,
        target: &str,
        prefer: Option<&str>,
        operation: &str,
    ) -> Result<String, FetchError> {
        let url = self.url(target);
        log::debug!("GET {url}");
        let mut request = self.client.get(&url).header(ACCEPT, "application/json");
        if let Some(prefer) = prefer {
            request = request.header("Prefer", prefer);
        }
        execute(request, 200, operation)
    }
}

/// Send on the shared runtime and check the status.
fn execute(
    request: reqwest::RequestBuilder,
    expected: u16,
    operation: &str,
) -> Result<String, FetchError> {
    SHARED_RUNTIME.handle().block_on(async {
        let response = request
            .header("OData-MaxVersion", "4.0")
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(operation, &e))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(operation, &e))?;
        log::trace!("HTTP {status}: {body}");
        if status != expected {
            return Err(FetchError::Status {
                operation: operation.to_string(),
                expected,
                actual: status,
                body,
            });
        }
        Ok(body)
    })
}

fn normalize_root(root: &str) -> String {
    if root.ends_with('/') {
        root.to_string()
    } else {
        format!("{root}/")
    }
}

/// Join `target` onto `root` unless it is already absolute
fn resolve(root: &str, target: &str) -> String {
    if target.starts_with("http://") || target.starts_with("https://") {
        target.to_string()
    } else {
        format!("{root}{}", target.trim_start_matches('/'))
    }
}
