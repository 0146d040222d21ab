//! One-shot HTTP listener that catches the OAuth redirect for the CLI.

use crate::error::{AuthError, AuthResult};
use reqwest::Url;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::debug;

const CALLBACK_PATH: &str = "/oauth2/callback";

/// Listener bound to the loopback interface.
pub struct LoopbackReceiver {
    listener: TcpListener,
    path: String,
}

impl LoopbackReceiver {
    /// Bind `127.0.0.1:port`; port 0 picks a free one.
    pub async fn bind(port: u16) -> AuthResult<Self> {
        let listener = TcpListener::bind(("127.0.0.1", port)).await?;
        Ok(Self {
            listener,
            path: CALLBACK_PATH.to_string(),
        })
    }

    pub fn port(&self) -> AuthResult<u16> {
        Ok(self.listener.local_addr()?.port())
    }

    pub fn redirect_uri(&self) -> AuthResult<String> {
        Ok(format!("http://127.0.0.1:{}{}", self.port()?, self.path))
    }

    /// Wait for the browser, answer it, and return the authorization code.
    pub async fn receive(self, expected_state: &str) -> AuthResult<String> {
        let (mut stream, peer) = self.listener.accept().await?;
        debug!("OAuth callback connection from {}", peer);

        let mut buf = vec![0_u8; 8192];
        let n = stream.read(&mut buf).await?;
        if n == 0 {
            return Err(AuthError::Callback("empty callback request".to_string()));
        }

        let raw = String::from_utf8_lossy(&buf[..n]);
        let target = raw
            .lines()
            .next()
            .and_then(|line| line.split_whitespace().nth(1))
            .ok_or_else(|| AuthError::Callback("invalid request line".to_string()))?
            .to_string();

        let result = parse_callback(&target, &self.path, expected_state);
        let page = match &result {
            Ok(_) => "<h1>Signed in to Chat Jee</h1><p>You can close this tab and return to the terminal.</p>",
            Err(_) => "<h1>Sign-in failed</h1><p>Return to the terminal for details.</p>",
        };
        // Best effort; the browser may already be gone.
        let _ = write_http_ok(&mut stream, page).await;
        result
    }
}

async fn write_http_ok(stream: &mut TcpStream, body: &str) -> std::io::Result<()> {
    let body = format!("<html><body>{}</body></html>", body);
    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    );
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await
}

/// Validate a redirect request target (`/path?code=..&state=..`) and
/// return its code.
pub fn parse_callback(
    target: &str,
    expected_path: &str,
    expected_state: &str,
) -> AuthResult<String> {
    let url = Url::parse(&format!("http://127.0.0.1{}", target))
        .map_err(|e| AuthError::Callback(format!("cannot parse callback URI: {e}")))?;

    if url.path() != expected_path {
        return Err(AuthError::Callback(format!(
            "unexpected callback path: {}",
            url.path()
        )));
    }

    let mut code = None;
    let mut state = None;
    let mut error = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            _ => {}
        }
    }

    if let Some(error) = error {
        return Err(AuthError::Denied(error));
    }
    if state.as_deref() != Some(expected_state) {
        return Err(AuthError::StateMismatch);
    }
    code.ok_or_else(|| AuthError::Callback("callback did not include a code".to_string()))
}
