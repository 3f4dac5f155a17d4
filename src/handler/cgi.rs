//! CGI gateway
//!
//! Runs `<exec> <script>` with a per-request environment and turns the
//! script's combined stdout/stderr into a response.
//!
//! Scripts may start their output with status and header lines:
//!
//! ```text
//! Status-Code: 302 Found
//! Location: /x
//!
//! body
//! ```
//!
//! Scanning stops at the first line that is neither; everything from there on
//! is the body.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::os::fd::OwnedFd;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::unix::pipe;
use tokio::process::Command;
use tokio::time::timeout;

use crate::config::{Config, LISTEN_HOST};
use crate::handler::error_page;
use crate::http::headers::Headers;
use crate::http::request::Request;
use crate::http::response::{Response, StatusCode};

/// Longest a script may run before it is killed.
pub const CGI_TIMEOUT: Duration = Duration::from_secs(30);

static STATUS_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Status-Code: (\d{3}) (.+)$").expect("status line pattern is valid")
});

static HEADER_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\S+): (\S.*)$").expect("header line pattern is valid"));

#[derive(Debug, Error)]
pub enum CgiError {
    #[error("failed to create output pipe: {0}")]
    Pipe(std::io::Error),

    #[error("failed to spawn {exec}: {source}")]
    Spawn {
        exec: String,
        source: std::io::Error,
    },

    #[error("script exited with {0}")]
    Exit(ExitStatus),

    #[error("script still running after {0:?}")]
    Timeout(Duration),

    #[error("failed to collect script output: {0}")]
    Io(#[from] std::io::Error),
}

/// Environment handed to a single script run.
///
/// Only keys with a non-empty value are present. The child gets exactly these
/// variables and nothing from the server's own environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CgiEnv {
    vars: BTreeMap<&'static str, String>,
}

impl CgiEnv {
    pub fn from_request(request: &Request, peer: SocketAddr, cfg: &Config) -> Self {
        let mut env = CgiEnv::default();

        env.set("HTTP_ACCEPT", request.header("Accept"));
        env.set("HTTP_HOST", request.header("Host"));
        env.set("HTTP_USER_AGENT", request.header("User-Agent"));
        env.set("HTTP_ACCEPT_ENCODING", request.header("Accept-Encoding"));
        env.set("REQUEST_METHOD", Some(request.method.as_str()));
        env.set("REQUEST_URI", Some(&request.target));
        env.set("QUERY_STRING", Some(request.query()));

        env.set("REMOTE_ADDRESS", Some(peer.ip().to_string()));
        env.set("REMOTE_PORT", Some(peer.port().to_string()));

        env.set("SERVER_ADDR", Some(LISTEN_HOST));
        env.set("SERVER_PORT", Some(cfg.port.to_string()));

        if let Some(body) = &request.body {
            env.set("CONTENT_TYPE", request.header("Content-Type"));
            env.set("CONTENT_LENGTH", Some(body.len().to_string()));
        }

        env
    }

    fn set<V: AsRef<str>>(&mut self, key: &'static str, value: Option<V>) {
        let Some(value) = value else {
            return;
        };

        let value = value.as_ref();
        if !value.is_empty() {
            self.vars.insert(key, value.to_string());
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.vars.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

/// What a script asked for, scraped from its output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CgiOutput {
    /// Code and message from a `Status-Code:` line
    pub status: Option<(StatusCode, String)>,
    pub headers: Headers,
    pub body: String,
}

impl CgiOutput {
    pub fn parse(output: &str) -> Self {
        let lines: Vec<&str> = output.split('\n').collect();

        let mut status = None;
        let mut headers = Headers::new();
        let mut scanned = 0;

        for &line in &lines {
            let line = line.strip_suffix('\r').unwrap_or(line);

            if let Some(caps) = STATUS_LINE.captures(line) {
                let code = caps[1].parse().ok().and_then(StatusCode::from_u16);
                if let Some(code) = code {
                    status = Some((code, caps[2].to_string()));
                    scanned += 1;
                    continue;
                }
            }

            match HEADER_LINE.captures(line) {
                Some(caps) => headers.insert(&caps[1], &caps[2]),
                None => break,
            }
            scanned += 1;
        }

        let mut body_start = scanned;
        if scanned > 0 && lines.get(scanned).is_some_and(|l| l.trim_end_matches('\r').is_empty()) {
            body_start += 1;
        }

        let body = lines.get(body_start..).map(|rest| rest.join("\n")).unwrap_or_default();

        Self {
            status,
            headers,
            body,
        }
    }

    pub fn into_response(self, request: &Request) -> std::io::Result<Response> {
        let builder = match self.status {
            Some((code, message)) => Response::new(code).reason(message),
            None => Response::new(StatusCode::OK),
        };

        Ok(builder
            .headers(&self.headers)
            .encoded_body(request, self.body.into_bytes())?
            .build())
    }
}

/// Runs `exec script` and returns everything it wrote to stdout and stderr.
///
/// Both streams share one pipe so their output interleaves as the script
/// wrote it. `stdin` is fed to the script when given. The run is killed once
/// `deadline` passes, and the read end of the pipe is closed with it, so a
/// process the script left behind cannot keep the server waiting. Output is
/// only returned for a zero exit status.
pub async fn run_script(
    exec: &Path,
    script: &Path,
    env: &CgiEnv,
    stdin: Option<&[u8]>,
    deadline: Duration,
) -> Result<String, CgiError> {
    let (reader, writer) = std::io::pipe().map_err(CgiError::Pipe)?;
    let stderr = writer.try_clone().map_err(CgiError::Pipe)?;
    let mut reader =
        pipe::Receiver::from_owned_fd(OwnedFd::from(reader)).map_err(CgiError::Pipe)?;

    let mut cmd = Command::new(exec);
    cmd.arg(script)
        .env_clear()
        .envs(env.iter())
        .stdin(if stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(writer)
        .stderr(stderr)
        .kill_on_drop(true);

    let mut child = cmd.spawn().map_err(|source| CgiError::Spawn {
        exec: exec.display().to_string(),
        source,
    })?;

    // The command still owns the write ends; the reader sees EOF only once
    // they and the child's copies are closed.
    drop(cmd);

    let input_pipe = child.stdin.take();

    let run = async {
        let feed = async {
            if let (Some(mut pipe), Some(input)) = (input_pipe, stdin) {
                if let Err(e) = pipe.write_all(input).await {
                    tracing::debug!(error = %e, "Script did not consume request body");
                }
            }
        };

        let collect = async {
            let mut output = Vec::new();
            reader.read_to_end(&mut output).await.map(|_| output)
        };

        let ((), output, status) = tokio::join!(feed, collect, child.wait());

        let status = status?;
        if !status.success() {
            return Err(CgiError::Exit(status));
        }

        Ok::<_, CgiError>(String::from_utf8_lossy(&output?).into_owned())
    };

    let result = timeout(deadline, run).await;
    match result {
        Ok(result) => result,
        Err(_) => {
            if let Err(e) = child.start_kill() {
                tracing::debug!(error = %e, "Failed to kill timed out script");
            }
            Err(CgiError::Timeout(deadline))
        }
    }
}

/// Runs `script` for `request` and builds the response from its output.
///
/// Any failure to run the script, or a non-zero exit, answers 500.
pub async fn serve(
    request: &Request,
    script: &Path,
    peer: SocketAddr,
    cfg: &Config,
) -> anyhow::Result<Response> {
    let env = CgiEnv::from_request(request, peer, cfg);
    let stdin = request.body.as_deref().map(str::as_bytes);

    let output = match run_script(&cfg.exec, script, &env, stdin, CGI_TIMEOUT).await {
        Ok(output) => output,
        Err(e) => {
            tracing::warn!(script = %script.display(), error = %e, "CGI script failed");
            return error_page::respond(StatusCode::INTERNAL_SERVER_ERROR, cfg).await;
        }
    };

    tracing::debug!(script = %script.display(), bytes = output.len(), "CGI script finished");

    Ok(CgiOutput::parse(&output).into_response(request)?)
}
