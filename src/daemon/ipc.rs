//! IPC server for the break-lock daemon.
//!
//! Unix Domain Socket server speaking single-shot JSON:
//! - One request per connection, one response back
//! - Requests are dispatched onto the mode state machine
//! - Read timeouts so a stalled client cannot wedge the daemon

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tokio::time::{timeout, Duration};

use crate::types::{IpcRequest, IpcResponse};

use super::machine::ModeStateMachine;

// ============================================================================
// Constants
// ============================================================================

/// Default socket path
pub const DEFAULT_SOCKET_PATH: &str = "~/.pomolock/pomolock.sock";

/// Maximum request size in bytes (4KB)
const MAX_REQUEST_SIZE: usize = 4096;

/// Read timeout in seconds
const READ_TIMEOUT_SECS: u64 = 5;

/// Resolves the default socket path against the home directory.
pub fn default_socket_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".pomolock")
        .join("pomolock.sock")
}

// ============================================================================
// IpcError
// ============================================================================

/// IPC-specific error types.
#[derive(Debug, thiserror::Error)]
pub enum IpcError {
    /// Socket binding error
    #[error("Failed to bind socket: {0}")]
    BindError(String),

    /// Read error
    #[error("Failed to read request: {0}")]
    ReadError(String),

    /// Write error
    #[error("Failed to write response: {0}")]
    WriteError(String),

    /// Timeout error
    #[error("Operation timed out")]
    Timeout,

    /// Request too large
    #[error("Request too large (max {MAX_REQUEST_SIZE} bytes)")]
    RequestTooLarge,
}

// ============================================================================
// IpcServer
// ============================================================================

/// Unix Domain Socket IPC server.
pub struct IpcServer {
    /// Unix socket listener
    listener: UnixListener,
    /// Socket path (for cleanup)
    socket_path: PathBuf,
}

impl IpcServer {
    /// Creates a new IPC server bound to the specified socket path.
    ///
    /// If the socket file already exists, it will be removed before binding.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket cannot be bound.
    pub fn new(socket_path: &Path) -> Result<Self> {
        if socket_path.exists() {
            std::fs::remove_file(socket_path)
                .with_context(|| format!("Failed to remove existing socket: {:?}", socket_path))?;
        }

        if let Some(parent) = socket_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create socket directory: {:?}", parent))?;
        }

        let listener = UnixListener::bind(socket_path)
            .with_context(|| format!("Failed to bind Unix socket: {:?}", socket_path))?;

        Ok(Self {
            listener,
            socket_path: socket_path.to_path_buf(),
        })
    }

    /// Accepts an incoming client connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be accepted.
    pub async fn accept(&self) -> Result<UnixStream> {
        let (stream, _addr) = self
            .listener
            .accept()
            .await
            .context("Failed to accept connection")?;
        Ok(stream)
    }

    /// Receives and deserializes an IPC request from the stream.
    ///
    /// Applies a read timeout to prevent blocking indefinitely.
    ///
    /// # Errors
    ///
    /// Returns an error if reading or deserialization fails.
    pub async fn receive_request(stream: &mut UnixStream) -> Result<IpcRequest> {
        let mut buffer = vec![0u8; MAX_REQUEST_SIZE];

        let read_result = timeout(
            Duration::from_secs(READ_TIMEOUT_SECS),
            stream.read(&mut buffer),
        )
        .await;

        let n = match read_result {
            Ok(Ok(n)) => n,
            Ok(Err(e)) => return Err(IpcError::ReadError(e.to_string()).into()),
            Err(_) => return Err(IpcError::Timeout.into()),
        };

        if n == 0 {
            anyhow::bail!("Connection closed by client");
        }

        let request: IpcRequest = serde_json::from_slice(&buffer[..n])
            .with_context(|| "Failed to deserialize IPC request")?;

        Ok(request)
    }

    /// Serializes and sends an IPC response to the stream.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub async fn send_response(stream: &mut UnixStream, response: &IpcResponse) -> Result<()> {
        let json = serde_json::to_vec(response).context("Failed to serialize IPC response")?;

        stream
            .write_all(&json)
            .await
            .context("Failed to write response")?;
        stream.flush().await.context("Failed to flush response")?;

        Ok(())
    }

    /// Returns the socket path.
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }
}

impl Drop for IpcServer {
    fn drop(&mut self) {
        // Clean up socket file on drop
        let _ = std::fs::remove_file(&self.socket_path);
    }
}

// ============================================================================
// RequestHandler
// ============================================================================

/// Handles IPC requests by dispatching to the mode state machine.
///
/// The daemon runs single-threaded, so the machine is shared through
/// `Rc<RefCell<_>>` and every dispatch is a short synchronous borrow.
pub struct RequestHandler {
    /// Shared reference to the state machine
    machine: Rc<RefCell<ModeStateMachine>>,
}

impl RequestHandler {
    /// Creates a new request handler with the given state machine.
    pub fn new(machine: Rc<RefCell<ModeStateMachine>>) -> Self {
        Self { machine }
    }

    /// Handles an IPC request and returns the appropriate response.
    pub fn handle(&self, request: IpcRequest) -> IpcResponse {
        match request {
            IpcRequest::Start => self.dispatch("タイマーを開始しました", |m| m.start()),
            IpcRequest::Pause => self.dispatch("タイマーを一時停止しました", |m| m.pause()),
            IpcRequest::Stop => self.dispatch("タイマーを停止しました", |m| m.stop()),
            IpcRequest::Reset => self.dispatch("タイマーをリセットしました", |m| m.reset_timer()),
            IpcRequest::Break => {
                self.dispatch("休憩を開始しました", |m| m.start_break_manually())
            }
            IpcRequest::Dismiss { start_new } => {
                let message = if start_new {
                    "休憩を終了し、新しいサイクルを開始しました"
                } else {
                    "休憩を終了しました"
                };
                self.dispatch(message, |m| m.dismiss_break(start_new))
            }
            IpcRequest::Set { params } => {
                self.dispatch("設定を更新しました", |m| m.apply_config(&params))
            }
            IpcRequest::Status => {
                let machine = self.machine.borrow();
                IpcResponse::success("", Some(machine.status()))
            }
        }
    }

    /// Runs one operation on the machine and wraps the result.
    fn dispatch<F>(&self, success_message: &str, op: F) -> IpcResponse
    where
        F: FnOnce(&mut ModeStateMachine) -> Result<()>,
    {
        let mut machine = self.machine.borrow_mut();
        match op(&mut machine) {
            Ok(()) => IpcResponse::success(success_message, Some(machine.status())),
            Err(e) => IpcResponse::error(e.to_string()),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
