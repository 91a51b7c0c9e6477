//! Request/response surface
//!
//! A [`Request`] is one of a closed set of actions, decoded from JSON objects
//! tagged by an `"action"` field. The [`Dispatcher`] runs it against the
//! cipher engine and a [`HistoryStore`] and produces a [`Response`] shaped for
//! JSON clients:
//!
//! ```text
//! {"action":"encrypt","plaintext":"HELLO","key":"MONARCHY"}
//!   -> {"success":true,"result":"CFSUPM","matrix":[["M",...],...],"pairs":["HE","LX","LO"]}
//! {"action":"get_history"}
//!   -> {"success":true,"history":[{"type":"encrypt",...}]}
//! ```

use serde::{Deserialize, Serialize};

use crate::cipher::Direction;
use crate::engine::{self, CipherOutput};
use crate::error::{ErrorCategory, ErrorKind, PlayfairError, Result};
use crate::history::{HistoryEntry, HistoryStore};
use crate::matrix::Matrix;
use crate::pairing::Digraph;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Request {
    Encrypt {
        #[serde(default)]
        plaintext: String,
        #[serde(default)]
        key: String,
    },
    Decrypt {
        #[serde(default)]
        ciphertext: String,
        #[serde(default)]
        key: String,
    },
    /// Records an entry without running the cipher.
    SaveHistory {
        /// Sent as `type`. Only `"encrypt"` and `"decrypt"` are accepted: a
        /// missing or unrecognised `type` rejects the request as invalid
        /// instead of storing a free-form or empty label.
        #[serde(rename = "type")]
        direction: Direction,
        #[serde(default)]
        input: String,
        #[serde(default)]
        output: String,
        #[serde(default)]
        key: String,
    },
    GetHistory,
    ClearHistory,
}

impl Request {
    /// Decodes a request from a JSON object.
    pub fn from_json(json: &str) -> Result<Request> {
        serde_json::from_str(json).map_err(|e| {
            PlayfairError::with_kind_and_source(
                ErrorCategory::User,
                ErrorKind::InvalidRequest,
                format!("invalid request: {}", e),
                e,
            )
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Response {
    Cipher {
        success: bool,
        result: String,
        #[serde(serialize_with = "engine::serialize_matrix")]
        matrix: Option<Matrix>,
        pairs: Vec<Digraph>,
    },
    History {
        success: bool,
        history: Vec<HistoryEntry>,
    },
    Failed {
        success: bool,
        error: String,
    },
    Status {
        success: bool,
    },
}

impl Response {
    pub fn cipher(output: CipherOutput) -> Self {
        let CipherOutput {
            result,
            matrix,
            pairs,
        } = output;
        Response::Cipher {
            success: true,
            result,
            matrix,
            pairs,
        }
    }

    pub fn history(history: Vec<HistoryEntry>) -> Self {
        Response::History {
            success: true,
            history,
        }
    }

    /// A request that was understood but had nothing to work on.
    pub fn rejected() -> Self {
        Response::Status { success: false }
    }

    pub fn ok() -> Self {
        Response::Status { success: true }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Response::Failed {
            success: false,
            error: error.into(),
        }
    }

    /// The cipher result carried by a successful encrypt or decrypt.
    pub fn into_cipher_output(self) -> Option<CipherOutput> {
        match self {
            Response::Cipher {
                result,
                matrix,
                pairs,
                ..
            } => Some(CipherOutput {
                result,
                matrix,
                pairs,
            }),
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        match self {
            Response::Cipher { success, .. }
            | Response::History { success, .. }
            | Response::Failed { success, .. }
            | Response::Status { success } => *success,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| {
            PlayfairError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::Serialization,
                "failed to encode response",
                e,
            )
        })
    }
}

/// Runs requests against the engine and a history store.
pub struct Dispatcher<S: HistoryStore> {
    store: S,
    record_history: bool,
}

impl<S: HistoryStore> Dispatcher<S> {
    /// Creates a dispatcher that records every successful cipher operation.
    pub fn new(store: S) -> Self {
        Self {
            store,
            record_history: true,
        }
    }

    /// Turns automatic recording of cipher operations on or off.
    pub fn record_history(mut self, enabled: bool) -> Self {
        self.record_history = enabled;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn handle(&mut self, request: Request) -> Result<Response> {
        match request {
            Request::Encrypt { plaintext, key } => {
                Ok(self.run_cipher(Direction::Encrypt, &plaintext, &key))
            }
            Request::Decrypt { ciphertext, key } => {
                Ok(self.run_cipher(Direction::Decrypt, &ciphertext, &key))
            }
            Request::SaveHistory {
                direction,
                input,
                output,
                key,
            } => {
                self.store
                    .append(HistoryEntry::now(direction, input, output, key))
                    .map_err(|e| e.with_context("failed to save history"))?;
                Ok(Response::ok())
            }
            Request::GetHistory => {
                let history = self
                    .store
                    .list()
                    .map_err(|e| e.with_context("failed to load history"))?;
                Ok(Response::history(history))
            }
            Request::ClearHistory => {
                self.store
                    .clear()
                    .map_err(|e| e.with_context("failed to clear history"))?;
                Ok(Response::ok())
            }
        }
    }

    fn run_cipher(&mut self, direction: Direction, text: &str, key: &str) -> Response {
        let text = text.trim();
        let key = key.trim();
        if text.is_empty() || key.is_empty() {
            return Response::rejected();
        }

        let output = engine::run(direction, text, key);

        if self.record_history {
            let entry = HistoryEntry::now(direction, text, output.result.as_str(), key);
            // History is best effort; the cipher result stands on its own.
            if let Err(e) = self.store.append(entry) {
                tracing::warn!(error = %e, "failed to record history");
            }
        }

        Response::cipher(output)
    }
}
