//! Action dispatch over the session state
//!
//! Every user interaction is an `Action`; `App::dispatch` is the single
//! place state transitions happen, and it returns an `Outcome` for the
//! terminal layer to render. Errors from ingestion and query are both
//! contained here: they become messages, never a dead session.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

use docchat_core::{DocumentKind, Error, KnowledgeBase, Result};
use docchat_gemini::GeminiClient;

use crate::session::{HandleFactory, HandleKey, HandleRegistry, SessionState};

/// A user-triggered event
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SubmitCredential(String),
    SelectModel(String),
    Open(PathBuf),
    Ask(String),
    Status,
    Reset,
    Help,
    Quit,
}

/// What the terminal layer should show for a dispatched action
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Info(String),
    Success(String),
    Warning(String),
    Failure(String),
    Answer(String),
    Help,
    Quit,
}

/// Parse one line of user input into an action.
///
/// Anything that is not a command is a question.
pub fn parse_action(input: &str) -> Option<Action> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    let lower = input.to_lowercase();
    match lower.as_str() {
        "exit" | "quit" => return Some(Action::Quit),
        "help" => return Some(Action::Help),
        "status" => return Some(Action::Status),
        "reset" => return Some(Action::Reset),
        _ => {}
    }

    if let Some(rest) = input.strip_prefix("open ").or_else(|| input.strip_prefix("load ")) {
        return Some(Action::Open(PathBuf::from(rest.trim())));
    }

    if let Some(rest) = input.strip_prefix("model ") {
        return Some(Action::SelectModel(rest.trim().to_string()));
    }

    Some(Action::Ask(input.to_string()))
}

/// The interactive application: one session, one handle registry
pub struct App {
    registry: HandleRegistry,
    session: SessionState,
}

impl App {
    pub fn new(factory: Box<dyn HandleFactory>) -> Self {
        Self {
            registry: HandleRegistry::new(factory),
            session: SessionState::new(),
        }
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// Whether the credential prompt should be shown
    pub fn needs_credential(&self) -> bool {
        self.session.credential.is_none()
    }

    /// One-line knowledge-base status, mirroring the original status line
    pub fn status_line(&self) -> String {
        match &self.session.ingested_file {
            Some(name) if self.session.ingested => {
                format!("🟢 Ready to chat with {}", name)
            }
            _ => "🔴 Waiting for PDF upload...".to_string(),
        }
    }

    pub async fn dispatch(&mut self, action: Action) -> Outcome {
        match action {
            Action::SubmitCredential(key) => self.submit_credential(key).await,
            Action::SelectModel(model_id) => self.select_model(model_id),
            Action::Open(path) => self.open_document(path).await,
            Action::Ask(question) => self.ask(question).await,
            Action::Status => Outcome::Info(self.status_line()),
            Action::Reset => self.reset(),
            Action::Help => Outcome::Help,
            Action::Quit => Outcome::Quit,
        }
    }

    async fn submit_credential(&mut self, key: String) -> Outcome {
        let key = key.trim().to_string();
        if key.is_empty() {
            return Outcome::Warning("API key must not be empty.".to_string());
        }

        // The embedding provider reads its credential from the environment.
        // Dispatch is single-threaded, so the write is not racing readers.
        unsafe { std::env::set_var("GEMINI_API_KEY", &key) };

        match self.create_handle(key).await {
            Ok(model_id) => Outcome::Success(format!(
                "Session ready (model {}). Open a PDF to start chatting.",
                model_id
            )),
            Err(e) => {
                warn!(error = %e, "session creation failed");
                Outcome::Failure(format!("Could not create a session: {}", e))
            }
        }
    }

    async fn create_handle(&mut self, key: String) -> Result<String> {
        let storage_dir = self.session.storage_dir()?;
        let handle_key = HandleKey {
            storage_dir,
            credential: key.clone(),
            model_id: self.session.model_id.clone(),
        };

        let handle = self.registry.get_or_create(&handle_key).await?;
        self.session.credential = Some(key);
        self.session.handle = Some(handle);
        Ok(self.session.model_id.clone())
    }

    fn select_model(&mut self, model_id: String) -> Outcome {
        if let Err(e) = GeminiClient::validate_model(&model_id) {
            return Outcome::Warning(e.to_string());
        }

        self.session.model_id = model_id.clone();
        if self.session.handle.is_some() {
            Outcome::Warning(format!(
                "Model set to {}. The current session keeps its model; reset to apply.",
                model_id
            ))
        } else {
            Outcome::Info(format!("Model set to {}.", model_id))
        }
    }

    async fn open_document(&mut self, path: PathBuf) -> Outcome {
        let Some(handle) = self.session.handle.clone() else {
            return Outcome::Warning("No session yet. Submit your API key first.".to_string());
        };

        if self.session.ingested {
            return Outcome::Warning(
                "A document is already in the knowledge base. Reset to start over.".to_string(),
            );
        }

        let declared_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        match self.ingest(&handle, &path, &declared_name).await {
            Ok(chunks) => {
                self.session.ingested = true;
                self.session.ingested_file = Some(declared_name.clone());
                Outcome::Success(format!(
                    "Successfully added {} to the knowledge base ({} chunks). You can now ask questions.",
                    declared_name, chunks
                ))
            }
            Err(e) => {
                warn!(error = %e, "ingestion failed");
                Outcome::Failure(format!("An error occurred during file processing: {}", e))
            }
        }
    }

    async fn ingest(
        &self,
        handle: &Arc<dyn KnowledgeBase>,
        path: &Path,
        declared_name: &str,
    ) -> Result<usize> {
        let kind = DocumentKind::from_filename(declared_name)?;
        let bytes = fs::read(path)?;

        // Stage the upload as a uniquely named temp file; the NamedTempFile
        // guard deletes it on every exit path, including ingestion failure.
        let suffix = match kind {
            DocumentKind::PdfFile => ".pdf",
            DocumentKind::TextFile => ".txt",
        };
        let mut staged = tempfile::Builder::new()
            .suffix(suffix)
            .tempfile()
            .map_err(Error::Io)?;
        staged.write_all(&bytes).map_err(Error::Io)?;
        staged.flush().map_err(Error::Io)?;

        let report = handle.add(staged.path(), kind).await?;
        Ok(report.chunks_indexed)
    }

    async fn ask(&mut self, question: String) -> Outcome {
        if !self.session.ingested {
            return Outcome::Warning(
                "The knowledge base is empty. Open a PDF before asking questions.".to_string(),
            );
        }

        if question.trim().is_empty() {
            return Outcome::Warning("Please enter a question.".to_string());
        }

        let Some(handle) = self.session.handle.clone() else {
            return Outcome::Warning("No session yet. Submit your API key first.".to_string());
        };

        match handle.chat(&question).await {
            Ok(answer) => Outcome::Answer(answer),
            Err(e) => {
                warn!(error = %e, "query failed");
                Outcome::Failure(format!("The question could not be answered: {}", e))
            }
        }
    }

    fn reset(&mut self) -> Outcome {
        self.registry.invalidate_all();
        self.session.reset();
        Outcome::Info(
            "Session cleared. Submit your API key to start a new session.".to_string(),
        )
    }
}
