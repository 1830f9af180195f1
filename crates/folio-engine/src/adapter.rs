//! Conversation adapter: the operator-facing surface of an editing session.
//!
//! Each operator instruction is one exchange with the completion service.
//! The reply is repair-parsed into a [`Plan`] and handed to the executor.
//! When a plan suspends, the operator's answer becomes a continuation message
//! and the plan derived from it resumes the executor.

use std::sync::Arc;

use folio_ai::{CompletionService, Context, Message};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::actions::RequestKind;
use crate::catalog::Catalog;
use crate::chat::{ChatAccumulator, ChatReply};
use crate::config::EngineConfig;
use crate::document::{self, Document, DocumentLibrary, DocumentSet, Rasterizer, RenderedPage};
use crate::error::{Error, Result};
use crate::events::SessionEvent;
use crate::executor::{RunReport, TaskExecutor};
use crate::parser::parse_json;
use crate::plan::{Plan, TaskAction};
use crate::prompt::{self, SuppliedInput};
use crate::session::EditingSession;

/// The result of one planning exchange
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    /// The message shown to the operator
    pub reply: String,
    /// `None` when the reply could not be read as a plan
    pub report: Option<RunReport>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub action: TaskAction,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outline {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub sections: Vec<OutlineSection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlineSection {
    pub heading: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub page: Option<u32>,
}

pub struct ConversationAdapter {
    config: EngineConfig,
    service: Arc<dyn CompletionService>,
    library: Arc<dyn DocumentLibrary>,
    rasterizer: Arc<dyn Rasterizer>,
    event_tx: broadcast::Sender<SessionEvent>,
    system_prompt: String,
    session: EditingSession,
}

impl ConversationAdapter {
    pub fn new(
        config: EngineConfig,
        service: Arc<dyn CompletionService>,
        library: Arc<dyn DocumentLibrary>,
        rasterizer: Arc<dyn Rasterizer>,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(config.event_capacity.max(1));
        let executor = TaskExecutor::new(
            library.clone(),
            rasterizer.clone(),
            service.clone(),
            config.clone(),
            event_tx.clone(),
        );
        let system_prompt = prompt::system_instruction(&Catalog::new());
        Self {
            config,
            service,
            library,
            rasterizer,
            event_tx,
            system_prompt,
            session: EditingSession::new(executor),
        }
    }

    /// Subscribe to session events
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.event_tx.subscribe()
    }

    pub fn documents(&self) -> &DocumentSet {
        &self.session.documents
    }

    pub fn session(&self) -> &EditingSession {
        &self.session
    }

    pub fn is_suspended(&self) -> bool {
        self.session.executor.is_suspended()
    }

    fn emit(&self, event: SessionEvent) {
        let _ = self.event_tx.send(event);
    }

    /// Brand and add a document. The first document starts the conversation.
    pub fn load_document(
        &mut self,
        name: impl Into<String>,
        bytes: Vec<u8>,
        password: Option<String>,
    ) -> Result<()> {
        let mut doc = Document::new(name, bytes);
        doc.password = password;
        let doc = document::brand(self.library.as_ref(), doc)?;
        tracing::info!("Loaded {}", doc.name);

        self.session.documents.push(doc);
        let system_prompt = &self.system_prompt;
        self.session.conversation_or_start(|| system_prompt.clone());
        self.emit(SessionEvent::DocumentsChanged {
            names: self.session.documents.names(),
        });
        Ok(())
    }

    /// Plan and execute an operator instruction. Refused while a request is pending.
    pub async fn handle_message(&mut self, text: &str) -> Result<TurnOutcome> {
        if self.session.executor.is_suspended() {
            return Err(Error::AwaitingInput);
        }
        let message = prompt::operator_message(text, &self.session.documents);
        self.exchange(message, false).await
    }

    /// Fulfil a pending `request_files` with new documents and continue.
    ///
    /// Either every file is added or none is.
    pub async fn supply_files(&mut self, files: Vec<Document>) -> Result<TurnOutcome> {
        match self.session.executor.pending() {
            None => return Err(Error::NotSuspended),
            Some(pending) if pending.request.kind != RequestKind::RequestFiles => {
                return Err(Error::WrongInputKind {
                    expected: pending.request.kind.describe().to_string(),
                });
            }
            Some(_) => {}
        }

        if files.is_empty() {
            return Err(Error::WrongInputKind {
                expected: RequestKind::RequestFiles.describe().to_string(),
            });
        }

        let branded = files
            .into_iter()
            .map(|file| document::brand(self.library.as_ref(), file))
            .collect::<Result<Vec<_>>>()?;
        let names: Vec<String> = branded.iter().map(|file| file.name.clone()).collect();
        for file in branded {
            self.session.documents.push(file);
        }
        self.emit(SessionEvent::DocumentsChanged {
            names: self.session.documents.names(),
        });

        self.continue_with(SuppliedInput::Files(names)).await
    }

    /// Fulfil a pending `request_input` with the operator's value and continue
    pub async fn supply_input(&mut self, value: impl Into<String>) -> Result<TurnOutcome> {
        match self.session.executor.pending() {
            None => return Err(Error::NotSuspended),
            Some(pending) if !matches!(pending.request.kind, RequestKind::RequestInput(_)) => {
                return Err(Error::WrongInputKind {
                    expected: pending.request.kind.describe().to_string(),
                });
            }
            Some(_) => {}
        }
        self.continue_with(SuppliedInput::Value(value.into())).await
    }

    async fn continue_with(&mut self, supplied: SuppliedInput) -> Result<TurnOutcome> {
        let pending = self
            .session
            .executor
            .pending()
            .ok_or(Error::NotSuspended)?;
        let message = prompt::continuation_message(&supplied, pending, &self.session.documents);
        self.exchange(message, true).await
    }

    /// Send one message, parse the reply and run (or resume with) the plan.
    ///
    /// When resuming, any failure before execution drops the suspension so the
    /// session is never stuck waiting for input that was already given.
    async fn exchange(&mut self, text: String, resume: bool) -> Result<TurnOutcome> {
        let system_prompt = &self.system_prompt;
        let conversation = self.session.conversation_or_start(|| system_prompt.clone());

        let message = Message::user(text);
        let raw = match self.service.send(&conversation.context, message.clone()).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("Completion request failed: {}", e);
                if resume {
                    self.session.executor.reset();
                }
                self.emit(SessionEvent::Error {
                    message: e.to_string(),
                });
                self.emit(SessionEvent::Ready);
                return Err(e.into());
            }
        };
        conversation.record(message, raw.clone());

        let Some(plan) = Plan::parse(&raw) else {
            if resume {
                self.session.executor.reset();
            }
            self.emit(SessionEvent::ParseFailed {
                message: prompt::REPHRASE_MESSAGE.to_string(),
            });
            self.emit(SessionEvent::Ready);
            return Ok(TurnOutcome {
                reply: prompt::REPHRASE_MESSAGE.to_string(),
                report: None,
            });
        };

        if !plan.response_message.is_empty() {
            self.emit(SessionEvent::AssistantMessage {
                text: plan.response_message.clone(),
            });
        }

        let documents = &mut self.session.documents;
        let report = if resume {
            self.session.executor.resume(&plan, documents).await?
        } else {
            self.session.executor.run(&plan, documents).await?
        };

        Ok(TurnOutcome {
            reply: plan.response_message,
            report: Some(report),
        })
    }

    /// Answer a question about the primary document, streaming the reply as
    /// [`SessionEvent::ChatDelta`] events. Does not touch the planning conversation.
    pub async fn ask(&self, question: &str, cancel: CancellationToken) -> Result<ChatReply> {
        let text = self.primary_text()?;
        let context = Context::with_system(prompt::CHAT_INSTRUCTION);
        let message = Message::user(format!(
            "Document text:\n{}\n\nQuestion: {}",
            text, question
        ));

        let stream = self
            .service
            .send_streaming(&context, message, cancel.clone())
            .await?;
        let mut accumulator = ChatAccumulator::new(self.config.chat_idle_timeout());
        let outcome = accumulator
            .drain(stream, &cancel, |delta| {
                self.emit(SessionEvent::ChatDelta {
                    delta: delta.to_string(),
                })
            })
            .await?;
        tracing::debug!("Chat reply finished: {:?}", outcome);
        Ok(accumulator.finish(outcome))
    }

    /// Suggest the single action that best fits a free-text need
    pub async fn recommend_tool(&self, query: &str) -> Result<Recommendation> {
        let context = Context::with_system(prompt::recommend_instruction());
        let raw = self.service.send(&context, Message::user(query)).await?;
        let value = parse_json(&raw).ok_or_else(|| Error::Parse(raw.clone()))?;
        serde_json::from_value(value).map_err(|e| Error::Parse(e.to_string()))
    }

    /// Outline the primary document
    pub async fn generate_outline(&self) -> Result<Outline> {
        let text = self.primary_text()?;
        let context = Context::with_system(prompt::OUTLINE_INSTRUCTION);
        let raw = self.service.send(&context, Message::user(text)).await?;
        let value = parse_json(&raw).ok_or_else(|| Error::Parse(raw.clone()))?;
        serde_json::from_value(value).map_err(|e| Error::Parse(e.to_string()))
    }

    /// Render a page (zero-based) of the document at `index`
    pub async fn preview(&self, index: usize, page: usize, scale: Option<f32>) -> Result<RenderedPage> {
        let doc = self.session.documents.get(index).ok_or(Error::NoDocument)?;
        let scale = scale.unwrap_or(self.config.preview_scale);
        self.rasterizer.render(&doc.bytes, page, scale).await
    }

    /// Discard documents, conversation and any pending request
    pub fn reset(&mut self) {
        self.session.reset();
        tracing::debug!("Session reset");
        self.emit(SessionEvent::DocumentsChanged { names: Vec::new() });
        self.emit(SessionEvent::Ready);
    }

    fn primary_text(&self) -> Result<String> {
        let primary = self.session.documents.primary().ok_or(Error::NoDocument)?;
        let pdf = document::open(self.library.as_ref(), primary)?;
        document::document_text(pdf.as_ref(), self.config.document_text_limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::ChatOutcome;
    use crate::executor::{ExecutorState, RunStatus};
    use crate::testing::{FakeLibrary, FakeRasterizer, MockService, decode, drain, fake_pdf};

    fn adapter(service: MockService) -> (ConversationAdapter, Arc<MockService>) {
        let service = Arc::new(service);
        let adapter = ConversationAdapter::new(
            EngineConfig::default(),
            service.clone(),
            Arc::new(FakeLibrary),
            Arc::new(FakeRasterizer),
        );
        (adapter, service)
    }

    const ASK_PASSWORD: &str = r#"{"response_message": "I need the password.",
        "tasks": [{"action": "request_input", "parameters": {"reason": "Password?", "type": "password"}},
                  {"action": "compress", "parameters": {}}]}"#;

    #[tokio::test]
    async fn test_load_document_brands_and_starts_conversation() {
        let (mut adapter, _) = adapter(MockService::new());
        let mut rx = adapter.subscribe();
        adapter.load_document("a.pdf", fake_pdf(1), None).unwrap();

        let doc = adapter.documents().primary().unwrap();
        assert_eq!(decode(&doc.bytes).brand.as_deref(), Some(document::BRAND_MARK));
        assert!(adapter.session().conversation.is_some());
        assert!(matches!(
            drain(&mut rx).as_slice(),
            [SessionEvent::DocumentsChanged { names }] if names == &["a.pdf"]
        ));
    }

    #[tokio::test]
    async fn test_load_protected_needs_password() {
        let (mut adapter, _) = adapter(MockService::new());
        let mut pdf = decode(&fake_pdf(1));
        pdf.password = Some("pw".into());
        let bytes = serde_json::to_vec(&pdf).unwrap();

        assert!(adapter.load_document("a.pdf", bytes.clone(), None).is_err());
        adapter.load_document("a.pdf", bytes, Some("pw".into())).unwrap();
        assert_eq!(adapter.documents().primary().unwrap().password.as_deref(), Some("pw"));
    }

    #[tokio::test]
    async fn test_handle_message_runs_plan() {
        let (mut adapter, service) = adapter(MockService::new().with_reply(
            "```json\n{\"response_message\": \"Rotating.\", \"tasks\": [{\"action\": \"rotate\", \"parameters\": {\"angle\": 90}}]}\n```",
        ));
        adapter.load_document("a.pdf", fake_pdf(2), None).unwrap();
        let mut rx = adapter.subscribe();

        let outcome = adapter.handle_message("rotate it").await.unwrap();
        assert_eq!(outcome.reply, "Rotating.");
        assert_eq!(outcome.report.unwrap().status, RunStatus::Completed);

        let pdf = decode(&adapter.documents().primary().unwrap().bytes);
        assert!(pdf.pages.iter().all(|p| p.rotation == 90));

        let events = drain(&mut rx);
        assert!(matches!(&events[0], SessionEvent::AssistantMessage { text } if text == "Rotating."));
        assert!(events.iter().any(|e| matches!(e, SessionEvent::PlanCompleted { tasks_run: 1 })));

        let requests = service.requests();
        assert!(requests[0].1.text().contains("rotate it"));
        assert!(requests[0].1.text().contains("a.pdf"));
        assert_eq!(adapter.session().conversation.as_ref().unwrap().turns(), 1);
    }

    #[tokio::test]
    async fn test_unparseable_reply_asks_to_rephrase() {
        let (mut adapter, _) = adapter(MockService::new().with_reply("I'm not sure what you mean."));
        adapter.load_document("a.pdf", fake_pdf(1), None).unwrap();
        let before = adapter.documents().primary().unwrap().bytes.clone();
        let mut rx = adapter.subscribe();

        let outcome = adapter.handle_message("hmm").await.unwrap();
        assert!(outcome.report.is_none());
        assert_eq!(outcome.reply, prompt::REPHRASE_MESSAGE);
        assert_eq!(adapter.documents().primary().unwrap().bytes, before);

        let events = drain(&mut rx);
        assert!(matches!(&events[0], SessionEvent::ParseFailed { .. }));
        assert!(!events.iter().any(|e| matches!(e, SessionEvent::PlanStart { .. })));
    }

    #[tokio::test]
    async fn test_service_failure_is_reported() {
        let (mut adapter, _) = adapter(MockService::new().with_failure("overloaded"));
        adapter.load_document("a.pdf", fake_pdf(1), None).unwrap();
        let mut rx = adapter.subscribe();

        assert!(adapter.handle_message("rotate").await.is_err());
        assert!(matches!(&drain(&mut rx)[0], SessionEvent::Error { .. }));
        assert_eq!(adapter.session().conversation.as_ref().unwrap().turns(), 0);
    }

    #[tokio::test]
    async fn test_suspended_refuses_new_messages() {
        let (mut adapter, _) = adapter(MockService::new().with_reply(ASK_PASSWORD));
        adapter.load_document("a.pdf", fake_pdf(1), None).unwrap();

        let outcome = adapter.handle_message("compress it").await.unwrap();
        assert!(matches!(outcome.report.unwrap().status, RunStatus::Suspended(_)));
        assert!(adapter.is_suspended());
        assert!(matches!(
            adapter.handle_message("anything").await,
            Err(Error::AwaitingInput)
        ));
    }

    #[tokio::test]
    async fn test_continuation_carries_input() {
        let (mut adapter, service) = adapter(
            MockService::new()
                .with_reply(ASK_PASSWORD)
                .with_reply(r#"{"response_message": "Protected.", "tasks": [{"action": "protect", "parameters": {"password": "hunter2"}}]}"#),
        );
        adapter.load_document("a.pdf", fake_pdf(1), None).unwrap();
        adapter.handle_message("protect it").await.unwrap();

        let outcome = adapter.supply_input("hunter2").await.unwrap();
        assert_eq!(outcome.report.unwrap().status, RunStatus::Completed);
        assert_eq!(*adapter.session().executor.state(), ExecutorState::Idle);

        let continuation = service.requests()[1].1.text();
        assert!(continuation.contains("hunter2"));
        assert!(continuation.contains("compress"));

        let primary = adapter.documents().primary().unwrap();
        assert_eq!(primary.password.as_deref(), Some("hunter2"));
        assert_eq!(adapter.session().conversation.as_ref().unwrap().turns(), 2);
    }

    #[tokio::test]
    async fn test_supply_protocol_misuse() {
        let (mut adapter, _) = adapter(MockService::new().with_reply(ASK_PASSWORD));
        adapter.load_document("a.pdf", fake_pdf(1), None).unwrap();

        assert!(matches!(adapter.supply_input("x").await, Err(Error::NotSuspended)));
        assert!(matches!(adapter.supply_files(vec![]).await, Err(Error::NotSuspended)));

        adapter.handle_message("compress").await.unwrap();
        let err = adapter
            .supply_files(vec![Document::new("b.pdf", fake_pdf(1))])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::WrongInputKind { .. }));
        assert!(err.is_protocol_misuse());
        assert!(adapter.is_suspended());
        assert_eq!(adapter.documents().len(), 1);
    }

    #[tokio::test]
    async fn test_supply_files_is_all_or_nothing() {
        let (mut adapter, service) = adapter(MockService::new().with_reply(
            r#"{"response_message": "Merging.", "tasks": [{"action": "merge", "parameters": {}}]}"#,
        ));
        adapter.load_document("a.pdf", fake_pdf(1), None).unwrap();
        adapter.handle_message("merge my files").await.unwrap();
        assert!(adapter.is_suspended());
        let mut rx = adapter.subscribe();

        let result = adapter
            .supply_files(vec![
                Document::new("b.pdf", fake_pdf(1)),
                Document::new("broken.pdf", b"not a pdf".to_vec()),
            ])
            .await;
        assert!(result.is_err());
        assert!(adapter.is_suspended());
        assert_eq!(adapter.documents().names(), vec!["a.pdf"]);
        assert!(drain(&mut rx).is_empty());

        let err = adapter.supply_files(vec![]).await.unwrap_err();
        assert!(matches!(err, Error::WrongInputKind { .. }));
        assert!(adapter.is_suspended());
        assert_eq!(adapter.documents().len(), 1);
        assert_eq!(service.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_supply_files_then_merge() {
        let (mut adapter, _) = adapter(
            MockService::new()
                .with_reply(r#"{"response_message": "Merging.", "tasks": [{"action": "merge", "parameters": {}}]}"#)
                .with_reply(r#"{"response_message": "Merged.", "tasks": [{"action": "merge", "parameters": {}}]}"#),
        );
        adapter.load_document("a.pdf", fake_pdf(1), None).unwrap();

        let outcome = adapter.handle_message("merge my files").await.unwrap();
        assert!(matches!(outcome.report.unwrap().status, RunStatus::Suspended(_)));

        let outcome = adapter
            .supply_files(vec![Document::new("b.pdf", fake_pdf(2))])
            .await
            .unwrap();
        assert_eq!(outcome.report.unwrap().status, RunStatus::Completed);
        assert_eq!(adapter.documents().names(), vec!["merged.pdf"]);
        assert_eq!(decode(&adapter.documents().primary().unwrap().bytes).pages.len(), 3);
    }

    #[tokio::test]
    async fn test_failed_continuation_returns_to_idle() {
        let (mut adapter, _) = adapter(MockService::new().with_reply(ASK_PASSWORD).with_failure("down"));
        adapter.load_document("a.pdf", fake_pdf(1), None).unwrap();
        adapter.handle_message("compress").await.unwrap();

        assert!(adapter.supply_input("pw").await.is_err());
        assert!(!adapter.is_suspended());
    }

    #[tokio::test]
    async fn test_unparseable_continuation_returns_to_idle() {
        let (mut adapter, _) = adapter(MockService::new().with_reply(ASK_PASSWORD).with_reply("no idea"));
        adapter.load_document("a.pdf", fake_pdf(1), None).unwrap();
        adapter.handle_message("compress").await.unwrap();

        let outcome = adapter.supply_input("pw").await.unwrap();
        assert!(outcome.report.is_none());
        assert!(!adapter.is_suspended());
    }

    #[tokio::test]
    async fn test_ask_streams_deltas() {
        let (mut adapter, service) = adapter(MockService::new().with_reply("It has two pages."));
        adapter.load_document("a.pdf", fake_pdf(2), None).unwrap();
        let mut rx = adapter.subscribe();

        let reply = adapter
            .ask("how long is it?", CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(reply.outcome, ChatOutcome::Complete);
        assert_eq!(reply.text, "It has two pages.");

        let deltas: Vec<String> = drain(&mut rx)
            .into_iter()
            .filter_map(|e| match e {
                SessionEvent::ChatDelta { delta } => Some(delta),
                _ => None,
            })
            .collect();
        assert_eq!(deltas.concat(), "It has two pages.");

        let (context, message) = &service.requests()[0];
        assert_eq!(context.system_prompt.as_deref(), Some(prompt::CHAT_INSTRUCTION));
        assert!(message.text().contains("Page 2 text"));
        assert_eq!(adapter.session().conversation.as_ref().unwrap().turns(), 0);
    }

    #[tokio::test]
    async fn test_ask_cancelled() {
        let (mut adapter, _) = adapter(MockService::new().with_reply("never seen"));
        adapter.load_document("a.pdf", fake_pdf(1), None).unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let reply = adapter.ask("?", cancel).await.unwrap();
        assert_eq!(reply.outcome, ChatOutcome::Cancelled);
        assert_eq!(reply.text, "");
    }

    #[tokio::test]
    async fn test_ask_without_document() {
        let (adapter, _) = adapter(MockService::new());
        assert!(matches!(
            adapter.ask("?", CancellationToken::new()).await,
            Err(Error::NoDocument)
        ));
    }

    #[tokio::test]
    async fn test_recommend_tool() {
        let (adapter, _) = adapter(MockService::new().with_reply(
            "Sure!\n```json\n{\"action\": \"compress\", \"reason\": \"Makes the file smaller.\"}\n```",
        ));
        let rec = adapter.recommend_tool("my file is too big").await.unwrap();
        assert_eq!(rec.action, TaskAction::from("compress"));
        assert_eq!(rec.reason, "Makes the file smaller.");
    }

    #[tokio::test]
    async fn test_recommend_tool_unparseable() {
        let (adapter, _) = adapter(MockService::new().with_reply("no json here"));
        assert!(matches!(
            adapter.recommend_tool("?").await,
            Err(Error::Parse(_))
        ));
    }

    #[tokio::test]
    async fn test_generate_outline() {
        let (mut adapter, _) = adapter(MockService::new().with_reply(
            r#"{"title": "Report", "sections": [{"heading": "Intro", "summary": "Start", "page": 1}, {"heading": "End"}]}"#,
        ));
        adapter.load_document("a.pdf", fake_pdf(2), None).unwrap();

        let outline = adapter.generate_outline().await.unwrap();
        assert_eq!(outline.title, "Report");
        assert_eq!(outline.sections.len(), 2);
        assert_eq!(outline.sections[0].page, Some(1));
        assert_eq!(outline.sections[1].page, None);
    }

    #[tokio::test]
    async fn test_preview() {
        let (mut adapter, _) = adapter(MockService::new());
        adapter.load_document("a.pdf", fake_pdf(2), None).unwrap();

        let page = adapter.preview(0, 1, None).await.unwrap();
        assert_eq!(page.width, 918);
        assert_eq!(page.png, b"png:1:1.5".to_vec());
        assert!(matches!(adapter.preview(3, 0, None).await, Err(Error::NoDocument)));
        assert!(adapter.preview(0, 9, None).await.is_err());
    }

    #[tokio::test]
    async fn test_reset_is_idempotent() {
        let (mut adapter, _) = adapter(MockService::new().with_reply(ASK_PASSWORD));
        adapter.load_document("a.pdf", fake_pdf(1), None).unwrap();
        adapter.handle_message("compress").await.unwrap();
        assert!(adapter.is_suspended());

        adapter.reset();
        adapter.reset();
        assert!(adapter.documents().is_empty());
        assert!(adapter.session().conversation.is_none());
        assert!(!adapter.is_suspended());
        assert!(matches!(adapter.supply_input("x").await, Err(Error::NotSuspended)));
    }
}
