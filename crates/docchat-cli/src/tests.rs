//! Tests for session caching and action dispatch

#[cfg(test)]
mod dispatch_tests {
    use crate::app::{Action, App, Outcome, parse_action};
    use crate::session::{HandleFactory, HandleKey, HandleRegistry};
    use async_trait::async_trait;
    use docchat_core::{DocumentKind, Error, IngestReport, KnowledgeBase, Result};
    use std::io::Write;
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    struct StubKb {
        fail_add: bool,
        adds: AtomicUsize,
        chats: AtomicUsize,
    }

    #[async_trait]
    impl KnowledgeBase for StubKb {
        async fn add(&self, _path: &Path, _kind: DocumentKind) -> Result<IngestReport> {
            self.adds.fetch_add(1, Ordering::SeqCst);
            if self.fail_add {
                Err(Error::Ingestion("simulated provider failure".to_string()))
            } else {
                Ok(IngestReport {
                    source: "report.pdf".to_string(),
                    chunks_indexed: 3,
                })
            }
        }

        async fn chat(&self, question: &str) -> Result<String> {
            self.chats.fetch_add(1, Ordering::SeqCst);
            Ok(format!("Answer to: {}", question))
        }
    }

    struct StubFactory {
        fail_add: bool,
        created: Arc<AtomicUsize>,
        last: Arc<Mutex<Option<Arc<StubKb>>>>,
    }

    impl StubFactory {
        fn new() -> Self {
            Self {
                fail_add: false,
                created: Arc::new(AtomicUsize::new(0)),
                last: Arc::new(Mutex::new(None)),
            }
        }

        fn failing() -> Self {
            Self {
                fail_add: true,
                ..Self::new()
            }
        }
    }

    #[async_trait]
    impl HandleFactory for StubFactory {
        async fn create(&self, _key: &HandleKey) -> Result<Arc<dyn KnowledgeBase>> {
            self.created.fetch_add(1, Ordering::SeqCst);
            let kb = Arc::new(StubKb {
                fail_add: self.fail_add,
                adds: AtomicUsize::new(0),
                chats: AtomicUsize::new(0),
            });
            *self.last.lock().unwrap() = Some(kb.clone());
            Ok(kb)
        }
    }

    fn key(dir: &str, credential: &str, model: &str) -> HandleKey {
        HandleKey {
            storage_dir: PathBuf::from(dir),
            credential: credential.to_string(),
            model_id: model.to_string(),
        }
    }

    fn write_fake_pdf(dir: &Path) -> PathBuf {
        let path = dir.join("report.pdf");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(&[0x25; 200]).unwrap();
        path
    }

    #[test]
    fn test_parse_actions() {
        assert_eq!(parse_action("exit"), Some(Action::Quit));
        assert_eq!(parse_action("QUIT"), Some(Action::Quit));
        assert_eq!(parse_action("help"), Some(Action::Help));
        assert_eq!(parse_action("reset"), Some(Action::Reset));
        assert_eq!(parse_action("status"), Some(Action::Status));
        assert_eq!(
            parse_action("open report.pdf"),
            Some(Action::Open(PathBuf::from("report.pdf")))
        );
        assert_eq!(
            parse_action("model gemini-2.5-pro"),
            Some(Action::SelectModel("gemini-2.5-pro".to_string()))
        );
        assert_eq!(
            parse_action("What is the summary?"),
            Some(Action::Ask("What is the summary?".to_string()))
        );
        assert_eq!(parse_action("   "), None);
    }

    #[tokio::test]
    async fn test_registry_caches_by_triple() {
        let factory = StubFactory::new();
        let created = factory.created.clone();
        let registry = HandleRegistry::new(Box::new(factory));

        let first = registry
            .get_or_create(&key("/tmp/a", "X", "gemini-2.5-flash"))
            .await
            .unwrap();
        let second = registry
            .get_or_create(&key("/tmp/a", "X", "gemini-2.5-flash"))
            .await
            .unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(created.load(Ordering::SeqCst), 1);

        let other_model = registry
            .get_or_create(&key("/tmp/a", "X", "gemini-2.5-pro"))
            .await
            .unwrap();
        assert!(!Arc::ptr_eq(&first, &other_model));

        let other_key = registry
            .get_or_create(&key("/tmp/a", "Y", "gemini-2.5-flash"))
            .await
            .unwrap();
        assert!(!Arc::ptr_eq(&first, &other_key));
        assert_eq!(created.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_registry_invalidation_forces_reconstruction() {
        let registry = HandleRegistry::new(Box::new(StubFactory::new()));
        let triple = key("/tmp/a", "X", "gemini-2.5-flash");

        let before = registry.get_or_create(&triple).await.unwrap();
        registry.invalidate_all();
        let after = registry.get_or_create(&triple).await.unwrap();

        assert!(!Arc::ptr_eq(&before, &after));
    }

    #[tokio::test]
    async fn test_happy_path_scenario() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = write_fake_pdf(dir.path());
        let mut app = App::new(Box::new(StubFactory::new()));

        assert!(app.needs_credential());
        let outcome = app
            .dispatch(Action::SubmitCredential("X".to_string()))
            .await;
        assert!(matches!(outcome, Outcome::Success(_)));
        assert!(!app.needs_credential());

        let outcome = app.dispatch(Action::Open(pdf)).await;
        match outcome {
            Outcome::Success(msg) => assert!(msg.contains("report.pdf")),
            other => panic!("expected success, got {:?}", other),
        }
        assert!(app.session().ingested);
        assert!(app.status_line().contains("report.pdf"));

        let outcome = app
            .dispatch(Action::Ask("What is the summary?".to_string()))
            .await;
        match outcome {
            Outcome::Answer(text) => {
                assert!(!text.is_empty());
                assert!(text.contains("What is the summary?"));
            }
            other => panic!("expected answer, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_ingestion_is_one_shot() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = write_fake_pdf(dir.path());
        let mut app = App::new(Box::new(StubFactory::new()));

        app.dispatch(Action::SubmitCredential("X".to_string()))
            .await;
        app.dispatch(Action::Open(pdf.clone())).await;
        assert!(app.session().ingested);

        let outcome = app.dispatch(Action::Open(pdf)).await;
        assert!(matches!(outcome, Outcome::Warning(_)));
        assert!(app.session().ingested);
        assert_eq!(
            app.session().ingested_file.as_deref(),
            Some("report.pdf")
        );
    }

    #[tokio::test]
    async fn test_question_gates() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = write_fake_pdf(dir.path());
        let factory = StubFactory::new();
        let last = factory.last.clone();
        let mut app = App::new(Box::new(factory));

        // Not ingested yet: the question never reaches the handle
        app.dispatch(Action::SubmitCredential("X".to_string()))
            .await;
        let outcome = app.dispatch(Action::Ask("anything".to_string())).await;
        assert!(matches!(outcome, Outcome::Warning(_)));

        app.dispatch(Action::Open(pdf)).await;

        // Empty question: warning, no external call
        let outcome = app.dispatch(Action::Ask("   ".to_string())).await;
        assert!(matches!(outcome, Outcome::Warning(_)));

        let kb = last.lock().unwrap().clone().unwrap();
        assert_eq!(kb.chats.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_ingestion_failure_keeps_session_usable() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = write_fake_pdf(dir.path());
        let mut app = App::new(Box::new(StubFactory::failing()));

        app.dispatch(Action::SubmitCredential("X".to_string()))
            .await;

        let outcome = app.dispatch(Action::Open(pdf.clone())).await;
        match outcome {
            Outcome::Failure(msg) => assert!(msg.contains("simulated provider failure")),
            other => panic!("expected failure, got {:?}", other),
        }
        assert!(!app.session().ingested);
        assert!(app.status_line().contains("Waiting"));

        // Retry is reachable: the upload path is not locked by the failure
        let outcome = app.dispatch(Action::Open(pdf)).await;
        assert!(matches!(outcome, Outcome::Failure(_)));
    }

    #[tokio::test]
    async fn test_reset_clears_everything_and_invalidates_cache() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = write_fake_pdf(dir.path());
        let mut app = App::new(Box::new(StubFactory::new()));

        app.dispatch(Action::SubmitCredential("X".to_string()))
            .await;
        app.dispatch(Action::Open(pdf)).await;
        let before = app.session().handle.clone().unwrap();

        let outcome = app.dispatch(Action::Reset).await;
        assert!(matches!(outcome, Outcome::Info(_)));
        assert!(app.needs_credential());
        assert!(!app.session().ingested);
        assert!(app.session().handle.is_none());
        assert!(app.session().ingested_file.is_none());
        assert!(app.status_line().contains("Waiting"));

        // Same credential and model, but a fresh directory and an
        // invalidated cache: the new handle must be a different one
        app.dispatch(Action::SubmitCredential("X".to_string()))
            .await;
        let after = app.session().handle.clone().unwrap();
        assert!(!Arc::ptr_eq(&before, &after));
    }

    #[tokio::test]
    async fn test_empty_credential_is_rejected() {
        let mut app = App::new(Box::new(StubFactory::new()));
        let outcome = app.dispatch(Action::SubmitCredential("  ".to_string())).await;
        assert!(matches!(outcome, Outcome::Warning(_)));
        assert!(app.needs_credential());
    }

    #[tokio::test]
    async fn test_model_switch_after_session_exists() {
        let mut app = App::new(Box::new(StubFactory::new()));

        let outcome = app
            .dispatch(Action::SelectModel("gemini-2.5-pro".to_string()))
            .await;
        assert!(matches!(outcome, Outcome::Info(_)));
        assert_eq!(app.session().model_id, "gemini-2.5-pro");

        app.dispatch(Action::SubmitCredential("X".to_string()))
            .await;

        // With a live session the selection is recorded but deferred
        let outcome = app
            .dispatch(Action::SelectModel("gemini-1.5-flash".to_string()))
            .await;
        assert!(matches!(outcome, Outcome::Warning(_)));
        assert_eq!(app.session().model_id, "gemini-1.5-flash");

        // Unknown ids are refused outright
        let outcome = app
            .dispatch(Action::SelectModel("gemini-9000".to_string()))
            .await;
        assert!(matches!(outcome, Outcome::Warning(_)));
        assert_eq!(app.session().model_id, "gemini-1.5-flash");
    }
}
