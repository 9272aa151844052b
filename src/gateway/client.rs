//! The gateway proper: credential handling + the primary→fallback pipeline.
//!
//! ## Fallback contract
//!
//! Fallback is an explicit two-step result pipeline, not exception
//! plumbing: the primary call's `Result` is inspected, and only a definitive
//! `Err` triggers one sequential call to the fallback model with identical
//! messages and options. There is no speculative concurrent dispatch, and
//! when the fallback also fails *its* error is what the caller sees — by
//! then the primary's failure has already been logged and absorbed.
//!
//! The credential is read fresh from the key store at the start of every
//! request, so replacing the key mid-session affects exactly the requests
//! issued after the change.

use super::{ChatBackend, CompletionOptions, HttpBackend, Message};
use crate::config::AnalysisConfig;
use crate::credential::CredentialStore;
use crate::error::LensError;
use crate::store::KeyValueStore;
use std::sync::Arc;
use tracing::{debug, warn};

/// Issues model calls with credential lookup and single-step model fallback.
#[derive(Clone)]
pub struct Gateway {
    backend: Arc<dyn ChatBackend>,
    credentials: CredentialStore,
    config: AnalysisConfig,
}

impl Gateway {
    /// Build a gateway over the HTTP backend configured in `config`.
    pub fn new(config: AnalysisConfig, store: Arc<dyn KeyValueStore>) -> Result<Self, LensError> {
        let backend: Arc<dyn ChatBackend> = Arc::new(HttpBackend::new(&config.base_url)?);
        Ok(Self::with_backend(config, store, backend))
    }

    /// Build a gateway over a caller-supplied backend (tests, middleware).
    pub fn with_backend(
        config: AnalysisConfig,
        store: Arc<dyn KeyValueStore>,
        backend: Arc<dyn ChatBackend>,
    ) -> Self {
        Self {
            backend,
            credentials: CredentialStore::new(store),
            config,
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Per-call options derived from the config.
    pub(crate) fn options(&self) -> CompletionOptions {
        CompletionOptions {
            temperature: self.config.temperature,
            max_tokens: Some(self.config.max_tokens),
            json_response: false,
        }
    }

    /// Run one request: read the credential, try the primary model, and on
    /// any failure retry once against the fallback model.
    pub async fn complete(
        &self,
        primary: &str,
        fallback: &str,
        messages: &[Message],
        options: &CompletionOptions,
    ) -> Result<String, LensError> {
        let credential = self.credentials.require()?;

        match self
            .backend
            .complete(&credential, primary, messages, options)
            .await
        {
            Ok(text) => {
                debug!("{primary} answered ({} chars)", text.len());
                Ok(text)
            }
            Err(primary_err) => {
                warn!("{primary} failed ({primary_err}); retrying with {fallback}");
                self.backend
                    .complete(&credential, fallback, messages, options)
                    .await
            }
        }
    }

    /// [`Self::complete`] against the configured vision model pair.
    pub(crate) async fn complete_vision(
        &self,
        messages: &[Message],
        options: &CompletionOptions,
    ) -> Result<String, LensError> {
        self.complete(
            &self.config.vision_model,
            &self.config.vision_fallback,
            messages,
            options,
        )
        .await
    }

    /// [`Self::complete`] against the configured text model pair.
    pub(crate) async fn complete_text(
        &self,
        messages: &[Message],
        options: &CompletionOptions,
    ) -> Result<String, LensError> {
        self.complete(
            &self.config.text_model,
            &self.config.text_fallback,
            messages,
            options,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{KeyValueStore, MemoryStore};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Backend that replays scripted results and records every call.
    struct Scripted {
        replies: Mutex<VecDeque<Result<String, LensError>>>,
        calls: Mutex<Vec<(String, String)>>, // (credential, model)
    }

    impl Scripted {
        fn new(replies: Vec<Result<String, LensError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<(String, String)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl ChatBackend for Scripted {
        async fn complete(
            &self,
            credential: &str,
            model: &str,
            _messages: &[Message],
            _options: &CompletionOptions,
        ) -> Result<String, LensError> {
            self.calls
                .lock()
                .unwrap()
                .push((credential.to_string(), model.to_string()));
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| panic!("no scripted reply left"))
        }
    }

    fn gateway_with(
        replies: Vec<Result<String, LensError>>,
    ) -> (Gateway, Arc<Scripted>, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        store.set("api_key", "sk-test").unwrap();
        let backend = Arc::new(Scripted::new(replies));
        let gateway = Gateway::with_backend(
            AnalysisConfig::default(),
            store.clone(),
            backend.clone(),
        );
        (gateway, backend, store)
    }

    fn fail(model: &str, reason: &str) -> LensError {
        LensError::ProviderRequestFailed {
            model: model.into(),
            reason: reason.into(),
        }
    }

    #[tokio::test]
    async fn primary_success_issues_one_call() {
        let (gateway, backend, _) = gateway_with(vec![Ok("answer".into())]);
        let out = gateway
            .complete("a", "b", &[Message::user("q")], &CompletionOptions::default())
            .await
            .unwrap();
        assert_eq!(out, "answer");
        assert_eq!(backend.calls().len(), 1);
        assert_eq!(backend.calls()[0].1, "a");
    }

    #[tokio::test]
    async fn primary_failure_falls_back_once() {
        let (gateway, backend, _) =
            gateway_with(vec![Err(fail("a", "HTTP 503")), Ok("rescued".into())]);
        let out = gateway
            .complete("a", "b", &[Message::user("q")], &CompletionOptions::default())
            .await
            .unwrap();
        assert_eq!(out, "rescued");
        let models: Vec<_> = backend.calls().iter().map(|(_, m)| m.clone()).collect();
        assert_eq!(models, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn double_failure_surfaces_the_fallback_error() {
        let (gateway, _, _) = gateway_with(vec![
            Err(fail("a", "primary down")),
            Err(fail("b", "fallback down")),
        ]);
        let err = gateway
            .complete("a", "b", &[Message::user("q")], &CompletionOptions::default())
            .await
            .unwrap_err();
        match err {
            LensError::ProviderRequestFailed { model, reason } => {
                assert_eq!(model, "b");
                assert_eq!(reason, "fallback down");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn missing_credential_short_circuits() {
        let store = Arc::new(MemoryStore::new());
        let backend = Arc::new(Scripted::new(vec![]));
        let gateway =
            Gateway::with_backend(AnalysisConfig::default(), store, backend.clone());
        let err = gateway
            .complete("a", "b", &[Message::user("q")], &CompletionOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, LensError::MissingCredential));
        assert!(backend.calls().is_empty(), "no network call without a key");
    }

    #[tokio::test]
    async fn credential_is_read_fresh_per_request() {
        let (gateway, backend, store) =
            gateway_with(vec![Ok("one".into()), Ok("two".into())]);

        gateway
            .complete("a", "b", &[Message::user("q")], &CompletionOptions::default())
            .await
            .unwrap();
        store.set("api_key", "sk-rotated").unwrap();
        gateway
            .complete("a", "b", &[Message::user("q")], &CompletionOptions::default())
            .await
            .unwrap();

        let creds: Vec<_> = backend.calls().iter().map(|(c, _)| c.clone()).collect();
        assert_eq!(creds, vec!["sk-test", "sk-rotated"]);
    }

    #[tokio::test]
    async fn empty_response_also_triggers_fallback() {
        let (gateway, backend, _) = gateway_with(vec![
            Err(LensError::EmptyResponse { model: "a".into() }),
            Ok("text".into()),
        ]);
        let out = gateway
            .complete("a", "b", &[Message::user("q")], &CompletionOptions::default())
            .await
            .unwrap();
        assert_eq!(out, "text");
        assert_eq!(backend.calls().len(), 2);
    }
}
