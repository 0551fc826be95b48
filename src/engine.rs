//! The engine actor and the host-side handle that drives it.
//!
//! The actor owns a [`SpellCheckEngine`] and processes one request at a time
//! in arrival order, so a request always observes every mutation sent before
//! it. Hosts talk to it only through [`EngineHandle`].

use crate::checker::custom_words::ImportReport;
use crate::checker::dictionary::{MorphologicalDictionary, WordListDictionary};
use crate::checker::{CacheStats, EngineOptions, SpellCheckEngine};
use crate::diff::{calculate_regions, DiffRegion};
use crate::error::{DictionaryError, EngineError};
use crate::protocol::{CheckOutcome, Request, Response, WordAction};
use serde_json::Value;
use std::time::Duration;
use tokio::sync::mpsc;

pub const DEFAULT_SUGGESTION_TIMEOUT: Duration = Duration::from_millis(1000);

/// Builds a dictionary from the affix and word-list sources sent with
/// `INIT_DICTIONARY`.
pub type DictionaryLoader = Box<
    dyn Fn(&str, &str) -> Result<Box<dyn MorphologicalDictionary>, DictionaryError> + Send,
>;

struct Envelope {
    request: Request,
    reply: Option<mpsc::UnboundedSender<Response>>,
}

struct Engine {
    state: SpellCheckEngine,
    loader: DictionaryLoader,
    inbox: mpsc::UnboundedReceiver<Envelope>,
}

impl Engine {
    async fn run(mut self) {
        while let Some(Envelope { request, reply }) = self.inbox.recv().await {
            let responses = self.handle(request).await;
            if let Some(reply) = reply {
                for response in responses {
                    // The host may have stopped waiting; late replies are dropped.
                    if reply.send(response).is_err() {
                        tracing::debug!("reply channel closed, discarding response");
                        break;
                    }
                }
            }
        }
        tracing::debug!("engine inbox closed, stopping");
    }

    #[tracing::instrument(skip_all, fields(request = request.name()))]
    async fn handle(&mut self, request: Request) -> Vec<Response> {
        match request {
            Request::InitDictionary {
                affix_rules,
                word_list,
            } => match (self.loader)(&affix_rules, &word_list) {
                Ok(dictionary) => {
                    self.state.set_dictionary(dictionary);
                    vec![Response::DictionaryReady { ready: true }]
                }
                Err(e) => {
                    tracing::warn!(error = %e, "dictionary initialization failed");
                    vec![Response::Error {
                        message: e.to_string(),
                    }]
                }
            },
            Request::CheckText { full_text } => {
                let invalid_words = self.state.check_full(&full_text).await;
                vec![self.outcome(invalid_words)]
            }
            Request::CheckIncremental { full_text, regions } => {
                let invalid_words = self.state.check_incremental(&full_text, &regions).await;
                vec![self.outcome(invalid_words)]
            }
            Request::AddWord { word } => {
                let recheck = self.state.add_word(&word).await;
                self.word_updated(recheck, WordAction::AddWord, word)
            }
            Request::RemoveWord { word } => {
                let recheck = self.state.remove_word(&word).await;
                self.word_updated(recheck, WordAction::RemoveWord, word)
            }
            Request::ImportWords { words } => {
                let (report, recheck) = self.state.import_payload(&words).await;
                let mut responses: Vec<Response> =
                    recheck.map(|r| self.outcome(r)).into_iter().collect();
                responses.push(report.into());
                responses
            }
            Request::ClearWords => {
                self.state.clear_words();
                Vec::new()
            }
            Request::GetSuggestions { word } => {
                let suggestions = self.state.suggest(&word);
                vec![Response::SuggestionsResult { word, suggestions }]
            }
            Request::GetCacheStats => vec![Response::CacheStats(self.state.stats())],
        }
    }

    fn word_updated(
        &self,
        recheck: Option<Vec<crate::CheckResult>>,
        action: WordAction,
        word: String,
    ) -> Vec<Response> {
        let mut responses: Vec<Response> = recheck.map(|r| self.outcome(r)).into_iter().collect();
        responses.push(Response::DictionaryUpdated { action, word });
        responses
    }

    fn outcome(&self, invalid_words: Vec<crate::CheckResult>) -> Response {
        CheckOutcome {
            invalid_words,
            current_invalid_map: self.state.known_invalid().clone(),
        }
        .into()
    }
}

/// Loader used by [`EngineHandle::spawn`]: a [`WordListDictionary`] built
/// from the raw sources.
pub fn word_list_loader(max_suggestions: usize) -> DictionaryLoader {
    Box::new(move |affix_rules, word_list| {
        let dictionary = WordListDictionary::from_sources(affix_rules, word_list)?
            .with_max_suggestions(max_suggestions);
        Ok(Box::new(dictionary) as Box<dyn MorphologicalDictionary>)
    })
}

/// Cloneable client for an engine actor. The actor stops once every handle
/// has been dropped.
#[derive(Clone)]
pub struct EngineHandle {
    outbox: mpsc::UnboundedSender<Envelope>,
    suggestion_timeout: Duration,
    context_words: usize,
}

impl EngineHandle {
    /// Start an engine on the current Tokio runtime.
    pub fn spawn(options: EngineOptions) -> Self {
        let loader = word_list_loader(options.max_suggestions);
        Self::spawn_with_loader(options, loader)
    }

    pub fn spawn_with_loader(options: EngineOptions, loader: DictionaryLoader) -> Self {
        let (outbox, inbox) = mpsc::unbounded_channel();
        let context_words = options.context_words;
        let engine = Engine {
            state: SpellCheckEngine::new(options),
            loader,
            inbox,
        };
        tokio::spawn(engine.run());

        Self {
            outbox,
            suggestion_timeout: DEFAULT_SUGGESTION_TIMEOUT,
            context_words,
        }
    }

    pub fn with_suggestion_timeout(mut self, timeout: Duration) -> Self {
        self.suggestion_timeout = timeout;
        self
    }

    /// Send a request and collect every response it produces, in order.
    pub async fn request(&self, request: Request) -> Result<Vec<Response>, EngineError> {
        let (reply, mut responses_rx) = mpsc::unbounded_channel();
        self.outbox
            .send(Envelope {
                request,
                reply: Some(reply),
            })
            .map_err(|_| EngineError::EngineStopped)?;

        let mut responses = Vec::new();
        while let Some(response) = responses_rx.recv().await {
            responses.push(response);
        }
        Ok(responses)
    }

    /// Send a request without waiting for (or receiving) its responses.
    pub fn post(&self, request: Request) -> Result<(), EngineError> {
        self.outbox
            .send(Envelope {
                request,
                reply: None,
            })
            .map_err(|_| EngineError::EngineStopped)
    }

    pub async fn init_dictionary(
        &self,
        affix_rules: impl Into<String>,
        word_list: impl Into<String>,
    ) -> Result<(), EngineError> {
        let responses = self
            .request(Request::InitDictionary {
                affix_rules: affix_rules.into(),
                word_list: word_list.into(),
            })
            .await?;

        match responses.into_iter().next() {
            Some(Response::DictionaryReady { ready: true }) => Ok(()),
            Some(Response::Error { message }) => Err(EngineError::Rejected(message)),
            other => Err(unexpected(other)),
        }
    }

    pub async fn check_text(&self, full_text: impl Into<String>) -> Result<CheckOutcome, EngineError> {
        let responses = self
            .request(Request::CheckText {
                full_text: full_text.into(),
            })
            .await?;
        expect_outcome(responses)
    }

    pub async fn check_incremental(
        &self,
        full_text: impl Into<String>,
        regions: Vec<DiffRegion>,
    ) -> Result<CheckOutcome, EngineError> {
        let responses = self
            .request(Request::CheckIncremental {
                full_text: full_text.into(),
                regions,
            })
            .await?;
        expect_outcome(responses)
    }

    /// Diff `previous` against `current` and check only what changed.
    /// Positions in the outcome are relative to `current`; words outside the
    /// changed regions are not reported.
    pub async fn check_revision(
        &self,
        previous: &str,
        current: &str,
    ) -> Result<CheckOutcome, EngineError> {
        let regions = calculate_regions(previous, current, self.context_words);
        self.check_incremental(current, regions).await
    }

    /// Returns the re-check of the last text, if there was one.
    pub async fn add_word(&self, word: impl Into<String>) -> Result<Option<CheckOutcome>, EngineError> {
        let responses = self.request(Request::AddWord { word: word.into() }).await?;
        split_word_update(responses)
    }

    pub async fn remove_word(
        &self,
        word: impl Into<String>,
    ) -> Result<Option<CheckOutcome>, EngineError> {
        let responses = self
            .request(Request::RemoveWord { word: word.into() })
            .await?;
        split_word_update(responses)
    }

    pub async fn import_words(
        &self,
        words: Vec<String>,
    ) -> Result<(ImportReport, Option<CheckOutcome>), EngineError> {
        self.import(Value::from(words)).await
    }

    /// Import a JSON array given as text. Malformed input imports nothing.
    pub async fn import_words_json(
        &self,
        json: impl Into<String>,
    ) -> Result<(ImportReport, Option<CheckOutcome>), EngineError> {
        self.import(Value::String(json.into())).await
    }

    async fn import(
        &self,
        words: Value,
    ) -> Result<(ImportReport, Option<CheckOutcome>), EngineError> {
        let responses = self.request(Request::ImportWords { words }).await?;

        let mut recheck = None;
        for response in responses {
            match response {
                Response::WordsImported { imported, failed } => {
                    return Ok((ImportReport { imported, failed }, recheck));
                }
                other => recheck = other.into_check_outcome(),
            }
        }
        Err(unexpected(None))
    }

    pub fn clear_words(&self) -> Result<(), EngineError> {
        self.post(Request::ClearWords)
    }

    /// Suggestions for `word`, or none if the engine does not answer within
    /// the suggestion timeout.
    pub async fn suggestions(&self, word: impl Into<String>) -> Vec<String> {
        let word = word.into();
        let request = self.request(Request::GetSuggestions { word: word.clone() });

        match tokio::time::timeout(self.suggestion_timeout, request).await {
            Ok(Ok(responses)) => responses
                .into_iter()
                .find_map(|response| match response {
                    Response::SuggestionsResult { suggestions, .. } => Some(suggestions),
                    _ => None,
                })
                .unwrap_or_default(),
            Ok(Err(e)) => {
                tracing::warn!(error = %e, word = %word, "suggestion request failed");
                Vec::new()
            }
            Err(_) => {
                tracing::warn!(word = %word, timeout = ?self.suggestion_timeout, "suggestion request timed out");
                Vec::new()
            }
        }
    }

    pub async fn cache_stats(&self) -> Result<CacheStats, EngineError> {
        let responses = self.request(Request::GetCacheStats).await?;
        match responses.into_iter().next() {
            Some(Response::CacheStats(stats)) => Ok(stats),
            other => Err(unexpected(other)),
        }
    }
}

fn expect_outcome(responses: Vec<Response>) -> Result<CheckOutcome, EngineError> {
    match responses.into_iter().next() {
        Some(response @ Response::CheckResult { .. }) => response
            .into_check_outcome()
            .ok_or_else(|| unexpected(None)),
        other => Err(unexpected(other)),
    }
}

fn split_word_update(responses: Vec<Response>) -> Result<Option<CheckOutcome>, EngineError> {
    let mut recheck = None;
    for response in responses {
        match response {
            Response::DictionaryUpdated { .. } => return Ok(recheck),
            other => recheck = other.into_check_outcome(),
        }
    }
    Err(unexpected(None))
}

fn unexpected(response: Option<Response>) -> EngineError {
    match response {
        Some(Response::Error { message }) => EngineError::Rejected(message),
        Some(other) => EngineError::Rejected(format!("unexpected response: {other:?}")),
        None => EngineError::Rejected("no response".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Stalling;

    impl MorphologicalDictionary for Stalling {
        fn check(&self, _word: &str) -> bool {
            true
        }

        fn suggest(&self, _word: &str) -> Vec<String> {
            std::thread::sleep(Duration::from_millis(200));
            vec!["late".to_string()]
        }
    }

    #[tokio::test]
    async fn test_init_failure_is_reported_not_fatal() {
        let loader: DictionaryLoader = Box::new(|_, _| {
            Err(DictionaryError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "corrupt word list",
            )))
        });
        let engine = EngineHandle::spawn_with_loader(EngineOptions::default(), loader);

        let err = engine.init_dictionary("", "hello").await.unwrap_err();
        assert!(matches!(err, EngineError::Rejected(message) if message.contains("corrupt word list")));

        // Still alive, still fail-open.
        let outcome = engine.check_text("qwzx blorp").await.unwrap();
        assert!(outcome.invalid_words.is_empty());
        assert!(!engine.cache_stats().await.unwrap().dictionary_ready);
    }

    #[tokio::test]
    async fn test_empty_word_list_is_ready() {
        let engine = EngineHandle::spawn(EngineOptions::default());
        engine.init_dictionary("", "").await.unwrap();

        assert!(engine.cache_stats().await.unwrap().dictionary_ready);
        let outcome = engine.check_text("anything").await.unwrap();
        assert_eq!(outcome.invalid_words.len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_import_reports_nothing_imported() {
        let engine = EngineHandle::spawn(EngineOptions::default());
        engine.init_dictionary("", "hello").await.unwrap();
        engine.check_text("helo").await.unwrap();

        let (report, recheck) = engine.import_words_json("{not a list").await.unwrap();
        assert_eq!(report, ImportReport::default());
        assert!(recheck.is_none());

        let (report, recheck) = engine.import_words_json(r#"["helo"]"#).await.unwrap();
        assert_eq!(report.imported, 1);
        assert!(recheck.unwrap().invalid_words.is_empty());
    }

    #[tokio::test]
    async fn test_clear_words_has_no_response() {
        let engine = EngineHandle::spawn(EngineOptions::default());
        engine.init_dictionary("", "hello\nworld").await.unwrap();
        engine.add_word("helo").await.unwrap();

        let responses = engine.request(Request::ClearWords).await.unwrap();
        assert!(responses.is_empty());
        assert_eq!(engine.cache_stats().await.unwrap().custom_words_count, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_suggestion_timeout_yields_empty() {
        let loader: DictionaryLoader =
            Box::new(|_, _| Ok(Box::new(Stalling) as Box<dyn MorphologicalDictionary>));
        let engine = EngineHandle::spawn_with_loader(EngineOptions::default(), loader)
            .with_suggestion_timeout(Duration::from_millis(20));
        engine.init_dictionary("", "").await.unwrap();

        assert!(engine.suggestions("anything").await.is_empty());

        // The late reply is discarded and the actor keeps serving.
        let engine = engine.with_suggestion_timeout(Duration::from_secs(5));
        assert_eq!(engine.suggestions("anything").await, vec!["late".to_string()]);
    }

    #[tokio::test]
    async fn test_post_after_engine_stopped() {
        let (outbox, inbox) = mpsc::unbounded_channel::<Envelope>();
        drop(inbox);
        let handle = EngineHandle {
            outbox,
            suggestion_timeout: DEFAULT_SUGGESTION_TIMEOUT,
            context_words: 2,
        };

        assert!(matches!(handle.clear_words(), Err(EngineError::EngineStopped)));
        assert!(matches!(
            handle.check_text("text").await,
            Err(EngineError::EngineStopped)
        ));
        assert!(handle.suggestions("text").await.is_empty());
    }
}
