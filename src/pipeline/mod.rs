//! End-to-end mapping: compose, rank, select, verify, merge.
//!
//! [`ControlMapper`] is built once per catalog and shared across requests. The BM25
//! index is immutable after construction, so concurrent requests need no locking.
//! Verifier calls for the selected subset run concurrently, each under its own timeout,
//! and the merge waits for all of them. Cancelling a request drops the outstanding
//! calls and merges whatever verdicts already arrived.

pub mod error;


pub use error::MapperError;

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use futures_util::StreamExt;
use futures_util::stream::FuturesUnordered;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::catalog::Catalog;
use crate::config::{ConfigError, MapperConfig};
use crate::document::{DocumentSource, InlineText};
use crate::merge::{MergeContext, merge_with_context};
use crate::output::MappingReport;
use crate::query::QueryComposer;
use crate::ranking::{LexicalRanker, RankedCandidate};
use crate::text::TextPreprocessor;
use crate::verifier::{
    AssessmentRequest, SemanticVerifier, VerifierVerdict, assess_with_timeout, build_verifier,
    select_for_verification,
};

/// One service to map.
#[derive(Clone)]
pub struct MappingRequest {
    pub service_name: String,
    pub analyst_note: String,
    pub document: Arc<dyn DocumentSource>,
}

impl MappingRequest {
    pub fn new(
        service_name: impl Into<String>,
        analyst_note: impl Into<String>,
        document: Arc<dyn DocumentSource>,
    ) -> Self {
        Self {
            service_name: service_name.into(),
            analyst_note: analyst_note.into(),
            document,
        }
    }

    /// Request over documentation text already in memory.
    pub fn inline(
        service_name: impl Into<String>,
        analyst_note: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self::new(service_name, analyst_note, Arc::new(InlineText::new(text)))
    }
}

#[derive(Clone)]
pub struct ControlMapper {
    ranker: Arc<LexicalRanker>,
    composer: QueryComposer,
    verifier: Option<Arc<dyn SemanticVerifier>>,
    catalog_fingerprint: String,
    config: MapperConfig,
}

impl ControlMapper {
    /// Validates `config`, indexes `catalog` and builds the configured verifier.
    pub fn new(catalog: Catalog, config: MapperConfig) -> Result<Self, MapperError> {
        config.validate()?;
        let verifier = build_verifier(&config.verifier).map_err(|e| {
            ConfigError::InvalidVerifier {
                reason: e.to_string(),
            }
        })?;
        Self::with_verifier(catalog, config, verifier)
    }

    /// Like [`ControlMapper::new`] with an explicit verifier (`None` disables verification).
    pub fn with_verifier(
        catalog: Catalog,
        config: MapperConfig,
        verifier: Option<Arc<dyn SemanticVerifier>>,
    ) -> Result<Self, MapperError> {
        let preprocessor = TextPreprocessor::english();
        let catalog_fingerprint = catalog.fingerprint();
        let ranker = LexicalRanker::build(catalog, config.bm25, preprocessor.clone())?;
        let composer = QueryComposer::new(config.query.clone(), preprocessor);

        info!(
            catalog_size = ranker.catalog().len(),
            vocabulary = ranker.index().vocabulary_size(),
            verifier = verifier.as_ref().map(|v| v.name()).unwrap_or("none"),
            top_n = config.top_n,
            verify_top_n = config.effective_verify_top_n(),
            "Control mapper ready"
        );

        Ok(Self {
            ranker: Arc::new(ranker),
            composer,
            verifier,
            catalog_fingerprint,
            config,
        })
    }

    /// Validates the config before touching the catalog file.
    pub fn from_path(path: impl AsRef<Path>, config: MapperConfig) -> Result<Self, MapperError> {
        config.validate()?;
        let catalog = Catalog::load(path)?;
        Self::new(catalog, config)
    }

    pub fn catalog(&self) -> &Catalog {
        self.ranker.catalog()
    }

    pub fn ranker(&self) -> &LexicalRanker {
        &self.ranker
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    pub async fn map_controls(&self, request: &MappingRequest) -> MappingReport {
        self.map_with_cancel(request, CancellationToken::new()).await
    }

    /// Runs one request. Never fails: unreadable documents, failed verifier calls and
    /// cancellation all degrade into warnings, degraded verdicts or lexical-only results.
    pub async fn map_with_cancel(
        &self,
        request: &MappingRequest,
        cancel: CancellationToken,
    ) -> MappingReport {
        let mut warnings = Vec::new();
        let mut context = MergeContext::default();

        let raw = match request.document.read_text().await {
            Ok(text) => text,
            Err(e) => {
                warn!(
                    service = %request.service_name,
                    error = %e,
                    "Document unreadable, continuing with an empty excerpt"
                );
                warnings.push(format!("document unreadable: {}", e));
                context.document_unreadable = true;
                String::new()
            }
        };

        let excerpt = self.composer.extract_relevant_excerpt(&raw);
        let tokens =
            self.composer
                .compose_tokens(&request.service_name, &request.analyst_note, &excerpt);
        let candidates = self.ranker.rank(&tokens, self.config.top_n);

        let outcome = self
            .verify_subset(request, &excerpt, &candidates, &cancel)
            .await;
        if outcome.cancelled {
            warnings.push(format!(
                "verification cancelled: {} of {} verdicts collected",
                outcome.verdicts.len(),
                outcome.selected.len()
            ));
            let answered: HashSet<u64> = outcome.verdicts.iter().map(|v| v.control_id).collect();
            context.unverified = outcome
                .selected
                .iter()
                .copied()
                .filter(|id| !answered.contains(id))
                .collect();
        }

        let mapping =
            merge_with_context(self.ranker.catalog(), &candidates, &outcome.verdicts, &context);
        let report = MappingReport::new(
            request.service_name.clone(),
            self.ranker.catalog().len(),
            self.catalog_fingerprint.clone(),
            mapping,
            warnings,
        );

        info!(
            service = %report.service_name,
            request_id = %report.request_id,
            lexical_matches = report.stats.lexical_matches,
            verified = report.stats.verified,
            degraded = report.stats.degraded,
            applicable = report.stats.applicable,
            "Mapping complete"
        );

        report
    }

    /// Fans out verifier calls for the selected subset and collects verdicts until every
    /// call finishes or the token fires.
    async fn verify_subset(
        &self,
        request: &MappingRequest,
        excerpt: &str,
        candidates: &[RankedCandidate],
        cancel: &CancellationToken,
    ) -> VerificationOutcome {
        let Some(verifier) = self.verifier.as_ref() else {
            return VerificationOutcome::default();
        };

        let selected = select_for_verification(candidates, self.config.effective_verify_top_n());
        let selected_ids: Vec<u64> = selected.iter().map(|c| c.control_id).collect();
        let timeout = self.config.verifier.timeout;

        let mut pending: FuturesUnordered<_> = selected
            .into_iter()
            .filter_map(|candidate| {
                let description = self.ranker.catalog().description(candidate.position)?;
                let assessment = AssessmentRequest::new(
                    candidate.control_id,
                    &request.service_name,
                    excerpt,
                    &request.analyst_note,
                    description,
                );
                let verifier = Arc::clone(verifier);
                Some(async move {
                    assess_with_timeout(verifier.as_ref(), &assessment, timeout).await
                })
            })
            .collect();

        let requested = pending.len();
        let mut verdicts = Vec::with_capacity(requested);
        let mut cancelled = false;

        while !pending.is_empty() {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    cancelled = true;
                    break;
                }
                next = pending.next() => match next {
                    Some(verdict) => verdicts.push(verdict),
                    None => break,
                },
            }
        }

        if cancelled {
            warn!(
                requested,
                collected = verdicts.len(),
                "Verification cancelled, merging collected verdicts"
            );
        } else {
            debug!(
                verifier = verifier.name(),
                requested,
                "Verification complete"
            );
        }

        VerificationOutcome {
            verdicts,
            selected: selected_ids,
            cancelled,
        }
    }
}

#[derive(Debug, Default)]
struct VerificationOutcome {
    verdicts: Vec<VerifierVerdict>,
    /// Ids sent to the verifier, in selection order.
    selected: Vec<u64>,
    cancelled: bool,
}
