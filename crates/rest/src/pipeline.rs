//! End-to-end handling of one search request.
//!
//! ```text
//! Validating -> Querying -> Parsing -> Resolving -> Formatting -> Assembling -> Done
//! ```
//!
//! Any stage may fail; the failure carries the stage it happened in and the
//! tracking id so that it can be logged once, at the edge.

use std::fmt;
use std::time::{Duration, Instant};

use axum::response::{IntoResponse, Response};
use tracing::{debug, error, warn};

use crate::error::GatewayError;
use crate::formatting::{FormatJob, FormatRequest, FormattingDispatcher, RecordFormatter};
use crate::query::{QueryLanguage, QueryNormalizer, SearchParams, SearchRequest};
use crate::records::RecordIdentifierResolver;
use crate::responses::EssResponse;
use crate::sru::{BackendSearchResult, SruClient, SruQuery};

/// Where a request is, or where it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    /// Checking and defaulting parameters.
    Validating,
    /// Calling the SRU backend.
    Querying,
    /// Reading and parsing the backend response.
    Parsing,
    /// Classifying records and extracting identifiers.
    Resolving,
    /// Formatting records concurrently.
    Formatting,
    /// Building the response document.
    Assembling,
    /// Finished.
    Done,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Validating => "validating",
            PipelineStage::Querying => "querying",
            PipelineStage::Parsing => "parsing",
            PipelineStage::Resolving => "resolving",
            PipelineStage::Formatting => "formatting",
            PipelineStage::Assembling => "assembling",
            PipelineStage::Done => "done",
        };
        f.write_str(name)
    }
}

/// A failed request.
#[derive(Debug)]
pub struct PipelineFailure {
    /// Stage the request failed in.
    pub stage: PipelineStage,
    /// Tracking id, when one was known at the time of failure.
    pub tracking_id: Option<String>,
    /// The cause.
    pub error: GatewayError,
}

impl PipelineFailure {
    fn new(stage: PipelineStage, tracking_id: Option<&str>, error: GatewayError) -> Self {
        Self {
            stage,
            tracking_id: tracking_id.map(str::to_string),
            error,
        }
    }
}

impl fmt::Display for PipelineFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "request failed while {}: {}", self.stage, self.error)
    }
}

impl std::error::Error for PipelineFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

impl IntoResponse for PipelineFailure {
    fn into_response(self) -> Response {
        let tracking_id = self.tracking_id.as_deref().unwrap_or("-");
        match self.stage {
            PipelineStage::Validating => warn!(
                tracking_id = %tracking_id,
                stage = %self.stage,
                error = %self.error,
                "Rejected search request"
            ),
            _ => error!(
                tracking_id = %tracking_id,
                stage = %self.stage,
                error = %self.error,
                "Search request failed"
            ),
        }
        self.error.into_response()
    }
}

/// Runs search requests from parameters to response document.
pub struct ResponsePipeline<F> {
    normalizer: QueryNormalizer,
    sru: SruClient,
    resolver: RecordIdentifierResolver,
    dispatcher: FormattingDispatcher<F>,
    deadline: Option<Duration>,
}

impl<F> Clone for ResponsePipeline<F> {
    fn clone(&self) -> Self {
        Self {
            normalizer: self.normalizer.clone(),
            sru: self.sru.clone(),
            resolver: self.resolver.clone(),
            dispatcher: self.dispatcher.clone(),
            deadline: self.deadline,
        }
    }
}

impl<F: RecordFormatter + 'static> ResponsePipeline<F> {
    /// Creates a pipeline from its collaborators, without a whole-request
    /// deadline.
    pub fn new(
        normalizer: QueryNormalizer,
        sru: SruClient,
        resolver: RecordIdentifierResolver,
        dispatcher: FormattingDispatcher<F>,
    ) -> Self {
        Self {
            normalizer,
            sru,
            resolver,
            dispatcher,
            deadline: None,
        }
    }

    /// Fails any request that has not produced a response within `deadline`.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Name of the configured record formatter.
    pub fn formatter_name(&self) -> &'static str {
        self.dispatcher.formatter().formatter_name()
    }

    /// Handles one search request.
    ///
    /// The tracking id is settled before validation so that every failure,
    /// including an unknown base, is logged under it.
    pub async fn run(
        &self,
        mut params: SearchParams,
        language: QueryLanguage,
    ) -> Result<EssResponse, PipelineFailure> {
        let started = Instant::now();
        let tracking_id = params.ensure_tracking_id().to_string();

        let request = self.normalizer.normalize(params, language).map_err(|e| {
            PipelineFailure::new(PipelineStage::Validating, Some(&tracking_id), e)
        })?;

        let mut reached = PipelineStage::Querying;
        let result = match self.deadline {
            Some(limit) => {
                let outcome =
                    tokio::time::timeout(limit, self.execute(&request, &mut reached)).await;
                outcome.unwrap_or_else(|_| {
                    Err(PipelineFailure::new(
                        reached,
                        Some(&tracking_id),
                        GatewayError::RequestTimeout { limit },
                    ))
                })
            }
            None => self.execute(&request, &mut reached).await,
        };
        debug!(
            tracking_id = %tracking_id,
            timer = "request",
            elapsed_ms = started.elapsed().as_millis() as u64,
            ok = result.is_ok(),
            "Search request finished"
        );
        result
    }

    async fn execute(
        &self,
        request: &SearchRequest,
        reached: &mut PipelineStage,
    ) -> Result<EssResponse, PipelineFailure> {
        let tracking_id = request.tracking_id.as_str();
        let fail = |stage: PipelineStage| {
            move |e: GatewayError| PipelineFailure::new(stage, Some(tracking_id), e)
        };

        debug!(
            tracking_id = %tracking_id,
            base = %request.base,
            language = %request.language,
            start = request.start,
            rows = request.rows,
            "Search request accepted"
        );

        *reached = PipelineStage::Querying;
        let query = SruQuery::from(request);
        let response = self
            .sru
            .send(&query, tracking_id)
            .await
            .map_err(fail(PipelineStage::Querying))?;

        *reached = PipelineStage::Parsing;
        let result = self
            .sru
            .read_response(response, tracking_id)
            .await
            .map_err(fail(PipelineStage::Parsing))?;
        if !result.diagnostics.is_empty() {
            warn!(
                tracking_id = %tracking_id,
                diagnostics = ?result.diagnostics,
                "SRU backend returned diagnostics"
            );
        }

        *reached = PipelineStage::Resolving;
        debug!(
            tracking_id = %tracking_id,
            stage = %PipelineStage::Resolving,
            records = result.records.len(),
            "Resolving records"
        );
        let hits = result.hits;
        let jobs = self.resolve(request, result);

        *reached = PipelineStage::Formatting;
        debug!(tracking_id = %tracking_id, stage = %PipelineStage::Formatting, "Formatting records");
        let records = self
            .dispatcher
            .dispatch(jobs, tracking_id)
            .await
            .map_err(fail(PipelineStage::Formatting))?;

        *reached = PipelineStage::Assembling;
        debug!(tracking_id = %tracking_id, stage = %PipelineStage::Assembling, "Assembling response");
        let response = EssResponse::new(hits, records, tracking_id);
        debug!(
            tracking_id = %tracking_id,
            stage = %PipelineStage::Done,
            hits = response.hits,
            records = response.records.len(),
            errors = response.error_count(),
            "Response assembled"
        );
        Ok(response)
    }

    /// One job per record, in backend order.
    fn resolve(&self, request: &SearchRequest, result: BackendSearchResult) -> Vec<FormatJob> {
        result
            .records
            .iter()
            .enumerate()
            .map(|(index, record)| match self.resolver.resolve(record) {
                Ok(resolved) => FormatJob::Format(FormatRequest {
                    document: resolved.document,
                    output_format: request.format.clone(),
                    identifier: resolved.identifier,
                    tracking_id: request.tracking_id.clone(),
                }),
                Err(e) => {
                    error!(
                        tracking_id = %request.tracking_id,
                        index,
                        position = ?record.position,
                        error = %e,
                        "Record cannot be formatted"
                    );
                    FormatJob::failed()
                }
            })
            .collect()
    }
}
