//! Export pipeline - drives one request from interpretation to rendered bytes
//!
//! Each call is independent: the pipeline holds only immutable configuration
//! and shared handles, so one instance can serve concurrent exports.

use crate::adapters::database::DataAccess;
use crate::config::{ExportConfig, MercatorConfig};
use crate::core::estimate::{ExportProfile, SizeEstimator, SizeTier, TimeEstimate};
use crate::core::executor::{ExecutorOptions, QueryExecutor};
use crate::core::export::summary::{ExportOutcome, ExportPlan};
use crate::core::interpreter::QueryInterpreter;
use crate::core::render::{RenderedOutput, Renderer, RendererRegistry};
use crate::domain::query::QueryParts;
use crate::domain::{ExportRequest, InterpretedQuery, MercatorError, Result};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// One page of a request, 1-based
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub page_size: u64,
}

impl PageRequest {
    pub fn new(page: u64, page_size: u64) -> Self {
        Self { page, page_size }
    }
}

/// Export pipeline
///
/// `run` performs interpret → count → estimate → execute → render. Execution
/// and rendering share one deadline derived from the time estimate, and the
/// whole call stops early when the caller's token is cancelled.
pub struct ExportPipeline {
    interpreter: QueryInterpreter,
    executor: QueryExecutor,
    registry: RendererRegistry,
    estimator: SizeEstimator,
    config: ExportConfig,
}

impl ExportPipeline {
    /// Build every stage from configuration over `store`
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the query or render sections are invalid.
    pub fn new(config: &MercatorConfig, store: Arc<dyn DataAccess>) -> Result<Self> {
        let interpreter = QueryInterpreter::from_config(&config.query)?;
        let executor = QueryExecutor::new(store, ExecutorOptions::from(&config.executor));
        let registry = RendererRegistry::with_defaults(&config.render)?;
        let estimator = SizeEstimator::from_config(&config.estimate);

        Ok(Self::from_parts(
            interpreter,
            executor,
            registry,
            estimator,
            config.export.clone(),
        ))
    }

    /// Assemble a pipeline from already built stages
    pub fn from_parts(
        interpreter: QueryInterpreter,
        executor: QueryExecutor,
        registry: RendererRegistry,
        estimator: SizeEstimator,
        config: ExportConfig,
    ) -> Self {
        Self {
            interpreter,
            executor,
            registry,
            estimator,
            config,
        }
    }

    pub fn interpreter(&self) -> &QueryInterpreter {
        &self.interpreter
    }

    pub fn registry(&self) -> &RendererRegistry {
        &self.registry
    }

    /// Registry for adding formats after construction
    pub fn registry_mut(&mut self) -> &mut RendererRegistry {
        &mut self.registry
    }

    /// Size and time forecast for `request`, without fetching rows
    ///
    /// `format` is any name in the registry, such as an
    /// [`ExportFormat`](crate::core::estimate::ExportFormat) or a format added
    /// with [`registry_mut`](Self::registry_mut).
    ///
    /// # Errors
    ///
    /// Returns a validation error for a bad request or unknown format and
    /// [`MercatorError::DataUnavailable`] when the count fails.
    pub async fn estimate(
        &self,
        request: &ExportRequest,
        format: impl AsRef<str>,
        profile: ExportProfile,
    ) -> Result<ExportPlan> {
        self.estimate_page(request, format, profile, None).await
    }

    /// Forecast for one page of `request`, or all of it when `page` is `None`
    pub async fn estimate_page(
        &self,
        request: &ExportRequest,
        format: impl AsRef<str>,
        profile: ExportProfile,
        page: Option<PageRequest>,
    ) -> Result<ExportPlan> {
        let renderer = self.registry.get(format.as_ref())?;
        let query = self.prepare(request, page)?;
        self.plan(&query, renderer.as_ref(), profile).await
    }

    /// Export the full result of `request`
    ///
    /// # Errors
    ///
    /// Returns exactly one typed error: validation, refused as too large,
    /// data unavailable, render failure, timeout or cancellation.
    pub async fn run(
        &self,
        request: &ExportRequest,
        format: impl AsRef<str>,
        profile: ExportProfile,
        cancel: CancellationToken,
    ) -> Result<ExportOutcome> {
        self.run_page(request, format, profile, None, cancel).await
    }

    /// Export one page of `request`, or all of it when `page` is `None`
    pub async fn run_page(
        &self,
        request: &ExportRequest,
        format: impl AsRef<str>,
        profile: ExportProfile,
        page: Option<PageRequest>,
        cancel: CancellationToken,
    ) -> Result<ExportOutcome> {
        let result = self
            .export(request, format.as_ref(), profile, page, &cancel)
            .await;
        if let Err(e) = &result {
            crate::log_error_with_context!(e, "Export failed");
        }
        result
    }

    async fn export(
        &self,
        request: &ExportRequest,
        format: &str,
        profile: ExportProfile,
        page: Option<PageRequest>,
        cancel: &CancellationToken,
    ) -> Result<ExportOutcome> {
        let started = Instant::now();
        if cancel.is_cancelled() {
            return Err(MercatorError::Cancelled);
        }

        let renderer = self.registry.get(format)?;
        let query = self.prepare(request, page)?;

        crate::log_export_start!(query.entity, renderer.name());

        let plan = cancellable(cancel, self.plan(&query, renderer.as_ref(), profile)).await?;
        if plan.estimate.tier == SizeTier::TooLarge && self.estimator.config().refuse_too_large {
            return Err(MercatorError::TooLarge(format!(
                "estimated {} for {} records",
                plan.estimate.formatted, plan.record_count
            )));
        }

        let deadline = self.deadline(&plan.time_estimate);
        tracing::debug!(deadline_secs = deadline.as_secs(), "Export deadline");

        // Cancelled when this call returns, so a render that has not started yet is skipped
        let render_stop = cancel.child_token();
        let _render_guard = render_stop.clone().drop_guard();

        let work = async {
            let rows = self.executor.execute(&query).await?;
            render_blocking(renderer, rows, query.fields.clone(), render_stop).await
        };
        let (output, record_count) = cancellable(cancel, async {
            tokio::time::timeout(deadline, work).await.map_err(|_| {
                MercatorError::Timeout(format!(
                    "export did not finish within {}s",
                    deadline.as_secs()
                ))
            })?
        })
        .await?;

        let outcome = ExportOutcome {
            output,
            plan,
            record_count,
            duration: started.elapsed(),
        };

        crate::log_export_complete!(outcome.record_count, outcome.output.len(), outcome.duration);
        outcome.log_summary();
        Ok(outcome)
    }

    fn prepare(&self, request: &ExportRequest, page: Option<PageRequest>) -> Result<InterpretedQuery> {
        let query = self.interpreter.interpret(request)?;
        match page {
            Some(page) => self.executor.paginate(&query, page.page, page.page_size),
            None => Ok(query),
        }
    }

    async fn plan(
        &self,
        query: &InterpretedQuery,
        renderer: &dyn Renderer,
        profile: ExportProfile,
    ) -> Result<ExportPlan> {
        let total = self.executor.count(query).await?;
        let record_count = windowed_count(total, query.parts());
        let estimate = self
            .estimator
            .estimate(record_count, renderer.size_class(), profile);
        let time_estimate = self.estimator.estimate_time(estimate.bytes);

        let plan = ExportPlan {
            entity: query.entity,
            format: renderer.name().to_string(),
            profile,
            record_count,
            estimate,
            time_estimate,
        };
        plan.log_plan();
        Ok(plan)
    }

    /// `max(min_timeout_secs, estimated seconds × timeout_multiplier)`
    pub fn deadline(&self, time_estimate: &TimeEstimate) -> Duration {
        let scaled = (time_estimate.seconds as f64 * self.config.timeout_multiplier).ceil() as u64;
        Duration::from_secs(scaled.max(self.config.min_timeout_secs))
    }
}

/// Rows a query returns once its offset and row cap apply to `total`
fn windowed_count(total: u64, parts: &QueryParts) -> u64 {
    let remaining = total.saturating_sub(parts.offset.unwrap_or(0));
    parts.limit.map_or(remaining, |limit| remaining.min(limit))
}

async fn cancellable<T>(
    cancel: &CancellationToken,
    work: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            tracing::warn!("Export cancelled");
            Err(MercatorError::Cancelled)
        }
        result = work => result,
    }
}

/// Render on the blocking pool
///
/// A render already running when the deadline passes or the export is
/// cancelled finishes on its worker and its output is dropped; `stop` only
/// prevents one that has not started.
async fn render_blocking(
    renderer: Arc<dyn Renderer>,
    rows: Vec<crate::domain::EntityRow>,
    fields: Vec<String>,
    stop: CancellationToken,
) -> Result<(RenderedOutput, usize)> {
    tokio::task::spawn_blocking(move || {
        if stop.is_cancelled() {
            return Err(MercatorError::Cancelled);
        }
        let count = rows.len();
        renderer.render(&rows, &fields).map(|output| (output, count))
    })
    .await
    .map_err(|e| MercatorError::Render(format!("render task failed: {e}")))?
}
