//! Counter cache maintenance service
//!
//! Thin orchestration over the maintainer port. Meant to be run from an
//! operator task (startup recovery, cron) after bulk data changes.

use blog_core::traits::CounterRecomputeReport;
use tracing::{info, instrument};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Maintenance service
pub struct MaintenanceService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MaintenanceService<'a> {
    /// Create a new MaintenanceService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Reset every denormalized counter to the true live association count.
    /// Safe to run repeatedly; a drift-free run updates nothing.
    #[instrument(skip(self))]
    pub async fn recompute_counters(&self) -> ServiceResult<CounterRecomputeReport> {
        let report = self.ctx.counter_maintainer().recompute_all().await?;

        info!(updated = report.total(), "Counter recompute complete");

        Ok(report)
    }
}
