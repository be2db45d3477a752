use std::path::Path;
use std::sync::Arc;

use crate::db::DbPool;
use crate::error::AppResult;
use crate::services::diagnostics::{FairnessEventSink, TracingEventSink};
use crate::services::policy_service::PolicyService;
use crate::services::season_fairness_service::SeasonFairnessService;

/// Shared handles for an embedding host (scheduler, report UI).
#[derive(Clone)]
pub struct AppState {
    db_pool: DbPool,
    policy_service: Arc<PolicyService>,
    fairness_service: Arc<SeasonFairnessService>,
}

impl AppState {
    pub fn new(db_pool: DbPool) -> Self {
        Self::with_sink(db_pool, Arc::new(TracingEventSink))
    }

    pub fn with_sink(db_pool: DbPool, sink: Arc<dyn FairnessEventSink>) -> Self {
        let policy_service = Arc::new(PolicyService::new(db_pool.clone()));
        let fairness_service = Arc::new(SeasonFairnessService::new(
            db_pool.clone(),
            Arc::clone(&policy_service),
            sink,
        ));

        Self {
            db_pool,
            policy_service,
            fairness_service,
        }
    }

    pub fn open(db_path: &Path) -> AppResult<Self> {
        Ok(Self::new(DbPool::new(db_path)?))
    }

    pub fn db(&self) -> &DbPool {
        &self.db_pool
    }

    pub fn policy(&self) -> Arc<PolicyService> {
        Arc::clone(&self.policy_service)
    }

    pub fn fairness(&self) -> Arc<SeasonFairnessService> {
        Arc::clone(&self.fairness_service)
    }
}
