use crate::core::{Pipeline, RunSummary};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&mut self) -> Result<RunSummary> {
        tracing::info!("Starting user ID resolution");
        self.monitor.log_stats("Start");

        let result = self.pipeline.execute().await;

        match &result {
            Ok(summary) => {
                tracing::info!(
                    "Resolved {} of {} records ({} skipped)",
                    summary.rows_written,
                    summary.rows_read,
                    summary.rows_skipped
                );
                match serde_json::to_string(summary) {
                    Ok(json) => tracing::debug!("Run summary: {}", json),
                    Err(e) => tracing::debug!("Run summary not serializable: {}", e),
                }
            }
            Err(e) => tracing::error!("Run aborted: {}", e),
        }

        self.monitor.log_stats("Finish");
        self.monitor.log_final_stats();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::EtlError;
    use chrono::Utc;

    struct FixedPipeline {
        rows: Option<u64>,
    }

    #[async_trait::async_trait]
    impl Pipeline for FixedPipeline {
        async fn execute(&self) -> Result<RunSummary> {
            match self.rows {
                Some(rows) => Ok(RunSummary {
                    rows_read: rows,
                    rows_written: rows,
                    rows_skipped: 0,
                    output: "out.csv".to_string(),
                    started_at: Utc::now(),
                    finished_at: Utc::now(),
                }),
                None => Err(EtlError::NoHeader),
            }
        }
    }

    #[tokio::test]
    async fn test_engine_returns_summary() {
        let mut engine = EtlEngine::new(FixedPipeline { rows: Some(4) });
        let summary = engine.run().await.unwrap();
        assert_eq!(summary.rows_written, 4);
        assert_eq!(summary.output, "out.csv");
    }

    #[tokio::test]
    async fn test_engine_propagates_failure() {
        let mut engine = EtlEngine::new_with_monitoring(FixedPipeline { rows: None }, true);
        assert!(matches!(engine.run().await, Err(EtlError::NoHeader)));
    }
}
