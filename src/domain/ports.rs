use crate::domain::model::{DisplayField, Endpoint, Resolution, RunSettings, RunSummary};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Looks up one user identifier in the directory.
///
/// `Err` means the directory itself is unusable and the run must stop;
/// `Ok(Resolution::Unresolved)` only affects the current row.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve(&self, identifier: &str, display: DisplayField) -> Result<Resolution>;
}

pub trait ConfigProvider: Send + Sync {
    fn endpoint(&self) -> Result<Endpoint>;
    fn input_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn column(&self) -> &str;
    fn full_name(&self) -> bool;

    fn run_settings(&self) -> RunSettings {
        RunSettings {
            input_path: self.input_path().to_string(),
            output_path: self.output_path().to_string(),
            column: self.column().to_string(),
            display: DisplayField::from_full_name_flag(self.full_name()),
        }
    }
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn execute(&self) -> Result<RunSummary>;
}
