pub mod etl;
pub mod pipeline;
pub mod resolver;
pub mod table;

pub use crate::domain::model::{
    DisplayField, Endpoint, Identity, Resolution, RunSettings, RunSummary, Scheme,
};
pub use crate::domain::ports::{ConfigProvider, IdentityResolver, Pipeline};
pub use crate::utils::error::Result;
