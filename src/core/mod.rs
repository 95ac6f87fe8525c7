pub mod activity;
pub mod context;
pub mod ranking;
pub mod report;
pub mod runner;
pub mod shapes;

pub use crate::domain::model::{CheckOutcome, CheckStatus, RunReport, Verdict};
pub use crate::domain::ports::{Check, ConfigProvider, Storage};
pub use crate::utils::error::Result;
