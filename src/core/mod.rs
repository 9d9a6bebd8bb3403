pub mod etl;
pub mod pipeline;

pub use crate::domain::model::{NameList, WaitUntil};
pub use crate::domain::ports::{
    BrowserDriver, BrowserPage, BrowserSession, ConfigProvider, Pipeline, Storage,
};
pub use crate::utils::error::Result;
