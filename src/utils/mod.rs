pub mod app_config;
mod error;
pub mod logging;
pub mod panic;

pub mod prelude {
    pub use super::app_config::AppConfig;
    pub use super::error::{Error, Result};
    pub use super::logging::prelude::*;
}

pub use app_config::AppConfig;
pub use error::{Error, Result};
