use edfsim::utils::logging::prelude::*;
use edfsim::utils::{self, AppConfig, Result};

mod cli;
mod commands;

static DEFAULT_CONFIG: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/resources/default_config.toml"
));

fn main() -> Result<()> {
    // panic setup should be done early
    utils::panic::setup();

    AppConfig::init(Some(DEFAULT_CONFIG))?;
    let _guard = utils::logging::setup()?;

    trace!("start cli execution");
    cli::execute()
}
