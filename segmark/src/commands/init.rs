use std::path::Path;

use anyhow::{bail, Result};
use tracing::{error, info};

use crate::{configuration::Configuration, SegmarkCliError};

pub fn init_handler(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        let err = SegmarkCliError::ConfigFileAlreadyExists(config_path.to_path_buf());
        error!("{}", err);
        bail!(err);
    }

    Configuration::default().save(config_path)?;

    info!("Initialized segmark configuration at: {}", config_path.display());
    info!("Run \"segmark annotate <video>\" to start marking segments.");

    Ok(())
}
