use crate::cli::render;
use crate::config::DefaultsManager;
use crate::core::error::Result;
use crate::module::{ModuleArgs, PipParams};
use crate::reconciler::Reconciler;
use std::path::PathBuf;

pub async fn execute(args_file: PathBuf, check: bool, config: Option<PathBuf>) -> Result<()> {
    let args = ModuleArgs::load(&args_file).await?;
    let params = PipParams::from_args(&args)?;
    let defaults = DefaultsManager::new(config).load().await?;

    let plan = Reconciler::new(params, check || args.check_mode(), defaults).plan()?;
    render::plan(&plan);

    Ok(())
}
