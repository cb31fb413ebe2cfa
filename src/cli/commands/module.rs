use crate::cli::{render, ModuleOptions};
use crate::config::DefaultsManager;
use crate::core::error::Result;
use crate::module::{Invocation, ModuleArgs, ModuleFailure, ModuleResult, PipParams};
use crate::reconciler::Reconciler;
use std::path::PathBuf;
use tracing::error;

/// Ansible entry point: read the arguments file, reconcile, print one document.
pub async fn execute(args_file: PathBuf, options: ModuleOptions, config: Option<PathBuf>) -> Result<()> {
    let mut args = match ModuleArgs::load(&args_file).await {
        Ok(args) => args,
        Err(e) => {
            error!(error = %e, "unreadable module arguments");
            render::failure(&ModuleFailure::from(&e), options.format)?;
            std::process::exit(1);
        }
    };

    if options.check {
        args.set_check_mode(true);
    }

    let invocation = (!args.no_log()).then(|| Invocation {
        module_args: args.params().clone(),
    });

    match invoke(&args, config).await {
        Ok(mut result) => {
            result.invocation = invocation;
            render::result(&result, options.format)
        }
        Err(e) => {
            error!(error = %e, "module failed");
            let mut failure = ModuleFailure::from(&e);
            failure.invocation = invocation;
            render::failure(&failure, options.format)?;
            std::process::exit(1);
        }
    }
}

async fn invoke(args: &ModuleArgs, config: Option<PathBuf>) -> Result<ModuleResult> {
    let params = PipParams::from_args(args)?;
    let defaults = DefaultsManager::new(config).load().await?;
    Reconciler::new(params, args.check_mode(), defaults).run().await
}
