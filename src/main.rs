use gitstate::audit::CommandAudit;
use gitstate::error::AppResult;
use gitstate::{Config, GitExecutor, GitVersion, RepositoryRegistry};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    match run().await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Print the snapshot for the repository at PATH (default: cwd).
/// Returns false when PATH holds no repository.
async fn run() -> AppResult<bool> {
    let path = match std::env::args_os().nth(1) {
        Some(arg) => PathBuf::from(arg),
        None => std::env::current_dir()?,
    };

    let config = Config::load_or_default()?;
    let mut executor = GitExecutor::from_config(&config.git);
    if let Some(audit_path) = config.audit_path()? {
        executor = executor.with_audit(CommandAudit::with_path(audit_path)?);
    }
    let runner = Arc::new(executor);

    let version = GitVersion::validate(runner.as_ref(), &path).await?;
    log::info!("Git version: {}", version);

    let registry = RepositoryRegistry::new(runner, &config);
    let Some(state) = registry.get_or_create(&path).await else {
        eprintln!("{} is not a git repository", path.display());
        return Ok(false);
    };

    let snapshot = state.snapshot();
    let json = serde_json::to_string_pretty(&*snapshot)?;
    println!("{}", json);
    Ok(true)
}
