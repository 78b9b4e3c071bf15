use std::process::ExitCode;

use request_runner::{ActionsContext, PipelineContext, RequestConfig, RequestRunner, Result};

#[tokio::main]
async fn main() -> ExitCode {
    let mut ctx = ActionsContext::from_env();

    // Any error reaching the top level is routed into the same failure
    // signal a failing status produces, so the hosting pipeline sees one
    // kind of hard failure.
    if let Err(err) = run(&mut ctx).await {
        ctx.set_failed(&err.to_string());
    }

    if ctx.is_failed() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

async fn run(ctx: &mut ActionsContext) -> Result<()> {
    let config = RequestConfig::from_env()?;
    RequestRunner::new(config).run(ctx).await?;
    Ok(())
}
