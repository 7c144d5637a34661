use crate::error::{CliError, Result, ResultExt};
use crate::progress::ProgressTracker;
use crate::ui;
use corrections::{
    ApplicationConfig, BatchReport, BatchSubmitter, FailureMode, ItemReport, RequestContext,
    Session,
};
use std::path::PathBuf;
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone)]
pub struct SubmitArgs {
    pub config_path: Option<PathBuf>,
    pub corrections_file: PathBuf,
    pub continue_on_error: bool,
    pub verbose: bool,
}

impl SubmitArgs {
    fn failure_mode(&self) -> FailureMode {
        if self.continue_on_error {
            FailureMode::ContinueOnError
        } else {
            FailureMode::FailFast
        }
    }
}

pub fn execute(args: SubmitArgs) -> Result<()> {
    let rt = Runtime::new().with_context(|| "Failed to create async runtime")?;
    rt.block_on(execute_async(args))
}

async fn execute_async(args: SubmitArgs) -> Result<()> {
    let mut progress = ProgressTracker::new("Nextlinux Corrections").with_steps(vec![
        "Loading configuration".to_string(),
        "Creating API session".to_string(),
        format!("Adding corrections from {}", args.corrections_file.display()),
    ]);

    progress.start_step();
    let config = ApplicationConfig::load(args.config_path.as_deref())?;
    if args.verbose {
        ui::info_message("Resolved configuration:");
        print!("{config}");
    }
    progress.complete_step();

    progress.start_step();
    let session = Session::new(config.session_config())?;
    if session.config().insecure {
        ui::warning_message("TLS certificate verification is disabled (nextlinux.http.insecure)");
    }
    if args.verbose {
        ui::info_message(&format!("Endpoint: {}", session.transport().endpoint()));
    }
    progress.complete_step();

    let root = RequestContext::with_cancellation(cancel_on_ctrl_c());
    let verbose = args.verbose;
    let mut submitter = BatchSubmitter::new(&session)
        .with_failure_mode(args.failure_mode())
        .with_progress(Box::new(move |item: &ItemReport, total: usize| {
            ui::item_outcome(item, total, verbose)
        }));

    progress.start_step();
    let report = submitter.run_file(&args.corrections_file, Some(&root)).await?;
    progress.complete_step();

    print_summary(&report);
    let failed = report.failures().count();
    if failed > 0 {
        return Err(CliError::Other(format!(
            "{failed} of {} corrections could not be added",
            report.total
        )));
    }

    progress.complete();
    Ok(())
}

/// Root cancellation scope, cancelled when the operator hits Ctrl-C
fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let on_signal = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ui::warning_message("Interrupted, stopping after the current correction");
            on_signal.cancel();
        }
    });
    token
}

fn print_summary(report: &BatchReport) {
    ui::section_header("Summary");
    ui::summary_line("Corrections", report.total);
    ui::summary_line("Added", report.succeeded() + report.decode_mismatches());
    ui::summary_line("Shape mismatches", report.decode_mismatches());
    ui::summary_line("Failed", report.failures().count());
}
