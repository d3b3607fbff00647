//! CLI commands
//!
//! One-shot versions of the panel's actions. They go through the same [`Orchestrator`]
//! the panel uses, so failures carry the same user-facing text.

use color_eyre::eyre::{self, Context, Result};
use crossterm::style::Stylize;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

use crate::buffer::LogBuffer;
use crate::config::Config;
use crate::gateway::{GENERIC_FAILURE, HttpGateway, ServiceApi};
use crate::model::{ControlOp, LogEntry, ServiceStatus};
use crate::orchestrator::{OpOutcome, Orchestrator};
use crate::stream::LogFeed;
use crate::style::{BpctlStyle, styled_level, styled_state};

fn orchestrator(config: &Config) -> Orchestrator<HttpGateway> {
    Orchestrator::with_timings(
        Arc::new(HttpGateway::new(&config.service.base_url)),
        config.panel.timings(),
    )
}

/// Turn a failed outcome into an error carrying the orchestrator's message
fn check<G: ServiceApi + ?Sized + 'static>(orch: &Orchestrator<G>, outcome: OpOutcome) -> Result<()> {
    match outcome {
        OpOutcome::Succeeded => Ok(()),
        OpOutcome::Rejected => eyre::bail!("Another operation is already running"),
        OpOutcome::Failed => {
            let message = orch
                .operation_state()
                .error
                .unwrap_or_else(|| GENERIC_FAILURE.to_string());
            eyre::bail!(message)
        }
    }
}

// ============================================================================
// Status & Control
// ============================================================================

/// Print the service status
///
/// # Errors
/// Returns an error if the service cannot be reached or answers with a failure.
pub async fn status(config: &Config, json_output: bool) -> Result<()> {
    let orch = orchestrator(config);
    check(&orch, orch.refresh_status().await)?;
    let status = orch.status().unwrap_or_default();

    if json_output {
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        print_status(&config.service.base_url, &status);
    }
    Ok(())
}

fn print_status(base_url: &str, status: &ServiceStatus) {
    println!("{}", "Service".header());
    println!("{}", "-".repeat(7));
    println!("{} {}", "URL:".dim(), base_url.technical());
    println!("{} {}", "Status:".dim(), styled_state(status.state));
    if let Some(version) = &status.config_version {
        println!("{} {}", "Config Version:".dim(), version.as_str().technical());
    }
    if let Some(path) = &status.config_path {
        println!("{} {}", "Config Path:".dim(), path.as_str().technical());
    }
    if !status.media_executors.is_empty() {
        println!("{} {}", "Media Executors:".dim(), status.media_executors.join(", "));
    }
}

/// Run a control operation and print the refreshed status
///
/// # Errors
/// Returns an error if the operation or the status refresh fails.
pub async fn control(config: &Config, op: ControlOp) -> Result<()> {
    let orch = orchestrator(config);
    let outcome = orch.run_control_op(op).await;
    check(&orch, outcome).with_context(|| format!("{} failed", op.name()))?;

    println!("{} {}", op.name().success(), "requested".dim());
    println!();
    match refreshed_status(&orch) {
        Ok(status) => print_status(&config.service.base_url, &status),
        Err(message) => eprintln!("{} {message}", "Status refresh failed:".warning()),
    }
    Ok(())
}

/// Status fetched after an operation, or the error that kept it from arriving
fn refreshed_status<G: ServiceApi + ?Sized + 'static>(
    orch: &Orchestrator<G>,
) -> std::result::Result<ServiceStatus, String> {
    orch.status().ok_or_else(|| {
        orch.operation_state()
            .error
            .unwrap_or_else(|| GENERIC_FAILURE.to_string())
    })
}

// ============================================================================
// Service Configuration
// ============================================================================

/// Print the service's configuration text
///
/// # Errors
/// Returns an error if the configuration cannot be fetched.
pub async fn config_show(config: &Config) -> Result<()> {
    let orch = orchestrator(config);
    let Some(document) = orch.load_config().await else {
        return check(&orch, OpOutcome::Failed);
    };

    if let Some(path) = &document.path {
        eprintln!("{} {}", "#".dim(), path.as_str().technical());
    }
    print!("{}", document.content);
    if !document.content.ends_with('\n') {
        println!();
    }
    Ok(())
}

/// Upload a file as the service's configuration
///
/// # Errors
/// Returns an error if the file cannot be read or the save fails.
pub async fn config_save(config: &Config, file: &Path, reload: bool) -> Result<()> {
    let content =
        std::fs::read_to_string(file).with_context(|| format!("Failed to read {file:?}"))?;

    let orch = orchestrator(config);
    let outcome = orch.run_save(content, reload).await;
    check(&orch, outcome)?;

    if let Some(message) = orch.operation_state().message {
        println!("{}", message.success());
    }
    Ok(())
}

// ============================================================================
// Logs
// ============================================================================

/// One log entry as a CLI line
#[must_use]
pub fn format_log_line(entry: &LogEntry) -> String {
    let logger = entry
        .logger
        .as_deref()
        .map(|l| format!("{} ", l.dim()))
        .unwrap_or_default();
    format!(
        "{} {} {logger}{}",
        entry.local_time().log_timestamp(),
        styled_level(&entry.level),
        entry.message
    )
}

/// Print the service log, newest first; with `follow`, keep printing live entries
///
/// The bulk history is loaded completely before the live channel opens.
///
/// # Errors
/// Returns an error if the history cannot be fetched.
pub async fn logs(config: &Config, follow: bool) -> Result<()> {
    let orch = orchestrator(config);
    let Some(history) = orch.load_logs().await else {
        return check(&orch, OpOutcome::Failed);
    };

    let mut buffer = LogBuffer::new(config.panel.log_capacity);
    buffer.replace_all(history);
    if buffer.is_empty() && !follow {
        println!("{}", "No logs yet".dim());
    }
    for entry in buffer.to_display_order() {
        println!("{}", format_log_line(entry));
    }

    if !follow {
        return Ok(());
    }

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut feed = LogFeed::new(Arc::clone(orch.gateway()));
    feed.open(move |entry| {
        let _ = tx.send(entry);
    });

    loop {
        tokio::select! {
            entry = rx.recv() => match entry {
                Some(entry) => println!("{}", format_log_line(&entry)),
                None => {
                    // Sender dropped with the channel task: the stream closed
                    eprintln!("{}", "Log stream closed".warning());
                    break;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                debug!("interrupted, closing log stream");
                break;
            }
        }
    }

    feed.close();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ServiceState;
    use crate::test_utils::FakeService;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn refreshed_status_follows_the_operation() {
        let orch = Orchestrator::new(Arc::new(FakeService::new(ServiceState::Stopped)));

        assert_eq!(orch.run_control_op(ControlOp::Start).await, OpOutcome::Succeeded);
        assert_eq!(
            refreshed_status(&orch).map(|s| s.state),
            Ok(ServiceState::Running)
        );
    }

    #[tokio::test]
    async fn failed_refresh_after_success_reports_the_error() {
        let service = Arc::new(FakeService::new(ServiceState::Stopped));
        service.pass_next();
        service.fail_next("status endpoint down");
        let orch = Orchestrator::new(Arc::clone(&service));

        assert_eq!(orch.run_control_op(ControlOp::Start).await, OpOutcome::Succeeded);
        assert_eq!(refreshed_status(&orch), Err("status endpoint down".to_string()));
    }

    #[test]
    fn log_line_includes_logger_when_present() {
        let mut entry = LogEntry::new(1_700_000_000.0, "INFO", "poster uploaded");
        assert!(!format_log_line(&entry).contains("app.manager"));
        entry.logger = Some("app.manager".to_string());
        let line = format_log_line(&entry);
        assert!(line.contains("app.manager"));
        assert!(line.ends_with("poster uploaded"));
    }
}
