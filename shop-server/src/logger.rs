//! Logging Infrastructure
//!
//! - Console output, pretty in development and JSON when requested
//! - Daily rotating application logs under `app/` (pruned after 14 days)
//! - Permanent audit logs under `audit/` (target `audit`)
//! - Permanent security logs under `security/` (target `security`)

use std::fs;
use std::path::{Path, PathBuf};
use tracing::Subscriber;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, filter, fmt, layer::SubscriberExt, prelude::*};

const APP_LOG_RETENTION_DAYS: i64 = 14;

type BoxedLayer<S> = Box<dyn Layer<S> + Send + Sync + 'static>;

/// Delete `app-YYYY-MM-DD*` files older than the retention window
pub fn cleanup_old_logs(log_dir: &Path) -> anyhow::Result<()> {
    let cutoff = (chrono::Local::now() - chrono::Duration::days(APP_LOG_RETENTION_DAYS)).date_naive();

    let app_log_dir = log_dir.join("app");
    if !app_log_dir.exists() {
        return Ok(());
    }

    for entry in fs::read_dir(app_log_dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        // Rolling appender names files "app.YYYY-MM-DD"
        let Some(date_part) = name.strip_prefix("app.") else {
            continue;
        };
        if let Ok(date) = chrono::NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
            && date < cutoff
        {
            fs::remove_file(&path)?;
            tracing::info!(file = %name, "Deleted old log file");
        }
    }

    Ok(())
}

fn file_layer<S>(dir: &Path, prefix: &str, json: bool) -> BoxedLayer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let writer = std::sync::Mutex::new(RollingFileAppender::new(Rotation::DAILY, dir, prefix));
    let layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false)
        .with_writer(writer);
    if json {
        layer.json().with_current_span(true).boxed()
    } else {
        layer.boxed()
    }
}

/// Initialize the logging system
///
/// * `level` - filter directive, overridden by `RUST_LOG` when set
/// * `json_format` - JSON console/file output
/// * `log_dir` - optional directory for file logging
pub fn init_logger_with_file(
    level: &str,
    json_format: bool,
    log_dir: Option<&str>,
) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let console_layer: BoxedLayer<_> = if json_format {
        fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    };

    let mut layers = vec![console_layer];

    if let Some(dir) = log_dir {
        let log_dir = Path::new(dir);
        let app_dir = log_dir.join("app");
        let audit_dir = log_dir.join("audit");
        let security_dir = log_dir.join("security");
        fs::create_dir_all(&app_dir)?;
        fs::create_dir_all(&audit_dir)?;
        fs::create_dir_all(&security_dir)?;

        layers.push(
            file_layer(&app_dir, "app", json_format)
                .with_filter(filter::filter_fn(|meta| {
                    meta.target() != "audit" && meta.target() != "security"
                }))
                .boxed(),
        );
        layers.push(
            file_layer(&audit_dir, "audit", json_format)
                .with_filter(filter::filter_fn(|meta| meta.target() == "audit"))
                .boxed(),
        );
        layers.push(
            file_layer(&security_dir, "security", json_format)
                .with_filter(filter::filter_fn(|meta| meta.target() == "security"))
                .boxed(),
        );

        tokio::spawn(periodic_cleanup(log_dir.to_path_buf()));
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layers)
        .try_init()?;

    Ok(())
}

/// Periodic cleanup task - runs every hour to clean old logs
async fn periodic_cleanup(log_dir: PathBuf) {
    use tokio::time::{Duration, sleep};

    loop {
        sleep(Duration::from_secs(3600)).await;

        if let Err(e) = cleanup_old_logs(&log_dir) {
            tracing::error!(error = %e, "Failed to cleanup old logs");
        }
    }
}

/// Console-only logging
pub fn init_logger(level: &str, json_format: bool) -> anyhow::Result<()> {
    init_logger_with_file(level, json_format, None)
}

/// Audit log helper - records business operations on target `audit`
///
/// ```no_run
/// # use shop_server::audit_log;
/// audit_log!("42", "order.confirm", "order:7");
/// audit_log!("42", "role.assign", "user:9", "seller");
/// ```
#[macro_export]
macro_rules! audit_log {
    ($user_id:expr, $action:expr, $resource:expr) => {
        tracing::info!(
            target: "audit",
            user_id = $user_id,
            action = $action,
            resource = $resource,
            timestamp = chrono::Local::now().to_rfc3339(),
            "AUDIT"
        );
    };
    ($user_id:expr, $action:expr, $resource:expr, $details:expr) => {
        tracing::info!(
            target: "audit",
            user_id = $user_id,
            action = $action,
            resource = $resource,
            details = $details,
            timestamp = chrono::Local::now().to_rfc3339(),
            "AUDIT"
        );
    };
}

/// Security log helper - records authorization events on target `security`
///
/// ```no_run
/// # use shop_server::security_log;
/// security_log!(WARN, "permission_denied", user_id = 42, required = "super_admin");
/// ```
#[macro_export]
macro_rules! security_log {
    (WARN, $event:expr, $($arg:tt)*) => {
        tracing::warn!(
            target: "security",
            event = $event,
            timestamp = chrono::Local::now().to_rfc3339(),
            $($arg)*
        );
    };
    (INFO, $event:expr, $($arg:tt)*) => {
        tracing::info!(
            target: "security",
            event = $event,
            timestamp = chrono::Local::now().to_rfc3339(),
            $($arg)*
        );
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleanup_removes_only_expired_app_logs() {
        let dir = tempfile::tempdir().unwrap();
        let app = dir.path().join("app");
        fs::create_dir_all(&app).unwrap();

        let old = app.join("app.2000-01-01");
        let today = app.join(format!("app.{}", chrono::Local::now().format("%Y-%m-%d")));
        let unrelated = app.join("notes.txt");
        for f in [&old, &today, &unrelated] {
            fs::write(f, b"x").unwrap();
        }

        cleanup_old_logs(dir.path()).unwrap();

        assert!(!old.exists());
        assert!(today.exists());
        assert!(unrelated.exists());
    }

    #[test]
    fn test_cleanup_without_app_dir_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        cleanup_old_logs(dir.path()).unwrap();
    }
}
