use crate::error::AppError;
use crate::notify::ReportContext;
use crate::state::SharedState;
use crate::storage::StoredReport;

use super::RawSubmission;

/// Validate, persist, then hand the report to the notifiers.
pub async fn run(state: &SharedState, raw: RawSubmission) -> Result<StoredReport, AppError> {
    let Some(submission) = raw.validate() else {
        tracing::debug!("Rejected submission with missing fields");
        return Err(AppError::Validation);
    };

    let report = state.store.store(&submission).await?;

    tracing::info!(
        package = %submission.package_name,
        version = %submission.package_version,
        phone_model = submission.phone_model.as_deref().unwrap_or(""),
        android_version = submission.android_version.as_deref().unwrap_or(""),
        "Stored crash report {}",
        report.filename
    );

    state
        .notifiers
        .dispatch(ReportContext::new(submission, &report));

    Ok(report)
}
