//! Outer boundary of every workflow operation
//!
//! Domain failures travel to the caller unchanged. Anything else (database,
//! gateway) is already an `Internal` error at this point and is logged with
//! its detail here, since the HTTP layer only shows a generic message.

use metrics::counter;
use tracing::{error, warn};

use crate::domain::DomainResult;

/// Record the outcome of `workflow` and hand the result back.
pub(crate) fn finish<T>(workflow: &'static str, result: DomainResult<T>) -> DomainResult<T> {
    if let Err(e) = &result {
        counter!("workflow_failures_total", "workflow" => workflow).increment(1);
        if e.is_domain() {
            warn!(workflow, error = %e, "Workflow rejected");
        } else {
            error!(workflow, error = %e, "Workflow failed");
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainError;

    #[test]
    fn error_kind_is_preserved() {
        let r: DomainResult<()> = finish("reservation", Err(DomainError::bad_request("nope")));
        assert!(matches!(r, Err(DomainError::BadRequest(_))));

        let r: DomainResult<()> = finish("reservation", Err(DomainError::Internal("db".into())));
        assert!(matches!(r, Err(DomainError::Internal(_))));

        assert_eq!(finish("reservation", Ok(3)).unwrap(), 3);
    }
}
