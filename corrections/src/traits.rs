use crate::session::RequestContext;
use crate::submitter::ItemReport;
use crate::types::{ApiResult, Correction};
use std::future::Future;

/// Trait for transports that can deliver a correction to the remote service
pub trait CorrectionTransport: Send + Sync {
    /// Perform the "add correction" call with the credentials carried by `context`.
    ///
    /// Implementations must drain and release the response body before
    /// returning, on success and on every failure path.
    fn add_correction(
        &self,
        context: &RequestContext,
        correction: &Correction,
    ) -> impl Future<Output = ApiResult> + Send;
}

/// Called after each correction with its report and the batch size
pub type ProgressCallback = Box<dyn Fn(&ItemReport, usize) + Send + Sync>;
