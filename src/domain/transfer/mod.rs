//! Transfer aggregate: staff moving batteries between stations.

pub mod model;

pub use model::{request_status, TransferDetail, TransferRequest, TransferStatus};
