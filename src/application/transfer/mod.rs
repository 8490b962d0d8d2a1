//! Staff-driven battery relocation between stations

mod service;

pub use service::{TransferMove, TransferOrder, TransferService, TransferView};
