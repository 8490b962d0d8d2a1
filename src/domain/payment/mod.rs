pub mod model;

pub use model::{
    new_order_code, PaymentOutcome, PaymentTransaction, TransactionKind, TransactionStatus,
};
