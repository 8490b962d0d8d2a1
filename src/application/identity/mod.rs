//! Accounts, tokens and QR login

mod qr_login;
mod service;

pub use qr_login::{QrLoginConfig, QrLoginSessions, QrPoll, QrSessionStatus};
pub use service::{AdminAccount, AuthResult, AuthService, Registration};
