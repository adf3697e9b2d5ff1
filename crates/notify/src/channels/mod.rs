//! Built-in delivery channel implementations, in default priority order:
//! Resend, Brevo, then direct SMTP.

pub mod brevo;
pub mod resend;
pub mod smtp;
