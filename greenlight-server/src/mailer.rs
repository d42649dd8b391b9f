//! Mail relay handle
//!
//! Built from the SMTP settings and handed to the context. Delivery and retry
//! live in the mail collaborator; this only carries the relay details.

use std::fmt;

use greenlight_core::SmtpConfig;

#[derive(Clone)]
pub struct Mailer {
    host: String,
    port: u16,
    username: String,
    password: String,
    sender: String,
}

impl Mailer {
    pub fn new(cfg: &SmtpConfig) -> Self {
        Self {
            host: cfg.host.clone(),
            port: cfg.port,
            username: cfg.username.clone(),
            password: cfg.password.clone(),
            sender: cfg.sender.clone(),
        }
    }

    /// `host:port` of the relay
    pub fn relay(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    /// Relays without credentials are allowed; the mailtrap ones are optional.
    pub fn has_credentials(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }
}

impl fmt::Debug for Mailer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mailer")
            .field("relay", &self.relay())
            .field("username", &self.username)
            .field("sender", &self.sender)
            .finish_non_exhaustive()
    }
}
