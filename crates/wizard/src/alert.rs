//! Dismissible operator alerts.

use crate::api::ClientError;

pub type AlertId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertLevel {
    Error,
    Warning,
}

/// One message shown to the operator until dismissed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub id: AlertId,
    pub level: AlertLevel,
    /// What the operator was doing, e.g. "Loading incomplete migrations".
    pub context: String,
    pub error: ClientError,
}

impl Alert {
    /// Single-line text for display.
    pub fn message(&self) -> String {
        format!("{}: {}", self.context, self.error)
    }
}

/// Ordered list of alerts with stable ids.
#[derive(Debug, Default)]
pub struct AlertCenter {
    alerts: Vec<Alert>,
    next_id: AlertId,
}

impl AlertCenter {
    pub fn push(&mut self, level: AlertLevel, context: &str, error: ClientError) -> AlertId {
        self.next_id += 1;
        let id = self.next_id;
        match level {
            AlertLevel::Error => tracing::error!(alert_id = id, %error, "{context}"),
            AlertLevel::Warning => tracing::warn!(alert_id = id, %error, "{context}"),
        }
        self.alerts.push(Alert {
            id,
            level,
            context: context.to_string(),
            error,
        });
        id
    }

    /// Remove an alert. Returns `false` if it was already gone.
    pub fn dismiss(&mut self, id: AlertId) -> bool {
        let before = self.alerts.len();
        self.alerts.retain(|a| a.id != id);
        self.alerts.len() != before
    }

    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }

    pub fn clear(&mut self) {
        self.alerts.clear();
    }
}
