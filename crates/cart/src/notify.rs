//! User-facing notices.
//!
//! The cart store never notifies on its own; the UI layer turns operation
//! outcomes into [`Notice`]s and hands them to a [`Notifier`].

use std::fmt;

use crate::error::{CartError, CartOperation};

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoticeKind {
    Error,
    Success,
    Info,
}

/// A message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    /// Create an error notice.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }

    /// Create a success notice.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    /// Create an informational notice.
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            message: message.into(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Fixed user-facing message for each error category.
///
/// Status codes and stock levels stay in the logs.
impl From<&CartError> for Notice {
    fn from(err: &CartError) -> Self {
        let message = match err {
            CartError::Lookup { operation, .. } | CartError::NotFound { operation, .. } => {
                match operation {
                    CartOperation::Add => "Error adding product",
                    CartOperation::Remove => "Error removing product",
                    CartOperation::UpdateAmount => "Error updating product amount",
                }
            }
            CartError::OutOfStock { .. } | CartError::InvalidQuantity { .. } => {
                "Requested quantity is out of stock"
            }
            CartError::Storage(_) => "Could not save your cart",
        };

        Self::error(message)
    }
}

/// Sink for user-facing notices (toasts, status lines, logs).
pub trait Notifier {
    /// Deliver a notice to the user.
    fn notify(&self, notice: Notice);
}

/// Notifier that emits notices as tracing events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.kind {
            NoticeKind::Error => tracing::error!(notice = %notice.message, "Cart notice"),
            NoticeKind::Success | NoticeKind::Info => {
                tracing::info!(notice = %notice.message, "Cart notice");
            }
        }
    }
}

/// Notify on error, passing the result through unchanged.
///
/// # Errors
///
/// Returns the original error after it has been reported.
pub fn report<T, N>(result: Result<T, CartError>, notifier: &N) -> Result<T, CartError>
where
    N: Notifier + ?Sized,
{
    if let Err(err) = &result {
        tracing::debug!(error = %err, "Cart operation failed");
        notifier.notify(Notice::from(err));
    }
    result
}
