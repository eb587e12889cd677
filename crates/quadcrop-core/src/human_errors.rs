// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable messages for scanner outcomes.
//
// Every technical error is mapped to plain English with a clear suggestion.
// The severity drives how the host presents it.

use crate::error::QuadcropError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Something transient went wrong; trying again may work.
    Retry,
    /// The user has to do something (retake the photo, adjust corners).
    ActionRequired,
    /// Cannot be fixed by retrying: unreadable file, bad configuration.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether the host may simply run the operation again.
    pub retriable: bool,
    pub severity: Severity,
}

/// Message for the "could not find document" state.
///
/// Not an error: detection finished but no four-sided outline was large
/// enough to be a page.
pub fn no_document_found() -> HumanError {
    HumanError {
        message: "We couldn't find the edges of your document.".into(),
        suggestion: "Place the page on a darker surface so all four edges are visible, or drag the corners into place yourself.".into(),
        retriable: false,
        severity: Severity::ActionRequired,
    }
}

/// Convert a `QuadcropError` into a `HumanError`.
pub fn humanize_error(err: &QuadcropError) -> HumanError {
    match err {
        QuadcropError::Decode(detail) => HumanError {
            message: "We couldn't open this picture.".into(),
            suggestion: format!("Try a JPEG or PNG photo instead. ({detail})"),
            retriable: false,
            severity: Severity::Permanent,
        },

        QuadcropError::ImageError(detail) => HumanError {
            message: "Something went wrong while processing the picture.".into(),
            suggestion: format!("Please try again. ({detail})"),
            retriable: true,
            severity: Severity::Retry,
        },

        QuadcropError::InvalidParameter(detail) => HumanError {
            message: "One of the scanner settings isn't valid.".into(),
            suggestion: format!("Reset the settings to their defaults. ({detail})"),
            retriable: false,
            severity: Severity::Permanent,
        },

        QuadcropError::CornerCount(_) | QuadcropError::NoCorners => HumanError {
            message: "The document needs four corners.".into(),
            suggestion: "Place all four corners on the edges of the page, then try again.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        QuadcropError::CornerIndex(index) => HumanError {
            message: "That corner doesn't exist.".into(),
            suggestion: format!("Pick one of the four corner handles. (index {index})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        QuadcropError::DegenerateGeometry(_) => HumanError {
            message: "The corners don't outline a page.".into(),
            suggestion: "Spread the corners apart so they form a four-sided shape around the document.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        QuadcropError::Worker(detail) => HumanError {
            message: "The scan was interrupted.".into(),
            suggestion: format!("Please try again. ({detail})"),
            retriable: true,
            severity: Severity::Retry,
        },

        QuadcropError::Io(io_err) => match io_err.kind() {
            std::io::ErrorKind::NotFound => HumanError {
                message: "We couldn't find that picture.".into(),
                suggestion: "It may have been moved or deleted. Pick it again from your gallery.".into(),
                retriable: false,
                severity: Severity::ActionRequired,
            },
            std::io::ErrorKind::PermissionDenied => HumanError {
                message: "We aren't allowed to open that picture.".into(),
                suggestion: "Allow access to your photos in the system settings, then try again.".into(),
                retriable: false,
                severity: Severity::ActionRequired,
            },
            _ => HumanError {
                message: "We couldn't read the picture.".into(),
                suggestion: format!("Please try again. ({io_err})"),
                retriable: true,
                severity: Severity::Retry,
            },
        },

        QuadcropError::Serialization(detail) => HumanError {
            message: "Saved scanner settings couldn't be read.".into(),
            suggestion: format!("Reset the settings to their defaults. ({detail})"),
            retriable: false,
            severity: Severity::Permanent,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_document_is_action_required() {
        let h = no_document_found();
        assert_eq!(h.severity, Severity::ActionRequired);
        assert!(!h.retriable);
    }

    #[test]
    fn degenerate_geometry_asks_user_to_move_corners() {
        let h = humanize_error(&QuadcropError::DegenerateGeometry("zero width".into()));
        assert_eq!(h.severity, Severity::ActionRequired);
        assert!(h.suggestion.contains("corners"));
    }

    #[test]
    fn decode_failure_is_permanent() {
        let h = humanize_error(&QuadcropError::Decode("bad header".into()));
        assert_eq!(h.severity, Severity::Permanent);
        assert!(h.suggestion.contains("bad header"));
    }

    #[test]
    fn missing_file_is_action_required() {
        let err = QuadcropError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_eq!(humanize_error(&err).severity, Severity::ActionRequired);
    }

    #[test]
    fn worker_failure_is_retriable() {
        let h = humanize_error(&QuadcropError::Worker("panicked".into()));
        assert!(h.retriable);
        assert_eq!(h.severity, Severity::Retry);
    }
}
