//! Toast notifications for reporting the outcome of dashboard actions.
//!
//! Toasts are rendered into `#alert-container` and removed by the page script
//! after a few seconds.

use axum::response::{IntoResponse, Response};
use maud::{Markup, html};

/// How long a toast stays on screen, in milliseconds.
pub const TOAST_TIMEOUT_MS: u32 = 3000;

const TOAST_STYLE: &str = "fixed top-4 right-4 z-50 max-w-sm px-4 py-3 rounded-lg shadow-lg";
const SUCCESS_STYLE: &str = "bg-green-500 text-white";
const ERROR_STYLE: &str = "bg-red-500 text-white";

/// A toast message telling the user how an action went.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// The action worked, e.g. "Generated 10 transactions successfully!".
    Success {
        /// The headline of the toast.
        message: String,
    },
    /// The action failed.
    Error {
        /// The headline of the toast.
        message: String,
        /// A longer explanation shown under the headline. May be empty.
        details: String,
    },
}

impl Alert {
    /// Render the toast on its own.
    pub fn into_html(self) -> Markup {
        let (style, message, details) = match self {
            Alert::Success { message } => (SUCCESS_STYLE, message, String::new()),
            Alert::Error { message, details } => (ERROR_STYLE, message, details),
        };

        html! {
            div
                role="alert"
                data-toast-timeout=(TOAST_TIMEOUT_MS)
                class={ (TOAST_STYLE) " " (style) }
            {
                p class="font-semibold" data-toast-message { (message) }

                @if !details.is_empty()
                {
                    p class="text-sm mt-1" { (details) }
                }
            }
        }
    }

    /// Render the toast as an out-of-band swap into `#alert-container`, for
    /// responses whose main content targets another element.
    pub fn into_oob_html(self) -> Markup {
        html! {
            div id="alert-container" hx-swap-oob="innerHTML"
            {
                (self.into_html())
            }
        }
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        self.into_html().into_response()
    }
}
