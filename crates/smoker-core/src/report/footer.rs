use core::fmt::Write;

use heapless::String;

use crate::http::Counters;

/// Room for the footer text with every figure at its widest.
pub const FOOTER_CAPACITY: usize = 224;

/// Page footer with the counters and memory figures
///
/// Rendered exactly once per response so that the measure and emit passes
/// see the same bytes even if a counter moves in between.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Footer {
    text: String<FOOTER_CAPACITY>,
}

impl Footer {
    pub fn render(counters: Counters, free_memory: usize, max_points: usize) -> Self {
        let mut text = String::new();
        // Cannot overflow: the template plus four 20-digit numbers fits.
        let _ = write!(
            text,
            "<FONT SIZE=-2><BR>Page requests={} - Network connects={} - Free RAM={} - Max. data points={}<BR>Smoker regulator logger<BR></body></html>",
            counters.requests, counters.reconnects, free_memory, max_points
        );
        Self { text }
    }

    pub fn as_str(&self) -> &str {
        self.text.as_str()
    }
}
