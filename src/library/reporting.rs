//! Central sink for errors which are handled without aborting the current operation
//!
//! Long running loops frequently swallow errors to keep processing (e.g. a single
//! poisoned message must not halt a stream). Those errors are still handed to an
//! [`ErrorReporter`] so that they end up in one well-known place, including their
//! full chain of causes.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{self, Display, Formatter};
use tracing::error;

/// Flattened, serializable representation of an error and its chain of causes
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorChain {
    causes: Vec<String>,
}

impl ErrorChain {
    /// Walks the source chain of the given error
    pub fn new(error: &(dyn Error + 'static)) -> Self {
        let mut source: Option<&(dyn Error + 'static)> = Some(error);
        let mut causes: Vec<String> = Vec::new();

        while let Some(error) = source {
            // Integrate nested chains instead of printing them as one blob
            if let Some(chain) = error.downcast_ref::<ErrorChain>() {
                causes.extend(chain.causes.iter().cloned());
            } else {
                causes.push(error.to_string());
            }

            source = error.source();
        }

        Self { causes }
    }

    /// Individual messages, outermost first
    pub fn causes(&self) -> &[String] {
        &self.causes
    }
}

#[cfg(test)]
impl ErrorChain {
    fn new_with_causes(causes: Vec<String>) -> Self {
        Self { causes }
    }
}

impl Error for ErrorChain {}

impl Display for ErrorChain {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if let Some(first) = self.causes.first() {
            writeln!(f, "Error: {}", first)?;
        } else {
            writeln!(f, "Unknown error")?;
            return Ok(());
        }

        if self.causes.len() > 1 {
            writeln!(f, "\nCaused by:")?;
            for (index, cause) in self.causes.iter().skip(1).enumerate() {
                writeln!(f, "    {}: {}", index, cause)?;
            }
        }

        Ok(())
    }
}

/// Destination for errors that have been handled but should not go unnoticed
pub trait ErrorReporter {
    /// Records the error together with a short description of the failed operation
    fn report(&self, operation: &str, error: &(dyn Error + 'static));
}

/// [`ErrorReporter`] writing the full cause chain to the tracing subscriber
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingErrorReporter;

impl ErrorReporter for TracingErrorReporter {
    fn report(&self, operation: &str, error: &(dyn Error + 'static)) {
        let chain = ErrorChain::new(error);
        error!(operation, causes = ?chain.causes(), "{}", chain);
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use std::sync::Mutex;

    /// Collects reported errors for later inspection
    #[derive(Default)]
    pub struct CollectingErrorReporter {
        reports: Mutex<Vec<(String, ErrorChain)>>,
    }

    impl CollectingErrorReporter {
        pub fn reports(&self) -> Vec<(String, ErrorChain)> {
            self.reports.lock().unwrap().clone()
        }
    }

    impl ErrorReporter for CollectingErrorReporter {
        fn report(&self, operation: &str, error: &(dyn Error + 'static)) {
            self.reports
                .lock()
                .unwrap()
                .push((operation.to_owned(), ErrorChain::new(error)));
        }
    }
}
