use colored::Colorize;

/// For re-throwing after we've printed a list of errors to the user.
#[derive(Debug, thiserror::Error)]
#[error("{0} failed due to {1} errors")]
pub struct AggregatedErrors(pub String, pub usize);

// in future we can add a `warnings` field, too.
#[derive(Debug)]
pub struct Errors {
    errors: Vec<anyhow::Error>,
}

impl Default for Errors {
    fn default() -> Self {
        Self {
            // ideally we won't have any,
            // and we don't mind reallocating if we're already in an error state:
            errors: Vec::with_capacity(0),
        }
    }
}

impl Errors {
    pub fn add(&mut self, e: anyhow::Error) {
        log::trace!("error: {e:?}");
        self.errors.push(e);
    }

    /// Print full list of errors to stderr, fail w/ an aggregated error
    /// if there were one or more errors.
    pub fn print_recap(&self, label: &str) -> Result<(), AggregatedErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            eprintln!("\n{} {}:\n", "Encountered errors while".red(), label.red());
            for e in &self.errors {
                eprintln!("{}: {e:#}", "ERROR".red());
            }
            eprintln!();
            Err(AggregatedErrors(label.to_owned(), self.errors.len()))
        }
    }
}
