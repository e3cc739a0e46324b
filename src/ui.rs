use anyhow::Result;
use colored::Colorize;

use util::Timer;

use crate::settings::Settings;

/// All interactions with the text UI should go through this struct.
pub struct Ui {
    /// -v setting, displays extra text info to user
    pub verbose: bool,
    timer: Timer,
}

impl Ui {
    pub fn new(settings: &Settings) -> Self {
        Self {
            verbose: settings.verbose > 0,
            timer: Timer::now(),
        }
    }

    /// Run `f` as a named phase. In verbose mode the phase is announced,
    /// timed, and reported when it finishes.
    pub fn phase<T>(&mut self, name: &str, f: impl FnOnce() -> Result<T>) -> Result<T> {
        if !self.verbose {
            return f();
        }
        eprint!("{}... ", name.magenta());
        self.timer.reset();
        let out = f()?;
        eprintln!("{}.", "done".green());
        self.timer.print_elapsed(name)?;
        Ok(out)
    }

    pub fn verbose_msg(&self, msg: &str) {
        if self.verbose {
            eprintln!("{}", msg);
        }
    }
}
