pub use crate::traits::Progress;

use log::LevelFilter;

impl Progress for indicatif::ProgressBar {
    fn inc(&self, i: u64) {
        indicatif::ProgressBar::inc(self, i)
    }

    fn finish(&self) {
        indicatif::ProgressBar::finish(self)
    }
}

impl Progress for logbar::ProgressBar {
    fn inc(&self, i: u64) {
        logbar::ProgressBar::inc(self, i as usize)
    }

    fn finish(&self) {
        logbar::ProgressBar::finish(self)
    }
}

enum Bar {
    Hidden,
    Terminal(indicatif::ProgressBar),
    Log(logbar::ProgressBar),
}

/// Progress bar over the event loop
///
/// On an interactive terminal this is an animated bar, otherwise a
/// plain text bar. Nothing is shown unless the log level is exactly
/// `info`. While a bar is shown only warnings and errors are logged.
pub struct ProgressBar {
    bar: Bar,
    suspended_level: Option<LevelFilter>,
}

impl Default for ProgressBar {
    fn default() -> Self {
        Self {
            bar: Bar::Hidden,
            suspended_level: None,
        }
    }
}

impl ProgressBar {
    /// A new progress bar with the given maximum progress and message
    pub fn new(len: u64, message: &str) -> Self {
        let level = log::max_level();
        if level != LevelFilter::Info {
            return ProgressBar::default();
        }
        let bar = if console::Term::stderr().features().is_attended() {
            let bar = indicatif::ProgressBar::new(len);
            if let Ok(style) = indicatif::ProgressStyle::default_bar()
                .template("{bar:60.cyan/cyan} {msg} {pos}/{len} [{elapsed}]")
            {
                bar.set_style(style);
            }
            bar.set_message(message.to_owned());
            Bar::Terminal(bar)
        } else {
            let style = logbar::Style::new().indicator('█');
            eprintln!("{}", message);
            Bar::Log(logbar::ProgressBar::with_style(len as usize, style))
        };
        log::set_max_level(level_while_shown(level));
        ProgressBar {
            bar,
            suspended_level: Some(level),
        }
    }
}

impl Progress for ProgressBar {
    fn inc(&self, i: u64) {
        match &self.bar {
            Bar::Hidden => {}
            Bar::Terminal(bar) => Progress::inc(bar, i),
            Bar::Log(bar) => Progress::inc(bar, i),
        }
    }

    fn finish(&self) {
        match &self.bar {
            Bar::Hidden => {}
            Bar::Terminal(bar) => Progress::finish(bar),
            Bar::Log(bar) => Progress::finish(bar),
        }
        if let Some(level) = self.suspended_level {
            log::set_max_level(level);
        }
    }
}

fn level_while_shown(level: LevelFilter) -> LevelFilter {
    level.min(LevelFilter::Warn)
}
