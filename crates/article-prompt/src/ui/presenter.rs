use indicatif::{ProgressBar, ProgressDrawTarget};
use parking_lot::Mutex;

use super::theme::{self, SpinnerKind};

/// Leveled console output plus a progress indicator for long-running stages
pub trait Presenter: Send + Sync {
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
    fn success(&self, message: &str);
    fn error(&self, message: &str);
    fn log(&self, message: &str);

    /// Start a progress stage; `total` of 0 means an indeterminate spinner
    fn begin_stage(&self, label: &str, kind: SpinnerKind, total: usize);
    fn advance_stage(&self);
    fn finish_stage(&self);
}

/// Announce the final answer for the article titled `title`
pub fn present_result(presenter: &dyn Presenter, title: &str, final_text: &str) {
    let heading = match title.trim() {
        "" => "Response ⤵️ ".to_string(),
        title => format!("Response for \"{}\" ⤵️ ", title),
    };

    presenter.success(&heading);
    presenter.log(final_text);
}

/// Colorized terminal output on stdout, spinner on stderr
#[derive(Default)]
pub struct ConsolePresenter {
    stage: Mutex<Option<ProgressBar>>,
}

impl ConsolePresenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Print without tearing an active spinner
    fn emit(&self, line: String) {
        match self.stage.lock().as_ref() {
            Some(bar) => bar.suspend(|| println!("{}", line)),
            None => println!("{}", line),
        }
    }
}

impl Presenter for ConsolePresenter {
    fn info(&self, message: &str) {
        self.emit(format!("{}\n", theme::info(message)));
    }

    fn warn(&self, message: &str) {
        self.emit(format!("{}\n", theme::warning(message)));
    }

    fn success(&self, message: &str) {
        self.emit(format!("{}\n", theme::success(message)));
    }

    fn error(&self, message: &str) {
        self.emit(format!("\n{}\n", theme::danger(message)));
    }

    fn log(&self, message: &str) {
        self.emit(message.to_string());
    }

    fn begin_stage(&self, label: &str, kind: SpinnerKind, total: usize) {
        let bar = if total > 0 {
            ProgressBar::new(total as u64)
        } else {
            ProgressBar::new_spinner()
        };

        // stderr is hidden automatically when it is not a terminal
        bar.set_draw_target(ProgressDrawTarget::stderr());
        bar.set_style(kind.style(total > 1));
        bar.set_message(label.to_string());
        bar.enable_steady_tick(kind.tick());

        if let Some(previous) = self.stage.lock().replace(bar) {
            previous.finish_and_clear();
        }
    }

    fn advance_stage(&self) {
        if let Some(bar) = self.stage.lock().as_ref() {
            bar.inc(1);
        }
    }

    fn finish_stage(&self) {
        if let Some(bar) = self.stage.lock().take() {
            bar.finish_and_clear();
        }
    }
}
