use std::{
    io::{self, stderr, stdout, BufWriter, IsTerminal, Write},
    panic,
};

use anyhow::Result;
use ratatui::{
    crossterm::{
        cursor,
        execute,
        terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    },
    prelude::CrosstermBackend,
    Frame,
    Terminal,
};

pub mod annotator;

pub type PanicHook = Box<dyn Fn(&panic::PanicHookInfo<'_>) + Sync + Send + 'static>;
pub type StdOutOrErrTerminal = Terminal<CrosstermBackend<BufWriter<Box<dyn Write + Send>>>>;

/// Stdout when it is a terminal, stderr otherwise.
fn screen() -> Box<dyn Write + Send> {
    if stdout().is_terminal() {
        Box::new(stdout())
    } else {
        Box::new(stderr())
    }
}

fn leave_screen(writer: &mut impl Write) -> io::Result<()> {
    execute!(writer, LeaveAlternateScreen, cursor::Show)?;
    disable_raw_mode()
}

pub trait TuiApp {
    /// The struct must have a field to store original panic hook as
    /// Option<PanicHook>
    fn original_panic_hook(&mut self) -> &mut Option<PanicHook>;

    fn init(&mut self) -> Result<StdOutOrErrTerminal> {
        enable_raw_mode()?;
        let mut writer = BufWriter::new(screen());
        execute!(writer, EnterAlternateScreen, cursor::Hide)?;

        *self.original_panic_hook() = Some(panic::take_hook());
        panic::set_hook(Box::new(|panic_info| {
            let _ = leave_screen(&mut screen());
            eprintln!("{}", panic_info);
        }));

        Ok(Terminal::new(CrosstermBackend::new(writer))?)
    }

    /// Leaves the alternate screen and puts the previous panic hook back.
    fn restore(&mut self, mut terminal: StdOutOrErrTerminal) -> Result<()> {
        leave_screen(terminal.backend_mut())?;
        if let Some(original) = self.original_panic_hook().take() {
            panic::set_hook(original);
        }

        Ok(())
    }

    fn render(&self, frame: &mut Frame);
}
