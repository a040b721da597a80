//! Interactive terminal session.

use std::io::{self, Stdout, Write};
use std::panic;
use std::time::Duration;

use arbor::key::{Key, convert_key_event};
use arbor::tree::{KeyOutcome, Tree, TreeNode};
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{Event, EventStream};
use crossterm::execute;
use crossterm::terminal::{
    Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode,
    enable_raw_mode,
};
use futures::StreamExt;
use log::{debug, error, trace};

use crate::error::CliError;
use crate::view;

/// How often pending collapses are settled.
const TICK: Duration = Duration::from_millis(50);

const HELP: &str = "arrows move/expand  space select  enter activate  q quit";

/// Raw mode plus alternate screen, restored on drop and on panic.
struct TerminalGuard {
    stdout: Stdout,
}

impl TerminalGuard {
    fn new() -> io::Result<Self> {
        let original_hook = panic::take_hook();
        panic::set_hook(Box::new(move |panic_info| {
            let _ = restore_terminal();
            original_hook(panic_info);
        }));

        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, Hide)?;
        Ok(Self { stdout })
    }

    fn draw(&mut self, tree: &Tree<TreeNode>) -> io::Result<()> {
        execute!(self.stdout, MoveTo(0, 0), Clear(ClearType::All))?;
        for line in view::render(tree) {
            write!(self.stdout, "{line}\r\n")?;
        }
        write!(self.stdout, "\r\n{HELP}\r\n")?;
        self.stdout.flush()
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = restore_terminal();
    }
}

fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), Show, LeaveAlternateScreen)?;
    Ok(())
}

/// Run the tree in the terminal until the user quits.
pub async fn run(tree: &Tree<TreeNode>) -> Result<(), CliError> {
    let mut terminal = TerminalGuard::new()?;
    let mut events = EventStream::new();
    let mut ticker = tokio::time::interval(TICK);

    terminal.draw(tree)?;
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                tree.tick();
            }
            event = events.next() => {
                let Some(event) = event else {
                    break;
                };
                match event {
                    Ok(Event::Key(key_event)) => {
                        trace!("Key event: {:?}", key_event);
                        let Some(combo) = convert_key_event(key_event) else {
                            continue;
                        };
                        let quit = matches!(combo.key, Key::Escape | Key::Char('q'))
                            || (combo.modifiers.ctrl && combo.key == Key::Char('c'));
                        if quit {
                            break;
                        }
                        // Spawned loads merge on their own; the tick redraws
                        if let KeyOutcome::Loading(load) = tree.on_key(&combo) {
                            debug!("Loading children of {}", load.id());
                        }
                    }
                    Ok(Event::Resize(..)) => terminal.draw(tree)?,
                    Ok(_) => {}
                    Err(e) => {
                        error!("Event stream error: {}", e);
                        return Err(e.into());
                    }
                }
            }
        }

        if tree.is_dirty() {
            tree.clear_dirty();
            terminal.draw(tree)?;
        }
    }
    Ok(())
}
