//! Escalation prompts: how the operator answers "abort, retry or skip?".
//!
//! - [`ConsolePrompt`]: interactive, on the process's stdin/stdout. Ctrl+C or
//!   end of input while it waits counts as abort.
//! - [`LinePrompt`]: same menu over any reader/writer pair.
//! - [`FixedPolicy`]: non-interactive, always the same answer.

use crate::controller::{Decision, DecisionProvider, FailureContext};
use console::style;
use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;
use tracing::warn;

static PROMPT_ACTIVE: AtomicBool = AtomicBool::new(false);
static INTERRUPTED: AtomicBool = AtomicBool::new(false);

const INTERRUPT_POLL: Duration = Duration::from_millis(100);

/// Installs the process Ctrl+C handler. While a [`ConsolePrompt`] is waiting the
/// interrupt becomes an abort answer; at any other time the process exits with 130.
pub fn install_interrupt_handler() -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(|| {
        if PROMPT_ACTIVE.load(Ordering::SeqCst) {
            INTERRUPTED.store(true, Ordering::SeqCst);
        } else {
            eprintln!("\n  Interrupted. Exiting...");
            std::process::exit(130);
        }
    })
}

enum LineEvent {
    Line(String),
    Eof,
    Interrupted,
}

pub fn parse_choice(input: &str) -> Option<Decision> {
    match input.trim() {
        "1" => Some(Decision::Abort),
        "2" => Some(Decision::Retry),
        "3" => Some(Decision::Skip),
        _ => None,
    }
}

fn render_menu<W: Write>(out: &mut W, context: &FailureContext<'_>) -> io::Result<()> {
    writeln!(
        out,
        "\n  {} File '{}' failed after {} attempts.",
        style("⚠").yellow(),
        context.file_name,
        context.attempts
    )?;
    writeln!(out, "  What would you like to do?")?;
    writeln!(out, "  1. Stop and exit")?;
    writeln!(out, "  2. Return to {} tries loop (retry)", context.attempts)?;
    writeln!(out, "  3. Step-over this file (skip to next)")?;
    Ok(())
}

/// Shows the menu and reads answers until one is valid. End of input or an
/// interrupt answers [`Decision::Abort`].
fn run_menu<W, F>(out: &mut W, context: &FailureContext<'_>, mut next_line: F) -> Decision
where
    W: Write,
    F: FnMut() -> LineEvent,
{
    // the menu is best effort; a closed stdout must not stall the decision
    let _ = render_menu(out, context);
    loop {
        let _ = write!(out, "  Enter your choice (1/2/3): ");
        let _ = out.flush();

        match next_line() {
            LineEvent::Line(line) => match parse_choice(&line) {
                Some(decision) => return decision,
                None => {
                    let _ = writeln!(out, "  {}", style("Invalid choice. Please enter 1, 2, or 3.").red());
                }
            },
            LineEvent::Eof | LineEvent::Interrupted => {
                let _ = writeln!(out, "\n  Interrupted. Exiting...");
                return Decision::Abort;
            }
        }
    }
}

/// Menu over an arbitrary line source, e.g. a script in tests or a pipe.
pub struct LinePrompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LinePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

impl<R: BufRead, W: Write> DecisionProvider for LinePrompt<R, W> {
    fn decide(&mut self, context: &FailureContext<'_>) -> Decision {
        let Self { input, output } = self;
        run_menu(output, context, || read_event(input))
    }
}

fn read_event<R: BufRead>(input: &mut R) -> LineEvent {
    let mut line = String::new();
    match input.read_line(&mut line) {
        Ok(0) => LineEvent::Eof,
        Ok(_) => LineEvent::Line(line),
        Err(e) => {
            warn!(error = %e, "Prompt input failed");
            LineEvent::Eof
        }
    }
}

/// Interactive prompt on stdin/stdout.
///
/// Stdin is read on a helper thread so the wait can be cut short by Ctrl+C
/// (see [`install_interrupt_handler`]).
#[derive(Default)]
pub struct ConsolePrompt {
    lines: Option<Receiver<io::Result<String>>>,
}

impl ConsolePrompt {
    pub fn new() -> Self {
        Self::default()
    }

    fn lines(&mut self) -> Option<&Receiver<io::Result<String>>> {
        if self.lines.is_none() {
            match spawn_stdin_reader() {
                Ok(rx) => self.lines = Some(rx),
                Err(e) => warn!(error = %e, "Could not start stdin reader; reading inline"),
            }
        }
        self.lines.as_ref()
    }
}

/// Marks a prompt as waiting for the interrupt handler; cleared on drop.
struct PromptActive;

impl PromptActive {
    fn enter() -> Self {
        INTERRUPTED.store(false, Ordering::SeqCst);
        PROMPT_ACTIVE.store(true, Ordering::SeqCst);
        PromptActive
    }
}

impl Drop for PromptActive {
    fn drop(&mut self) {
        PROMPT_ACTIVE.store(false, Ordering::SeqCst);
    }
}

impl DecisionProvider for ConsolePrompt {
    fn decide(&mut self, context: &FailureContext<'_>) -> Decision {
        let _active = PromptActive::enter();
        let stdout = io::stdout();
        let mut out = stdout.lock();

        match self.lines() {
            Some(rx) => channel_decision(&mut out, context, rx, &INTERRUPTED),
            None => {
                let stdin = io::stdin();
                let mut input = stdin.lock();
                run_menu(&mut out, context, || read_event(&mut input))
            }
        }
    }
}

/// Menu fed from a line channel; raising `interrupted` answers abort.
fn channel_decision<W: Write>(
    out: &mut W,
    context: &FailureContext<'_>,
    lines: &Receiver<io::Result<String>>,
    interrupted: &AtomicBool,
) -> Decision {
    run_menu(out, context, || wait_for_line(lines, interrupted))
}

/// Blocks until a line arrives, the sender goes away or `interrupted` is raised.
/// The flag is consumed when seen.
fn wait_for_line(lines: &Receiver<io::Result<String>>, interrupted: &AtomicBool) -> LineEvent {
    loop {
        if interrupted.swap(false, Ordering::SeqCst) {
            return LineEvent::Interrupted;
        }
        match lines.recv_timeout(INTERRUPT_POLL) {
            Ok(Ok(line)) => return LineEvent::Line(line),
            Ok(Err(e)) => {
                warn!(error = %e, "Prompt input failed");
                return LineEvent::Eof;
            }
            Err(RecvTimeoutError::Disconnected) => return LineEvent::Eof,
            Err(RecvTimeoutError::Timeout) => continue,
        }
    }
}

fn spawn_stdin_reader() -> io::Result<Receiver<io::Result<String>>> {
    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name("stdin-reader".to_string())
        .spawn(move || {
            let stdin = io::stdin();
            loop {
                let mut line = String::new();
                match stdin.lock().read_line(&mut line) {
                    Ok(0) => break,
                    Ok(_) => {
                        if tx.send(Ok(line)).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        let _ = tx.send(Err(e));
                        break;
                    }
                }
            }
        })?;
    Ok(rx)
}

/// Answers every escalation the same way, for unattended runs.
///
/// A fixed [`Decision::Retry`] keeps retrying a file until the service answers.
#[derive(Debug, Clone, Copy)]
pub struct FixedPolicy {
    decision: Decision,
}

impl FixedPolicy {
    pub fn new(decision: Decision) -> Self {
        Self { decision }
    }
}

impl DecisionProvider for FixedPolicy {
    fn decide(&mut self, context: &FailureContext<'_>) -> Decision {
        println!(
            "  ⚙ '{}' failed after {} attempts; policy: {:?}",
            context.file_name, context.attempts, self.decision
        );
        self.decision
    }
}

/// How exhausted files are escalated during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Ask on the console.
    #[default]
    Prompt,
    /// Skip the file and keep going.
    Skip,
    /// Stop the batch.
    Abort,
}

impl FailurePolicy {
    pub fn decision_provider(self) -> Box<dyn DecisionProvider> {
        match self {
            FailurePolicy::Prompt => Box::new(ConsolePrompt::new()),
            FailurePolicy::Skip => Box::new(FixedPolicy::new(Decision::Skip)),
            FailurePolicy::Abort => Box::new(FixedPolicy::new(Decision::Abort)),
        }
    }
}
