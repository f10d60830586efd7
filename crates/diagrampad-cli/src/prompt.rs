//! Terminal confirmation prompts

use std::io::{self, BufRead, Write};
use tracing::warn;

use diagrampad::{Confirm, Confirmation};

/// How confirmations are answered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmPolicy {
    /// `--yes`: every request is accepted
    AssumeYes,
    /// Ask on the terminal
    Prompt,
    /// Nobody to ask: every request is declined
    Decline,
}

impl ConfirmPolicy {
    /// Confirmer reading answers from stdin and prompting on stderr
    pub fn on_stdin(self) -> PromptConfirm<io::StdinLock<'static>, io::Stderr> {
        PromptConfirm::new(self, io::stdin().lock(), io::stderr())
    }
}

/// Answer `request` according to `policy`
///
/// Only `y` or `yes` (any case) counts as agreement; end of input is a no.
pub fn answer(
    policy: ConfirmPolicy,
    input: &mut impl BufRead,
    output: &mut impl Write,
    request: &Confirmation,
) -> bool {
    match policy {
        ConfirmPolicy::AssumeYes => true,
        ConfirmPolicy::Decline => {
            warn!(prompt = %request.prompt(), "Declined without asking; pass --yes to accept");
            let _ = writeln!(output, "{} [declined: not interactive, pass --yes]", request.prompt());
            false
        }
        ConfirmPolicy::Prompt => {
            if write!(output, "{} [y/N] ", request.prompt())
                .and_then(|()| output.flush())
                .is_err()
            {
                return false;
            }
            let mut line = String::new();
            match input.read_line(&mut line) {
                Ok(0) | Err(_) => false,
                Ok(_) => matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
            }
        }
    }
}

/// [`Confirm`] implementation over a reader and a writer
pub struct PromptConfirm<R, W> {
    policy: ConfirmPolicy,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> PromptConfirm<R, W> {
    pub fn new(policy: ConfirmPolicy, input: R, output: W) -> Self {
        Self {
            policy,
            input,
            output,
        }
    }
}

impl<R: BufRead, W: Write> Confirm for PromptConfirm<R, W> {
    fn confirm(&mut self, request: &Confirmation) -> bool {
        answer(self.policy, &mut self.input, &mut self.output, request)
    }
}
