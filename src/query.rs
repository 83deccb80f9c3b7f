//! Interactive "most similar word" loop over standard input.

use std::io::{self, BufRead, Write};

use tracing::debug;

use crate::similarity::{Lookup, Similarity};

/// Lines matching one of these (ignoring case) end the session.
pub const EXIT_KEYWORDS: [&str; 3] = ["exit", "quit", "q"];
/// neighbours printed per query
pub const TOP_N: usize = 10;

const PROMPT: &str = ">>> ";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    AwaitingInput,
    Terminated,
}

/// Why a session ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Termination {
    ExitKeyword,
    EndOfInput,
}

pub fn is_exit_keyword(token: &str) -> bool {
    EXIT_KEYWORDS.iter().any(|k| k.eq_ignore_ascii_case(token))
}

/// One query session writing prompts and results to `output`.
pub struct Session<'a, W: Write> {
    similarity: &'a Similarity,
    output: W,
    state: State,
    top_n: usize,
}

impl<'a, W: Write> Session<'a, W> {

    pub fn new(similarity: &'a Similarity, output: W) -> Self {
        Self {
            similarity,
            output,
            state: State::AwaitingInput,
            top_n: TOP_N,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Reads `input` line by line until an exit keyword or the end of the stream.
    pub fn run<R: BufRead>(&mut self, mut input: R) -> io::Result<Termination> {

        writeln!(self.output, "Enter Exit/Quit to close")?;
        self.prompt()?;

        let mut buf = Vec::new();
        let termination = loop {
            buf.clear();
            if input.read_until(b'\n', &mut buf)? == 0 {
                break Termination::EndOfInput;
            }
            let line = String::from_utf8_lossy(&buf);
            if self.handle_line(&line)? == State::Terminated {
                break Termination::ExitKeyword;
            }
        };

        self.state = State::Terminated;
        writeln!(self.output, "Done")?;
        self.output.flush()?;
        Ok(termination)
    }

    /// Answers one line of input and prints the next prompt.
    pub fn handle_line(&mut self, line: &str) -> io::Result<State> {

        if self.state == State::Terminated {
            return Ok(self.state);
        }

        let token = line.trim();
        if is_exit_keyword(token) {
            self.state = State::Terminated;
            return Ok(self.state);
        }

        if !token.is_empty() {
            debug!("processing message from stdin *****{}*****", token);
            match self.similarity.most_similar(token, self.top_n) {
                Lookup::Found(neighbours) => {
                    writeln!(self.output, "Similar to {}", token)?;
                    for (term, score) in neighbours {
                        writeln!(self.output, "{} {}", term, score)?;
                    }
                }
                Lookup::NotFound => writeln!(self.output, "Word {} not found", token)?,
            }
        }

        self.prompt()?;
        Ok(self.state)
    }

    fn prompt(&mut self) -> io::Result<()> {
        write!(self.output, "{}", PROMPT)?;
        self.output.flush()
    }
}
