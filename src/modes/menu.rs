//! Start-up menu asking whether to train from scratch or resume a saved model

use anyhow::{Context, Result, bail};
use std::io::{BufRead, Write};

/// Ask whether to resume training from the saved model
///
/// Writes the two options to `output` and reads lines from `input` until one
/// of them is chosen: `1` starts fresh (`false`), `2` resumes (`true`). Any
/// other answer repeats the prompt. Running out of input is an error.
///
/// # Example
///
/// ```rust
/// use snake_dqn::modes::prompt_resume;
///
/// let mut output = Vec::new();
/// let resume = prompt_resume("maybe\n2\n".as_bytes(), &mut output).unwrap();
/// assert!(resume);
/// ```
pub fn prompt_resume<R: BufRead, W: Write>(mut input: R, mut output: W) -> Result<bool> {
    let mut line = String::new();

    loop {
        writeln!(output, "1) Train a new model")?;
        writeln!(output, "2) Resume training the saved model")?;
        write!(output, "Select an option [1/2]: ")?;
        output.flush()?;

        line.clear();
        let read = input
            .read_line(&mut line)
            .context("Failed to read menu selection")?;
        if read == 0 {
            bail!("Input closed before a menu option was selected");
        }

        match line.trim() {
            "1" => return Ok(false),
            "2" => return Ok(true),
            other => writeln!(output, "Unrecognized option {other:?}, please enter 1 or 2")?,
        }
    }
}
