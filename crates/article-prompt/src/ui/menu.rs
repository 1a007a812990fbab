use std::io::{BufRead, Write};

use super::theme;
use crate::models::prompt::{CannedPrompt, PromptSpec, CANNED_PROMPTS};
use crate::utils::error::AppError;

pub const CUSTOM_PROMPT_CHOICE: &str = "[Custom prompt]";

/// Numbered prompt picker over any line-oriented input/output pair
pub struct PromptMenu<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> PromptMenu<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn select(&mut self) -> Result<PromptSpec, AppError> {
        self.print_choices()?;

        let custom_choice = CANNED_PROMPTS.len() + 1;
        loop {
            let answer = self.ask("Select prompt")?;

            match answer.trim().parse::<usize>() {
                Ok(n) if n == custom_choice => return self.custom_prompt(),
                Ok(n) => {
                    if let Some(canned) = CannedPrompt::by_choice(n) {
                        return Ok(canned.to_spec());
                    }
                }
                Err(_) => {
                    // typing a canned prompt verbatim also works
                    if let Some(canned) = CannedPrompt::find(&answer) {
                        return Ok(canned.to_spec());
                    }
                }
            }

            self.say(&format!("Please enter a number between 1 and {}", custom_choice))?;
        }
    }

    fn custom_prompt(&mut self) -> Result<PromptSpec, AppError> {
        let prompt = loop {
            let prompt = self.ask("Custom prompt (e.g 'Summarize this')")?;
            if !prompt.trim().is_empty() {
                break prompt.trim().to_string();
            }
        };

        let combination = self.ask(
            "Custom combination prompt (e.g 'Combine these summaries into an overall summary')",
        )?;

        Ok(PromptSpec::from_prompt(prompt, Some(combination)))
    }

    fn print_choices(&mut self) -> Result<(), AppError> {
        let choices = CANNED_PROMPTS
            .iter()
            .map(|c| c.prompt)
            .chain(std::iter::once(CUSTOM_PROMPT_CHOICE));

        for (i, choice) in choices.enumerate() {
            let number = theme::key_hint(&format!("{:>2})", i + 1));
            self.say(&format!("{} {}", number, choice))?;
        }

        Ok(())
    }

    fn say(&mut self, line: &str) -> Result<(), AppError> {
        writeln!(self.output, "{}", line).map_err(io_error)
    }

    /// Read one answer; end of input aborts the selection
    fn ask(&mut self, question: &str) -> Result<String, AppError> {
        write!(self.output, "{} ", theme::key_hint(&format!("? {}:", question))).map_err(io_error)?;
        self.output.flush().map_err(io_error)?;

        let mut line = String::new();
        let read = self.input.read_line(&mut line).map_err(io_error)?;
        if read == 0 {
            return Err(AppError::InvalidInput("no prompt selected".to_string()));
        }

        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}

fn io_error(err: std::io::Error) -> AppError {
    AppError::InvalidInput(format!("terminal I/O failed: {}", err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn run(input: &str) -> (Result<PromptSpec, AppError>, String) {
        let mut output = Vec::new();
        let result = PromptMenu::new(Cursor::new(input.as_bytes()), &mut output).select();
        (result, String::from_utf8_lossy(&output).into_owned())
    }

    #[test]
    fn test_select_canned_by_number() {
        let (result, output) = run("2\n");
        let spec = result.unwrap();

        assert_eq!(spec.prompt, "List 10 key takeaways");
        assert_eq!(
            spec.combination(),
            Some("Combine these takeaways into an overall list of 10 key takeaways")
        );
        assert!(output.contains("Summarize this"));
        assert!(output.contains(CUSTOM_PROMPT_CHOICE));
    }

    #[test]
    fn test_invalid_choice_asks_again() {
        let (result, output) = run("9\nabc\n1\n");

        assert_eq!(result.unwrap().prompt, "Summarize this");
        assert_eq!(output.matches("Please enter a number").count(), 2);
    }

    #[test]
    fn test_custom_prompt_with_combination() {
        let (result, _) = run("5\nTranslate to French\nMerge the translations\n");
        let spec = result.unwrap();

        assert_eq!(spec.prompt, "Translate to French");
        assert_eq!(spec.combination(), Some("Merge the translations"));
    }

    #[test]
    fn test_custom_prompt_blank_combination_is_none() {
        let (result, _) = run("5\n\nTranslate to French\n\n");
        let spec = result.unwrap();

        assert_eq!(spec.prompt, "Translate to French");
        assert_eq!(spec.combination(), None);
    }

    #[test]
    fn test_end_of_input_is_invalid_input() {
        let (result, _) = run("");
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }
}
