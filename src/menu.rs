//! Text menu around the core. Turns terminal input into a [`SchemaRequest`]
//! and hands it to the [`Invoker`]; everything interactive stays here.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use tracing::debug;

use crate::catalog::{load_catalog, SchemaRequest};
use crate::error::MenuError;
use crate::events::InvocationEvent;
use crate::invoker::Invoker;

/// Which way a menu pass ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

pub struct Menu<R, W> {
    input: R,
    output: W,
    catalog: PathBuf,
}

impl<R: BufRead, W: Write> Menu<R, W> {
    pub fn new(input: R, output: W, catalog: impl Into<PathBuf>) -> Self {
        Self {
            input,
            output,
            catalog: catalog.into(),
        }
    }

    /// Loop until the user exits or input ends. Invocation failures are
    /// returned to the caller; input, catalog and schema problems are printed.
    pub async fn run(&mut self, invoker: &Invoker) -> Result<(), MenuError> {
        loop {
            writeln!(self.output, "ChatGPT API-Based Application Interface")?;
            writeln!(self.output, "1. Select a premade example")?;
            writeln!(self.output, "2. Input your details")?;
            writeln!(self.output, "3. Exit")?;

            let Some(choice) = self.prompt("Enter your choice: ")? else {
                return Ok(());
            };

            let flow = match choice.parse::<u32>() {
                Ok(1) => self.premade(invoker).await?,
                Ok(2) => self.custom(invoker).await?,
                Ok(3) => {
                    writeln!(self.output, "Exiting.")?;
                    Flow::Exit
                }
                Ok(_) => {
                    writeln!(
                        self.output,
                        "Invalid choice. Please enter a number between 1 and 3."
                    )?;
                    Flow::Continue
                }
                Err(_) => {
                    writeln!(self.output, "Invalid input. Please enter a number.")?;
                    Flow::Continue
                }
            };

            if flow == Flow::Exit {
                return Ok(());
            }
        }
    }

    async fn premade(&mut self, invoker: &Invoker) -> Result<Flow, MenuError> {
        let entries = match load_catalog(&self.catalog).await {
            Ok(entries) => entries,
            Err(e) => {
                writeln!(self.output, "Error: {e}")?;
                return Ok(Flow::Continue);
            }
        };
        if entries.is_empty() {
            writeln!(self.output, "The catalog has no examples.")?;
            return Ok(Flow::Continue);
        }

        writeln!(self.output, "Select a premade example:")?;
        for (i, entry) in entries.iter().enumerate() {
            writeln!(self.output, "{}. {}: {}", i + 1, entry.name, entry.description)?;
        }

        loop {
            let Some(choice) = self.prompt("Choose an example: ")? else {
                return Ok(Flow::Exit);
            };
            match choice.parse::<usize>() {
                Ok(n) if (1..=entries.len()).contains(&n) => {
                    let request = SchemaRequest::from(entries[n - 1].clone());
                    self.execute(invoker, &request).await?;
                    return Ok(Flow::Continue);
                }
                _ => writeln!(
                    self.output,
                    "Invalid choice. Please enter a number corresponding to an example."
                )?,
            }
        }
    }

    async fn custom(&mut self, invoker: &Invoker) -> Result<Flow, MenuError> {
        let prompts = [
            "Enter a list of entities, separated by commas: ",
            "Enter a list of attributes, separated by commas: ",
            "Enter the function name: ",
            "Enter the function description: ",
        ];
        let mut answers = Vec::with_capacity(prompts.len());
        for text in prompts {
            match self.prompt(text)? {
                Some(answer) => answers.push(answer),
                None => return Ok(Flow::Exit),
            }
        }

        let request = SchemaRequest::from_input(&answers[0], &answers[1], &answers[2], &answers[3]);
        self.execute(invoker, &request).await?;
        Ok(Flow::Continue)
    }

    /// Build the definition and invoke. A bad schema is reported, not fatal.
    async fn execute(
        &mut self,
        invoker: &Invoker,
        request: &SchemaRequest,
    ) -> Result<(), MenuError> {
        let definition = match request.builder().definition() {
            Ok(definition) => definition,
            Err(e) => {
                writeln!(self.output, "Error: {e}")?;
                return Ok(());
            }
        };

        // Capacity covers every event of one invocation, so sends never wait.
        let (tx, mut rx) = tokio::sync::mpsc::channel::<InvocationEvent>(8);
        let result = invoker
            .invoke_streaming(&request.user_message, &definition, tx)
            .await;

        while let Ok(event) = rx.try_recv() {
            match event {
                InvocationEvent::Request {
                    function,
                    parameters,
                } => debug!(%function, parameters, "invocation sent"),
                InvocationEvent::Response {
                    rendered,
                    token_count,
                } => {
                    writeln!(self.output, "{rendered}")?;
                    writeln!(self.output, "Token count: {token_count}")?;
                }
                InvocationEvent::Persisted { path } => {
                    writeln!(self.output, "Saved to {}", path.display())?;
                }
            }
        }

        // Events go out first so a reply is shown even when saving it failed.
        result?;
        Ok(())
    }

    /// Print `text` and read one trimmed line. `None` at end of input.
    fn prompt(&mut self, text: &str) -> Result<Option<String>, MenuError> {
        write!(self.output, "{text}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    pub fn into_output(self) -> W {
        self.output
    }
}
