use std::io::{self, Write};

use codespan_reporting::diagnostic::{Diagnostic, Label};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use codespan_reporting::term::{self, Config, DisplayStyle};
use console::{style, Term};
use lira_backend::{AllocError, Allocation};
use lira_frontend::ParseError;

/// Reports diagnostics and progress on standard error.
pub struct ConsoleDriver {
    files: SimpleFiles<String, String>,
    file: usize,
    writer: StandardStream,
    config: Config,
    term: Term,
}

impl ConsoleDriver {
    pub fn new(name: String, source: String) -> Self {
        let mut files = SimpleFiles::new();
        let file = files.add(name, source);

        Self {
            files,
            file,
            writer: StandardStream::stderr(ColorChoice::Auto),
            config: Config {
                display_style: DisplayStyle::Rich,
                ..Default::default()
            },
            term: Term::stderr(),
        }
    }

    pub fn report_parse(&mut self, errors: &[ParseError]) -> anyhow::Result<()> {
        for error in errors {
            let diagnostic = Diagnostic::error()
                .with_message(&error.message)
                .with_labels(vec![Label::primary(self.file, error.span.clone())]);

            term::emit(&mut self.writer, &self.config, &self.files, &diagnostic)?;
        }

        Ok(())
    }

    pub fn report_alloc(&mut self, method: &str, error: &AllocError) -> anyhow::Result<()> {
        let diagnostic: Diagnostic<usize> = Diagnostic::error()
            .with_message(error.to_string())
            .with_notes(vec![format!("while allocating `{method}`")]);

        term::emit(&mut self.writer, &self.config, &self.files, &diagnostic)?;
        Ok(())
    }

    pub fn report_done(&mut self, allocation: &Allocation) -> io::Result<()> {
        let spilled = allocation.spilled();
        let status = if spilled.is_empty() {
            style("allocated").green().bold()
        } else {
            style("spilled").yellow().bold()
        };

        let spilled: Vec<String> = spilled.iter().map(|vreg| format!("v{vreg}")).collect();
        let mut line = format!(
            "{status} `{}`: {} registers, {} bytes of frame",
            allocation.method.name,
            allocation.used.len(),
            allocation.frame_size
        );

        if !spilled.is_empty() {
            line.push_str(&format!(" ({})", spilled.join(", ")));
        }

        self.term.write_line(&line)
    }

    pub fn report_failures(&mut self, failed: usize) -> io::Result<()> {
        let noun = if failed == 1 { "method" } else { "methods" };
        writeln!(
            self.term,
            "{}: {failed} {noun} could not be allocated",
            style("error").red().bold()
        )
    }
}
