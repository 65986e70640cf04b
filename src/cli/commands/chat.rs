//! Interactive question loop over one video.

use super::ingest::ingest_with;
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;
use console::style;
use std::io::{self, BufRead, Write};

/// Run the chat command: ingest, then answer questions until an empty line.
pub async fn run_chat(reference: &str, settings: Settings) -> Result<()> {
    let orchestrator = Orchestrator::new(settings)?;
    let outcome = ingest_with(&orchestrator, reference).await?;

    println!("\n{} {}", style("Chatting about").bold().cyan(), style(&outcome.title).bold());
    println!("{}\n", style("Enter a question, or an empty line to quit.").dim());

    let stdin = io::stdin();
    let answered = question_loop(&orchestrator, reference, stdin.lock(), io::stdout()).await?;

    Output::info(&format!("Goodbye! ({} questions answered)", answered));
    Ok(())
}

/// Read questions from `input` and write answers to `output`.
///
/// Stops at the first empty line or end of input. A failed answer is
/// reported and the loop continues. Returns the number of answers written.
pub(crate) async fn question_loop<R, W>(
    orchestrator: &Orchestrator,
    reference: &str,
    mut input: R,
    mut output: W,
) -> Result<usize>
where
    R: BufRead,
    W: Write,
{
    let mut answered = 0;

    loop {
        write!(output, "{} ", style("Question:").green().bold())?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            break;
        }

        let question = line.trim();
        if question.is_empty() {
            break;
        }

        match orchestrator.answer(question, reference).await {
            Ok(answer) => {
                writeln!(output, "\n{}\n", answer.text.trim())?;
                answered += 1;
            }
            Err(e) => {
                Output::error(&format!("Error: {}", e));
            }
        }
    }

    Ok(answered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Prompts;
    use crate::metadata_store::MemoryMetadataStore;
    use crate::pipeline::fakes::{FakeEmbedder, RecordingCompleter};
    use crate::vector_index::MemoryBackend;
    use std::io::Cursor;
    use std::sync::Arc;

    fn orchestrator(completer: Arc<RecordingCompleter>) -> Orchestrator {
        Orchestrator::with_components(
            Settings::default(),
            Prompts::default(),
            Arc::new(FakeEmbedder::new()),
            Arc::new(MemoryBackend::new()),
            Arc::new(MemoryMetadataStore::new()),
            completer,
        )
    }

    #[tokio::test]
    async fn test_loop_stops_on_empty_line() {
        let completer = Arc::new(RecordingCompleter::new());
        let orchestrator = orchestrator(completer.clone());
        let input = Cursor::new("first?\nsecond?\n\nnever asked?\n");
        let mut output = Vec::new();

        let answered = question_loop(&orchestrator, "dQw4w9WgXcQ", input, &mut output)
            .await
            .unwrap();

        assert_eq!(answered, 2);
        assert_eq!(completer.prompts.lock().unwrap().len(), 2);
        let printed = String::from_utf8(output).unwrap();
        assert_eq!(printed.matches("fake answer").count(), 2);
    }

    #[tokio::test]
    async fn test_loop_stops_at_end_of_input() {
        let completer = Arc::new(RecordingCompleter::new());
        let orchestrator = orchestrator(completer.clone());

        let answered = question_loop(
            &orchestrator,
            "dQw4w9WgXcQ",
            Cursor::new("only one?"),
            Vec::new(),
        )
        .await
        .unwrap();

        assert_eq!(answered, 1);
    }

    #[tokio::test]
    async fn test_whitespace_line_ends_loop() {
        let completer = Arc::new(RecordingCompleter::new());
        let orchestrator = orchestrator(completer.clone());

        let answered = question_loop(
            &orchestrator,
            "dQw4w9WgXcQ",
            Cursor::new("   \nignored?\n"),
            Vec::new(),
        )
        .await
        .unwrap();

        assert_eq!(answered, 0);
        assert!(completer.prompts.lock().unwrap().is_empty());
    }
}
