use chiral_dns_application::use_cases::ConsoleSession;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// Drives `session` from stdin until `quit` or end of input.
pub async fn run_console(mut session: ConsoleSession) -> anyhow::Result<()> {
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    stdout
        .write_all(b"Chiral DNS command console. Type 'help' for commands.\n")
        .await?;

    loop {
        stdout.write_all(session.prompt().as_bytes()).await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            stdout.write_all(b"\n").await?;
            break;
        };

        let output = session.execute(&line).await;
        for text in &output.lines {
            stdout.write_all(text.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
        }
        if output.quit {
            break;
        }
    }

    stdout.flush().await?;
    Ok(())
}
