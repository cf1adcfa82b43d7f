use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ats_cli::form::FormState;
use ats_cli::gateway::GatewayClient;
use ats_cli::notify::{self, Notification};
use ats_cli::report::{self, Osc52Clipboard};
use ats_cli::session::{self, is_affirmative, SubmitOutcome};
use ats_cli::upload::{parse_dropped_paths, FileCandidate};
use ats_cli::USER_AGENT;

#[derive(Parser, Debug)]
#[command(name = "ats-check")]
#[command(version, about = "Compare a PDF résumé against a job description", long_about = None)]
struct Cli {
    /// Analysis server base URL
    #[arg(long, env = "ATS_SERVER_URL", default_value = "http://localhost:8080")]
    server: String,

    /// Résumé PDF for the first analysis (omit to be prompted for one)
    #[arg(short, long)]
    resume: Option<PathBuf>,

    /// Job description text for the first analysis
    #[arg(short, long, conflicts_with = "job_description_file")]
    job_description: Option<String>,

    /// Read the first job description from a file (default: stdin)
    #[arg(long)]
    job_description_file: Option<PathBuf>,

    /// Copy the missing keywords to the clipboard after each analysis
    #[arg(long)]
    copy_missing: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();

    // Logs go to stderr so the report stays clean on stdout
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ats_cli=warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let gateway = GatewayClient::new(&cli.server, USER_AGENT)?;
    let interactive = io::stdout().is_terminal();
    let mut stdin = BufReader::new(tokio::io::stdin());

    let mut form = FormState::new();
    let mut first_pass = true;
    let mut last_outcome: Option<SubmitOutcome> = None;

    // Runs until input ends or the user declines another analysis
    loop {
        let pick_resume = form.held_file().is_none()
            || last_outcome == Some(SubmitOutcome::EncodingFailed);
        if pick_resume {
            let flagged = cli.resume.as_ref().filter(|_| first_pass);
            let picked = match flagged {
                Some(path) => select_from_flag(&mut form, path),
                None => prompt_for_drop(&mut form, &mut stdin).await?,
            };
            if !picked {
                break;
            }
        }

        if form.job_description().is_empty() {
            let text = if first_pass {
                job_description_from_flags(&cli).await?
            } else {
                None
            };
            let text = match text {
                Some(text) => text,
                None => match prompt_for_job_description(&mut stdin).await? {
                    Some(text) => text,
                    None => break,
                },
            };
            form.set_job_description(text.trim());
            if form.job_description().is_empty() {
                eprintln!("The job description is empty.");
                first_pass = false;
                continue;
            }
        }
        first_pass = false;

        let outcome = session::submit(&mut form, &gateway, |state| {
            if interactive {
                print!("\x1b[2J\x1b[H{}", report::render(state));
                let _ = io::stdout().flush();
            }
        })
        .await;
        flush_notifications(&mut form);
        last_outcome = Some(outcome);

        if outcome != SubmitOutcome::Succeeded {
            // Failed clears the form; EncodingFailed asks for another file
            continue;
        }

        if !interactive {
            print!("{}", report::render(&form));
        }
        if cli.copy_missing {
            report::copy_missing_keywords(&mut form, &mut Osc52Clipboard::stdout());
            flush_notifications(&mut form);
        }

        eprint!("Analyze another resume? [y/N] ");
        io::stderr().flush()?;
        match read_line(&mut stdin).await? {
            Some(answer) if is_affirmative(&answer) => form.reset(),
            _ => break,
        }
    }

    Ok(match last_outcome {
        Some(SubmitOutcome::Succeeded) => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    })
}

fn flush_notifications(form: &mut FormState) {
    for notification in form.take_notifications() {
        eprintln!("{notification}");
    }
}

async fn read_line<R>(stdin: &mut R) -> Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = String::new();
    if stdin.read_line(&mut line).await? == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}

/// Offers a `--resume` path through the picker. Returns whether it was accepted.
fn select_from_flag(form: &mut FormState, path: &Path) -> bool {
    match FileCandidate::from_path(path) {
        Ok(candidate) => {
            let accepted = candidate.is_accepted();
            form.select_files(vec![candidate]);
            flush_notifications(form);
            accepted
        }
        Err(e) => {
            eprintln!("Cannot open résumé {}: {e}", path.display());
            false
        }
    }
}

/// Asks for a résumé until one is accepted. Dragging a file onto a terminal
/// pastes its path, which is treated as a drop. Returns `false` when input ends.
async fn prompt_for_drop<R>(form: &mut FormState, stdin: &mut R) -> Result<bool>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        eprint!("Drop your PDF here (or type its path): ");
        io::stderr().flush()?;

        let Some(line) = read_line(stdin).await? else {
            return Ok(false);
        };

        form.drag_over();
        let mut candidates = Vec::new();
        for path in parse_dropped_paths(&line) {
            match FileCandidate::from_path(&path) {
                Ok(candidate) => candidates.push(candidate),
                Err(e) => {
                    tracing::debug!("Skipping {}: {e}", path.display());
                    form.notify(Notification::warning(notify::MSG_INVALID_FILE));
                }
            }
        }
        let accepted = candidates.iter().any(FileCandidate::is_accepted);
        form.drop_files(candidates, USER_AGENT);
        flush_notifications(form);

        if accepted && form.held_file().is_some() {
            return Ok(true);
        }
    }
}

async fn job_description_from_flags(cli: &Cli) -> Result<Option<String>> {
    if let Some(text) = &cli.job_description {
        return Ok(Some(text.clone()));
    }
    if let Some(path) = &cli.job_description_file {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Cannot read job description {}", path.display()))?;
        return Ok(Some(text));
    }
    Ok(None)
}

/// On a terminal the description ends at an empty line; piped input is read
/// to the end. Returns `None` when input has ended.
async fn prompt_for_job_description<R>(stdin: &mut R) -> Result<Option<String>>
where
    R: AsyncBufRead + AsyncRead + Unpin,
{
    if !io::stdin().is_terminal() {
        let mut text = String::new();
        if stdin.read_to_string(&mut text).await? == 0 {
            return Ok(None);
        }
        return Ok(Some(text));
    }

    eprintln!("Paste the job description, then an empty line:");
    let mut text = String::new();
    while let Some(line) = read_line(stdin).await? {
        if line.trim().is_empty() && !text.is_empty() {
            return Ok(Some(text));
        }
        text.push_str(&line);
    }
    Ok((!text.is_empty()).then_some(text))
}
