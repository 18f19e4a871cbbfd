use clap::Parser;
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

use study_chat::cli::{webhook_for, Args, Mode};
use study_chat::config::Config;
use study_chat::repl::{print_banner, run_quiz, run_tutor};
use study_chat::{HttpWebhook, QuizWidget, TutorWidget};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so they never interleave with the chat on stdout.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut config = Config::load(args.config.as_deref())?;
    args.apply_to(&mut config);

    let url = webhook_for(args.mode, &config).to_string();
    let webhook = HttpWebhook::new(url.as_str(), config.request_timeout())?;
    let stdin = BufReader::new(tokio::io::stdin());

    match args.mode {
        Mode::Quiz => {
            let widget = QuizWidget::new(webhook, config.answer_delay());
            print_banner(args.mode, &url, widget.session());
            run_quiz(widget, stdin, std::io::stdout()).await?;
        }
        Mode::Tutor => {
            let widget = TutorWidget::new(webhook);
            print_banner(args.mode, &url, widget.session());
            run_tutor(widget, stdin, std::io::stdout()).await?;
        }
    }

    Ok(())
}
