use anyhow::{Context, Result};
use clap::Parser;
use scout_assistant::{
    config::{load_config, ScoutConfig},
    intent::IntentClassifier,
    services::{
        camera::FileImageCapture, inference::HttpInferenceClient, stt::QueuedTranscriber,
        tts::LogSpeechPlayer, wakeword::ManualWakeWord,
    },
    turn::{Collaborators, ControllerConfig, TurnController},
    ScoutError,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Professor server base URL (overrides SCOUT_SERVER_URL)
    #[arg(long)]
    server_url: Option<String>,

    /// Image file sent to the server for visual requests
    #[arg(long, default_value = "frame.jpg")]
    image: PathBuf,

    /// Intent labels file for an on-device model (overrides SCOUT_LABELS_PATH)
    #[arg(long)]
    labels: Option<PathBuf>,

    /// Simulated speech duration per spoken word, in milliseconds
    #[arg(long, default_value_t = 0)]
    speech_pacing_ms: u64,

    /// How long to wait for an utterance after the wake word, in seconds
    #[arg(long, default_value_t = 10)]
    utterance_timeout_secs: u64,
}

fn build_classifier(config: &ScoutConfig) -> IntentClassifier {
    match &config.labels_path {
        Some(path) => IntentClassifier::load(path, config.confidence_threshold, || {
            Err(ScoutError::Model(
                "no on-device model backend in this build".to_string(),
            ))
        }),
        None => IntentClassifier::keyword_only(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    let args = Args::parse();
    log::info!("🚀 Initializing scout with args: {:?}", args);

    let mut config = load_config().context("Failed to load configuration")?;
    if let Some(url) = &args.server_url {
        config.server_url = ScoutConfig::parse_server_url(url).context("Invalid --server-url")?;
    }
    if let Some(labels) = &args.labels {
        config.labels_path = Some(labels.clone());
    }

    let classifier = build_classifier(&config);

    let detector = Arc::new(ManualWakeWord::new());
    let (transcriber, transcript_tx) =
        QueuedTranscriber::new(Duration::from_secs(args.utterance_timeout_secs));
    let inference =
        HttpInferenceClient::from_config(&config).context("Failed to create inference client")?;
    log::info!("📡 Professor server endpoint: {}", inference.endpoint());

    let collaborators = Collaborators {
        detector: detector.clone(),
        transcriber: Arc::new(transcriber),
        camera: Arc::new(FileImageCapture::new(&args.image)),
        inference: Arc::new(inference),
        speech: Arc::new(LogSpeechPlayer::with_pacing(Duration::from_millis(
            args.speech_pacing_ms,
        ))),
    };

    let mut controller =
        TurnController::new(collaborators, classifier, ControllerConfig::from(&config));
    controller
        .initialize()
        .await
        .context("Failed to initialize assistant")?;

    // Display layer: mirror status changes to the log
    let mut status_rx = controller.subscribe();
    tokio::spawn(async move {
        while status_rx.changed().await.is_ok() {
            let status = status_rx.borrow_and_update().clone();
            log::info!("[{}] {}", status.state, status.last_response_text);
        }
    });

    let shutdown = CancellationToken::new();

    // Every line typed stands for "wake word + utterance"
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        if line.trim().is_empty() {
                            continue;
                        }
                        if detector.trigger() {
                            if transcript_tx.send(line).is_err() {
                                break;
                            }
                        } else {
                            println!("⏳ Still busy with the previous request, try again in a moment");
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        log::error!("Failed to read stdin: {}", e);
                        break;
                    }
                }
            }
            shutdown.cancel();
        });
    }

    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                log::info!("Received Ctrl+C, shutting down...");
            }
            shutdown.cancel();
        });
    }

    println!("🎧 Type a request and press Enter (each line acts as wake word + speech)");
    println!("   Press Ctrl+C or Ctrl+D to exit");

    controller.run(shutdown).await?;

    println!("\n👋 Goodbye!");
    Ok(())
}
