use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use axum_server::tls_rustls::RustlsConfig;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;

use anyhow::anyhow;

use speech_relay::{
    ServerConfig,
    form::{ClientConfig, FormState, RelayClient, VoiceCatalog, artifact::playback_hint},
    routes,
    state::AppState,
};

/// Speech Relay - Google Cloud text-to-speech relay
#[derive(Parser, Debug)]
#[command(name = "speech-relay")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (YAML)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Subcommand to run (defaults to `serve`)
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the relay HTTP server
    Serve,

    /// Generate speech through a running relay and save it as MP3
    Generate {
        /// Text to convert
        #[arg(short = 't', long = "text")]
        text: String,

        /// Language code
        #[arg(short = 'l', long = "language", default_value = "en-US")]
        language: String,

        /// Voice name (defaults to the language's first catalog voice)
        #[arg(short = 'v', long = "voice")]
        voice: Option<String>,

        /// Speaking rate, 0.25 to 4.0
        #[arg(long = "speed", default_value_t = 1.0)]
        speed: f64,

        /// Pitch in semitones, -20 to 20
        #[arg(long = "pitch", default_value_t = 0.0, allow_hyphen_values = true)]
        pitch: f64,

        /// Directory the MP3 is written to
        #[arg(short = 'o', long = "output-dir", default_value = ".")]
        output_dir: PathBuf,

        /// Voice catalog file (YAML)
        #[arg(long = "catalog", value_name = "FILE")]
        catalog: Option<PathBuf>,
    },

    /// Print the voice catalog
    Voices {
        /// Only show this language
        #[arg(short = 'l', long = "language")]
        language: Option<String>,

        /// Voice catalog file (YAML)
        #[arg(long = "catalog", value_name = "FILE")]
        catalog: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if it exists (must be done before config loading)
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Initialize crypto provider for TLS connections
    // This must be done before any TLS connections are attempted
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow!("Failed to install default crypto provider"))?;

    // Parse CLI arguments
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(cli.config).await,
        Commands::Generate {
            text,
            language,
            voice,
            speed,
            pitch,
            output_dir,
            catalog,
        } => {
            let catalog = VoiceCatalog::resolve(catalog.as_deref())?;
            let mut form = FormState::new();
            form.set_text(text);
            if language != form.language() {
                form.set_language(language, &catalog);
            }
            if let Some(voice) = voice {
                if !catalog.contains_voice(form.language(), &voice) {
                    warn!(%voice, language = form.language(), "Voice is not in the catalog");
                }
                form.set_voice(voice);
            }
            form.set_speed(speed);
            form.set_pitch(pitch);
            generate(form, &output_dir).await
        }
        Commands::Voices { language, catalog } => {
            let catalog = VoiceCatalog::resolve(catalog.as_deref())?;
            print_catalog(&catalog, language.as_deref());
            Ok(())
        }
    }
}

async fn serve(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    // Load configuration from file or environment
    let config = if let Some(config_path) = config_path {
        println!("Loading configuration from {}", config_path.display());
        ServerConfig::from_file(&config_path).map_err(|e| anyhow!(e.to_string()))?
    } else {
        ServerConfig::from_env().map_err(|e| anyhow!(e.to_string()))?
    };

    let address = config.address();
    let tls_config = config.tls.clone();
    if config.requires_api_key() {
        info!("Relay key required for /text-to-speech");
    }
    println!("Starting server on {address}");

    // Create application state
    let app_state = AppState::new(config).map_err(|e| anyhow!(e.to_string()))?;

    let app = routes::create_app(app_state);

    // Parse socket address
    let socket_addr: SocketAddr = address
        .parse()
        .map_err(|e| anyhow!("Invalid server address '{}': {}", address, e))?;

    // Start server with or without TLS
    if let Some(tls) = tls_config {
        // Load TLS configuration from certificate and key files
        let rustls_config = RustlsConfig::from_pem_file(&tls.cert_path, &tls.key_path)
            .await
            .map_err(|e| {
                anyhow!(
                    "Failed to load TLS certificates from {} and {}: {}",
                    tls.cert_path.display(),
                    tls.key_path.display(),
                    e
                )
            })?;

        println!("Server listening on https://{} (TLS enabled)", socket_addr);

        axum_server::bind_rustls(socket_addr, rustls_config)
            .serve(app.into_make_service_with_connect_info::<SocketAddr>())
            .await
            .map_err(|e| anyhow!("TLS server error: {}", e))?;
    } else {
        println!("Server listening on http://{}", socket_addr);

        let listener = TcpListener::bind(&socket_addr).await?;
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await?;
    }

    Ok(())
}

async fn generate(mut form: FormState, output_dir: &Path) -> anyhow::Result<()> {
    let client = RelayClient::new(ClientConfig::from_env()).map_err(|e| anyhow!(e.to_string()))?;

    let body = form.begin_generation().map_err(|e| anyhow!(e.to_string()))?;
    println!("{} characters", form.text_chars());
    info!(
        text_chars = form.text_chars(),
        language = form.language(),
        voice = form.voice(),
        speed = form.speed(),
        pitch = form.pitch(),
        "Generating audio"
    );

    match client.generate(&body).await {
        Ok(audio) => form.complete_success(audio),
        Err(e) => form.complete_failure(e.to_string()),
    }

    if let Some(message) = form.error() {
        anyhow::bail!("{message}");
    }

    let audio = form
        .audio()
        .ok_or_else(|| anyhow!("Relay returned no audio"))?;
    let path = audio.download(output_dir).await?;
    println!("Saved {} bytes to {}", audio.len(), path.display());
    println!("{}", playback_hint(&path));
    Ok(())
}

fn print_catalog(catalog: &VoiceCatalog, language: Option<&str>) {
    for entry in catalog.languages() {
        if language.is_some_and(|code| code != entry.code) {
            continue;
        }
        println!("{} ({})", entry.name, entry.code);
        for voice in &entry.voices {
            println!("  {:<24} {}", voice.name, voice.label);
        }
    }
}
