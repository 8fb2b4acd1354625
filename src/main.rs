use anyhow::Result;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "meme-captioner-rust",
    version,
    about = "Serve template images with top and bottom captions"
)]
struct Cli {
    /// Port to serve on (default: 3001)
    #[arg(short = 'p', long = "port", env = "PORT")]
    port: Option<u16>,

    /// Address to bind (default: 0.0.0.0)
    #[arg(long = "host")]
    host: Option<String>,

    /// Directory scanned for <name>.jpg templates (default: ./memes)
    #[arg(short = 't', long = "templates")]
    templates: Option<String>,

    /// Font file used for captions (default: ./font.ttf)
    #[arg(short = 'f', long = "font")]
    font: Option<String>,

    /// Read extra settings from a local TOML file
    #[arg(short = 'r', long = "settings")]
    settings: Option<String>,

    /// Enable verbose logging
    #[arg(long = "verbose")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    meme_captioner_rust::logging::init(cli.verbose)?;
    meme_captioner_rust::run(meme_captioner_rust::Config {
        host: cli.host,
        port: cli.port,
        templates_dir: cli.templates,
        font_path: cli.font,
        settings_path: cli.settings,
    })
    .await
}
