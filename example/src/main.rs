mod helpers;

use std::{fs, path::PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use log::{debug, info};
use mustache_helpers::{HelperExtensions, Locale, Mustache, RenderSettings, Value};
use tokio::io::AsyncWriteExt;
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "mustache-example")]
#[command(about = "Render a directory of Mustache templates with demo helpers")]
struct Cli {
    /// Directory searched for *.mustache files
    #[arg(long, default_value = "templates")]
    templates: PathBuf,

    /// JSON file used as the view for every template
    #[arg(long)]
    data: Option<PathBuf>,

    /// Locale tag, e.g. en-GB or ru-RU
    #[arg(long, default_value = "en-GB")]
    locale: String,

    /// Stream output through the async renderer
    #[arg(long = "async")]
    use_async: bool,
}

fn load_view(path: Option<&PathBuf>) -> Result<Value> {
    let Some(path) = path else {
        return Ok(Value::Null);
    };
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let json: serde_json::Value =
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
    Ok(json.into())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::Builder::from_default_env().init();

    let cli = Cli::parse();
    let locale =
        Locale::from_tag(&cli.locale).ok_or_else(|| anyhow!("unknown locale {}", cli.locale))?;
    let settings = RenderSettings::with_locale(locale);
    let view = load_view(cli.data.as_ref())?;

    let inline = helpers::inline()?;
    let sections = helpers::sections()?;
    let mustache = Mustache::builder()
        .configure(|settings| {
            settings.add_helpers(inline).add_section_helpers(sections);
        })
        .build();

    let mut stdout = tokio::io::stdout();
    for entry in WalkDir::new(&cli.templates).sort_by_file_name() {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() || path.extension().is_none_or(|ext| ext != "mustache") {
            debug!("skipping {}", path.display());
            continue;
        }
        info!("rendering {}", path.display());
        let source =
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;

        println!("== {} ==", path.display());
        if cli.use_async {
            mustache
                .render_async(&source, view.clone(), &settings, &mut stdout)
                .await
                .with_context(|| format!("rendering {}", path.display()))?;
            stdout.write_all(b"\n").await?;
            stdout.flush().await?;
        } else {
            let html = mustache
                .render_with(&source, view.clone(), &settings)
                .with_context(|| format!("rendering {}", path.display()))?;
            println!("{}", html);
        }
    }
    Ok(())
}
