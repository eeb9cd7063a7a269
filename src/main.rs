//! Pagemark - render markdown into paginated page layouts.
//!
//! # Usage
//!
//! ```bash
//! pagemark README.md -o README.json
//! pagemark --page-size letter --landscape README.md
//! pagemark --watch --trace render.log README.md
//! ```

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use pagemark::canvas::{Orientation, PageCanvas, PageSize};
use pagemark::config::{
    ConfigFlags, clear_config_flags, global_config_path, load_config_flags, local_override_path,
    save_config_flags,
};
use pagemark::document;
use pagemark::perf;
use pagemark::render::{RenderOptions, Renderer, StyleSheet};
use pagemark::watcher::{DEFAULT_DEBOUNCE, SourceWatcher};

/// Render markdown into paginated page layouts
#[derive(Parser, Debug)]
#[command(name = "pagemark", version, about, long_about = None)]
struct Cli {
    /// Markdown file to render
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Write the rendered pages (JSON) here instead of stdout
    #[arg(short, long, value_name = "OUT")]
    output: Option<PathBuf>,

    /// Paper size
    #[arg(long, value_enum)]
    page_size: Option<PageSize>,

    /// Rotate pages to landscape
    #[arg(long)]
    landscape: bool,

    /// Prefix prepended to image paths
    #[arg(long, value_name = "DIR")]
    image_prefix: Option<String>,

    /// Fallback prefix for high-resolution images
    #[arg(long, value_name = "DIR")]
    image_alt_prefix: Option<String>,

    /// JSON style sheet overriding the default styles
    #[arg(long, value_name = "FILE")]
    styles: Option<PathBuf>,

    /// Write every layout decision to a trace file
    #[arg(long, value_name = "FILE")]
    trace: Option<PathBuf>,

    /// Log render timings
    #[arg(long)]
    perf: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Re-render whenever the file changes
    #[arg(short, long)]
    watch: bool,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

impl Cli {
    /// The flags that can be saved as defaults.
    fn flags(&self) -> ConfigFlags {
        ConfigFlags {
            watch: self.watch,
            perf: self.perf,
            verbose: self.verbose,
            landscape: self.landscape,
            page_size: self.page_size,
            image_prefix: self.image_prefix.clone(),
            image_alt_prefix: self.image_alt_prefix.clone(),
            styles: self.styles.clone(),
            trace: self.trace.clone(),
        }
    }
}

/// Everything one render pass needs besides the source text.
struct Job {
    source: PathBuf,
    output: Option<PathBuf>,
    page_size: PageSize,
    orientation: Orientation,
    options: RenderOptions,
}

impl Job {
    fn run(&self) -> Result<()> {
        let _scope = perf::scope("render.total");
        let bytes = fs::read(&self.source)
            .with_context(|| format!("Failed to read {}", self.source.display()))?;
        let markdown = document::prepare_content(
            &self.source,
            String::from_utf8_lossy(&bytes).into_owned(),
        );
        let tree = {
            let _scope = perf::scope("render.parse");
            document::parse(&markdown)
        };

        let mut canvas = PageCanvas::new(self.page_size, self.orientation);
        let report = Renderer::new(&mut canvas, self.options.clone())
            .render(&tree)
            .with_context(|| format!("Failed to render {}", self.source.display()))?;
        let rendered = canvas.finish();
        tracing::info!(
            pages = rendered.pages.len(),
            anchors = report.anchors,
            "rendered {}",
            self.source.display()
        );
        for skipped in &report.skipped_images {
            eprintln!(
                "[warn] Image not found: {} (looked for {})",
                skipped.destination,
                skipped.path.display()
            );
        }

        let json = rendered.to_json().context("Failed to serialize pages")?;
        match &self.output {
            Some(path) => fs::write(path, json + "\n")
                .with_context(|| format!("Failed to write {}", path.display()))?,
            None => {
                let mut stdout = std::io::stdout().lock();
                writeln!(stdout, "{json}").context("Failed to write to stdout")?;
            }
        }
        Ok(())
    }
}

fn load_styles(path: Option<&Path>) -> Result<StyleSheet> {
    let Some(path) = path else {
        return Ok(StyleSheet::default());
    };
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read styles {}", path.display()))?;
    StyleSheet::from_json(&json).with_context(|| format!("Invalid styles {}", path.display()))
}

fn watch(job: &Job) -> Result<()> {
    let mut watcher = SourceWatcher::new(&job.source, DEFAULT_DEBOUNCE)
        .with_context(|| format!("Failed to watch {}", job.source.display()))?;
    eprintln!("Watching {} (Ctrl-C to stop)", watcher.source().display());
    loop {
        if watcher.wait_for_change(Duration::from_secs(1)) {
            if let Err(err) = job.run() {
                eprintln!("[error] {err:#}");
            }
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = cli.flags();

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);

    let level = if effective.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    perf::set_enabled(effective.perf);
    let trace_path = effective
        .trace
        .clone()
        .or_else(|| std::env::var_os("PAGEMARK_TRACE").map(PathBuf::from));
    if let Err(err) = perf::set_trace_path(trace_path.as_deref()) {
        eprintln!(
            "[warn] Failed to open render trace {}: {}",
            trace_path
                .as_ref()
                .map_or_else(|| "<unset>".to_string(), |p| p.display().to_string()),
            err
        );
    }

    if !cli.file.exists() {
        anyhow::bail!("File not found: {}", cli.file.display());
    }

    let job = Job {
        source: cli.file,
        output: cli.output,
        page_size: effective.page_size.unwrap_or_default(),
        orientation: if effective.landscape {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        },
        options: RenderOptions {
            styles: load_styles(effective.styles.as_deref())?,
            local_path_prefix: effective.image_prefix.unwrap_or_default(),
            alternative_image_prefix: effective.image_alt_prefix.unwrap_or_default(),
        },
    };

    let result = job.run();
    let result = if effective.watch {
        if let Err(err) = result {
            eprintln!("[error] {err:#}");
        }
        watch(&job)
    } else {
        result
    };
    let _ = perf::set_trace_path(None);
    result
}
