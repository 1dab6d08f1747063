//! Replays a JSON event script against a loro-backed canvas and prints the
//! resulting scene as SVG.
//!
//! ```text
//! coverboard-replay <events.json> [--config <config.json>] [--snapshot <out.loro>] [--fit <W>x<H>]
//! ```
//!
//! `--fit` frames every positioned layer in a viewport of the given size.

use coverboard_core::{
    Canvas, CanvasConfig, CanvasEvent, ConfigError, Document, LoroDocument, render_scene, selection_bounds,
};
use kurbo::Size;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;

#[derive(Debug, Error)]
enum ReplayError {
    #[error("{0}")]
    Usage(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Invalid event script: {0}")]
    Script(#[from] serde_json::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

type ReplayResult<T> = Result<T, ReplayError>;

const USAGE: &str =
    "usage: coverboard-replay <events.json> [--config <config.json>] [--snapshot <out.loro>] [--fit <W>x<H>]";

/// Screen-space margin around fitted content.
const FIT_PADDING: f64 = 32.0;

#[derive(Debug, PartialEq)]
struct Args {
    events: PathBuf,
    config: Option<PathBuf>,
    snapshot: Option<PathBuf>,
    fit: Option<Size>,
}

impl Args {
    fn parse(args: impl IntoIterator<Item = String>) -> ReplayResult<Self> {
        let mut events = None;
        let mut config = None;
        let mut snapshot = None;
        let mut fit = None;

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => config = Some(Self::value(&mut args, "--config")?),
                "--snapshot" => snapshot = Some(Self::value(&mut args, "--snapshot")?),
                "--fit" => {
                    let value = Self::value(&mut args, "--fit")?;
                    fit = Some(Self::viewport(&value.to_string_lossy())?);
                }
                "-h" | "--help" => return Err(ReplayError::Usage(USAGE.to_string())),
                _ if events.is_none() => events = Some(PathBuf::from(arg)),
                _ => return Err(ReplayError::Usage(format!("unexpected argument {arg}\n{USAGE}"))),
            }
        }

        Ok(Self {
            events: events.ok_or_else(|| ReplayError::Usage(USAGE.to_string()))?,
            config,
            snapshot,
            fit,
        })
    }

    fn viewport(value: &str) -> ReplayResult<Size> {
        let invalid = || ReplayError::Usage(format!("--fit expects <W>x<H>, got {value}\n{USAGE}"));
        let (width, height) = value.split_once('x').ok_or_else(invalid)?;
        let width: f64 = width.trim().parse().map_err(|_| invalid())?;
        let height: f64 = height.trim().parse().map_err(|_| invalid())?;
        if width <= 0.0 || height <= 0.0 {
            return Err(invalid());
        }
        Ok(Size::new(width, height))
    }

    fn value(args: &mut impl Iterator<Item = String>, flag: &str) -> ReplayResult<PathBuf> {
        args.next()
            .map(PathBuf::from)
            .ok_or_else(|| ReplayError::Usage(format!("{flag} needs a path\n{USAGE}")))
    }
}

fn run(args: Args) -> ReplayResult<String> {
    let config = match &args.config {
        Some(path) => CanvasConfig::load(path)?,
        None => CanvasConfig::default(),
    };

    let script = fs::read_to_string(&args.events)
        .map_err(|e| ReplayError::Io(format!("Failed to read {}: {}", args.events.display(), e)))?;
    let events: Vec<CanvasEvent> = serde_json::from_str(&script)?;
    log::info!("Replaying {} event(s) from {}", events.len(), args.events.display());

    let document = LoroDocument::with_history(config.max_undo_steps, config.history_merge_interval_ms);
    let mut canvas = Canvas::with_config(document, config);
    for event in events {
        canvas.handle(event);
    }
    for request in canvas.take_font_requests() {
        log::info!("Font stylesheet for {}: {}", request.family, request.href);
    }

    if let Some(viewport) = args.fit {
        let ids = canvas.document().layer_ids();
        match selection_bounds(canvas.document(), &ids) {
            Some(bounds) => canvas.camera.fit_to_bounds(bounds.to_rect(), viewport, FIT_PADDING),
            None => log::warn!("Nothing to fit, board is empty"),
        }
    }

    let svg = render_scene(canvas.document(), &canvas.camera, canvas.presence());

    if let Some(path) = &args.snapshot {
        let bytes = canvas.document().export_snapshot();
        fs::write(path, &bytes)
            .map_err(|e| ReplayError::Io(format!("Failed to write {}: {}", path.display(), e)))?;
        log::info!("Wrote {} byte snapshot to {}", bytes.len(), path.display());
    }

    Ok(svg)
}

fn main() -> ExitCode {
    env_logger::init();

    let result = Args::parse(std::env::args().skip(1)).and_then(run);
    match result {
        Ok(svg) => {
            println!("{svg}");
            ExitCode::SUCCESS
        }
        Err(ReplayError::Usage(message)) => {
            eprintln!("{message}");
            ExitCode::from(2)
        }
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coverboard_core::Document;

    fn args(list: &[&str]) -> ReplayResult<Args> {
        Args::parse(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_parse_args() {
        let parsed = args(&["events.json", "--config", "board.json", "--snapshot", "out.loro"]).expect("parse");
        assert_eq!(
            parsed,
            Args {
                events: PathBuf::from("events.json"),
                config: Some(PathBuf::from("board.json")),
                snapshot: Some(PathBuf::from("out.loro")),
                fit: None,
            }
        );

        let parsed = args(&["events.json", "--fit", "800x600"]).expect("parse");
        assert_eq!(parsed.fit, Some(Size::new(800.0, 600.0)));
    }

    #[test]
    fn test_parse_args_errors() {
        assert!(matches!(args(&[]), Err(ReplayError::Usage(_))));
        assert!(matches!(args(&["a.json", "--config"]), Err(ReplayError::Usage(_))));
        assert!(matches!(args(&["a.json", "b.json"]), Err(ReplayError::Usage(_))));
        assert!(matches!(args(&["a.json", "--fit", "wide"]), Err(ReplayError::Usage(_))));
        assert!(matches!(args(&["a.json", "--fit", "0x600"]), Err(ReplayError::Usage(_))));
    }

    #[test]
    fn test_replay_script() {
        let dir = std::env::temp_dir().join(format!("coverboard-replay-{}", std::process::id()));
        fs::create_dir_all(&dir).expect("temp dir");
        let events = dir.join("events.json");
        let snapshot = dir.join("board.loro");
        fs::write(
            &events,
            r#"[
                {"type": "select_tool", "tool": {"insert": "note"}},
                {"type": "pointer_up", "position": {"x": 10, "y": 20}}
            ]"#,
        )
        .expect("write script");

        let svg = run(Args {
            events: events.clone(),
            config: None,
            snapshot: Some(snapshot.clone()),
            fit: None,
        })
        .expect("replay");
        assert!(svg.contains(r#"<rect x="10" y="20" width="140" height="140""#));

        let restored = LoroDocument::from_snapshot(&fs::read(&snapshot).expect("snapshot")).expect("import");
        assert_eq!(restored.layer_count(), 1);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_script_is_io_error() {
        let result = run(Args {
            events: PathBuf::from("/definitely/not/here/events.json"),
            config: None,
            snapshot: None,
            fit: None,
        });
        assert!(matches!(result, Err(ReplayError::Io(_))));
    }

    #[test]
    fn test_replay_fits_content() {
        let dir = std::env::temp_dir().join(format!("coverboard-fit-{}", std::process::id()));
        fs::create_dir_all(&dir).expect("temp dir");
        let events = dir.join("events.json");
        fs::write(
            &events,
            r#"[
                {"type": "select_tool", "tool": {"insert": "rectangle"}},
                {"type": "pointer_up", "position": {"x": 0, "y": 0}}
            ]"#,
        )
        .expect("write script");

        // A 100x100 rectangle framed in 264x264 with 32px padding scales by 2.
        let svg = run(Args {
            events,
            config: None,
            snapshot: None,
            fit: Some(Size::new(264.0, 264.0)),
        })
        .expect("replay");
        assert!(svg.contains(r#"<g transform="matrix(2 0 0 2 32 32)">"#));

        let _ = fs::remove_dir_all(&dir);
    }
}
