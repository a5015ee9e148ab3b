use std::path::Path;
use std::process::ExitCode;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kiosk_automation::desktop::{default_note_path, NoteTyper, ScreenCapture, DEFAULT_NOTE_TEXT};

fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Load environment
    dotenvy::dotenv().ok();

    let target = default_note_path();
    tracing::info!(path = %target.display(), "writing note through the text editor");

    match write_note(&target) {
        Ok(()) => {
            tracing::info!(path = %target.display(), "note flow finished");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("desktop note flow failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Editor-driven write first; on failure grab a screen capture for
/// diagnostics, then fall back to writing the file directly.
fn write_note(target: &Path) -> kiosk_automation::Result<()> {
    let via_editor =
        NoteTyper::new().and_then(|mut typer| typer.write_via_editor(DEFAULT_NOTE_TEXT, target));

    match via_editor {
        Ok(()) => Ok(()),
        Err(e) => {
            tracing::error!("editor-driven write failed: {}", e);
            capture_failure_screen();
            tracing::info!("falling back to writing the note directly");
            NoteTyper::write_direct(DEFAULT_NOTE_TEXT, target)
        }
    }
}

fn capture_failure_screen() {
    let path = Path::new(".").join(format!(
        "desktop_error_{}.png",
        chrono::Utc::now().timestamp_millis()
    ));
    match ScreenCapture::capture_to_file(&path) {
        Ok(()) => tracing::info!(path = %path.display(), "failure screenshot captured"),
        Err(e) => tracing::warn!("could not capture failure screenshot: {}", e),
    }
}
