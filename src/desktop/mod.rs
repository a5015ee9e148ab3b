//! Desktop automation: OS-level keyboard input, the text-editor note flow,
//! and full-screen capture for failure diagnostics.

pub mod editor;
pub mod input;
pub mod screenshot;

pub use editor::{default_note_path, NoteTyper, DEFAULT_NOTE_TEXT};
pub use input::{InputSimulator, KeyCode, Modifier};
pub use screenshot::ScreenCapture;
