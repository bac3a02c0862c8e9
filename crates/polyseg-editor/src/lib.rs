pub mod controller;
pub mod history;
pub mod input;
pub mod mode;
pub mod session;
pub mod shortcuts;
pub mod tools;

pub use controller::{Editor, EditorView, InteractionState, Notice, NoticeLevel, Response};
pub use history::History;
pub use input::{InputEvent, Modifiers, MoveCoalescer, PointerButton};
pub use mode::{EditMode, ModeMachine, Transition};
pub use session::{SaveRequest, SaveSink, SaveTicket};
pub use shortcuts::{ShortcutAction, ShortcutMap};
