use crate::catalog::{AppId, CategoryId, LinkUrl};
use async_channel::Sender;
use strum::Display as StrumDisplay;
use wedge::geom::{Point, Size};
use wedge::ink::{ClearTicket, PointerId};
use wedge::recognizer::Recognition;

#[derive(Debug, Clone, Copy, PartialEq, Eq, StrumDisplay)]
#[strum(serialize_all = "lowercase")]
pub enum PointerPhase {
    Down,
    Move,
    Up,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub phase: PointerPhase,
    pub id: PointerId,
    pub point: Point,
    pub t_ms: i64,
}

/// Target of an `assign` command.
#[derive(Debug, Clone, PartialEq)]
pub enum Assignee {
    App(AppId),
    Link(LinkUrl),
}

#[derive(Debug, Clone)]
pub enum AppEvent {
    Pointer(PointerEvent),
    Resize(Size),
    /// Animation frame; the time comes with `Launcher::handle`.
    Tick,
    ToggleMode,
    Back,
    Bind { slot: usize, app: AppId },
    ShowCategory(CategoryId),
    Share(LinkUrl),
    Unshare(LinkUrl),
    Assign { target: Assignee, category: CategoryId },
    Rename { category: CategoryId, name: String },
    Recognized(Recognition),
    ClearInk(ClearTicket),
    Battery(u32),
    /// Asks for the current frame as a JSON display list.
    Frame(Sender<String>),
    ConfigReload,
}
