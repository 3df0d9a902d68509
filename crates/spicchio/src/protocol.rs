//! Line commands accepted on the control socket.
//!
//! ```text
//! down|move|up <pointer> <x> <y> [t_ms]
//! resize <width> <height>
//! toggle | back | frame
//! bind <slot> <app>            slot is 1-12 or ring:position, e.g. inner:se
//! category <id|all|links>
//! share <url> | unshare <url>
//! assign app|link <id|url> <category>
//! rename <category> <name>
//! ```

use crate::catalog::{AppId, CategoryId, LinkUrl};
use crate::events::{AppEvent, Assignee, PointerEvent, PointerPhase};
use std::str::FromStr;
use strum::{Display as StrumDisplay, EnumString};
use thiserror::Error;
use wedge::dial::{Position, Ring, WEDGE_COUNT, wedge_index};
use wedge::geom::{Point, Size};
use wedge::ink::PointerId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, StrumDisplay)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
enum Verb {
    Down,
    Move,
    Up,
    Resize,
    Toggle,
    Back,
    Bind,
    Category,
    Share,
    Unshare,
    Assign,
    Rename,
    Frame,
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Malformed quoting: {0}")]
    Split(#[from] shell_words::ParseError),
    #[error("Empty command")]
    Empty,
    #[error("Unknown command '{0}'")]
    Unknown(String),
    #[error("'{command}' is missing <{name}>")]
    Missing { command: String, name: &'static str },
    #[error("'{command}': invalid {name} '{value}'")]
    Invalid {
        command: String,
        name: &'static str,
        value: String,
    },
    #[error("'{command}' takes at most {max} arguments")]
    TooMany { command: String, max: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Pointer {
        phase: PointerPhase,
        id: PointerId,
        point: Point,
        t_ms: Option<i64>,
    },
    Resize(Size),
    Toggle,
    Back,
    Bind {
        slot: usize,
        app: AppId,
    },
    Category(CategoryId),
    Share(LinkUrl),
    Unshare(LinkUrl),
    Assign {
        target: Assignee,
        category: CategoryId,
    },
    Rename {
        category: CategoryId,
        name: String,
    },
    Frame,
}

impl Command {
    /// Event for the launcher; `frame` has none since it needs a reply channel.
    /// Pointer commands without a timestamp are stamped with `now_ms`.
    pub fn into_event(self, now_ms: i64) -> Option<AppEvent> {
        let event = match self {
            Command::Pointer {
                phase,
                id,
                point,
                t_ms,
            } => AppEvent::Pointer(PointerEvent {
                phase,
                id,
                point,
                t_ms: t_ms.unwrap_or(now_ms),
            }),
            Command::Resize(size) => AppEvent::Resize(size),
            Command::Toggle => AppEvent::ToggleMode,
            Command::Back => AppEvent::Back,
            Command::Bind { slot, app } => AppEvent::Bind { slot, app },
            Command::Category(id) => AppEvent::ShowCategory(id),
            Command::Share(url) => AppEvent::Share(url),
            Command::Unshare(url) => AppEvent::Unshare(url),
            Command::Assign { target, category } => AppEvent::Assign { target, category },
            Command::Rename { category, name } => AppEvent::Rename { category, name },
            Command::Frame => return None,
        };
        Some(event)
    }
}

struct Args {
    verb: Verb,
    words: std::vec::IntoIter<String>,
}

impl Args {
    fn next(&mut self, name: &'static str) -> Result<String, ProtocolError> {
        self.words.next().ok_or(ProtocolError::Missing {
            command: self.verb.to_string(),
            name,
        })
    }

    fn parse<T: FromStr>(&mut self, name: &'static str) -> Result<T, ProtocolError> {
        let value = self.next(name)?;
        self.convert(name, value)
    }

    fn optional<T: FromStr>(&mut self, name: &'static str) -> Result<Option<T>, ProtocolError> {
        self.words
            .next()
            .map(|value| self.convert(name, value))
            .transpose()
    }

    fn coordinate(&mut self, name: &'static str) -> Result<f64, ProtocolError> {
        let value: f64 = self.parse(name)?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(self.invalid(name, value.to_string()))
        }
    }

    fn convert<T: FromStr>(&self, name: &'static str, value: String) -> Result<T, ProtocolError> {
        value.parse().map_err(|_| self.invalid(name, value))
    }

    fn invalid(&self, name: &'static str, value: String) -> ProtocolError {
        ProtocolError::Invalid {
            command: self.verb.to_string(),
            name,
            value,
        }
    }

    fn finish<T>(mut self, max: usize, command: T) -> Result<T, ProtocolError> {
        if self.words.next().is_some() {
            return Err(ProtocolError::TooMany {
                command: self.verb.to_string(),
                max,
            });
        }
        Ok(command)
    }
}

/// Home slot from `1`-`12` or `ring:position`, as a 0-based wedge index.
fn parse_slot(value: &str) -> Option<usize> {
    match value.split_once(':') {
        Some((ring, position)) => Some(wedge_index(
            ring.parse::<Ring>().ok()?,
            position.parse::<Position>().ok()?,
        )),
        None => value
            .parse::<usize>()
            .ok()
            .filter(|n| (1..=WEDGE_COUNT).contains(n))
            .map(|n| n - 1),
    }
}

pub fn parse(line: &str) -> Result<Command, ProtocolError> {
    let mut words = shell_words::split(line)?.into_iter();
    let head = words.next().ok_or(ProtocolError::Empty)?;
    let verb = Verb::from_str(&head).map_err(|_| ProtocolError::Unknown(head.clone()))?;
    let mut args = Args { verb, words };

    match verb {
        Verb::Down | Verb::Move | Verb::Up => {
            let phase = match verb {
                Verb::Down => PointerPhase::Down,
                Verb::Move => PointerPhase::Move,
                _ => PointerPhase::Up,
            };
            let id = args.parse("pointer")?;
            let x = args.coordinate("x")?;
            let y = args.coordinate("y")?;
            let t_ms = args.optional("t_ms")?;
            args.finish(
                4,
                Command::Pointer {
                    phase,
                    id,
                    point: Point::new(x, y),
                    t_ms,
                },
            )
        }
        Verb::Resize => {
            let width = args.coordinate("width")?;
            let height = args.coordinate("height")?;
            let size = Size::new(width, height);
            if !size.is_usable_viewport() {
                return Err(args.invalid("size", format!("{}x{}", width, height)));
            }
            args.finish(2, Command::Resize(size))
        }
        Verb::Toggle => args.finish(0, Command::Toggle),
        Verb::Back => args.finish(0, Command::Back),
        Verb::Frame => args.finish(0, Command::Frame),
        Verb::Bind => {
            let raw = args.next("slot")?;
            let slot = parse_slot(&raw).ok_or_else(|| args.invalid("slot", raw))?;
            let app = AppId::new(args.next("app")?);
            args.finish(2, Command::Bind { slot, app })
        }
        Verb::Category => {
            let id = args.parse("category")?;
            args.finish(1, Command::Category(id))
        }
        Verb::Share => {
            let url = LinkUrl::new(args.next("url")?);
            args.finish(1, Command::Share(url))
        }
        Verb::Unshare => {
            let url = LinkUrl::new(args.next("url")?);
            args.finish(1, Command::Unshare(url))
        }
        Verb::Assign => {
            let kind = args.next("kind")?;
            let key = args.next("target")?;
            let target = match kind.to_ascii_lowercase().as_str() {
                "app" => Assignee::App(AppId::new(key)),
                "link" => Assignee::Link(LinkUrl::new(key)),
                _ => return Err(args.invalid("kind", kind)),
            };
            let category = args.parse("category")?;
            args.finish(3, Command::Assign { target, category })
        }
        Verb::Rename => {
            let category = args.parse("category")?;
            let name = args.next("name")?;
            args.finish(2, Command::Rename { category, name })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointer_commands() {
        assert_eq!(
            parse("down 2 10.5 20").unwrap(),
            Command::Pointer {
                phase: PointerPhase::Down,
                id: 2,
                point: Point::new(10.5, 20.0),
                t_ms: None,
            }
        );
        let Command::Pointer { phase, t_ms, .. } = parse("UP 0 1 1 1234").unwrap() else {
            panic!("expected a pointer command");
        };
        assert_eq!(phase, PointerPhase::Up);
        assert_eq!(t_ms, Some(1234));
    }

    #[test]
    fn test_missing_timestamp_is_stamped() {
        let event = parse("move 1 5 5").unwrap().into_event(77).unwrap();
        let AppEvent::Pointer(p) = event else {
            panic!("expected a pointer event");
        };
        assert_eq!(p.t_ms, 77);
        assert_eq!(p.phase, PointerPhase::Move);
    }

    #[test]
    fn test_slots() {
        assert_eq!(parse_slot("1"), Some(0));
        assert_eq!(parse_slot("12"), Some(11));
        assert_eq!(parse_slot("0"), None);
        assert_eq!(parse_slot("13"), None);
        assert_eq!(parse_slot("inner:se"), Some(8));
        assert_eq!(parse_slot("o:1"), Some(1));
        assert_eq!(parse_slot("middle:se"), None);

        assert_eq!(
            parse("bind 3 'org.gnome.Calculator'").unwrap(),
            Command::Bind {
                slot: 2,
                app: AppId::from("org.gnome.Calculator"),
            }
        );
    }

    #[test]
    fn test_quoted_arguments() {
        assert_eq!(
            parse(r#"rename 4 "Social stuff""#).unwrap(),
            Command::Rename {
                category: CategoryId::new(4),
                name: "Social stuff".to_string(),
            }
        );
        assert_eq!(
            parse("unshare 'https://a.example/?q=a b'").unwrap(),
            Command::Unshare(LinkUrl::from("https://a.example/?q=a b"))
        );
        assert_eq!(
            parse("assign link https://a.example links").unwrap(),
            Command::Assign {
                target: Assignee::Link(LinkUrl::from("https://a.example")),
                category: CategoryId::LINKS,
            }
        );
    }

    #[test]
    fn test_errors() {
        assert!(matches!(parse("   "), Err(ProtocolError::Empty)));
        assert!(matches!(parse("fly 1 2"), Err(ProtocolError::Unknown(v)) if v == "fly"));
        assert!(matches!(
            parse("down 1 2"),
            Err(ProtocolError::Missing { name: "y", .. })
        ));
        assert!(matches!(
            parse("down 1 x 2"),
            Err(ProtocolError::Invalid { name: "x", .. })
        ));
        assert!(matches!(
            parse("down 1 NaN 2"),
            Err(ProtocolError::Invalid { name: "x", .. })
        ));
        assert!(matches!(
            parse("toggle now"),
            Err(ProtocolError::TooMany { max: 0, .. })
        ));
        assert!(matches!(
            parse("share 'unterminated"),
            Err(ProtocolError::Split(_))
        ));
        assert!(matches!(
            parse("resize -1 10"),
            Err(ProtocolError::Invalid { name: "size", .. })
        ));
        assert!(matches!(
            parse("resize 1e15 1"),
            Err(ProtocolError::Invalid { name: "size", .. })
        ));
        assert!(matches!(
            parse("resize inf 1"),
            Err(ProtocolError::Invalid { name: "width", .. })
        ));
        assert!(matches!(
            parse("assign thing x 1"),
            Err(ProtocolError::Invalid { name: "kind", .. })
        ));
    }

    #[test]
    fn test_frame_has_no_event() {
        assert!(parse("frame").unwrap().into_event(0).is_none());
        assert!(matches!(
            parse("toggle").unwrap().into_event(0),
            Some(AppEvent::ToggleMode)
        ));
    }
}
