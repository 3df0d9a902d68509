use crate::draw::{Canvas, Content, Theme};
use crate::geom::Point;

/// A resolved touch: the wedge index on a dial, the item index on a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hit {
    pub slot: usize,
}

/// Something that lays out regions which can be hit-tested and drawn.
pub trait Surface {
    /// `None` means the touch is not ours and should fall through.
    fn hit_test(&self, point: Point) -> Option<Hit>;

    /// `content` maps a slot to what it shows; `rotation_deg` is the twist
    /// animation's current angle (0 when idle).
    fn paint(
        &self,
        canvas: &mut dyn Canvas,
        content: &dyn Fn(usize) -> Content,
        theme: &Theme,
        rotation_deg: f64,
    );
}
