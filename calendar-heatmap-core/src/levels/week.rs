//! Week overview: the month layout narrowed to a single column.

use chrono::NaiveDate;

use super::{blocks, Canvas, Rendered};
use crate::aggregate::Period;
use crate::types::Overview;

pub const GROUP_CLASS: &str = "item-block-week";

pub fn render(canvas: &mut Canvas<'_>, anchor: NaiveDate) -> Rendered {
    blocks::render(canvas, Overview::Week, Period::week_of(anchor), GROUP_CLASS)
}
