//! Month overview.

use chrono::NaiveDate;

use super::{blocks, Canvas, Rendered};
use crate::aggregate::Period;
use crate::types::Overview;

pub const GROUP_CLASS: &str = "item-block-month";

pub fn render(canvas: &mut Canvas<'_>, anchor: NaiveDate) -> Rendered {
    blocks::render(canvas, Overview::Month, Period::month_of(anchor), GROUP_CLASS)
}
