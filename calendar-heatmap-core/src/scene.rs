//! Retained SVG scene graph.
//!
//! The heatmap owns a single scene: three layers (items, labels, buttons) of
//! elements, each carrying geometry, fill, opacity and the data it is bound
//! to. Elements are addressed by [`ElementId`]; ids increase in insertion
//! order, which is also paint order.

use std::collections::BTreeMap;

use crate::levels::Binding;

/// Handle to an element of the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(usize);

/// Top-level group an element lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Layer {
    Items,
    Labels,
    Buttons,
}

impl Layer {
    pub const ALL: [Layer; 3] = [Layer::Items, Layer::Labels, Layer::Buttons];
}

/// Geometry of an element. Child coordinates are relative to their group.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        /// Corner radius (rx = ry)
        radius: f64,
    },
    /// `<g>` translated by (x, y)
    Group { x: f64, y: f64 },
    Text {
        x: f64,
        y: f64,
        text: String,
        font_size: f64,
    },
    Circle { cx: f64, cy: f64, r: f64 },
}

impl Shape {
    pub fn x(&self) -> f64 {
        match self {
            Shape::Rect { x, .. } | Shape::Group { x, .. } | Shape::Text { x, .. } => *x,
            Shape::Circle { cx, .. } => *cx,
        }
    }

    pub fn set_x(&mut self, value: f64) {
        match self {
            Shape::Rect { x, .. } | Shape::Group { x, .. } | Shape::Text { x, .. } => *x = value,
            Shape::Circle { cx, .. } => *cx = value,
        }
    }
}

/// Approximate rendered width of a label; there is no font engine here.
pub fn text_width(text: &str, font_size: f64) -> f64 {
    text.chars().count() as f64 * font_size * 0.6
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Space-separated class list, e.g. `item item-block-year`
    pub class: String,
    pub layer: Layer,
    pub parent: Option<ElementId>,
    pub shape: Shape,
    pub fill: Option<String>,
    pub opacity: f64,
    pub binding: Binding,
}

impl Element {
    pub fn new(class: &str, layer: Layer, shape: Shape, binding: Binding) -> Self {
        Self {
            class: class.to_string(),
            layer,
            parent: None,
            shape,
            fill: None,
            opacity: 1.0,
            binding,
        }
    }

    pub fn with_fill(mut self, fill: impl Into<String>) -> Self {
        self.fill = Some(fill.into());
        self
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_parent(mut self, parent: ElementId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.class.split_whitespace().any(|c| c == class)
    }
}

/// The element tree of one mounted heatmap.
#[derive(Debug, Default)]
pub struct Scene {
    elements: BTreeMap<ElementId, Element>,
    next_id: usize,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, element: Element) -> ElementId {
        let id = ElementId(self.next_id);
        self.next_id += 1;
        self.elements.insert(id, element);
        id
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id)
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.get_mut(&id)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.contains_key(&id)
    }

    /// Remove an element and its descendants. Returns every removed id.
    pub fn remove(&mut self, id: ElementId) -> Vec<ElementId> {
        let mut removed = Vec::new();
        if self.elements.remove(&id).is_none() {
            return removed;
        }
        removed.push(id);
        for child in self.children(id) {
            removed.extend(self.remove(child));
        }
        removed
    }

    /// Remove every element carrying `class`, with descendants.
    pub fn remove_class(&mut self, class: &str) -> Vec<ElementId> {
        let ids = self.with_class(class);
        ids.into_iter().flat_map(|id| self.remove(id)).collect()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// All elements in paint order.
    pub fn iter(&self) -> impl Iterator<Item = (ElementId, &Element)> {
        self.elements.iter().map(|(id, el)| (*id, el))
    }

    pub fn with_class(&self, class: &str) -> Vec<ElementId> {
        self.iter()
            .filter(|(_, el)| el.has_class(class))
            .map(|(id, _)| id)
            .collect()
    }

    pub fn children(&self, parent: ElementId) -> Vec<ElementId> {
        self.iter()
            .filter(|(_, el)| el.parent == Some(parent))
            .map(|(id, _)| id)
            .collect()
    }

    /// Top-level elements of a layer in paint order.
    pub fn roots(&self, layer: Layer) -> Vec<ElementId> {
        self.iter()
            .filter(|(_, el)| el.layer == layer && el.parent.is_none())
            .map(|(id, _)| id)
            .collect()
    }

    /// Translation accumulated from an element's ancestor groups.
    fn offset(&self, id: ElementId) -> (f64, f64) {
        let mut dx = 0.0;
        let mut dy = 0.0;
        let mut current = self.get(id).and_then(|el| el.parent);
        while let Some(parent_id) = current {
            let Some(parent) = self.get(parent_id) else {
                break;
            };
            if let Shape::Group { x, y } = parent.shape {
                dx += x;
                dy += y;
            }
            current = parent.parent;
        }
        (dx, dy)
    }

    fn hit(&self, id: ElementId, el: &Element, px: f64, py: f64) -> bool {
        let (dx, dy) = self.offset(id);
        let (px, py) = (px - dx, py - dy);
        match &el.shape {
            Shape::Rect {
                x,
                y,
                width,
                height,
                ..
            } => px >= *x && px <= x + width && py >= *y && py <= y + height,
            Shape::Text {
                x,
                y,
                text,
                font_size,
            } => {
                px >= *x && px <= x + text_width(text, *font_size) && py >= y - font_size && py <= *y
            }
            Shape::Circle { cx, cy, r } => (px - cx).powi(2) + (py - cy).powi(2) <= r * r,
            Shape::Group { .. } => false,
        }
    }

    /// Topmost element under a point, resolving to the element that owns the
    /// event binding (a group's children report the group when unbound).
    pub fn element_at(&self, x: f64, y: f64) -> Option<ElementId> {
        for layer in Layer::ALL.iter().rev() {
            let hit = self
                .elements
                .iter()
                .rev()
                .filter(|(_, el)| el.layer == *layer)
                .find(|(id, el)| self.hit(**id, el, x, y));
            if let Some((id, el)) = hit {
                if el.binding == Binding::None {
                    if let Some(parent) = el.parent {
                        return Some(parent);
                    }
                }
                return Some(*id);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x: f64, y: f64, w: f64, h: f64) -> Shape {
        Shape::Rect {
            x,
            y,
            width: w,
            height: h,
            radius: 0.0,
        }
    }

    #[test]
    fn test_insert_and_query_by_class() {
        let mut scene = Scene::new();
        let a = scene.insert(Element::new(
            "item item-circle",
            Layer::Items,
            rect(0.0, 0.0, 10.0, 10.0),
            Binding::DayCell(0),
        ));
        let b = scene.insert(Element::new(
            "label label-month",
            Layer::Labels,
            Shape::Text {
                x: 0.0,
                y: 20.0,
                text: "Jan".into(),
                font_size: 13.0,
            },
            Binding::MonthLabel(1),
        ));
        assert!(a < b);
        assert_eq!(scene.with_class("item"), vec![a]);
        assert_eq!(scene.with_class("label-month"), vec![b]);
        assert!(scene.with_class("label-day").is_empty());
        assert_eq!(scene.roots(Layer::Labels), vec![b]);
    }

    #[test]
    fn test_remove_group_removes_children() {
        let mut scene = Scene::new();
        let group = scene.insert(Element::new(
            "item item-block-month",
            Layer::Items,
            Shape::Group { x: 100.0, y: 50.0 },
            Binding::DayBlock(0),
        ));
        let child = scene.insert(
            Element::new(
                "item item-block-rect",
                Layer::Items,
                rect(0.0, 0.0, 20.0, 10.0),
                Binding::None,
            )
            .with_parent(group),
        );
        let removed = scene.remove_class("item-block-month");
        assert_eq!(removed.len(), 2);
        assert!(!scene.contains(child));
        assert!(scene.is_empty());
    }

    #[test]
    fn test_element_at_respects_group_offset() {
        let mut scene = Scene::new();
        let group = scene.insert(Element::new(
            "item item-block-week",
            Layer::Items,
            Shape::Group { x: 100.0, y: 50.0 },
            Binding::DayBlock(3),
        ));
        let child = scene.insert(
            Element::new(
                "item item-block-rect",
                Layer::Items,
                rect(0.0, 0.0, 20.0, 10.0),
                Binding::CategorySegment {
                    day: 3,
                    category: 0,
                },
            )
            .with_parent(group),
        );
        assert_eq!(scene.element_at(105.0, 55.0), Some(child));
        assert_eq!(scene.element_at(5.0, 5.0), None);
    }

    #[test]
    fn test_buttons_are_hit_before_items() {
        let mut scene = Scene::new();
        scene.insert(Element::new(
            "item",
            Layer::Items,
            rect(0.0, 0.0, 100.0, 100.0),
            Binding::YearBlock(2024),
        ));
        let button = scene.insert(Element::new(
            "button button-back",
            Layer::Buttons,
            Shape::Circle {
                cx: 10.0,
                cy: 10.0,
                r: 5.0,
            },
            Binding::BackButton,
        ));
        assert_eq!(scene.element_at(10.0, 10.0), Some(button));
    }
}
