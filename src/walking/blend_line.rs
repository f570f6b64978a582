use std::collections::VecDeque;

use itertools::Itertools;

use crate::misc::{FloatingPoint, Transition};

use super::{BlendPoint, Extremity};

/// The pair of extremities closing one end of a line:
/// one seen on the surface, the other on the curve.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineEnd<T: FloatingPoint> {
    pub on_surface: Extremity<T>,
    pub on_curve: Extremity<T>,
}

/// Sampled intersection line between the blend cross-sections and the surface.
/// Points are kept in increasing guide parameter order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlendLine<T: FloatingPoint> {
    points: VecDeque<BlendPoint<T>>,
    start: Option<LineEnd<T>>,
    end: Option<LineEnd<T>>,
    transition: Transition,
}

impl<T: FloatingPoint> Default for BlendLine<T> {
    fn default() -> Self {
        Self {
            points: VecDeque::new(),
            start: None,
            end: None,
            transition: Transition::Undecided,
        }
    }
}

impl<T: FloatingPoint> BlendLine<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, point: BlendPoint<T>) {
        self.points.push_back(point);
    }

    pub fn prepend(&mut self, point: BlendPoint<T>) {
        self.points.push_front(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &VecDeque<BlendPoint<T>> {
        &self.points
    }

    pub fn point(&self, index: usize) -> Option<&BlendPoint<T>> {
        self.points.get(index)
    }

    pub fn first(&self) -> Option<&BlendPoint<T>> {
        self.points.front()
    }

    pub fn last(&self) -> Option<&BlendPoint<T>> {
        self.points.back()
    }

    pub fn start(&self) -> Option<&LineEnd<T>> {
        self.start.as_ref()
    }

    pub fn end(&self) -> Option<&LineEnd<T>> {
        self.end.as_ref()
    }

    pub fn set_start_points(&mut self, on_surface: Extremity<T>, on_curve: Extremity<T>) {
        self.start = Some(LineEnd {
            on_surface,
            on_curve,
        });
    }

    pub fn set_end_points(&mut self, on_surface: Extremity<T>, on_curve: Extremity<T>) {
        self.end = Some(LineEnd {
            on_surface,
            on_curve,
        });
    }

    /// Transition of the line relative to the visible side of the surface
    pub fn transition(&self) -> Transition {
        self.transition
    }

    pub fn set_transition(&mut self, transition: Transition) {
        self.transition = transition;
    }

    /// Guide parameters of the samples
    pub fn parameters(&self) -> Vec<T> {
        self.points.iter().map(|p| p.parameter()).collect()
    }

    /// 3D distances between consecutive samples on the surface
    pub fn chord_lengths(&self) -> Vec<T> {
        self.points
            .iter()
            .tuple_windows()
            .map(|(a, b)| (b.point_on_surface() - a.point_on_surface()).norm())
            .collect()
    }
}
