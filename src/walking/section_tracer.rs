use crate::misc::FloatingPoint;

use super::BlendPoint;

/// Receiver of the cross-sections visited by a walk
pub trait SectionTracer<T: FloatingPoint> {
    /// Called for the first section and for every accepted one
    fn section(&mut self, parameter: T, point: &BlendPoint<T>);
}

/// A recorded cross-section
#[derive(Debug, Clone, PartialEq)]
pub struct TracedSection<T: FloatingPoint> {
    pub index: usize,
    pub parameter: T,
    pub point_on_surface: nalgebra::Point3<T>,
    pub point_on_curve: nalgebra::Point3<T>,
}

/// Tracer keeping every visited section with its own running index
#[derive(Debug, Clone, Default)]
pub struct SectionRecorder<T: FloatingPoint> {
    counter: usize,
    sections: Vec<TracedSection<T>>,
}

impl<T: FloatingPoint> SectionRecorder<T> {
    pub fn new() -> Self {
        Self {
            counter: 0,
            sections: vec![],
        }
    }

    /// Number of sections recorded so far
    pub fn counter(&self) -> usize {
        self.counter
    }

    pub fn sections(&self) -> &[TracedSection<T>] {
        &self.sections
    }

    pub fn clear(&mut self) {
        self.counter = 0;
        self.sections.clear();
    }
}

impl<T: FloatingPoint> SectionTracer<T> for SectionRecorder<T> {
    fn section(&mut self, parameter: T, point: &BlendPoint<T>) {
        self.counter += 1;
        #[cfg(feature = "log")]
        log::trace!(
            "section #{} at {:?}: {:?} / {:?}",
            self.counter,
            parameter,
            point.point_on_surface(),
            point.point_on_curve()
        );
        self.sections.push(TracedSection {
            index: self.counter,
            parameter,
            point_on_surface: *point.point_on_surface(),
            point_on_curve: *point.point_on_curve(),
        });
    }
}
