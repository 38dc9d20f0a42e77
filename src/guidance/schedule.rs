/*
    Helmsman, segmented steering guidance
    Copyright (C) 2018-onwards Christopher Rabotin <christopher.rabotin@gmail.com>

    This program is free software: you can redistribute it and/or modify
    it under the terms of the GNU Affero General Public License as published
    by the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU Affero General Public License for more details.

    You should have received a copy of the GNU Affero General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/

use crate::errors::{NegativeDurationSnafu, SegmentIndexSnafu, ThrottleRatioSnafu};
use crate::guidance::frames::{validate_angles, SteeringFrame};
use crate::time::{Duration, Epoch};
use crate::GuidanceError;

use serde_derive::{Deserialize, Serialize};
use snafu::ensure;

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// A steering setpoint: the frame, angle triple, throttle level and propulsion
/// switch held constant over a segment, or indefinitely for the schedule default.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Setpoint {
    /// Registry key of the steering frame, resolved at evaluation time
    pub frame_id: String,
    /// Steering angles in degrees, ordered per the frame's angle labels
    pub angles: [f64; 3],
    /// Throttle level in [0; 1], where 1.0 uses all thrust available
    pub throttle: f64,
    /// Whether propulsion is active: engine firing, or sail deployed
    pub propulsion_on: bool,
}

impl Setpoint {
    /// Creates a validated setpoint for the provided frame.
    pub fn new(
        frame: SteeringFrame,
        angles: &[f64],
        throttle: f64,
        propulsion_on: bool,
    ) -> Result<Self, GuidanceError> {
        let angles = validate_angles(angles)?;
        ensure!(
            throttle.is_finite() && (0.0..=1.0).contains(&throttle),
            ThrottleRatioSnafu { ratio: throttle }
        );
        Ok(Self {
            frame_id: frame.id().to_string(),
            angles,
            throttle,
            propulsion_on,
        })
    }

    /// Creates a validated setpoint from a frame registry key, e.g. when
    /// rebuilding a schedule from host save data.
    pub fn from_frame_id(
        frame_id: &str,
        angles: &[f64],
        throttle: f64,
        propulsion_on: bool,
    ) -> Result<Self, GuidanceError> {
        Self::new(
            SteeringFrame::from_id(frame_id)?,
            angles,
            throttle,
            propulsion_on,
        )
    }

    /// Creates a coasting setpoint: the frame's default angles, zero throttle,
    /// propulsion off.
    pub fn coasting(frame: SteeringFrame) -> Self {
        Self {
            frame_id: frame.id().to_string(),
            angles: frame.angle_defaults(),
            throttle: 0.0,
            propulsion_on: false,
        }
    }

    /// Resolves this setpoint's frame in the registry.
    pub fn frame(&self) -> Result<SteeringFrame, GuidanceError> {
        SteeringFrame::from_id(&self.frame_id)
    }

    /// Checks the setpoint invariants: known frame, three finite angles, and a
    /// throttle within [0; 1].
    pub fn validate(&self) -> Result<(), GuidanceError> {
        self.frame()?;
        validate_angles(&self.angles)?;
        ensure!(
            self.throttle.is_finite() && (0.0..=1.0).contains(&self.throttle),
            ThrottleRatioSnafu {
                ratio: self.throttle
            }
        );
        Ok(())
    }
}

impl fmt::Display for Setpoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} steering at [{:.1}, {:.1}, {:.1}] deg @ {:.1}% throttle, propulsion {}",
            self.frame_id,
            self.angles[0],
            self.angles[1],
            self.angles[2],
            100.0 * self.throttle,
            if self.propulsion_on { "on" } else { "off" },
        )
    }
}

/// One scheduled interval of constant steering: a setpoint held for a duration.
///
/// Segments do not store their start epoch: the owning schedule derives it from
/// the epoch and the durations of all preceding segments.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ControlSegment {
    pub setpoint: Setpoint,
    /// Non-negative duration of the segment
    pub duration: Duration,
}

impl ControlSegment {
    /// Creates a validated segment.
    pub fn new(setpoint: Setpoint, duration: Duration) -> Result<Self, GuidanceError> {
        let segment = Self { setpoint, duration };
        segment.validate()?;
        Ok(segment)
    }

    /// Checks the segment invariants: a valid setpoint and a non-negative duration.
    pub fn validate(&self) -> Result<(), GuidanceError> {
        self.setpoint.validate()?;
        ensure!(
            self.duration >= Duration::ZERO,
            NegativeDurationSnafu {
                duration: self.duration
            }
        );
        Ok(())
    }
}

impl fmt::Display for ControlSegment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} for {}", self.setpoint, self.duration)
    }
}

/// The active entry of a schedule at some epoch: the setpoint in effect, its
/// absolute start epoch, and its segment index (`None` for the default).
#[derive(Copy, Clone, Debug)]
pub struct ActiveSegment<'a> {
    pub setpoint: &'a Setpoint,
    /// Absolute start of this setpoint's validity. For the default setpoint,
    /// this is the schedule epoch when queried before it, and the end of the
    /// last segment when queried after it.
    pub start: Epoch,
    pub index: Option<usize>,
}

/// An ordered timeline of control segments, starting at an epoch, with a default
/// setpoint covering every instant no segment does.
///
/// Segment start epochs are derived, never stored: the i-th segment starts at
/// `epoch + sum(duration of segments 0..i)`, so segments never overlap and never
/// leave gaps. The derived start array is rebuilt by every edit before the edit
/// returns, and lookups binary search it.
#[derive(Clone, Debug, PartialEq)]
pub struct ControlSchedule {
    epoch: Epoch,
    segments: Vec<ControlSegment>,
    default_setpoint: Setpoint,
    /// Derived cumulative start epochs, one per segment, non-decreasing
    starts: Vec<Epoch>,
}

impl ControlSchedule {
    /// Creates an empty schedule starting at the provided epoch.
    pub fn new(epoch: Epoch, default_setpoint: Setpoint) -> Result<Self, GuidanceError> {
        default_setpoint.validate()?;
        Ok(Self {
            epoch,
            segments: Vec::new(),
            default_setpoint,
            starts: Vec::new(),
        })
    }

    /// Creates a schedule from segments provided in chronological order.
    pub fn from_segments(
        epoch: Epoch,
        segments: Vec<ControlSegment>,
        default_setpoint: Setpoint,
    ) -> Result<Self, GuidanceError> {
        default_setpoint.validate()?;
        for segment in &segments {
            segment.validate()?;
        }
        let mut me = Self {
            epoch,
            segments,
            default_setpoint,
            starts: Vec::new(),
        };
        me.rebuild_starts();
        Ok(me)
    }

    /// Returns the epoch at which the first segment begins.
    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    /// Returns the scheduled segments, in chronological order.
    pub fn segments(&self) -> &[ControlSegment] {
        &self.segments
    }

    /// Returns the setpoint applied whenever no segment covers the query epoch.
    pub fn default_setpoint(&self) -> &Setpoint {
        &self.default_setpoint
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns the sum of all segment durations.
    pub fn total_duration(&self) -> Duration {
        self.segments
            .iter()
            .fold(Duration::ZERO, |total, segment| total + segment.duration)
    }

    /// Returns the end of the last segment, i.e. the epoch from which the
    /// default setpoint takes over. Equals the schedule epoch when empty.
    pub fn end_epoch(&self) -> Epoch {
        self.epoch + self.total_duration()
    }

    /// Appends a segment at the end of the timeline.
    pub fn append(&mut self, segment: ControlSegment) -> Result<(), GuidanceError> {
        segment.validate()?;
        self.segments.push(segment);
        self.rebuild_starts();
        Ok(())
    }

    /// Inserts a segment before the provided index, shifting the start of every
    /// later segment by the new segment's duration.
    pub fn insert(&mut self, index: usize, segment: ControlSegment) -> Result<(), GuidanceError> {
        ensure!(
            index <= self.segments.len(),
            SegmentIndexSnafu {
                index,
                len: self.segments.len()
            }
        );
        segment.validate()?;
        self.segments.insert(index, segment);
        self.rebuild_starts();
        Ok(())
    }

    /// Removes and returns the segment at the provided index.
    pub fn remove(&mut self, index: usize) -> Result<ControlSegment, GuidanceError> {
        ensure!(
            index < self.segments.len(),
            SegmentIndexSnafu {
                index,
                len: self.segments.len()
            }
        );
        let removed = self.segments.remove(index);
        self.rebuild_starts();
        Ok(removed)
    }

    /// Moves the segment at `from` so that it ends up at index `to`.
    pub fn move_segment(&mut self, from: usize, to: usize) -> Result<(), GuidanceError> {
        ensure!(
            from < self.segments.len(),
            SegmentIndexSnafu {
                index: from,
                len: self.segments.len()
            }
        );
        ensure!(
            to < self.segments.len(),
            SegmentIndexSnafu {
                index: to,
                len: self.segments.len()
            }
        );
        let segment = self.segments.remove(from);
        self.segments.insert(to, segment);
        self.rebuild_starts();
        Ok(())
    }

    /// Changes the duration of the segment at the provided index, shifting the
    /// start of every later segment.
    pub fn set_duration(&mut self, index: usize, duration: Duration) -> Result<(), GuidanceError> {
        ensure!(
            index < self.segments.len(),
            SegmentIndexSnafu {
                index,
                len: self.segments.len()
            }
        );
        ensure!(
            duration >= Duration::ZERO,
            NegativeDurationSnafu { duration }
        );
        self.segments[index].duration = duration;
        self.rebuild_starts();
        Ok(())
    }

    /// Replaces the setpoint of the segment at the provided index.
    pub fn set_setpoint(&mut self, index: usize, setpoint: Setpoint) -> Result<(), GuidanceError> {
        ensure!(
            index < self.segments.len(),
            SegmentIndexSnafu {
                index,
                len: self.segments.len()
            }
        );
        setpoint.validate()?;
        self.segments[index].setpoint = setpoint;
        Ok(())
    }

    /// Replaces the default setpoint.
    pub fn set_default(&mut self, setpoint: Setpoint) -> Result<(), GuidanceError> {
        setpoint.validate()?;
        self.default_setpoint = setpoint;
        Ok(())
    }

    /// Shifts the whole timeline to start at the provided epoch.
    pub fn set_epoch(&mut self, epoch: Epoch) {
        self.epoch = epoch;
        self.rebuild_starts();
    }

    /// Returns the setpoint in effect at the provided epoch, with its absolute
    /// start. This is a total function: every epoch maps to exactly one entry.
    ///
    /// Segments cover half-open intervals `[start, start + duration)`, so a
    /// query exactly at a boundary resolves to the later segment and two
    /// consecutive tick queries straddling a boundary see no gap and no overlap.
    pub fn segment_at(&self, epoch: Epoch) -> ActiveSegment<'_> {
        if epoch < self.epoch {
            return ActiveSegment {
                setpoint: &self.default_setpoint,
                start: self.epoch,
                index: None,
            };
        }
        // Index of the last segment whose start is at or before the query.
        // partition_point rather than a plain binary search: zero-duration
        // segments make the start array non-strictly sorted, and the last of a
        // run of equal starts is the one whose interval is non-empty.
        let count = self.starts.partition_point(|start| *start <= epoch);
        if count > 0 {
            let index = count - 1;
            let segment = &self.segments[index];
            let start = self.starts[index];
            if index + 1 < self.segments.len() || epoch < start + segment.duration {
                return ActiveSegment {
                    setpoint: &segment.setpoint,
                    start,
                    index: Some(index),
                };
            }
        }
        // Past the end of the last segment, or the schedule is empty
        ActiveSegment {
            setpoint: &self.default_setpoint,
            start: self.end_epoch(),
            index: None,
        }
    }

    /// Recomputes the derived start epochs. Every edit calls this before
    /// returning so a lookup never observes a partially updated timeline.
    fn rebuild_starts(&mut self) {
        self.starts.clear();
        self.starts.reserve(self.segments.len());
        let mut cursor = self.epoch;
        for segment in &self.segments {
            self.starts.push(cursor);
            cursor += segment.duration;
        }
    }
}

impl fmt::Display for ControlSchedule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "ControlSchedule with {} segments from {} to {}, then {}",
            self.segments.len(),
            self.epoch,
            self.end_epoch(),
            self.default_setpoint,
        )
    }
}

/// Single-writer, multiple-reader handle over a schedule.
///
/// Edits clone the current schedule, apply the change, and publish the result
/// as a fresh immutable snapshot; a failed edit publishes nothing. The tick
/// loop grabs a snapshot and resolves against it, so a lookup always sees the
/// timeline either entirely before or entirely after an edit, never a mix.
#[derive(Clone, Debug)]
pub struct SharedSchedule {
    inner: Arc<RwLock<Arc<ControlSchedule>>>,
}

impl SharedSchedule {
    pub fn new(schedule: ControlSchedule) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(schedule))),
        }
    }

    /// Returns the current schedule snapshot. Cheap: clones a pointer, not the
    /// timeline.
    pub fn snapshot(&self) -> Arc<ControlSchedule> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Applies an edit to a draft of the current schedule and publishes the
    /// draft if the edit succeeds. On error, the published schedule is
    /// unchanged and the error is returned to the caller.
    pub fn edit<F>(&self, apply: F) -> Result<(), GuidanceError>
    where
        F: FnOnce(&mut ControlSchedule) -> Result<(), GuidanceError>,
    {
        let mut published = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let mut draft = ControlSchedule::clone(&published);
        apply(&mut draft)?;
        *published = Arc::new(draft);
        info!("published {}", *published);
        Ok(())
    }
}
