// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Joint keyframe animation producing per-model poses.

use crate::math::{Mat4, Pose};

/// A named range of frames within an [`Animation`].
#[derive(Debug, Clone, PartialEq)]
pub struct Movement {
    /// The movement name.
    pub name: String,
    /// Index of the first frame.
    pub first: usize,
    /// Number of frames.
    pub count: usize,
    /// Frames per second, or `None` for the animation's default rate.
    pub rate: Option<f64>,
}

impl Movement {
    /// Creates a movement played at the animation's default rate.
    pub fn new(name: impl Into<String>, first: usize, count: usize) -> Self {
        Self {
            name: name.into(),
            first,
            count,
            rate: None,
        }
    }

    /// Sets an explicit playback rate in frames per second.
    pub fn with_rate(mut self, rate: f64) -> Self {
        self.rate = Some(rate);
        self
    }
}

/// Keyframes for a joint hierarchy, shared by every model playing them.
///
/// Frames are stored frame-major: frame `f` of joint `j` is at `f * joints + j`.
/// Each joint names its parent by index (`-1` for roots) and parents must come
/// before their children.
#[derive(Debug, Clone)]
pub struct Animation {
    name: String,
    frames: Vec<Mat4>,
    joints: Vec<i32>,
    movements: Vec<Movement>,
    frame_rate: f64,
}

impl Animation {
    /// Creates an empty animation using `frame_rate` for movements without their own.
    pub fn new(name: impl Into<String>, frame_rate: f64) -> Self {
        Self {
            name: name.into(),
            frames: Vec::new(),
            joints: Vec::new(),
            movements: Vec::new(),
            frame_rate,
        }
    }

    /// The animation name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Replaces the keyframes, joint hierarchy and movements.
    pub fn set_data(&mut self, frames: Vec<Mat4>, joints: Vec<i32>, movements: Vec<Movement>) {
        let needed = movements
            .iter()
            .map(|mv| (mv.first + mv.count) * joints.len())
            .max()
            .unwrap_or(0);
        if frames.len() < needed {
            log::warn!(
                "Animation {} has {} keyframes, movements need {}",
                self.name,
                frames.len(),
                needed
            );
        }
        self.frames = frames;
        self.joints = joints;
        self.movements = movements;
    }

    /// The number of joints per frame.
    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    /// The movement names in index order.
    pub fn movement_names(&self) -> Vec<&str> {
        self.movements.iter().map(|mv| mv.name.as_str()).collect()
    }

    /// The movements in index order.
    pub fn movements(&self) -> &[Movement] {
        &self.movements
    }

    /// Returns `index` if it names a movement, otherwise `0`.
    pub fn play_movement(&self, index: usize) -> usize {
        if index < self.movements.len() {
            index
        } else {
            0
        }
    }

    /// The number of frames in a movement, `0` for unknown movements.
    pub fn max_frames(&self, movement: usize) -> usize {
        self.movements.get(movement).map_or(0, |mv| mv.count)
    }

    /// Advances `frame` by `dt` seconds and writes the interpolated pose of every
    /// joint into `poses`. Returns the new frame position.
    ///
    /// The position is not wrapped; the caller decides when a loop has completed.
    pub fn animate(&self, dt: f64, frame: f64, movement: usize, poses: &mut Vec<Pose>) -> f64 {
        let Some(mv) = self.movements.get(movement) else {
            return 0.0;
        };
        if mv.count == 0 {
            return frame;
        }
        let frame = frame + dt * mv.rate.unwrap_or(self.frame_rate);
        let floor = frame.floor();
        let weight = (frame - floor) as f32;
        let count = mv.count as i64;
        let f1 = (floor as i64).rem_euclid(count) as usize + mv.first;
        let f2 = (floor as i64 + 1).rem_euclid(count) as usize + mv.first;

        let joints = self.joints.len();
        poses.resize(joints, Pose::IDENTITY);
        for (joint, &parent) in self.joints.iter().enumerate() {
            let m1 = self.keyframe(f1, joint);
            let m2 = self.keyframe(f2, joint);
            let mut local = Mat4::lerp(&m1, &m2, weight);
            if parent >= 0 && (parent as usize) < joint {
                local = poses[parent as usize].to_mat4() * local;
            }
            poses[joint] = Pose::from_mat4(&local);
        }
        frame
    }

    fn keyframe(&self, frame: usize, joint: usize) -> Mat4 {
        self.frames
            .get(frame * self.joints.len() + joint)
            .copied()
            .unwrap_or(Mat4::IDENTITY)
    }
}
