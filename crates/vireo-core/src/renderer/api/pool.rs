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

//! A caller-owned table of render targets addressed by generational handles.

use super::target::RenderTarget;
use crate::math::Rgba8;
use crate::renderer::error::RasterError;
use std::fmt;

macro_rules! target_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name {
            index: u32,
            generation: u32,
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}#{}v{}", stringify!($name), self.index, self.generation)
            }
        }

        impl $name {
            fn from_key(key: SlotKey) -> Self {
                Self {
                    index: key.index,
                    generation: key.generation,
                }
            }

            fn key(self) -> SlotKey {
                SlotKey {
                    index: self.index,
                    generation: self.generation,
                }
            }
        }
    };
}

target_id!(
    /// Handle to a color target in a [`RenderTargetPool`].
    ColorTargetId
);
target_id!(
    /// Handle to a depth target in a [`RenderTargetPool`].
    DepthTargetId
);

#[derive(Debug, Clone, Copy)]
struct SlotKey {
    index: u32,
    generation: u32,
}

#[derive(Debug)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

#[derive(Debug)]
struct Slots<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
}

impl<T> Default for Slots<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }
}

impl<T> Slots<T> {
    fn insert(&mut self, value: T) -> SlotKey {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value = Some(value);
            return SlotKey {
                index,
                generation: slot.generation,
            };
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            value: Some(value),
        });
        SlotKey {
            index,
            generation: 0,
        }
    }

    fn remove(&mut self, key: SlotKey) -> Option<T> {
        let slot = self.slots.get_mut(key.index as usize)?;
        if slot.generation != key.generation {
            return None;
        }
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(key.index);
        Some(value)
    }

    fn get(&self, key: SlotKey) -> Option<&T> {
        self.slots
            .get(key.index as usize)
            .filter(|slot| slot.generation == key.generation)
            .and_then(|slot| slot.value.as_ref())
    }

    fn get_mut(&mut self, key: SlotKey) -> Option<&mut T> {
        self.slots
            .get_mut(key.index as usize)
            .filter(|slot| slot.generation == key.generation)
            .and_then(|slot| slot.value.as_mut())
    }

    fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }
}

/// Owns the color (`Rgba8`) and depth (`f32`) targets a pipeline draws into.
#[derive(Debug, Default)]
pub struct RenderTargetPool {
    color: Slots<RenderTarget<Rgba8>>,
    depth: Slots<RenderTarget<f32>>,
}

impl RenderTargetPool {
    /// Creates an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a color target cleared to transparent black.
    pub fn create_color(&mut self, width: u32, height: u32) -> ColorTargetId {
        let id = ColorTargetId::from_key(self.color.insert(RenderTarget::new(width, height)));
        log::debug!("Created {width}x{height} color target {id}.");
        id
    }

    /// Allocates a depth target cleared to `1.0`.
    pub fn create_depth(&mut self, width: u32, height: u32) -> DepthTargetId {
        let mut target = RenderTarget::new(width, height);
        target.clear(1.0);
        let id = DepthTargetId::from_key(self.depth.insert(target));
        log::debug!("Created {width}x{height} depth target {id}.");
        id
    }

    /// Removes a color target, returning it. Its handle becomes stale.
    pub fn destroy_color(&mut self, id: ColorTargetId) -> Option<RenderTarget<Rgba8>> {
        let target = self.color.remove(id.key());
        if target.is_some() {
            log::debug!("Destroyed color target {id}.");
        }
        target
    }

    /// Removes a depth target, returning it. Its handle becomes stale.
    pub fn destroy_depth(&mut self, id: DepthTargetId) -> Option<RenderTarget<f32>> {
        let target = self.depth.remove(id.key());
        if target.is_some() {
            log::debug!("Destroyed depth target {id}.");
        }
        target
    }

    /// Looks up a color target.
    pub fn color(&self, id: ColorTargetId) -> Option<&RenderTarget<Rgba8>> {
        self.color.get(id.key())
    }

    /// Looks up a color target mutably.
    pub fn color_mut(&mut self, id: ColorTargetId) -> Option<&mut RenderTarget<Rgba8>> {
        self.color.get_mut(id.key())
    }

    /// Looks up a depth target.
    pub fn depth(&self, id: DepthTargetId) -> Option<&RenderTarget<f32>> {
        self.depth.get(id.key())
    }

    /// Looks up a depth target mutably.
    pub fn depth_mut(&mut self, id: DepthTargetId) -> Option<&mut RenderTarget<f32>> {
        self.depth.get_mut(id.key())
    }

    /// Borrows the optional color and depth targets of a draw at the same time.
    ///
    /// Fails if a handle is stale or if both targets are bound with different sizes.
    #[allow(clippy::type_complexity)]
    pub fn targets_mut(
        &mut self,
        color: Option<ColorTargetId>,
        depth: Option<DepthTargetId>,
    ) -> Result<
        (
            Option<&mut RenderTarget<Rgba8>>,
            Option<&mut RenderTarget<f32>>,
        ),
        RasterError,
    > {
        let color = match color {
            Some(id) => Some(
                self.color
                    .get_mut(id.key())
                    .ok_or(RasterError::InvalidColorTarget(id))?,
            ),
            None => None,
        };
        let depth = match depth {
            Some(id) => Some(
                self.depth
                    .get_mut(id.key())
                    .ok_or(RasterError::InvalidDepthTarget(id))?,
            ),
            None => None,
        };
        if let (Some(c), Some(d)) = (&color, &depth) {
            if c.size() != d.size() {
                return Err(RasterError::TargetSizeMismatch {
                    color: c.size(),
                    depth: d.size(),
                });
            }
        }
        Ok((color, depth))
    }

    /// Number of live color targets.
    pub fn color_count(&self) -> usize {
        self.color.len()
    }

    /// Number of live depth targets.
    pub fn depth_count(&self) -> usize {
        self.depth.len()
    }
}
