use bytemuck::{Pod, Zeroable};

/// Per-instance render data handed to the host renderer as a flat float
/// buffer. The layout is part of the host protocol: 12 floats = 48 bytes
/// stride, field order fixed.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, Pod, Zeroable)]
pub struct RenderInstance {
    /// X position in world space.
    pub x: f32,
    /// Y position in world space.
    pub y: f32,
    /// Draw depth. Larger values draw in front.
    pub depth: f32,
    /// Rotation in radians.
    pub rotation: f32,
    /// World-space rendered width in game units.
    pub scale_x: f32,
    /// World-space rendered height in game units.
    pub scale_y: f32,
    /// Which texture atlas the cell comes from.
    pub atlas: f32,
    /// Atlas column.
    pub col: f32,
    /// Atlas row.
    pub row: f32,
    /// UV cell span (1.0 = single cell, 2.0 = 2x2 block).
    pub cell_span: f32,
    /// Opacity (0.0 = invisible, 1.0 = opaque).
    pub alpha: f32,
    /// Blend mode: 0.0 = alpha, 1.0 = additive.
    pub blend: f32,
}

impl RenderInstance {
    pub const FLOATS: usize = 12;
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4;
}

/// Flat instance buffer rebuilt once per frame.
///
/// Alpha-blended instances come first, additive instances after
/// [`blend_split`](Self::blend_split), so the host can draw each group in
/// one batch. Within a group, insertion order is draw order.
pub struct RenderBuffer {
    instances: Vec<RenderInstance>,
    blend_split: u32,
    /// Instances beyond this count are dropped, not reallocated.
    max_instances: usize,
}

impl RenderBuffer {
    pub const DEFAULT_MAX_INSTANCES: usize = 8192;

    pub fn new() -> Self {
        Self::with_max_instances(Self::DEFAULT_MAX_INSTANCES)
    }

    pub fn with_max_instances(max_instances: usize) -> Self {
        Self {
            instances: Vec::with_capacity(512.min(max_instances)),
            blend_split: 0,
            max_instances,
        }
    }

    pub fn clear(&mut self) {
        self.instances.clear();
        self.blend_split = 0;
    }

    /// Append an instance. Silently dropped once the buffer is full; the
    /// frame still renders with whatever fit.
    pub fn push(&mut self, instance: RenderInstance) {
        if self.instances.len() < self.max_instances {
            self.instances.push(instance);
        } else {
            log::debug!("render buffer full ({} instances)", self.max_instances);
        }
    }

    pub fn set_blend_split(&mut self, split: u32) {
        self.blend_split = split;
    }

    /// Index of the first additive instance. Everything before it is
    /// alpha-blended.
    pub fn blend_split(&self) -> u32 {
        self.blend_split
    }

    pub fn instances(&self) -> &[RenderInstance] {
        &self.instances
    }

    pub fn instance_count(&self) -> u32 {
        self.instances.len() as u32
    }

    /// Raw pointer to instance data for zero-copy host reads.
    pub fn instances_ptr(&self) -> *const f32 {
        self.instances.as_ptr() as *const f32
    }
}

impl Default for RenderBuffer {
    fn default() -> Self {
        Self::new()
    }
}
