use crate::device::{DeviceBuffer, SharedDevice};

/// Vertex layout handed to the graphics device.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MapVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    pub color: [u8; 4],
}

/// CPU staging storage plus an optional device registration.
///
/// `capacity()` only grows through [`VertexBuffer::reserve_exact_for`], and only
/// to exactly what the pending batch needs.
#[derive(Debug, Default)]
pub struct VertexBuffer {
    vertices: Vec<MapVertex>,
    used: usize,
    gpu: Option<DeviceBuffer>,
}

impl VertexBuffer {
    #[inline]
    pub fn detached() -> Self {
        Self::default()
    }

    pub fn registered(device: &SharedDevice) -> Self {
        Self {
            vertices: Vec::new(),
            used: 0,
            gpu: Some(DeviceBuffer::register(device)),
        }
    }

    #[inline]
    pub fn used(&self) -> usize {
        self.used
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.vertices.len() - self.used
    }

    #[inline]
    pub fn is_registered(&self) -> bool {
        self.gpu.is_some()
    }

    #[inline]
    pub fn device_buffer(&self) -> Option<&DeviceBuffer> {
        self.gpu.as_ref()
    }

    /// Forgets written vertices, keeping capacity for the next rebuild.
    #[inline]
    pub fn clear(&mut self) {
        self.used = 0;
    }

    pub fn reserve_exact_for(&mut self, count: usize) {
        let remaining = self.remaining();
        if remaining < count {
            let grow = count - remaining;
            self.vertices.reserve_exact(grow);
            self.vertices.resize(self.vertices.len() + grow, MapVertex::default());
        }
    }

    /// Appends one vertex. Callers reserve with [`VertexBuffer::reserve_exact_for`]
    /// first; a push past capacity grows by exactly one slot.
    #[inline]
    pub fn push(&mut self, v: MapVertex) {
        if self.used == self.vertices.len() {
            self.reserve_exact_for(1);
        }
        self.vertices[self.used] = v;
        self.used += 1;
    }

    #[inline]
    pub fn vertices(&self) -> &[MapVertex] {
        &self.vertices[..self.used]
    }

    /// Sends the used range to the device, if registered.
    pub fn commit(&self) {
        if let Some(gpu) = &self.gpu {
            gpu.upload(bytemuck::cast_slice(self.vertices()));
        }
    }
}

/// The opaque stream plus a lazily registered alpha stream.
#[derive(Debug, Default)]
pub struct ChunkBuffers {
    device: Option<SharedDevice>,
    opaque: VertexBuffer,
    alpha: Option<VertexBuffer>,
}

impl ChunkBuffers {
    pub fn new(device: &SharedDevice) -> Self {
        Self {
            device: Some(device.clone()),
            opaque: VertexBuffer::registered(device),
            alpha: None,
        }
    }

    #[inline]
    pub fn opaque(&self) -> &VertexBuffer {
        &self.opaque
    }

    #[inline]
    pub fn opaque_mut(&mut self) -> &mut VertexBuffer {
        &mut self.opaque
    }

    #[inline]
    pub fn alpha(&self) -> Option<&VertexBuffer> {
        self.alpha.as_ref()
    }

    #[inline]
    pub fn is_alpha_enabled(&self) -> bool {
        self.alpha.is_some()
    }

    /// Registers the alpha stream on first use.
    pub fn enable_alpha(&mut self) -> &mut VertexBuffer {
        let device = &self.device;
        self.alpha.get_or_insert_with(|| match device {
            Some(d) => VertexBuffer::registered(d),
            None => VertexBuffer::detached(),
        })
    }

    /// Drops the alpha stream and its device registration.
    pub fn disable_alpha(&mut self) {
        self.alpha = None;
    }

    /// Destination stream for a mesh, enabling the alpha stream when needed.
    #[inline]
    pub fn stream_mut(&mut self, alpha: bool) -> &mut VertexBuffer {
        if alpha { self.enable_alpha() } else { &mut self.opaque }
    }

    /// Disables the alpha stream when the last rebuild wrote nothing to it.
    pub fn release_unused_alpha(&mut self) -> bool {
        if self.alpha.as_ref().is_some_and(|a| a.used() == 0) {
            self.alpha = None;
            return true;
        }
        false
    }

    pub fn clear(&mut self) {
        self.opaque.clear();
        if let Some(a) = &mut self.alpha {
            a.clear();
        }
    }

    pub fn commit(&self) {
        self.opaque.commit();
        if let Some(a) = &self.alpha {
            a.commit();
        }
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.opaque.used() + self.alpha.as_ref().map_or(0, VertexBuffer::used)
    }
}
