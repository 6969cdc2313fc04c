/// Vertex buffer holding one frame's instances of a single kind.
///
/// The whole frame is uploaded at once after batching, so draws address it
/// by byte offset and the buffer only ever grows.
pub struct UploadRing {
    pub buf: wgpu::Buffer,
    label: &'static str,
    cap: u64,
}

impl UploadRing {
    pub fn new(device: &wgpu::Device, label: &'static str, cap: u64) -> Self {
        Self {
            buf: Self::create(device, label, cap),
            label,
            cap,
        }
    }

    fn create(device: &wgpu::Device, label: &str, cap: u64) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: cap,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    /// Replaces the buffer contents with `bytes`, growing to the next power
    /// of two when they don't fit.
    pub fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        let need = bytes.len() as u64;
        if need > self.cap {
            let cap = need.next_power_of_two();
            log::debug!("growing {} from {} to {} bytes", self.label, self.cap, cap);
            self.buf = Self::create(device, self.label, cap);
            self.cap = cap;
        }
        queue.write_buffer(&self.buf, 0, bytes);
    }
}
