use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(pub u64);

/// Rendering collaborator that owns GPU-resident vertex storage. The map only
/// creates, fills, and releases buffers; it never draws.
pub trait GraphicsDevice {
    fn create_buffer(&mut self) -> BufferId;
    fn upload(&mut self, id: BufferId, bytes: &[u8]);
    fn release(&mut self, id: BufferId);
}

pub type SharedDevice = Rc<RefCell<dyn GraphicsDevice>>;

impl core::fmt::Debug for dyn GraphicsDevice {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("GraphicsDevice")
    }
}

/// A registered device buffer, released when dropped.
pub struct DeviceBuffer {
    id: BufferId,
    device: SharedDevice,
}

impl DeviceBuffer {
    pub fn register(device: &SharedDevice) -> Self {
        let id = device.borrow_mut().create_buffer();
        Self {
            id,
            device: Rc::clone(device),
        }
    }

    #[inline]
    pub fn id(&self) -> BufferId {
        self.id
    }

    pub fn upload(&self, bytes: &[u8]) {
        self.device.borrow_mut().upload(self.id, bytes);
    }
}

impl Drop for DeviceBuffer {
    fn drop(&mut self) {
        self.device.borrow_mut().release(self.id);
    }
}

impl core::fmt::Debug for DeviceBuffer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DeviceBuffer").field("id", &self.id).finish()
    }
}

/// Hands out ids and discards uploads.
#[derive(Debug, Default)]
pub struct NullDevice {
    next: u64,
}

impl GraphicsDevice for NullDevice {
    fn create_buffer(&mut self) -> BufferId {
        self.next += 1;
        BufferId(self.next)
    }

    fn upload(&mut self, _id: BufferId, _bytes: &[u8]) {}

    fn release(&mut self, _id: BufferId) {}
}

/// Tracks buffer lifetimes and upload traffic; panics on use-after-release
/// and double release.
#[derive(Debug, Default)]
pub struct RecordingDevice {
    next: u64,
    live: BTreeSet<BufferId>,
    pub created: usize,
    pub released: usize,
    pub uploads: usize,
    pub bytes_uploaded: usize,
}

impl RecordingDevice {
    #[inline]
    pub fn live_buffers(&self) -> usize {
        self.live.len()
    }

    #[inline]
    pub fn is_live(&self, id: BufferId) -> bool {
        self.live.contains(&id)
    }
}

impl GraphicsDevice for RecordingDevice {
    fn create_buffer(&mut self) -> BufferId {
        self.next += 1;
        let id = BufferId(self.next);
        self.live.insert(id);
        self.created += 1;
        id
    }

    fn upload(&mut self, id: BufferId, bytes: &[u8]) {
        assert!(self.live.contains(&id), "upload to released buffer {id:?}");
        self.uploads += 1;
        self.bytes_uploaded += bytes.len();
    }

    fn release(&mut self, id: BufferId) {
        assert!(self.live.remove(&id), "buffer {id:?} released twice");
        self.released += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_buffer_releases_on_drop() {
        let rec = Rc::new(RefCell::new(RecordingDevice::default()));
        let device: SharedDevice = rec.clone();
        let a = DeviceBuffer::register(&device);
        let b = DeviceBuffer::register(&device);
        assert_ne!(a.id(), b.id());
        a.upload(&[1, 2, 3]);
        assert_eq!(rec.borrow().live_buffers(), 2);
        let released = a.id();
        drop(a);
        assert_eq!(rec.borrow().live_buffers(), 1);
        assert!(!rec.borrow().is_live(released));
        assert!(rec.borrow().is_live(b.id()));
        drop(b);
        let r = rec.borrow();
        assert_eq!((r.created, r.released, r.uploads, r.bytes_uploaded), (2, 2, 1, 3));
    }
}
