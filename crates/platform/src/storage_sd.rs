//! SD card [`Storage`] over an `embedded-sdmmc` FAT volume.
//!
//! The `VolumeManager` owns every open handle, so the storage and its files
//! share it through a `RefCell`. The firmware runs a single-threaded executor
//! and never holds a borrow across an await point, which is the whole
//! soundness argument; the manager lives in a `StaticCell` set up by the
//! board bring-up code.
//!
//! Mounting opens volume 0 and its root directory; [`Storage::release`]
//! closes both. File handles close themselves on drop so a failed playback
//! session cannot leak them.

use core::cell::RefCell;

use embedded_sdmmc::{
    BlockDevice, Mode, RawDirectory, RawFile, TimeSource, Timestamp, VolumeIdx, VolumeManager,
};

use crate::storage::{File, Storage};

/// Status code for SD storage operations.
#[derive(Debug)]
pub enum SdStorageError<E: core::fmt::Debug> {
    /// The volume was already released (or never mounted).
    NotMounted,
    /// An empty path, or one nesting more directories than the traversal
    /// supports.
    InvalidPath,
    /// A seek target beyond what FAT can address.
    SeekOutOfRange,
    /// Error from the FAT layer or the card itself.
    Fat(embedded_sdmmc::Error<E>),
}

impl<E: core::fmt::Debug> From<embedded_sdmmc::Error<E>> for SdStorageError<E> {
    fn from(e: embedded_sdmmc::Error<E>) -> Self {
        Self::Fat(e)
    }
}

impl<E: core::fmt::Debug> core::fmt::Display for SdStorageError<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotMounted => f.write_str("SD volume not mounted"),
            Self::InvalidPath => f.write_str("invalid path"),
            Self::SeekOutOfRange => f.write_str("seek position beyond FAT range"),
            Self::Fat(e) => write!(f, "FAT error: {e:?}"),
        }
    }
}

/// Error alias tied to a block device.
pub type SdError<D> = SdStorageError<<D as BlockDevice>::Error>;

/// A fixed "no RTC" time source.
///
/// The player only ever reads, so FAT timestamps are never written back;
/// `embedded-sdmmc` still requires a `TimeSource` to construct the manager.
pub struct NullTimeSource;

impl TimeSource for NullTimeSource {
    fn get_timestamp(&self) -> Timestamp {
        Timestamp {
            year_since_1970: 0,
            zero_indexed_month: 0,
            zero_indexed_day: 0,
            hours: 0,
            minutes: 0,
            seconds: 0,
        }
    }
}

/// A mounted FAT volume on the SD card.
pub struct SdFatStorage<'a, D: BlockDevice, T: TimeSource> {
    mgr: &'a RefCell<VolumeManager<D, T>>,
    volume: Option<embedded_sdmmc::RawVolume>,
    root: Option<RawDirectory>,
}

impl<'a, D: BlockDevice, T: TimeSource> SdFatStorage<'a, D, T> {
    /// Mount volume 0 and open its root directory.
    ///
    /// A mount failure is operator-visible and fatal for the session; the
    /// caller reports it and does not retry.
    pub fn mount(mgr: &'a RefCell<VolumeManager<D, T>>) -> Result<Self, SdError<D>> {
        let mut m = mgr.borrow_mut();
        let volume = m.open_raw_volume(VolumeIdx(0))?;
        let root = match m.open_root_dir(volume) {
            Ok(root) => root,
            Err(e) => {
                let _ = m.close_volume(volume);
                return Err(e.into());
            }
        };
        drop(m);
        Ok(Self {
            mgr,
            volume: Some(volume),
            root: Some(root),
        })
    }

    /// Walk `/`-separated directory components and open the final one as a
    /// file. Intermediate directory handles are closed before returning.
    fn open_at(
        m: &mut VolumeManager<D, T>,
        root: RawDirectory,
        path: &str,
    ) -> Result<RawFile, SdError<D>> {
        let mut dir = root;
        let mut opened: heapless::Vec<RawDirectory, 4> = heapless::Vec::new();
        let mut result = Err(SdStorageError::InvalidPath);

        let mut components = path.split('/').filter(|c| !c.is_empty()).peekable();
        while let Some(component) = components.next() {
            if components.peek().is_none() {
                result = m
                    .open_file_in_dir(dir, component, Mode::ReadOnly)
                    .map_err(SdStorageError::Fat);
                break;
            }
            match m.open_dir(dir, component) {
                Ok(sub) => {
                    if opened.push(sub).is_err() {
                        let _ = m.close_dir(sub);
                        result = Err(SdStorageError::InvalidPath);
                        break;
                    }
                    dir = sub;
                }
                Err(e) => {
                    result = Err(e.into());
                    break;
                }
            }
        }

        for d in opened {
            let _ = m.close_dir(d);
        }
        result
    }
}

impl<'a, D: BlockDevice, T: TimeSource> Storage for SdFatStorage<'a, D, T> {
    type Error = SdError<D>;
    type File = SdFatFile<'a, D, T>;

    async fn open_file(&mut self, path: &str) -> Result<Self::File, Self::Error> {
        let root = self.root.ok_or(SdStorageError::NotMounted)?;
        let mut m = self.mgr.borrow_mut();
        let file = Self::open_at(&mut m, root, path)?;
        let size = match m.file_length(file) {
            Ok(len) => len,
            Err(e) => {
                let _ = m.close_file(file);
                return Err(e.into());
            }
        };
        drop(m);
        Ok(SdFatFile {
            mgr: self.mgr,
            file,
            size,
        })
    }

    async fn exists(&mut self, path: &str) -> Result<bool, Self::Error> {
        let root = self.root.ok_or(SdStorageError::NotMounted)?;
        let mut m = self.mgr.borrow_mut();
        // Probe by opening; any failure reads as absent, which is all the
        // caller can act on anyway.
        match Self::open_at(&mut m, root, path) {
            Ok(file) => {
                let _ = m.close_file(file);
                Ok(true)
            }
            Err(_) => Ok(false),
        }
    }

    async fn release(&mut self) -> Result<(), Self::Error> {
        let mut m = self.mgr.borrow_mut();
        if let Some(root) = self.root.take() {
            m.close_dir(root)?;
        }
        if let Some(volume) = self.volume.take() {
            m.close_volume(volume)?;
        }
        Ok(())
    }
}

/// An open file on the SD card. Closes its handle on drop.
pub struct SdFatFile<'a, D: BlockDevice, T: TimeSource> {
    mgr: &'a RefCell<VolumeManager<D, T>>,
    file: RawFile,
    size: u32,
}

impl<D: BlockDevice, T: TimeSource> File for SdFatFile<'_, D, T> {
    type Error = SdError<D>;

    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        match self.mgr.borrow_mut().read(self.file, buf) {
            Ok(n) => Ok(n),
            // End of file is not an error at this layer; short reads are the
            // caller's signal.
            Err(embedded_sdmmc::Error::EndOfFile) => Ok(0),
            Err(e) => Err(e.into()),
        }
    }

    async fn seek(&mut self, pos: u64) -> Result<u64, Self::Error> {
        let offset = u32::try_from(pos).map_err(|_| SdStorageError::SeekOutOfRange)?;
        self.mgr
            .borrow_mut()
            .file_seek_from_start(self.file, offset)?;
        Ok(pos)
    }

    fn size(&self) -> u64 {
        u64::from(self.size)
    }
}

impl<D: BlockDevice, T: TimeSource> Drop for SdFatFile<'_, D, T> {
    fn drop(&mut self) {
        let _ = self.mgr.borrow_mut().close_file(self.file);
    }
}
