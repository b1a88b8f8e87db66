//! Configuration of the volume reader.

use dcmstack_transfer_syntax_registry::{CodecRegistry, ExternalCodec};
use std::sync::Arc;

/// The order of the rows of each slice in memory.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MemoryRowOrder {
    /// Keep the order of the files, which is top-down.
    #[default]
    FileNative,
    /// The first row in memory is the top row of the image.
    TopDown,
    /// The first row in memory is the bottom row of the image.
    /// The slice order is also reversed,
    /// so that the patient matrix stays right-handed.
    BottomUp,
}

impl MemoryRowOrder {
    /// Whether rows are flipped relative to the files.
    pub fn is_bottom_up(self) -> bool {
        self == MemoryRowOrder::BottomUp
    }
}

/// Options of a [`VolumeReader`](crate::VolumeReader).
///
/// Built with consuming methods:
///
/// ```
/// use dcmstack_reader::{MemoryRowOrder, ReadOptions};
///
/// let options = ReadOptions::new()
///     .time_as_vector(true)
///     .memory_row_order(MemoryRowOrder::BottomUp);
/// assert!(options.sorting);
/// ```
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct ReadOptions {
    /// Order slices by position and time (default),
    /// or keep the order of the files.
    pub sorting: bool,
    /// Store the time points of a slice as components.
    pub time_as_vector: bool,
    /// Read only this time point.
    pub desired_time_index: Option<usize>,
    /// Read only this stack of a multi-stack series.
    pub desired_stack_id: Option<String>,
    /// The order of rows in memory.
    pub memory_row_order: MemoryRowOrder,
    /// Bring files with different rescale parameters to a common one.
    pub auto_rescale: bool,
    /// The codecs of encapsulated pixel data.
    pub codecs: CodecRegistry,
}

impl Default for ReadOptions {
    fn default() -> Self {
        ReadOptions {
            sorting: true,
            time_as_vector: false,
            desired_time_index: None,
            desired_stack_id: None,
            memory_row_order: MemoryRowOrder::FileNative,
            auto_rescale: true,
            codecs: CodecRegistry::new(),
        }
    }
}

impl ReadOptions {
    /// Create the default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether slices are sorted.
    pub fn sorting(mut self, sorting: bool) -> Self {
        self.sorting = sorting;
        self
    }

    /// Set whether time points become components of a slice.
    pub fn time_as_vector(mut self, time_as_vector: bool) -> Self {
        self.time_as_vector = time_as_vector;
        self
    }

    /// Select a single time point.
    pub fn desired_time_index(mut self, index: Option<usize>) -> Self {
        self.desired_time_index = index;
        self
    }

    /// Select a stack by its identifier.
    pub fn desired_stack_id(mut self, stack_id: Option<String>) -> Self {
        self.desired_stack_id = stack_id;
        self
    }

    /// Set the order of rows in memory.
    pub fn memory_row_order(mut self, order: MemoryRowOrder) -> Self {
        self.memory_row_order = order;
        self
    }

    /// Set whether differing rescale parameters are normalized.
    pub fn auto_rescale(mut self, auto_rescale: bool) -> Self {
        self.auto_rescale = auto_rescale;
        self
    }

    /// Replace the codec registry.
    pub fn codecs(mut self, codecs: CodecRegistry) -> Self {
        self.codecs = codecs;
        self
    }

    /// Add a codec for an encapsulated transfer syntax.
    pub fn register_codec(mut self, uid: &str, codec: Arc<dyn ExternalCodec>) -> Self {
        self.codecs.register(uid, codec);
        self
    }
}
