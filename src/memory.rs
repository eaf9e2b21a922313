//! Allocation of large, aligned, zeroed blocks for the transposition table.
//!
//! The table never calls the global allocator directly. It goes through a
//! `PageAllocator`, so an embedding program can supply huge-page or
//! instrumented memory without touching the table code.

use std::alloc::{self, Layout};
use std::ptr::NonNull;

/// Alignment for blocks of at least one huge page.
pub const LARGE_PAGE_SIZE: usize = 2 * 1024 * 1024;

/// Alignment for smaller blocks.
pub const PAGE_SIZE: usize = 4096;

/// Source of large zeroed memory blocks.
pub trait PageAllocator {
    /// Allocate a zeroed block described by `layout`, or `None` on failure.
    fn alloc(&self, layout: Layout) -> Option<NonNull<u8>>;

    /// Release a block.
    ///
    /// # Safety
    /// `ptr` must have been returned by `alloc` on this allocator with the
    /// same `layout`, and must not be used afterwards.
    unsafe fn free(&self, ptr: NonNull<u8>, layout: Layout);
}

/// `PageAllocator` over the global Rust allocator.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemAllocator;

impl PageAllocator for SystemAllocator {
    fn alloc(&self, layout: Layout) -> Option<NonNull<u8>> {
        if layout.size() == 0 {
            return None;
        }
        // SAFETY: the layout has a non-zero size.
        NonNull::new(unsafe { alloc::alloc_zeroed(layout) })
    }

    unsafe fn free(&self, ptr: NonNull<u8>, layout: Layout) {
        alloc::dealloc(ptr.as_ptr(), layout);
    }
}

/// Page-aligned layout for a block of `size` bytes. Blocks of a huge page
/// or more are aligned to the huge page size.
#[must_use]
pub fn page_layout(size: usize) -> Option<Layout> {
    let align = if size >= LARGE_PAGE_SIZE {
        LARGE_PAGE_SIZE
    } else {
        PAGE_SIZE
    };
    Layout::from_size_align(size, align).ok()
}
