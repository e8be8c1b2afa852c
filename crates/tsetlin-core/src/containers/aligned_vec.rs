use std::alloc::{alloc_zeroed, dealloc, handle_alloc_error, Layout};
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::ptr::NonNull;

use serde::de::{Deserializer, SeqAccess, Visitor};
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};

const ALIGNMENT: usize = 64;

/// An ordered sequence of `T` whose backing buffer starts at a 64-byte
/// aligned address, for SIMD-friendly contiguous iteration. Only `Copy`
/// element types are supported (the engine only ever stores integers and
/// `u64` bit-blocks in these), which keeps the zero-initialization path a
/// single `alloc_zeroed` call.
pub struct AlignedVec<T> {
    ptr: NonNull<T>,
    len: usize,
}

unsafe impl<T: Send> Send for AlignedVec<T> {}
unsafe impl<T: Sync> Sync for AlignedVec<T> {}

impl<T: Copy + Default> AlignedVec<T> {
    fn layout(len: usize) -> Layout {
        let align = ALIGNMENT.max(std::mem::align_of::<T>());
        let size = len * std::mem::size_of::<T>();
        Layout::from_size_align(size, align).expect("valid layout")
    }

    /// Allocate `len` elements, zero-initialized.
    pub fn zeroed(len: usize) -> Self {
        if len == 0 {
            return AlignedVec {
                ptr: NonNull::dangling(),
                len: 0,
            };
        }
        let layout = Self::layout(len);
        // SAFETY: layout has nonzero size (len > 0) and `T`'s all-zero bit
        // pattern is always a valid `T` for the integer/bit-block types
        // this container is instantiated with.
        let raw = unsafe { alloc_zeroed(layout) };
        let ptr = match NonNull::new(raw as *mut T) {
            Some(p) => p,
            None => handle_alloc_error(layout),
        };
        AlignedVec { ptr, len }
    }

    pub fn filled(len: usize, value: T) -> Self {
        let mut v = Self::zeroed(len);
        for slot in v.iter_mut() {
            *slot = value;
        }
        v
    }

    pub fn from_slice(data: &[T]) -> Self {
        let mut v = Self::zeroed(data.len());
        v.as_mut_slice().copy_from_slice(data);
        v
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }

    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.ptr.as_ptr()
    }

    pub fn as_slice(&self) -> &[T] {
        if self.len == 0 {
            &[]
        } else {
            unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
        }
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        if self.len == 0 {
            &mut []
        } else {
            unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
        }
    }
}

impl<T: Copy + Default> Clone for AlignedVec<T> {
    fn clone(&self) -> Self {
        Self::from_slice(self.as_slice())
    }
}

impl<T: Copy + Default> Drop for AlignedVec<T> {
    fn drop(&mut self) {
        if self.len != 0 {
            let layout = Self::layout(self.len);
            unsafe { dealloc(self.ptr.as_ptr() as *mut u8, layout) };
        }
    }
}

impl<T: Copy + Default> Deref for AlignedVec<T> {
    type Target = [T];
    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T: Copy + Default> DerefMut for AlignedVec<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T: Copy + Default + PartialEq> PartialEq for AlignedVec<T> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Copy + Default + fmt::Debug> fmt::Debug for AlignedVec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice().iter()).finish()
    }
}

impl<T: Copy + Default + Serialize> Serialize for AlignedVec<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len))?;
        for item in self.as_slice() {
            seq.serialize_element(item)?;
        }
        seq.end()
    }
}

impl<'de, T: Copy + Default + Deserialize<'de>> Deserialize<'de> for AlignedVec<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct V<T>(std::marker::PhantomData<T>);
        impl<'de, T: Copy + Default + Deserialize<'de>> Visitor<'de> for V<T> {
            type Value = AlignedVec<T>;
            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a sequence of elements")
            }
            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let mut buf = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(v) = seq.next_element()? {
                    buf.push(v);
                }
                Ok(AlignedVec::from_slice(&buf))
            }
        }
        deserializer.deserialize_seq(V(std::marker::PhantomData))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zeroed_is_aligned_to_64() {
        let v: AlignedVec<i32> = AlignedVec::zeroed(17);
        assert_eq!(v.as_ptr() as usize % ALIGNMENT, 0);
        assert!(v.iter().all(|&x| x == 0));
    }

    #[test]
    fn round_trips_through_json() {
        let v: AlignedVec<i16> = AlignedVec::from_slice(&[1, -2, 3, -4]);
        let json = serde_json::to_string(&v).unwrap();
        let back: AlignedVec<i16> = serde_json::from_str(&json).unwrap();
        assert_eq!(v, back);
    }

    #[test]
    fn empty_vec_does_not_allocate() {
        let v: AlignedVec<u64> = AlignedVec::zeroed(0);
        assert_eq!(v.len(), 0);
        assert!(v.is_empty());
    }
}
