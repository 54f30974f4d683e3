//! Dense kernels over [`CpuArray`](super::CpuArray)
//!
//! Kernels are plain generic functions over element types; the registration
//! code in `ops` instantiates them once per concrete tag.

pub(crate) mod elementwise;
pub(crate) mod matmul;
pub(crate) mod reduce;
pub(crate) mod shape;

use crate::tensor::Shape;
use smallvec::SmallVec;

type Strides = SmallVec<[usize; 4]>;

/// Source offset of every element of a row-major walk over `out`
///
/// `strides[i]` is the source step for a unit move along output axis `i`;
/// zero strides repeat (broadcast) the source.
pub(crate) fn gather_offsets(out: &[usize], strides: &[usize]) -> Vec<usize> {
    let numel: usize = out.iter().product();
    let mut offsets = Vec::with_capacity(numel);
    let mut index: Strides = SmallVec::from_elem(0, out.len());
    let mut offset = 0;

    for _ in 0..numel {
        offsets.push(offset);
        for axis in (0..out.len()).rev() {
            index[axis] += 1;
            offset += strides[axis];
            if index[axis] < out[axis] {
                break;
            }
            offset -= strides[axis] * index[axis];
            index[axis] = 0;
        }
    }
    offsets
}

/// Offsets reading an array of shape `src` broadcast to `out`
pub(crate) fn broadcast_offsets(src: &[usize], out: &[usize]) -> Vec<usize> {
    let pad = out.len() - src.len();
    let src_strides = Shape::from(src).strides();
    let strides: Strides = (0..out.len())
        .map(|i| {
            if i < pad || src[i - pad] == 1 {
                0
            } else {
                src_strides[i - pad]
            }
        })
        .collect();
    gather_offsets(out, &strides)
}

/// `(outer, len, inner)` split of `shape` around `axis`
pub(crate) fn split_at_axis(shape: &[usize], axis: usize) -> (usize, usize, usize) {
    let outer = shape[..axis].iter().product();
    let inner = shape[axis + 1..].iter().product();
    (outer, shape[axis], inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gather_offsets_transposes() {
        // (2, 3) read through swapped strides of a (3, 2) source
        assert_eq!(gather_offsets(&[2, 3], &[1, 2]), vec![0, 2, 4, 1, 3, 5]);
    }

    #[test]
    fn test_broadcast_offsets() {
        assert_eq!(broadcast_offsets(&[3], &[2, 3]), vec![0, 1, 2, 0, 1, 2]);
        assert_eq!(broadcast_offsets(&[2, 1], &[2, 3]), vec![0, 0, 0, 1, 1, 1]);
        assert_eq!(broadcast_offsets(&[], &[2]), vec![0, 0]);
    }

    #[test]
    fn test_split_at_axis() {
        assert_eq!(split_at_axis(&[2, 3, 4], 1), (2, 3, 4));
        assert_eq!(split_at_axis(&[5], 0), (1, 5, 1));
    }
}
