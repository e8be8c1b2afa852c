mod aligned_vec;
mod bitmatrix;
mod bitvector;
mod numeric_matrix;

pub use aligned_vec::AlignedVec;
pub use bitmatrix::BitMatrix;
pub use bitvector::{blocks_for, pack_bytes, BitVector};
pub use numeric_matrix::NumericMatrix;
