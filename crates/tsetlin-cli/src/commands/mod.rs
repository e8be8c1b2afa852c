pub mod evaluate;
pub mod fit;
pub mod gen_noisy_xor;
pub mod predict;
