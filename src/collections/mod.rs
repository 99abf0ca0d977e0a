//! Typed, index-safe sequences used for authority indices and the
//! dealer's per-authority vectors (`n[0..s]`, the verification vector
//! `vi[]`, partial decryption shares).

mod typed_usize;
pub use typed_usize::TypedUsize;

mod vecmap;
pub use vecmap::VecMap;

mod vecmap_iter;
pub use vecmap_iter::VecMapIter;
