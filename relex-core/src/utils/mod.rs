pub(crate) mod observable;
pub(crate) mod sparse_set;
pub(crate) mod typed_index_vec;
