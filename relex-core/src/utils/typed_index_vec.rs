use std::marker::PhantomData;
use std::ops::Index;
use std::ops::IndexMut;

pub trait TiVecKey {
    fn from_index(index: usize) -> Self;
    fn as_index(&self) -> usize;
}

pub struct TiVec<K, T> {
    pd: PhantomData<K>,
    inner: Vec<T>,
}

impl<K, T> Default for TiVec<K, T> {
    fn default() -> Self {
        TiVec::new()
    }
}

impl<K, T> TiVec<K, T> {
    pub(crate) fn new() -> TiVec<K, T> {
        TiVec {
            pd: Default::default(),
            inner: vec![],
        }
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K: TiVecKey, V> TiVec<K, V> {
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.inner.get_mut(key.as_index())
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.inner.get(key.as_index())
    }

    pub fn push_with_key(&mut self, f: impl FnOnce(&K) -> V) -> K {
        let key = K::from_index(self.inner.len());
        self.inner.push(f(&key));
        key
    }

    pub fn keys(&self) -> impl Iterator<Item = K> {
        (0..self.inner.len()).map(K::from_index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &V> {
        self.inner.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut V> {
        self.inner.iter_mut()
    }
}

impl<K: TiVecKey, V> Index<K> for TiVec<K, V> {
    type Output = V;

    fn index(&self, key: K) -> &V {
        &self.inner[key.as_index()]
    }
}

impl<K: TiVecKey, V> IndexMut<K> for TiVec<K, V> {
    fn index_mut(&mut self, key: K) -> &mut V {
        &mut self.inner[key.as_index()]
    }
}
