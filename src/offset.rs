//! Contiguous storage addressed by a signed index range with an arbitrary lower bound

use {
    serde::{Deserialize, Serialize},
    std::ops::{Index, IndexMut, RangeInclusive},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OffsetVec<T> {
    lo: isize,
    data: Vec<T>,
}

impl<T> OffsetVec<T> {
    /// Collects `f(i)` for every `i` in `range`
    pub fn from_fn<F: FnMut(isize) -> T>(range: RangeInclusive<isize>, f: F) -> Self {
        let lo = *range.start();
        OffsetVec {
            lo,
            data: range.map(f).collect(),
        }
    }

    pub fn lo(&self) -> isize {
        self.lo
    }

    pub fn hi(&self) -> isize {
        self.lo + self.data.len() as isize - 1
    }

    pub fn range(&self) -> RangeInclusive<isize> {
        self.lo()..=self.hi()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, i: isize) -> Option<&T> {
        self.slot(i).map(|s| &self.data[s])
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Physical slot of logical index `i`, if in range
    pub fn slot(&self, i: isize) -> Option<usize> {
        if i < self.lo || i > self.hi() {
            None
        } else {
            Some((i - self.lo) as usize)
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (isize, &T)> {
        let lo = self.lo;
        self.data
            .iter()
            .enumerate()
            .map(move |(s, v)| (lo + s as isize, v))
    }
}

impl<T: Clone> OffsetVec<T> {
    pub fn filled(range: RangeInclusive<isize>, value: T) -> Self {
        Self::from_fn(range, |_| value.clone())
    }
}

impl<T> Index<isize> for OffsetVec<T> {
    type Output = T;

    fn index(&self, i: isize) -> &T {
        match self.slot(i) {
            Some(s) => &self.data[s],
            None => panic!(
                "index {} out of range {}..={}",
                i,
                self.lo,
                self.hi()
            ),
        }
    }
}

impl<T> IndexMut<isize> for OffsetVec<T> {
    fn index_mut(&mut self, i: isize) -> &mut T {
        let (lo, hi) = (self.lo, self.hi());
        match self.slot(i) {
            Some(s) => &mut self.data[s],
            None => panic!("index {} out of range {}..={}", i, lo, hi),
        }
    }
}
