//! Factorials over the small integer domain of goal counts.

use std::cell::RefCell;

/// The largest `n` whose factorial fits in a `u128`.
pub const MAX_FACTORIAL: u8 = 34;

pub trait Factorial {
    fn get(&self, n: u8) -> u128;
}

#[derive(Default)]
pub struct Calculator;

impl Factorial for Calculator {
    #[inline]
    fn get(&self, n: u8) -> u128 {
        assert!(n <= MAX_FACTORIAL, "{n}! overflows");
        let mut product = 1u128;
        for i in 2..=n {
            product *= i as u128;
        }
        product
    }
}

/// A memoising factorial that extends its table incrementally, only as far as the largest `n`
/// requested so far. Each product is computed once.
pub struct Memo {
    entries: RefCell<Vec<u128>>,
}
impl Memo {
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl Default for Memo {
    fn default() -> Self {
        Self {
            entries: RefCell::new(vec![1, 1]),
        }
    }
}

impl Factorial for Memo {
    #[inline]
    fn get(&self, n: u8) -> u128 {
        assert!(n <= MAX_FACTORIAL, "{n}! overflows");
        let mut entries = self.entries.borrow_mut();
        while entries.len() <= n as usize {
            let next = entries.len() as u128 * entries[entries.len() - 1];
            entries.push(next);
        }
        entries[n as usize]
    }
}
