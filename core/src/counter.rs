//! Mixed-radix counting over a Cartesian product.

/// A counter over every digit vector in the Cartesian product `0..radices[0] × 0..radices[1] × ..`.
///
/// The last position is the lowest-order digit: it is advanced first, and overflow carries into
/// the preceding position. The counter is exhausted once the first position overflows, after
/// having yielded the product of all radices.
///
/// A counter over zero positions yields a single, empty digit vector, while any zero radix
/// yields nothing.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MixedRadix {
    radices: Vec<usize>,
    digits: Vec<usize>,
    state: State,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum State {
    Start,
    Running,
    Done,
}

impl MixedRadix {
    /// Creates a new counter with the provided radix for each position.
    pub fn new(radices: Vec<usize>) -> Self {
        let state = if radices.contains(&0) {
            State::Done
        } else {
            State::Start
        };

        Self {
            digits: vec![0; radices.len()],
            radices,
            state,
        }
    }

    /// Returns the current digits, or `None` if the counter has not been started or is exhausted.
    pub fn digits(&self) -> Option<&[usize]> {
        (self.state == State::Running).then_some(self.digits.as_slice())
    }

    /// Advances the counter and returns the new digits, or `None` when exhausted.
    ///
    /// This is the non-allocating counterpart to [`Iterator::next`].
    pub fn advance(&mut self) -> Option<&[usize]> {
        match self.state {
            State::Start => self.state = State::Running,
            State::Running => {
                let mut position = self.digits.len();

                loop {
                    if position == 0 {
                        self.state = State::Done;
                        break;
                    }
                    position -= 1;

                    self.digits[position] += 1;
                    if self.digits[position] < self.radices[position] {
                        break;
                    }
                    self.digits[position] = 0;
                }
            }
            State::Done => (),
        }

        self.digits()
    }

    /// Returns the total number of digit vectors yielded by a fresh counter.
    pub fn len(&self) -> usize {
        self.radices.iter().product()
    }

    /// Returns `true` if a fresh counter would yield nothing.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Iterator for MixedRadix {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        self.advance().map(<[usize]>::to_vec)
    }
}
