//! A small sequence matcher for token patterns
//!
//! Patterns are ordered steps of (predicate, quantifier) or (group,
//! quantifier). Matching is greedy with backtracking; replacement scans left
//! to right and never overlaps.

/// Repetition of a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantifier {
    One,
    Optional,
    ZeroOrMore,
    OneOrMore,
}

impl Quantifier {
    fn bounds(self) -> (usize, usize) {
        match self {
            Quantifier::One => (1, 1),
            Quantifier::Optional => (0, 1),
            Quantifier::ZeroOrMore => (0, usize::MAX),
            Quantifier::OneOrMore => (1, usize::MAX),
        }
    }
}

pub type Predicate<T> = fn(&T) -> bool;

enum Element<T> {
    Item(Predicate<T>),
    Group(Vec<Step<T>>),
}

pub struct Step<T> {
    element: Element<T>,
    quantifier: Quantifier,
}

impl<T> Step<T> {
    pub fn one(predicate: Predicate<T>) -> Self {
        Self::item(predicate, Quantifier::One)
    }

    pub fn optional(predicate: Predicate<T>) -> Self {
        Self::item(predicate, Quantifier::Optional)
    }

    pub fn zero_or_more(predicate: Predicate<T>) -> Self {
        Self::item(predicate, Quantifier::ZeroOrMore)
    }

    pub fn one_or_more(predicate: Predicate<T>) -> Self {
        Self::item(predicate, Quantifier::OneOrMore)
    }

    pub fn item(predicate: Predicate<T>, quantifier: Quantifier) -> Self {
        Self {
            element: Element::Item(predicate),
            quantifier,
        }
    }

    pub fn group(steps: Vec<Step<T>>, quantifier: Quantifier) -> Self {
        Self {
            element: Element::Group(steps),
            quantifier,
        }
    }
}

pub struct Pattern<T> {
    steps: Vec<Step<T>>,
}

type Continuation<'a> = &'a dyn Fn(usize) -> Option<usize>;

impl<T> Pattern<T> {
    pub fn new(steps: Vec<Step<T>>) -> Self {
        Self { steps }
    }

    /// End of the longest match starting at `start`, preferring earlier
    /// steps' greed.
    pub fn match_at(&self, items: &[T], start: usize) -> Option<usize> {
        match_steps(&self.steps, items, start, &|end| Some(end))
    }

    /// Replace every non-empty, non-overlapping match with `merge(matched)`.
    pub fn replace_all<F>(&self, items: Vec<T>, mut merge: F) -> Vec<T>
    where
        T: Clone,
        F: FnMut(&[T]) -> T,
    {
        let mut out = Vec::with_capacity(items.len());
        let mut i = 0;
        while i < items.len() {
            match self.match_at(&items, i) {
                Some(end) if end > i => {
                    out.push(merge(&items[i..end]));
                    i = end;
                }
                _ => {
                    out.push(items[i].clone());
                    i += 1;
                }
            }
        }
        out
    }
}

fn match_steps<T>(steps: &[Step<T>], items: &[T], pos: usize, rest: Continuation<'_>) -> Option<usize> {
    match steps.split_first() {
        None => rest(pos),
        Some((step, tail)) => match_repeat(step, tail, items, pos, 0, rest),
    }
}

fn match_repeat<T>(
    step: &Step<T>,
    tail: &[Step<T>],
    items: &[T],
    pos: usize,
    count: usize,
    rest: Continuation<'_>,
) -> Option<usize> {
    let (min, max) = step.quantifier.bounds();
    if count < max {
        let more = |next: usize| {
            if next == pos {
                None
            } else {
                match_repeat(step, tail, items, next, count + 1, rest)
            }
        };
        if let Some(end) = match_once(step, items, pos, &more) {
            return Some(end);
        }
    }
    if count >= min {
        match_steps(tail, items, pos, rest)
    } else {
        None
    }
}

fn match_once<T>(step: &Step<T>, items: &[T], pos: usize, rest: Continuation<'_>) -> Option<usize> {
    match &step.element {
        Element::Item(predicate) => match items.get(pos) {
            Some(item) if predicate(item) => rest(pos + 1),
            _ => None,
        },
        Element::Group(inner) => match_steps(inner, items, pos, rest),
    }
}
