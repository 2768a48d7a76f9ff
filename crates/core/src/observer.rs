/// Receives events emitted while a simulation advances.
///
/// Observers see every event exactly once and in order. They may accumulate
/// whatever they need (timing metrics, running sums, a retained trajectory)
/// but cannot alter the simulation itself.
///
/// Closures of the form `FnMut(&E)` are observers, as is `()` which discards
/// everything. A pair of observers forwards each event to both, in order.
pub trait Observer<E> {
    /// Handles a single event.
    fn observe(&mut self, event: &E);
}

impl<E> Observer<E> for () {
    fn observe(&mut self, _event: &E) {}
}

impl<E, F> Observer<E> for F
where
    F: FnMut(&E),
{
    fn observe(&mut self, event: &E) {
        self(event);
    }
}

impl<E, A, B> Observer<E> for (A, B)
where
    A: Observer<E>,
    B: Observer<E>,
{
    fn observe(&mut self, event: &E) {
        self.0.observe(event);
        self.1.observe(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter(usize);

    impl Observer<f64> for Counter {
        fn observe(&mut self, _event: &f64) {
            self.0 += 1;
        }
    }

    fn feed<O: Observer<f64>>(observer: &mut O, events: &[f64]) {
        for event in events {
            observer.observe(event);
        }
    }

    #[test]
    fn unit_discards_events() {
        feed(&mut (), &[1.0, 2.0]);
    }

    #[test]
    fn closures_see_events_in_order() {
        let mut seen = Vec::new();
        feed(&mut |day: &f64| seen.push(*day), &[3.0, 1.0, 2.0]);

        assert_eq!(seen, vec![3.0, 1.0, 2.0]);
    }

    #[test]
    fn pairs_forward_to_both() {
        let mut pair = (Counter(0), Counter(10));
        feed(&mut pair, &[0.5, 1.5, 2.5]);

        assert_eq!(pair.0.0, 3);
        assert_eq!(pair.1.0, 13);
    }
}
