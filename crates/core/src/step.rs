/// A state that can be advanced by one explicit step.
///
/// The derivative carries the rate of change of every state component with
/// respect to `Delta`; stepping applies `state + derivative * delta` and never
/// solves for an implicit update. In the cohort engine `Delta` is the step
/// length in days.
pub trait StepIntegrable<Delta> {
    /// Rates of change of the state with respect to `Delta`.
    type Derivative;

    /// Returns the state reached after one explicit step of size `delta`.
    #[must_use]
    fn step(&self, derivative: Self::Derivative, delta: Delta) -> Self;
}

/// The derivative type of a [`StepIntegrable`] state.
pub type DerivativeOf<T, Delta> = <T as StepIntegrable<Delta>>::Derivative;
