/// A callable model that maps a typed input to a typed output.
///
/// Implementations must be pure: the same input always yields the same output
/// and no state is mutated between calls. The cohort engine relies on this to
/// make runs bit-reproducible and safe to evaluate from many threads at once.
pub trait Model {
    type Input;
    type Output;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Evaluates the model for `input`.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] when the model cannot be evaluated, for example
    /// when an external data source has no value for the requested input.
    fn call(&self, input: &Self::Input) -> Result<Self::Output, Self::Error>;
}
