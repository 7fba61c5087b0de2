mod add;
pub use add::Add;

mod fail;
pub use fail::Fail;

mod mult;
pub use mult::Mult;

/// The service name the calculator methods are served under.
pub const CALCULATOR_SERVICE: &str = "calculator";
